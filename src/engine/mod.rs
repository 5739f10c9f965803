//! Frame driver and injected audio context.

pub mod context;
pub mod graph;

pub use context::AudioContext;
pub use graph::{GraphError, SignalGraph};
