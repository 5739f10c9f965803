//! Signal graph nodes and parameter binding.
//!
//! Nodes wrap the low-level DSP primitives with the patching layer: typed
//! handles, live parameter signals, and per-frame stereo outputs read by
//! downstream consumers. The driver that walks nodes in dependency order
//! lives in [`crate::engine`].

/// Control-rate sine source for parameter modulation.
pub mod lfo;
/// Node handles, stereo frames, and the closed node set.
pub mod node;
/// Stereo string resonator node.
pub mod resonator;
/// Constant-or-live parameter values.
pub mod signal;

pub use lfo::LfoNode;
pub use node::{InputNode, NodeId, SignalNode, StereoFrame};
pub use resonator::{ResonatorParam, StringResonatorNode};
pub use signal::Signal;
