//! Low-level DSP primitives used by the higher level graph nodes.
//!
//! These components are allocation-free and realtime-safe once initialized,
//! making them safe to run inside audio callbacks. They intentionally stay
//! focused on the signal-processing math so the graph layer can own
//! parameter binding and scheduling.

/// Comb/low-pass/all-pass string resonator channel.
pub mod streson;

pub use streson::{ChannelState, StresonError};
