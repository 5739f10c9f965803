pub mod dsp;
pub mod engine; // Frame driver and injected audio context
pub mod graph; // Signal nodes and parameter binding

/// Lowest fundamental the resonator delay line can represent. Frequencies
/// below this are clamped at compute time; the delay buffer is sized
/// against it at init time.
pub const MIN_FUNDAMENTAL_HZ: f32 = 20.0;

pub const DEFAULT_FUNDAMENTAL_HZ: f32 = 100.0;
pub const DEFAULT_FEEDBACK: f32 = 0.95;
