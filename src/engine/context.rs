/// Shared, read-only processing context handed to nodes at init time.
///
/// Passed explicitly rather than read from a process-wide singleton, so
/// tests can run with synthetic sample rates. Validation happens where the
/// rate is consumed (delay-line sizing in `ChannelState::init`); the
/// context itself is an opaque carrier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioContext {
    pub sample_rate: f32,
}

impl AudioContext {
    pub fn new(sample_rate: f32) -> Self {
        Self { sample_rate }
    }
}
