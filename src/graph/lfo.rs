use std::f32::consts::TAU;

use crate::engine::AudioContext;
use crate::graph::node::StereoFrame;

/*
LFO (Low Frequency Oscillator)
==============================

A control-rate sine source for driving node parameters. Unlike an audio
oscillator it ignores note pitch entirely: it runs at a fixed rate and
publishes `center + depth * sin(phase)` on both channels, so it plugs
straight into any parameter Signal.

  // Vibrato-style wobble on a resonator's fundamental:
  let lfo = graph.add_node(SignalNode::Lfo(LfoNode::sine(5.0, 100.0, 8.0, ctx)));
  graph.set_parameter(res, ResonatorParam::FundamentalFrequency, Signal::Node(lfo))?;

Depth scales the swing: center=100, depth=8 sweeps 92..108. Depth 0 makes
the LFO a plain constant source, handy for tests.
*/

pub struct LfoNode {
    frequency: f32, // Fixed rate in Hz, independent of any note context
    center: f32,
    depth: f32,
    phase: f32, // Normalized 0..1
    sample_rate: f32,
    released: bool,
}

impl LfoNode {
    /// The context must carry a positive, finite sample rate; the rate
    /// divides the phase increment, so a degenerate one is a
    /// precondition failure rather than a NaN source.
    pub fn sine(frequency: f32, center: f32, depth: f32, ctx: &AudioContext) -> Self {
        let sample_rate = ctx.sample_rate;
        assert!(
            sample_rate.is_finite() && sample_rate > 0.0,
            "LfoNode::sine requires a positive sample rate, got {sample_rate}"
        );
        Self {
            frequency,
            center,
            depth,
            phase: 0.0,
            sample_rate,
            released: false,
        }
    }

    pub(crate) fn process_frame(&mut self) -> StereoFrame {
        let value = self.center + self.depth * (TAU * self.phase).sin();
        self.phase += self.frequency / self.sample_rate;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        StereoFrame::splat(value)
    }

    pub(crate) fn release(&mut self) {
        assert!(!self.released, "LfoNode::release called twice");
        self.released = true;
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_is_the_center_value() {
        let ctx = AudioContext::new(48_000.0);
        let mut lfo = LfoNode::sine(5.0, 100.0, 25.0, &ctx);
        assert_eq!(lfo.process_frame(), StereoFrame::splat(100.0));
    }

    #[test]
    #[should_panic(expected = "positive sample rate")]
    fn rejects_a_degenerate_sample_rate() {
        LfoNode::sine(5.0, 100.0, 8.0, &AudioContext::new(0.0));
    }

    #[test]
    fn sweeps_within_center_plus_minus_depth() {
        let ctx = AudioContext::new(48_000.0);
        let mut lfo = LfoNode::sine(50.0, 100.0, 8.0, &ctx);
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for _ in 0..48_000 {
            let v = lfo.process_frame().left;
            min = min.min(v);
            max = max.max(v);
        }
        assert!(min >= 92.0 - 1e-3 && min < 93.0, "min {min}");
        assert!(max <= 108.0 + 1e-3 && max > 107.0, "max {max}");
    }
}
