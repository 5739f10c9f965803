use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::streson::{ChannelState, StresonError};
use crate::engine::AudioContext;
use crate::graph::node::{NodeId, StereoFrame};
use crate::graph::signal::Signal;
use crate::{DEFAULT_FEEDBACK, DEFAULT_FUNDAMENTAL_HZ};

/*
String Resonator Node
=====================

Passes its stereo input through a string resonator (comb / low-pass /
all-pass feedback network), simulating sympathetic resonance: feed it a
signal and the "string" tuned to the fundamental frequency rings along.

The node owns exactly two channel states - left and right - with identical
coefficients but independent audio history. Both parameters are Signals,
so either can be a constant or another node's live output:

  // Fixed tuning:
  let res = StringResonatorNode::new(input, &ctx)?;                // 100 Hz, 0.95

  // LFO-warbled tuning:
  let res = StringResonatorNode::with_parameters(
      input, Signal::Node(lfo), Signal::Value(0.9), &ctx)?;

Parameter binding
-----------------

A single logical parameter drives the matching coefficient field in BOTH
channel states, every frame, after the signal is resolved against the
current upstream outputs. Rebinding with `set_parameter` replaces the bound
signal and rebuilds the dependency list in full from the current bindings,
so a rebind takes effect on the next frame and no stale upstream edge
survives.

Stability is the caller's problem by contract: feedback >= 1 diverges and
nothing here clamps it. `set_strict(true)` turns non-finite resolved
parameters into panics for debugging; the permissive default lets them
through as audible artifacts, matching the reference behavior.
*/

/// Bindable parameters of a [`StringResonatorNode`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResonatorParam {
    /// Fundamental frequency of the string, in Hz. Default 100.0.
    FundamentalFrequency,
    /// Feedback gain, nominally [0, 1). Default 0.95.
    Feedback,
}

pub struct StringResonatorNode {
    input: NodeId,
    fundamental_frequency: Signal,
    feedback: Signal,
    left: ChannelState,
    right: ChannelState,
    deps: Vec<NodeId>,
    strict: bool,
    released: bool,
}

impl StringResonatorNode {
    /// Construct with default parameter values. Allocates and initializes
    /// both channel states; an init failure is fatal and no partial node
    /// survives.
    pub fn new(input: NodeId, ctx: &AudioContext) -> Result<Self, StresonError> {
        let mut left = ChannelState::new();
        let mut right = ChannelState::new();
        left.init(ctx)?;
        right.init(ctx)?;

        let mut node = Self {
            input,
            fundamental_frequency: Signal::Value(DEFAULT_FUNDAMENTAL_HZ),
            feedback: Signal::Value(DEFAULT_FEEDBACK),
            left,
            right,
            deps: Vec::new(),
            strict: false,
            released: false,
        };
        node.bind(ResonatorParam::FundamentalFrequency, DEFAULT_FUNDAMENTAL_HZ);
        node.bind(ResonatorParam::Feedback, DEFAULT_FEEDBACK);
        node.rebuild_dependencies();
        Ok(node)
    }

    /// Construct, then rebind both named parameters.
    pub fn with_parameters(
        input: NodeId,
        fundamental_frequency: Signal,
        feedback: Signal,
        ctx: &AudioContext,
    ) -> Result<Self, StresonError> {
        let mut node = Self::new(input, ctx)?;
        node.set_parameter(ResonatorParam::FundamentalFrequency, fundamental_frequency);
        node.set_parameter(ResonatorParam::Feedback, feedback);
        Ok(node)
    }

    /// Rebind a parameter to a new signal. Takes effect on the next
    /// `process_frame`, identically on both channels.
    pub fn set_parameter(&mut self, param: ResonatorParam, signal: Signal) {
        match param {
            ResonatorParam::FundamentalFrequency => self.fundamental_frequency = signal,
            ResonatorParam::Feedback => self.feedback = signal,
        }
        // Constants can be pushed into the channel states right away;
        // node-backed signals are resolved per frame.
        if let Signal::Value(value) = signal {
            self.bind(param, value);
        }
        self.rebuild_dependencies();
        debug!(?param, ?signal, "resonator parameter rebound");
    }

    /// Currently bound signal for a parameter.
    pub fn parameter(&self, param: ResonatorParam) -> Signal {
        match param {
            ResonatorParam::FundamentalFrequency => self.fundamental_frequency,
            ResonatorParam::Feedback => self.feedback,
        }
    }

    /// Upstream nodes this node reads: the audio input plus any node
    /// backing a parameter signal.
    pub fn dependencies(&self) -> &[NodeId] {
        &self.deps
    }

    /// Panic on non-finite resolved parameters instead of passing them
    /// through. Off by default.
    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Effective coefficients currently held by the (left, right) channel
    /// states. Equal by construction; both returned so hosts can assert
    /// the lock-step invariant cheaply.
    pub fn channel_frequencies(&self) -> (f32, f32) {
        (self.left.frequency, self.right.frequency)
    }

    pub fn channel_feedback(&self) -> (f32, f32) {
        (self.left.feedback, self.right.feedback)
    }

    /// Write one logical parameter into the matching field of both channel
    /// states. Audio history stays independent; coefficients never differ.
    fn bind(&mut self, param: ResonatorParam, value: f32) {
        match param {
            ResonatorParam::FundamentalFrequency => {
                self.left.frequency = value;
                self.right.frequency = value;
            }
            ResonatorParam::Feedback => {
                self.left.feedback = value;
                self.right.feedback = value;
            }
        }
    }

    /// Full rebuild from current bindings: input first, then parameter
    /// sources in declaration order, deduplicated. Resolution is
    /// idempotent per node, so duplicates would be harmless - they are
    /// dropped anyway to keep traversal minimal.
    fn rebuild_dependencies(&mut self) {
        self.deps.clear();
        self.deps.push(self.input);
        for signal in [self.fundamental_frequency, self.feedback] {
            if let Some(id) = signal.source() {
                if !self.deps.contains(&id) {
                    self.deps.push(id);
                }
            }
        }
    }

    /// Compute one stereo frame from the upstream outputs. Advances both
    /// delay lines; calling twice per frame is not idempotent by design.
    pub(crate) fn process_frame(&mut self, outputs: &[StereoFrame]) -> StereoFrame {
        assert!(
            !self.released,
            "StringResonatorNode::process_frame called after release"
        );

        let freq = self.fundamental_frequency.resolve(outputs);
        let gain = self.feedback.resolve(outputs);
        if self.strict {
            assert!(
                freq.is_finite() && gain.is_finite(),
                "non-finite resonator parameter: frequency={freq}, feedback={gain}"
            );
        }
        self.bind(ResonatorParam::FundamentalFrequency, freq);
        self.bind(ResonatorParam::Feedback, gain);

        let input = outputs
            .get(self.input.index())
            .copied()
            .unwrap_or_else(|| panic!("resonator input references unknown node {:?}", self.input));
        StereoFrame {
            left: self.left.process(input.left),
            right: self.right.process(input.right),
        }
    }

    /// Destroy both channel states. Valid exactly once; any use of the
    /// node afterwards is a protocol violation and panics.
    pub fn release(&mut self) {
        assert!(!self.released, "StringResonatorNode::release called twice");
        self.left.destroy();
        self.right.destroy();
        self.released = true;
    }
}
