#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::graph::lfo::LfoNode;
use crate::graph::resonator::StringResonatorNode;

/// Handle to a node stored in a [`SignalGraph`](crate::engine::SignalGraph).
/// Handles are stable for the life of the graph; released nodes keep their
/// slot so downstream handles never shift.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One computed stereo sample pair. Persisted on the graph between frames
/// so downstream consumers read the most recent value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StereoFrame {
    pub left: f32,
    pub right: f32,
}

impl StereoFrame {
    /// Same value on both channels (control sources, mono feeds).
    pub fn splat(value: f32) -> Self {
        Self {
            left: value,
            right: value,
        }
    }
}

/// Externally fed stereo source. The host writes one frame per driver tick
/// before the graph computes; the node republishes it unchanged.
#[derive(Debug, Default)]
pub struct InputNode {
    frame: StereoFrame,
    released: bool,
}

impl InputNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_frame(&mut self, left: f32, right: f32) {
        self.frame = StereoFrame { left, right };
    }

    pub(crate) fn process_frame(&self) -> StereoFrame {
        self.frame
    }

    pub(crate) fn release(&mut self) {
        assert!(!self.released, "InputNode::release called twice");
        self.released = true;
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

/// Closed set of node variants the graph can hold.
///
/// Dispatch is a match on the tag rather than a trait object, so the
/// per-sample driver loop walks a plain `Vec` with no vtable indirection
/// and the compiler sees every compute path.
pub enum SignalNode {
    Input(InputNode),
    Lfo(LfoNode),
    Resonator(StringResonatorNode),
}

impl SignalNode {
    /// Upstream nodes that must have computed before this one, in the
    /// current frame. Sources have none.
    pub fn dependencies(&self) -> &[NodeId] {
        match self {
            SignalNode::Input(_) | SignalNode::Lfo(_) => &[],
            SignalNode::Resonator(node) => node.dependencies(),
        }
    }

    /// Compute one stereo frame, reading already computed upstream outputs.
    /// Not idempotent for stateful variants: every call advances internal
    /// state, so the driver must invoke it exactly once per frame.
    pub fn process_frame(&mut self, outputs: &[StereoFrame]) -> StereoFrame {
        match self {
            SignalNode::Input(node) => node.process_frame(),
            SignalNode::Lfo(node) => node.process_frame(),
            SignalNode::Resonator(node) => node.process_frame(outputs),
        }
    }

    /// Tear down owned resources. The resonator destroys its channel
    /// states; source variants just mark themselves dead. Valid exactly
    /// once for every variant.
    pub fn release(&mut self) {
        match self {
            SignalNode::Input(node) => node.release(),
            SignalNode::Lfo(node) => node.release(),
            SignalNode::Resonator(node) => node.release(),
        }
    }

    /// False once the node has been released and must no longer compute.
    pub fn is_live(&self) -> bool {
        match self {
            SignalNode::Input(node) => !node.is_released(),
            SignalNode::Lfo(node) => !node.is_released(),
            SignalNode::Resonator(node) => !node.is_released(),
        }
    }
}
