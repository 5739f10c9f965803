#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::graph::node::{NodeId, StereoFrame};

/*
Signals
=======

Every numeric input to a node is a Signal: either a fixed scalar or a
handle to another node's live output. That is what makes parameters
"patchable" - a resonator's fundamental frequency can be the number 100.0
today and an LFO tomorrow, with no change to the resonator itself.

  Signal::Value(100.0)   constant, resolves to itself
  Signal::Node(lfo_id)   reads the LFO's most recent output every frame

Resolution happens at compute time against the persisted per-node outputs,
so a signal always sees the value its source produced for the current frame
(the driver computes sources first). Control taps read the source's left
channel; a mono control source publishes identical left/right outputs, so
the choice of channel is only visible if an audio-rate stereo node is used
as a parameter.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Signal {
    /// Immutable scalar.
    Value(f32),
    /// Live output of another node.
    Node(NodeId),
}

impl Signal {
    /// The node this signal reads from, if any.
    pub fn source(&self) -> Option<NodeId> {
        match self {
            Signal::Node(id) => Some(*id),
            Signal::Value(_) => None,
        }
    }

    /// Resolve to a control value against the persisted node outputs.
    ///
    /// Panics on a dangling node handle; a signal that outlives its source
    /// is a graph-construction error, not a recoverable condition.
    pub fn resolve(&self, outputs: &[StereoFrame]) -> f32 {
        match *self {
            Signal::Value(value) => value,
            Signal::Node(id) => {
                outputs
                    .get(id.index())
                    .unwrap_or_else(|| panic!("signal references unknown node {id:?}"))
                    .left
            }
        }
    }
}

impl From<f32> for Signal {
    fn from(value: f32) -> Self {
        Signal::Value(value)
    }
}

impl From<NodeId> for Signal {
    fn from(id: NodeId) -> Self {
        Signal::Node(id)
    }
}
