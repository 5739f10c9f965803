use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;
use tracing::debug;

use crate::engine::AudioContext;
use crate::graph::node::{NodeId, SignalNode, StereoFrame};
use crate::graph::resonator::ResonatorParam;
use crate::graph::signal::Signal;

/*
Signal Graph Driver
===================

Owns the node arena and drives one frame of computation across it, upstream
before downstream. Nodes only declare their dependency sets; ordering,
cycle rejection, and release tracking live here.

Per frame:

  1. The host feeds input nodes (`feed_input`).
  2. `process_frame` walks the cached topological order and computes each
     live node once, storing its stereo output in the persisted output
     array that downstream nodes (and parameter signals) read.

The order is rebuilt lazily after any structural mutation (node added,
parameter rebound, node released). A parameter signal that transitively
depends on its own node's output has no valid order and is rejected as a
cycle. Released nodes are skipped; a live node still depending on one is
an error, since its signal would read a dead output.

Everything is single-threaded and synchronous: `process_frame` mutates
per-node state with no locking, so one total order per graph, driven by
one clock. Control-plane mutations log at debug level; the steady per-
sample path does not log or allocate.
*/

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("dependency cycle through node {0:?}")]
    CycleDetected(NodeId),
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("node {0:?} is not an input node")]
    NotAnInput(NodeId),
    #[error("node {0:?} has no bindable parameters")]
    NotParametric(NodeId),
    #[error("node {0:?} used after release")]
    ReleasedUpstream(NodeId),
}

pub struct SignalGraph {
    ctx: AudioContext,
    nodes: Vec<SignalNode>,
    /// Most recent output per node, parallel to `nodes`. Persisted between
    /// frames so downstream consumers always have a value to read.
    outputs: Vec<StereoFrame>,
    order: Vec<NodeId>,
    order_dirty: bool,
}

impl SignalGraph {
    pub fn new(ctx: AudioContext) -> Self {
        Self {
            ctx,
            nodes: Vec::new(),
            outputs: Vec::new(),
            order: Vec::new(),
            order_dirty: false,
        }
    }

    pub fn context(&self) -> &AudioContext {
        &self.ctx
    }

    pub fn add_node(&mut self, node: SignalNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.outputs.push(StereoFrame::default());
        self.order_dirty = true;
        debug!(?id, "node added");
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&SignalNode> {
        self.nodes.get(id.index())
    }

    /// Mutable access to a node. Conservatively invalidates the cached
    /// order, since the caller may rebind parameters through it.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SignalNode> {
        self.order_dirty = true;
        self.nodes.get_mut(id.index())
    }

    /// Most recent output of a node.
    pub fn output(&self, id: NodeId) -> Option<StereoFrame> {
        self.outputs.get(id.index()).copied()
    }

    /// Write the current frame of an input node. Call before
    /// `process_frame` so downstream nodes see this frame's value.
    pub fn feed_input(&mut self, id: NodeId, left: f32, right: f32) -> Result<(), GraphError> {
        match self.nodes.get_mut(id.index()) {
            Some(SignalNode::Input(input)) => {
                input.set_frame(left, right);
                Ok(())
            }
            Some(_) => Err(GraphError::NotAnInput(id)),
            None => Err(GraphError::UnknownNode(id)),
        }
    }

    /// Rebind a resonator parameter. Takes effect on the next frame.
    pub fn set_parameter(
        &mut self,
        id: NodeId,
        param: ResonatorParam,
        signal: Signal,
    ) -> Result<(), GraphError> {
        match self.nodes.get_mut(id.index()) {
            Some(SignalNode::Resonator(node)) => {
                node.set_parameter(param, signal);
                self.order_dirty = true;
                Ok(())
            }
            Some(_) => Err(GraphError::NotParametric(id)),
            None => Err(GraphError::UnknownNode(id)),
        }
    }

    /// Tear down a node's resources and drop it from the execution order.
    /// Its slot and last output remain; computing it again is a protocol
    /// violation caught by the node itself.
    pub fn release_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get_mut(id.index())
            .ok_or(GraphError::UnknownNode(id))?;
        node.release();
        self.order_dirty = true;
        debug!(?id, "node released");
        Ok(())
    }

    /// Compute one frame for every live node, upstream before downstream.
    /// Each node is computed exactly once per call.
    pub fn process_frame(&mut self) -> Result<(), GraphError> {
        if self.order_dirty {
            self.order = self.sorted_order()?;
            self.order_dirty = false;
            debug!(order = ?self.order, "execution order rebuilt");
        }

        let Self {
            nodes, outputs, order, ..
        } = self;
        for &id in order.iter() {
            let frame = nodes[id.index()].process_frame(outputs);
            outputs[id.index()] = frame;
        }
        Ok(())
    }

    /// Topological sort over the live subgraph via petgraph. Edges into
    /// unknown or released nodes are rejected in a pre-pass; released
    /// roots are simply skipped.
    fn sorted_order(&self) -> Result<Vec<NodeId>, GraphError> {
        let mut dag = DiGraph::<NodeId, ()>::with_capacity(self.nodes.len(), self.nodes.len());
        let mut indices: Vec<Option<NodeIndex>> = vec![None; self.nodes.len()];
        for (slot, node) in self.nodes.iter().enumerate() {
            if node.is_live() {
                indices[slot] = Some(dag.add_node(NodeId(slot)));
            }
        }

        for (slot, node) in self.nodes.iter().enumerate() {
            let Some(consumer) = indices[slot] else {
                continue;
            };
            for &dep in node.dependencies() {
                match self.nodes.get(dep.index()) {
                    None => return Err(GraphError::UnknownNode(dep)),
                    Some(upstream) if !upstream.is_live() => {
                        return Err(GraphError::ReleasedUpstream(dep));
                    }
                    Some(_) => {}
                }
                // Edge direction follows the data: dependency -> consumer.
                if let Some(source) = indices[dep.index()] {
                    dag.add_edge(source, consumer, ());
                }
            }
        }

        let order = toposort(&dag, None)
            .map_err(|cycle| GraphError::CycleDetected(dag[cycle.node_id()]))?;
        Ok(order.into_iter().map(|idx| dag[idx]).collect())
    }
}
