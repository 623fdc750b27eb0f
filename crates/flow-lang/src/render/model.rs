//! Plain data the renderer consumes from callers that compute path sets or
//! cross-workflow linkage (`flow-engine`) without this crate depending on
//! that crate's types.

use crate::ast::{GraphNode, SignalTarget};

/// One step of a single generated execution path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathStep {
    pub node: GraphNode,
    /// `Some(outcome)` when this step is a branch point whose outcome on
    /// this particular path determined which elements follow it.
    pub outcome: Option<bool>,
}

/// One complete path from start to end, in visit order.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPath {
    pub steps: Vec<PathStep>,
}

/// A method annotated as a signal handler, rendered as a hexagon with the
/// signal-handler style.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalHandlerNode {
    pub workflow_name: String,
    pub method_name: String,
}

/// One external-signal send, resolved (or not) against the discovered
/// workflow set by the cross-workflow linker.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalSignalEdge {
    pub from_workflow: String,
    pub signal_name: String,
    pub target: SignalTarget,
    /// Every `(workflow, handler)` the linker matched this send to. Empty
    /// renders the unresolved sentinel node and carries a validator
    /// warning; more than one renders an edge to each (ambiguity warning).
    pub resolved: Vec<(String, String)>,
}
