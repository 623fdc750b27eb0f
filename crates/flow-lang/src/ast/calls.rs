use super::loc::SourceLoc;
use crate::names::DecisionId;

// ---------------------------------------------------------------------------
// Activity call
// ---------------------------------------------------------------------------

/// A recognised activity dispatch, either by direct function reference or by
/// `Class.method` reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityCall {
    pub display_name: String,
    pub order_index: usize,
    pub loc: SourceLoc,
}

// ---------------------------------------------------------------------------
// Decision point
// ---------------------------------------------------------------------------

/// A binary decision introduced by the `to_decision` helper.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionPoint {
    pub id: DecisionId,
    pub label: String,
    pub order_index: usize,
    pub loc: SourceLoc,
}

// ---------------------------------------------------------------------------
// Wait point
// ---------------------------------------------------------------------------

/// A binary (signaled / timeout) wait introduced by the three-argument
/// `wait_condition` helper.
#[derive(Debug, Clone, PartialEq)]
pub struct WaitPoint {
    pub id: DecisionId,
    pub label: String,
    pub order_index: usize,
    pub loc: SourceLoc,
}

// ---------------------------------------------------------------------------
// Child-workflow call
// ---------------------------------------------------------------------------

/// A synchronous child-workflow spawn.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildWorkflowCall {
    pub target_name: String,
    pub order_index: usize,
    pub loc: SourceLoc,
}

// ---------------------------------------------------------------------------
// External-signal send
// ---------------------------------------------------------------------------

/// Where an external-signal send's target expression resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalTarget {
    /// The target expression was a plain string literal.
    Literal(String),
    /// A formatted string with a literal head and at least one non-literal
    /// placeholder; each placeholder is masked with `{*}`.
    Pattern(String),
    /// The target expression could not be reduced to a literal or pattern.
    Dynamic,
}

impl SignalTarget {
    /// Render the target the way the diagram and path list display it.
    pub fn display(&self) -> String {
        match self {
            Self::Literal(s) => s.clone(),
            Self::Pattern(s) => s.clone(),
            Self::Dynamic => "<dynamic>".to_string(),
        }
    }
}

/// An asynchronous send to a named peer workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalSignalSend {
    pub signal_name: String,
    pub target: SignalTarget,
    pub order_index: usize,
    pub loc: SourceLoc,
}

// ---------------------------------------------------------------------------
// Unsupported construct
// ---------------------------------------------------------------------------

/// A call-site or statement shape the classifier recognises as
/// control-flow-bearing but does not support.
#[derive(Debug, Clone, PartialEq)]
pub struct UnsupportedConstruct {
    pub kind: String,
    pub loc: SourceLoc,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// GraphNode — the filtered call-site sequence the branch-point engine consumes
// ---------------------------------------------------------------------------

/// One call-site record that participates in the execution graph. Source
/// order of the enclosing `Vec<GraphNode>` is a public-contract invariant
/// (§5): every later stage relies on it.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphNode {
    Activity(ActivityCall),
    Decision(DecisionPoint),
    Wait(WaitPoint),
    ChildWorkflow(ChildWorkflowCall),
    ExternalSignal(ExternalSignalSend),
}

impl GraphNode {
    pub fn order_index(&self) -> usize {
        match self {
            Self::Activity(a) => a.order_index,
            Self::Decision(d) => d.order_index,
            Self::Wait(w) => w.order_index,
            Self::ChildWorkflow(c) => c.order_index,
            Self::ExternalSignal(e) => e.order_index,
        }
    }

    /// A node is a branch point iff it offers exactly two outcomes.
    pub fn is_branch_point(&self) -> bool {
        matches!(self, Self::Decision(_) | Self::Wait(_))
    }

    /// The branch point's stable ID, for nodes that have one.
    pub fn decision_id(&self) -> Option<DecisionId> {
        match self {
            Self::Decision(d) => Some(d.id),
            Self::Wait(w) => Some(w.id),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// FlowElement — the classifier's tree-shaped output
// ---------------------------------------------------------------------------

/// One element of a run method's flattened control structure.
///
/// An `if`/`else` pair gated on a tracked decision or wait variable becomes
/// a `Branch`: the gate node itself is always visited (the helper call
/// always executes), while `on_true`/`on_false` hold the elements that are
/// only reached under the corresponding outcome. This is what lets the
/// branch-point engine reconstruct path-dependent membership — not every
/// node lies on every path.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowElement {
    Node(GraphNode),
    Branch {
        gate: GraphNode,
        on_true: Vec<FlowElement>,
        on_false: Vec<FlowElement>,
    },
}

impl FlowElement {
    /// Source-order position of this element's own call site (the gate's,
    /// for a branch).
    pub fn order_index(&self) -> usize {
        match self {
            Self::Node(n) => n.order_index(),
            Self::Branch { gate, .. } => gate.order_index(),
        }
    }
}
