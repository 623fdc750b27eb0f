use std::path::PathBuf;

use super::calls::{FlowElement, GraphNode};
use super::loc::SourceLoc;

/// One statically discovered workflow: its declared name, where its run
/// method lives, the tree-shaped call-site graph produced by the
/// classifier, and the signal names it is reachable by.
///
/// Immutable once the classifier returns — no later stage mutates a
/// `Workflow`; the renderer and engine only ever read it.
#[derive(Debug, Clone, PartialEq)]
pub struct Workflow {
    pub name: String,
    pub source_path: PathBuf,
    pub run_location: SourceLoc,
    /// Source-ordered, nested call-site structure. `Branch` elements carry
    /// the two alternatives gated on a decision/wait outcome.
    pub nodes: Vec<FlowElement>,
    /// Names of methods annotated as signal handlers — signals this
    /// workflow accepts asynchronously from peers.
    pub signal_handlers: Vec<String>,
    /// Names this workflow accepts via internal wait points (the third,
    /// literal argument to `wait_condition`).
    pub accepted_wait_signals: Vec<String>,
}

impl Workflow {
    /// All branch-point gate nodes (decisions + waits), in source order,
    /// regardless of nesting depth.
    pub fn branch_points(&self) -> Vec<&GraphNode> {
        fn walk<'a>(elems: &'a [FlowElement], out: &mut Vec<&'a GraphNode>) {
            for e in elems {
                match e {
                    // A decision/wait whose result is never tested by an
                    // `if` is still a binary branch point per the data
                    // model — it just has no gated alternative content.
                    FlowElement::Node(n) if n.is_branch_point() => out.push(n),
                    FlowElement::Node(_) => {}
                    FlowElement::Branch {
                        gate,
                        on_true,
                        on_false,
                    } => {
                        out.push(gate);
                        walk(on_true, out);
                        walk(on_false, out);
                    }
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.nodes, &mut out);
        out.sort_by_key(|n| n.order_index());
        out
    }

    /// Count of branch points — `b` in the specification's formulas.
    pub fn branch_count(&self) -> usize {
        self.branch_points().len()
    }

    /// All activity call sites anywhere in the tree, source order.
    pub fn activities(&self) -> Vec<&GraphNode> {
        fn walk<'a>(elems: &'a [FlowElement], out: &mut Vec<&'a GraphNode>) {
            for e in elems {
                match e {
                    FlowElement::Node(n @ GraphNode::Activity(_)) => out.push(n),
                    FlowElement::Node(_) => {}
                    FlowElement::Branch {
                        on_true, on_false, ..
                    } => {
                        walk(on_true, out);
                        walk(on_false, out);
                    }
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.nodes, &mut out);
        out.sort_by_key(|n| n.order_index());
        out
    }

    /// All child-workflow call sites anywhere in the tree, source order.
    pub fn child_workflow_calls(&self) -> Vec<&GraphNode> {
        fn walk<'a>(elems: &'a [FlowElement], out: &mut Vec<&'a GraphNode>) {
            for e in elems {
                match e {
                    FlowElement::Node(n @ GraphNode::ChildWorkflow(_)) => out.push(n),
                    FlowElement::Node(_) => {}
                    FlowElement::Branch {
                        on_true, on_false, ..
                    } => {
                        walk(on_true, out);
                        walk(on_false, out);
                    }
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.nodes, &mut out);
        out.sort_by_key(|n| n.order_index());
        out
    }

    /// All external-signal send call sites anywhere in the tree, source order.
    pub fn external_signal_sends(&self) -> Vec<&GraphNode> {
        fn walk<'a>(elems: &'a [FlowElement], out: &mut Vec<&'a GraphNode>) {
            for e in elems {
                match e {
                    FlowElement::Node(n @ GraphNode::ExternalSignal(_)) => out.push(n),
                    FlowElement::Node(_) => {}
                    FlowElement::Branch {
                        on_true, on_false, ..
                    } => {
                        walk(on_true, out);
                        walk(on_false, out);
                    }
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.nodes, &mut out);
        out.sort_by_key(|n| n.order_index());
        out
    }
}
