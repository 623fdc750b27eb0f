//! The validator (§4.5): structural-quality diagnostics over a classified
//! workflow. The branch-point engine and cross-workflow linker live in
//! `flow-engine`, so the checks that need their output (unreachable
//! activities, unresolved signals) take plain data here rather than a
//! `flow-engine` type — keeping this crate free of that dependency.

use std::collections::HashSet;

use crate::ast::Workflow;
use crate::render::model::ExternalSignalEdge;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub category: String,
    pub message: String,
    pub suggestion: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.severity, self.category, self.message, self.suggestion
        )
    }
}

/// Branch-point pressure: `b >= max_decision_points - 1`.
pub fn branch_point_pressure(workflow: &Workflow, max_decision_points: usize) -> Option<Diagnostic> {
    let b = workflow.branch_count();
    if max_decision_points > 0 && b + 1 >= max_decision_points {
        Some(Diagnostic {
            severity: Severity::Warning,
            category: "branch-point-pressure".to_string(),
            message: format!(
                "workflow `{}` has {b} branch point(s), at or near the configured cap of {max_decision_points}",
                workflow.name
            ),
            suggestion: "refactor to reduce branch points or raise max_decision_points".to_string(),
        })
    } else {
        None
    }
}

/// Unreachable activity: an activity call site no generated path visits.
/// `visited_order_indices` is supplied by the caller, derived from the
/// generated path set.
pub fn unreachable_activities(
    workflow: &Workflow,
    visited_order_indices: &HashSet<usize>,
) -> Vec<Diagnostic> {
    workflow
        .activities()
        .into_iter()
        .filter(|n| !visited_order_indices.contains(&n.order_index()))
        .map(|n| {
            let name = match n {
                crate::ast::GraphNode::Activity(a) => a.display_name.clone(),
                _ => unreachable!("activities() only yields Activity nodes"),
            };
            Diagnostic {
                severity: Severity::Warning,
                category: "unreachable-activity".to_string(),
                message: format!("activity `{name}` in workflow `{}` is not visited by any generated path", workflow.name),
                suggestion: "remove the dead call site or verify the enclosing branch logic".to_string(),
            }
        })
        .collect()
}

/// Unresolved external-signal send, once a cross-workflow linker has
/// attempted resolution and found no matching handler.
pub fn unresolved_external_signal_edge(edge: &ExternalSignalEdge) -> Diagnostic {
    Diagnostic {
        severity: Severity::Warning,
        category: "unresolved-external-signal".to_string(),
        message: format!(
            "signal `{}` sent from `{}` to `{}` could not be matched to any discovered workflow",
            edge.signal_name,
            edge.from_workflow,
            edge.target.display()
        ),
        suggestion: "add the target workflow to the search paths or configure an explicit mapping".to_string(),
    }
}

pub fn ambiguous_signal_handler(signal_name: &str, workflow_names: &[String]) -> Diagnostic {
    Diagnostic {
        severity: Severity::Warning,
        category: "ambiguous-signal-handler".to_string(),
        message: format!(
            "signal `{signal_name}` is accepted by {} workflows: {}",
            workflow_names.len(),
            workflow_names.join(", ")
        ),
        suggestion: "use an explicit or hybrid signal resolution strategy to disambiguate".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{DecisionId, DecisionPoint, FlowElement, GraphNode, SourceLoc};
    use std::path::PathBuf;

    fn workflow_with_branches(n: usize) -> Workflow {
        let mut nodes = Vec::new();
        for i in 0..n {
            nodes.push(FlowElement::Node(GraphNode::Decision(DecisionPoint {
                id: DecisionId::from_label(&format!("D{i}")),
                label: format!("D{i}"),
                order_index: i,
                loc: SourceLoc::new(1, 1),
            })));
        }
        Workflow {
            name: "W".to_string(),
            source_path: PathBuf::from("t.py"),
            run_location: SourceLoc::new(1, 1),
            nodes,
            signal_handlers: Vec::new(),
            accepted_wait_signals: Vec::new(),
        }
    }

    #[test]
    fn pressure_warns_near_cap() {
        let wf = workflow_with_branches(9);
        assert!(branch_point_pressure(&wf, 10).is_some());
    }

    #[test]
    fn pressure_silent_when_low() {
        let wf = workflow_with_branches(2);
        assert!(branch_point_pressure(&wf, 10).is_none());
    }
}
