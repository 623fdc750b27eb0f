//! The branch-point engine (§4.4): safety gates, then outcome-vector
//! enumeration over the classified call-site tree.
//!
//! Grounded on `wf-lang::compiler::compile_wfl`'s shape — validate first,
//! then build the flat executable representation in one pass — except
//! here "validate" means the two safety gates and "flat representation"
//! is the generated path set rather than a `Vec<RulePlan>`.

use flow_config::Configuration;
use flow_lang::ast::{FlowElement, GraphNode, Workflow};
use flow_lang::render::{PathStep, RenderedPath};

use crate::error::{generation_error, FlowResult};

/// Enumerates the full path set for one classified workflow, after
/// checking the two safety gates from §4.4.
pub fn generate_paths(workflow: &Workflow, config: &Configuration) -> FlowResult<Vec<RenderedPath>> {
    let b = workflow.branch_count();

    if b > config.max_decision_points {
        return Err(generation_error(format!(
            "workflow `{}` has {b} branch point(s), exceeding max_decision_points of {}",
            workflow.name, config.max_decision_points
        )));
    }

    let total: u64 = 1u64.checked_shl(b as u32).ok_or_else(|| {
        generation_error(format!(
            "workflow `{}` branch point count {b} is too large to enumerate",
            workflow.name
        ))
    })?;

    if total > config.max_paths as u64 {
        return Err(generation_error(format!(
            "workflow `{}` would generate {total} paths, exceeding max_paths of {}",
            workflow.name, config.max_paths
        )));
    }

    let mut paths = Vec::with_capacity(total as usize);
    for outcome in 0..total {
        // Low-order bit corresponds to the first branch point encountered
        // in source order.
        let bits: Vec<bool> = (0..b).map(|i| (outcome >> i) & 1 == 1).collect();
        let mut steps = Vec::new();
        let mut counter = 0usize;
        walk(&workflow.nodes, &bits, &mut counter, &mut steps);
        paths.push(RenderedPath { steps });
    }

    Ok(paths)
}

fn walk(elems: &[FlowElement], bits: &[bool], counter: &mut usize, steps: &mut Vec<PathStep>) {
    for e in elems {
        match e {
            FlowElement::Node(n) => {
                let outcome = branch_outcome(n, bits, counter);
                steps.push(PathStep {
                    node: n.clone(),
                    outcome,
                });
            }
            FlowElement::Branch {
                gate,
                on_true,
                on_false,
            } => {
                let idx = *counter;
                *counter += 1;
                let taken = bits[idx];
                steps.push(PathStep {
                    node: gate.clone(),
                    outcome: Some(taken),
                });
                if taken {
                    walk(on_true, bits, counter, steps);
                } else {
                    walk(on_false, bits, counter, steps);
                }
            }
        }
    }
}

fn branch_outcome(node: &GraphNode, bits: &[bool], counter: &mut usize) -> Option<bool> {
    if node.is_branch_point() {
        let idx = *counter;
        *counter += 1;
        Some(bits[idx])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_config::ConfigurationBuilder;
    use flow_lang::ast::{ActivityCall, DecisionId, DecisionPoint, SourceLoc};
    use std::path::PathBuf;

    fn workflow(nodes: Vec<FlowElement>) -> Workflow {
        Workflow {
            name: "W".to_string(),
            source_path: PathBuf::from("t.py"),
            run_location: SourceLoc::new(1, 1),
            nodes,
            signal_handlers: Vec::new(),
            accepted_wait_signals: Vec::new(),
        }
    }

    fn activity(name: &str, order_index: usize) -> FlowElement {
        FlowElement::Node(GraphNode::Activity(ActivityCall {
            display_name: name.to_string(),
            order_index,
            loc: SourceLoc::new(order_index + 1, 1),
        }))
    }

    #[test]
    fn linear_workflow_has_one_path() {
        let wf = workflow(vec![activity("validate_input", 0), activity("save_result", 1)]);
        let config = ConfigurationBuilder::new().build().unwrap();
        let paths = generate_paths(&wf, &config).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].steps.len(), 2);
    }

    #[test]
    fn two_decisions_produce_four_paths() {
        let gate_a = GraphNode::Decision(DecisionPoint {
            id: DecisionId::from_label("NeedToConvert"),
            label: "NeedToConvert".to_string(),
            order_index: 0,
            loc: SourceLoc::new(1, 1),
        });
        let gate_b = GraphNode::Decision(DecisionPoint {
            id: DecisionId::from_label("IsTFN_Known"),
            label: "IsTFN_Known".to_string(),
            order_index: 1,
            loc: SourceLoc::new(2, 1),
        });
        // Two sequential if/else pairs: the second decision is a sibling
        // reached regardless of the first's outcome, not duplicated inside
        // each arm.
        let wf = workflow(vec![
            FlowElement::Branch {
                gate: gate_a,
                on_true: vec![],
                on_false: vec![],
            },
            FlowElement::Branch {
                gate: gate_b,
                on_true: vec![],
                on_false: vec![],
            },
        ]);
        let config = ConfigurationBuilder::new().build().unwrap();
        let paths = generate_paths(&wf, &config).unwrap();
        assert_eq!(paths.len(), 4);
    }

    #[test]
    fn cap_violation_rejected() {
        let nodes: Vec<FlowElement> = (0..11)
            .map(|i| {
                FlowElement::Node(GraphNode::Decision(DecisionPoint {
                    id: DecisionId::from_label(&format!("D{i}")),
                    label: format!("D{i}"),
                    order_index: i,
                    loc: SourceLoc::new(1, 1),
                }))
            })
            .collect();
        let wf = workflow(nodes);
        let config = ConfigurationBuilder::new().max_decision_points(10).build().unwrap();
        let err = generate_paths(&wf, &config).unwrap_err();
        assert!(err.to_string().contains("11"));
    }
}
