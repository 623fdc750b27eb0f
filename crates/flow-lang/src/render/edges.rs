//! Edge lines (§6 Diagram DSL, edge forms) connecting the nodes `nodes`
//! declares. Walks the same `FlowElement` tree, threading the decision/wait
//! outcome label onto the edge leaving a gate.

use std::collections::HashMap;

use flow_config::Configuration;

use crate::ast::{FlowElement, GraphNode, Workflow};

/// A pending edge source: the id it leaves from, and the outcome label to
/// attach (if any) to the next edge drawn from it.
type Pending = (String, Option<String>);

fn edge_line(from: &str, to: &str, label: Option<&str>) -> String {
    match label {
        Some(l) => format!("{from} -- {l} --> {to}"),
        None => format!("{from} --> {to}"),
    }
}

/// Plain (non-cross-workflow) intra-workflow edges: start through the tree
/// to end.
pub fn collect(workflow: &Workflow, ids: &HashMap<usize, String>, config: &Configuration) -> Vec<String> {
    let mut out = Vec::new();
    let start: Vec<Pending> = vec![("s".to_string(), None)];
    let exits = connect(&workflow.nodes, ids, start, config, &mut out);
    for (from, label) in exits {
        out.push(edge_line(&from, "e", label.as_deref()));
    }
    out
}

fn connect(
    elems: &[FlowElement],
    ids: &HashMap<usize, String>,
    incoming: Vec<Pending>,
    config: &Configuration,
    out: &mut Vec<String>,
) -> Vec<Pending> {
    let mut cur = incoming;
    for elem in elems {
        match elem {
            FlowElement::Node(n) => {
                let id = ids[&n.order_index()].clone();
                for (from, label) in &cur {
                    out.push(edge_line(from, &id, label.as_deref()));
                }
                cur = vec![(id, None)];
            }
            FlowElement::Branch {
                gate,
                on_true,
                on_false,
            } => {
                let gid = ids[&gate.order_index()].clone();
                for (from, label) in &cur {
                    out.push(edge_line(from, &gid, label.as_deref()));
                }
                let (true_label, false_label) = outcome_labels(gate, config);
                let true_in = vec![(gid.clone(), Some(true_label))];
                let false_in = vec![(gid, Some(false_label))];
                let mut true_exits = connect(on_true, ids, true_in, config, out);
                let false_exits = connect(on_false, ids, false_in, config, out);
                true_exits.extend(false_exits);
                cur = true_exits;
            }
        }
    }
    cur
}

fn outcome_labels(gate: &GraphNode, config: &Configuration) -> (String, String) {
    match gate {
        GraphNode::Wait(_) => (
            config.signal_success_label.clone(),
            config.signal_timeout_label.clone(),
        ),
        _ => (
            config.decision_true_label.clone(),
            config.decision_false_label.clone(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ActivityCall, DecisionId, DecisionPoint, SourceLoc};
    use flow_config::ConfigurationBuilder;
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

    #[test]
    fn linear_chain_connects_start_and_end() {
        let a = GraphNode::Activity(ActivityCall {
            display_name: "validate_input".to_string(),
            order_index: 0,
            loc: SourceLoc::new(1, 1),
        });
        let wf = workflow(vec![FlowElement::Node(a.clone())]);
        let mut ids = HashMap::new();
        ids.insert(0, "validate_input".to_string());
        let config = ConfigurationBuilder::new().build().unwrap();
        let edges = collect(&wf, &ids, &config);
        assert_eq!(edges, vec!["s --> validate_input", "validate_input --> e"]);
    }

    #[test]
    fn branch_labels_true_and_false_arms() {
        let gate = GraphNode::Decision(DecisionPoint {
            id: DecisionId::from_label("HighValue"),
            label: "HighValue".to_string(),
            order_index: 0,
            loc: SourceLoc::new(1, 1),
        });
        let on_true = GraphNode::Activity(ActivityCall {
            display_name: "manager_review".to_string(),
            order_index: 1,
            loc: SourceLoc::new(2, 1),
        });
        let wf = workflow(vec![FlowElement::Branch {
            gate: gate.clone(),
            on_true: vec![FlowElement::Node(on_true)],
            on_false: vec![],
        }]);
        let mut ids = HashMap::new();
        ids.insert(0, "d0".to_string());
        ids.insert(1, "manager_review".to_string());
        let config = ConfigurationBuilder::new().build().unwrap();
        let edges = collect(&wf, &ids, &config);
        assert_eq!(
            edges,
            vec![
                "s --> d0",
                "d0 -- yes --> manager_review",
                "manager_review --> e",
                "d0 -- no --> e",
            ]
        );
    }
}
