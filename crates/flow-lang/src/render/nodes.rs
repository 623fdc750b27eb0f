//! Node declaration + style-directive lines (§6 Diagram DSL, node shapes).

use std::collections::{HashMap, HashSet};

use flow_config::Configuration;

use super::format::{
    node_label, sanitize_id, EXTERNAL_SIGNAL_FILL, EXTERNAL_SIGNAL_STROKE, SIGNAL_HANDLER_FILL,
    SIGNAL_HANDLER_STROKE, UNRESOLVED_FILL, UNRESOLVED_STROKE,
};
use super::model::{ExternalSignalEdge, SignalHandlerNode};
use crate::ast::{FlowElement, GraphNode, Workflow};

/// One declared node: its DSL id, its full declaration line, and an
/// optional style directive line.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDecl {
    pub id: String,
    pub line: String,
    pub style: Option<String>,
}

/// Declares every call-site node in one workflow's tree, plus its start and
/// end nodes. Returns the declarations in tree order and a lookup from each
/// `GraphNode`'s `order_index` to the id assigned to it, which `edges`
/// needs to wire up the flowchart.
pub fn collect(workflow: &Workflow, config: &Configuration) -> (Vec<NodeDecl>, HashMap<usize, String>) {
    let mut decls = Vec::new();
    let mut ids = HashMap::new();
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut decision_counter = 0usize;

    decls.push(NodeDecl {
        id: "s".to_string(),
        line: format!("s(({}))", config.start_node_label),
        style: None,
    });

    fn walk(
        elems: &[FlowElement],
        config: &Configuration,
        decision_counter: &mut usize,
        seen_ids: &mut HashSet<String>,
        ids: &mut HashMap<usize, String>,
        decls: &mut Vec<NodeDecl>,
    ) {
        for e in elems {
            match e {
                FlowElement::Node(n) => {
                    decls.push(node_decl(n, config, decision_counter, seen_ids, ids));
                }
                FlowElement::Branch {
                    gate,
                    on_true,
                    on_false,
                } => {
                    decls.push(node_decl(gate, config, decision_counter, seen_ids, ids));
                    walk(on_true, config, decision_counter, seen_ids, ids, decls);
                    walk(on_false, config, decision_counter, seen_ids, ids, decls);
                }
            }
        }
    }
    walk(
        &workflow.nodes,
        config,
        &mut decision_counter,
        &mut seen_ids,
        &mut ids,
        &mut decls,
    );

    decls.push(NodeDecl {
        id: "e".to_string(),
        line: format!("e(({}))", config.end_node_label),
        style: None,
    });

    (decls, ids)
}

fn unique_id(candidate: String, order_index: usize, seen: &mut HashSet<String>) -> String {
    let id = if seen.contains(&candidate) {
        format!("{candidate}_{order_index}")
    } else {
        candidate
    };
    seen.insert(id.clone());
    id
}

fn node_decl(
    node: &GraphNode,
    config: &Configuration,
    decision_counter: &mut usize,
    seen_ids: &mut HashSet<String>,
    ids: &mut HashMap<usize, String>,
) -> NodeDecl {
    let order_index = node.order_index();
    let decl = match node {
        GraphNode::Activity(a) => {
            let id = unique_id(sanitize_id(&a.display_name), order_index, seen_ids);
            let label = node_label(&a.display_name, config.split_names_by_words);
            NodeDecl {
                line: format!("{id}[{label}]"),
                id,
                style: None,
            }
        }
        GraphNode::Decision(d) => {
            let n = *decision_counter;
            *decision_counter += 1;
            let id = unique_id(format!("d{n}"), order_index, seen_ids);
            let label = node_label(&d.label, config.split_names_by_words);
            NodeDecl {
                line: format!("{id}{{{label}}}"),
                id,
                style: None,
            }
        }
        GraphNode::Wait(w) => {
            let id = unique_id(sanitize_id(&w.label), order_index, seen_ids);
            let label = node_label(&w.label, config.split_names_by_words);
            NodeDecl {
                line: format!("{id}{{{{{label}}}}}"),
                id,
                style: None,
            }
        }
        GraphNode::ChildWorkflow(c) => {
            let id = unique_id(sanitize_id(&c.target_name), order_index, seen_ids);
            let label = node_label(&c.target_name, config.split_names_by_words);
            NodeDecl {
                line: format!("{id}[[{label}]]"),
                id,
                style: None,
            }
        }
        GraphNode::ExternalSignal(s) => {
            let id = unique_id(
                format!("ext_sig_{}", sanitize_id(&s.signal_name)),
                order_index,
                seen_ids,
            );
            let label = format!("Signal '{}' to {}", s.signal_name, s.target.display());
            NodeDecl {
                line: format!("{id}[/{label}\\]"),
                style: Some(format!(
                    "style {id} fill:{EXTERNAL_SIGNAL_FILL},stroke:{EXTERNAL_SIGNAL_STROKE}"
                )),
                id,
            }
        }
    };
    ids.insert(order_index, decl.id.clone());
    decl
}

/// A signal-handler hexagon, rendered in the workflow that owns the
/// handler method — used by cross-workflow rendering only.
pub fn signal_handler_decl(handler: &SignalHandlerNode, config: &Configuration, seen_ids: &mut HashSet<String>) -> NodeDecl {
    let id = unique_id(sanitize_id(&handler.method_name), 0, seen_ids);
    let label = node_label(&handler.method_name, config.split_names_by_words);
    NodeDecl {
        line: format!("{id}{{{{{label}}}}}"),
        style: Some(format!(
            "style {id} fill:{SIGNAL_HANDLER_FILL},stroke:{SIGNAL_HANDLER_STROKE}"
        )),
        id,
    }
}

/// The unresolved-handler sentinel node for one external-signal send that
/// the linker could not match to any discovered workflow.
pub fn unresolved_decl(_send: &ExternalSignalEdge, index: usize, seen_ids: &mut HashSet<String>) -> NodeDecl {
    let id = unique_id(format!("unresolved_{index}"), index, seen_ids);
    NodeDecl {
        line: format!("{id}[/?/]"),
        style: Some(format!(
            "style {id} fill:{UNRESOLVED_FILL},stroke:{UNRESOLVED_STROKE}"
        )),
        id,
    }
}
