//! The flowchart/path/validation renderer (§4.9, folding the "Diagram DSL"
//! into one component). Split the way `wf-lang::explain` splits its output
//! assembly: small section builders (`nodes`, `edges`, `paths`,
//! `validation`) plus a thin top-level assembler that concatenates
//! whichever sections `output_format` asks for.

pub mod edges;
pub mod format;
pub mod model;
pub mod nodes;
pub mod paths;
pub mod validation;

pub use model::{ExternalSignalEdge, PathStep, RenderedPath, SignalHandlerNode};

use std::collections::{HashMap, HashSet};

use flow_config::{Configuration, OutputFormat, SignalVisualizationMode};

use crate::ast::Workflow;

fn assemble_lines(decls: &[nodes::NodeDecl], edge_lines: &[String]) -> String {
    let mut out = String::new();
    for d in decls {
        out.push_str(&d.line);
        out.push('\n');
    }
    for e in edge_lines {
        out.push_str(e);
        out.push('\n');
    }
    for d in decls {
        if let Some(style) = &d.style {
            out.push_str(style);
            out.push('\n');
        }
    }
    out
}

/// Renders the flowchart for one workflow with no cross-workflow group
/// wrapper — the shape every single-workflow scenario in §8 expects.
pub fn diagram_single(workflow: &Workflow, config: &Configuration) -> String {
    let (decls, ids) = nodes::collect(workflow, config);
    let edge_lines = edges::collect(workflow, &ids, config);
    assemble_lines(&decls, &edge_lines)
}

/// Renders the flowchart across a set of linked workflows: one `subgraph`
/// group per workflow (with its own nodes, signal-handler hexagons, and
/// intra-workflow edges), plus a dashed cross-group edge for every
/// external-signal send — terminating at the matched handler hexagon, or
/// at a freshly declared unresolved sentinel when the linker found no
/// match.
pub fn diagram_multi(
    workflows: &[&Workflow],
    handlers: &[SignalHandlerNode],
    signal_edges: &[ExternalSignalEdge],
    config: &Configuration,
) -> String {
    let grouped = config.signal_visualization_mode == SignalVisualizationMode::Subgraph;
    let mut out = String::new();
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut handler_ids: HashMap<(String, String), String> = HashMap::new();

    for wf in workflows {
        if grouped {
            out.push_str(&format!("subgraph {}\n", wf.name));
        }

        let (decls, ids) = nodes::collect(wf, config);
        for d in &decls {
            seen_ids.insert(d.id.clone());
            out.push_str(&d.line);
            out.push('\n');
        }

        let handler_decls: Vec<_> = handlers
            .iter()
            .filter(|h| h.workflow_name == wf.name)
            .map(|h| {
                let decl = nodes::signal_handler_decl(h, config, &mut seen_ids);
                handler_ids.insert((wf.name.clone(), h.method_name.clone()), decl.id.clone());
                decl
            })
            .collect();
        for d in &handler_decls {
            out.push_str(&d.line);
            out.push('\n');
        }

        let edge_lines = edges::collect(wf, &ids, config);
        for e in &edge_lines {
            out.push_str(e);
            out.push('\n');
        }
        if grouped {
            out.push_str("end\n");
        }

        for d in decls.iter().chain(handler_decls.iter()) {
            if let Some(style) = &d.style {
                out.push_str(style);
                out.push('\n');
            }
        }
    }

    for (i, send) in signal_edges.iter().enumerate() {
        let from_id = format!("ext_sig_{}", format::sanitize_id(&send.signal_name));
        if send.resolved.is_empty() {
            let decl = nodes::unresolved_decl(send, i, &mut seen_ids);
            out.push_str(&decl.line);
            out.push('\n');
            out.push_str(&format!("{from_id} -.{}.-> {}\n", send.signal_name, decl.id));
            if let Some(style) = &decl.style {
                out.push_str(style);
                out.push('\n');
            }
            continue;
        }
        for (target_workflow, handler) in &send.resolved {
            if let Some(to_id) = handler_ids.get(&(target_workflow.clone(), handler.clone())) {
                out.push_str(&format!("{from_id} -.{}.-> {to_id}\n", send.signal_name));
            }
        }
    }

    out
}

/// Concatenates whichever rendered sections `output_format` selects,
/// honoring `include_path_list` / `include_validation_report` /
/// `suppress_validation` within `Full`.
pub fn assemble(
    diagram: &str,
    path_list: &str,
    validation_report: &str,
    config: &Configuration,
) -> String {
    let mut sections: Vec<&str> = Vec::new();
    match config.output_format {
        OutputFormat::DiagramOnly => sections.push(diagram),
        OutputFormat::PathsOnly => sections.push(path_list),
        OutputFormat::Full => {
            sections.push(diagram);
            if config.include_path_list {
                sections.push(path_list);
            }
            if config.include_validation_report && !config.suppress_validation {
                sections.push(validation_report);
            }
        }
    }
    sections.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ActivityCall, FlowElement, GraphNode, SourceLoc};
    use flow_config::ConfigurationBuilder;
    use std::path::PathBuf;

    fn linear_workflow() -> Workflow {
        Workflow {
            name: "Linear".to_string(),
            source_path: PathBuf::from("t.py"),
            run_location: SourceLoc::new(1, 1),
            nodes: vec![FlowElement::Node(GraphNode::Activity(ActivityCall {
                display_name: "validate_input".to_string(),
                order_index: 0,
                loc: SourceLoc::new(2, 1),
            }))],
            signal_handlers: Vec::new(),
            accepted_wait_signals: Vec::new(),
        }
    }

    #[test]
    fn single_workflow_diagram_has_start_node_and_end() {
        let wf = linear_workflow();
        let config = ConfigurationBuilder::new()
            .split_names_by_words(false)
            .build()
            .unwrap();
        let diagram = diagram_single(&wf, &config);
        assert!(diagram.contains("s((Start))"));
        assert!(diagram.contains("validate_input[validate_input]"));
        assert!(diagram.contains("e((End))"));
        assert!(diagram.contains("s --> validate_input"));
        assert!(diagram.contains("validate_input --> e"));
    }
}
