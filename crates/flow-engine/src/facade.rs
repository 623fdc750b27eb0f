//! The three public entry points (§4.6): a fixed-stage pipeline from a
//! source path to rendered output, single-workflow or cross-workflow.
//!
//! Grounded on `wf_runtime::lifecycle`'s bootstrap-then-spawn shape and
//! `wf-lang::compiler::compile_wfl`'s validate-then-build shape: each
//! function runs every stage unconditionally in source order and never
//! partially returns.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use flow_config::Configuration;
use flow_lang::ast::{GraphNode, Workflow};
use flow_lang::render;
use flow_lang::validate::{self, Diagnostic};

use crate::engine::generate_paths;
use crate::error::{linkage_error, FlowResult};
use crate::linker::{self, WorkflowIndex};

/// Classify the single workflow in `path` (or the one named `workflow_name`,
/// when a file defines more than one) and render it alone: no child
/// expansion, no signal peers.
pub fn analyze_workflow(
    path: &Path,
    workflow_name: Option<&str>,
    config: &Configuration,
) -> FlowResult<String> {
    let workflow = classify_entry(path, workflow_name)?;
    render_single(&workflow, config)
}

/// Classify the entry workflow and, per `config.child_workflow_expansion`,
/// recursively resolve and render its child-workflow graph.
pub fn analyze_workflow_graph(
    path: &Path,
    workflow_name: Option<&str>,
    search_dirs: &[PathBuf],
    config: &Configuration,
) -> FlowResult<String> {
    let entry = classify_entry(path, workflow_name)?;
    let index = WorkflowIndex::build(search_dirs)?;
    let workflows = linker::link_children(&entry, &index, config)?;

    if workflows.len() == 1 {
        return render_single(&workflows[0], config);
    }

    let diagram = render::diagram_multi(
        &workflows.iter().collect::<Vec<_>>(),
        &[],
        &[],
        config,
    );
    let (paths, mut diagnostics) = generate_and_validate(&workflows[0], config)?;
    for peer in &workflows[1..] {
        let (_, peer_diagnostics) = generate_and_validate(peer, config)?;
        diagnostics.extend(peer_diagnostics);
    }
    let path_list = render::paths::render(&paths, config);
    let validation_report = render::validation::render(&diagnostics);
    Ok(render::assemble(&diagram, &path_list, &validation_report, config))
}

/// Classify the entry workflow and discover signal peers reachable through
/// its external-signal sends, resolving each send per
/// `config.signal_resolution_strategy`.
pub fn analyze_signal_graph(
    path: &Path,
    workflow_name: Option<&str>,
    search_dirs: &[PathBuf],
    config: &Configuration,
) -> FlowResult<String> {
    let entry = classify_entry(path, workflow_name)?;
    let index = WorkflowIndex::build(search_dirs)?;
    let result = linker::link_signals(&entry, &index, config)?;

    let diagram = render::diagram_multi(
        &result.workflows.iter().collect::<Vec<_>>(),
        &result.handlers,
        &result.edges,
        config,
    );

    let (paths, mut diagnostics) = generate_and_validate(&result.workflows[0], config)?;
    for peer in &result.workflows[1..] {
        let (_, peer_diagnostics) = generate_and_validate(peer, config)?;
        diagnostics.extend(peer_diagnostics);
    }
    if config.warn_unresolved_signals {
        for edge in &result.edges {
            if edge.resolved.is_empty() {
                diagnostics.push(validate::unresolved_external_signal_edge(edge));
            } else if edge.resolved.len() > 1 {
                let names: Vec<String> = edge.resolved.iter().map(|(w, _)| w.clone()).collect();
                diagnostics.push(validate::ambiguous_signal_handler(&edge.signal_name, &names));
            }
        }
    }
    let path_list = render::paths::render(&paths, config);
    let validation_report = render::validation::render(&diagnostics);
    Ok(render::assemble(&diagram, &path_list, &validation_report, config))
}

fn classify_entry(path: &Path, workflow_name: Option<&str>) -> FlowResult<Workflow> {
    let parsed = flow_lang::source::read_source(path)?;
    let classes = flow_lang::locate::locate_classes(path, &parsed.module.classes)?;
    let class = match workflow_name {
        Some(name) => classes.into_iter().find(|c| c.name == name).ok_or_else(|| {
            linkage_error(format!(
                "file `{}` does not define workflow `{name}`",
                path.display()
            ))
        })?,
        None => classes[0],
    };
    flow_lang::classify::classify_workflow(path, class)
}

fn render_single(workflow: &Workflow, config: &Configuration) -> FlowResult<String> {
    let (paths, diagnostics) = generate_and_validate(workflow, config)?;
    let diagram = render::diagram_single(workflow, config);
    let path_list = render::paths::render(&paths, config);
    let validation_report = render::validation::render(&diagnostics);
    Ok(render::assemble(&diagram, &path_list, &validation_report, config))
}

/// Run the branch-point engine, then every structural-quality check that
/// depends on its output.
fn generate_and_validate(
    workflow: &Workflow,
    config: &Configuration,
) -> FlowResult<(Vec<render::RenderedPath>, Vec<Diagnostic>)> {
    let paths = generate_paths(workflow, config)?;

    let mut diagnostics = Vec::new();
    if !config.suppress_validation {
        if let Some(d) = validate::branch_point_pressure(workflow, config.max_decision_points) {
            diagnostics.push(d);
        }
        let visited: HashSet<usize> = paths
            .iter()
            .flat_map(|p| p.steps.iter())
            .filter(|s| matches!(s.node, GraphNode::Activity(_)))
            .map(|s| s.node.order_index())
            .collect();
        diagnostics.extend(validate::unreachable_activities(workflow, &visited));
    }
    Ok((paths, diagnostics))
}
