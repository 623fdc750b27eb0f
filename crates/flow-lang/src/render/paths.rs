//! Path-list output (§6): `Execution Paths (N total):` followed by one
//! `Path k: ...` line per generated path.

use flow_config::Configuration;

use super::format::node_label;
use super::model::RenderedPath;
use crate::ast::GraphNode;

fn step_label(node: &GraphNode, outcome: Option<bool>, config: &Configuration) -> String {
    let (name, outcome_label) = match node {
        GraphNode::Activity(a) => (a.display_name.clone(), None),
        GraphNode::ChildWorkflow(c) => (c.target_name.clone(), None),
        GraphNode::ExternalSignal(s) => (format!("Signal '{}'", s.signal_name), None),
        GraphNode::Decision(d) => (
            d.label.clone(),
            outcome.map(|o| {
                if o {
                    config.decision_true_label.clone()
                } else {
                    config.decision_false_label.clone()
                }
            }),
        ),
        GraphNode::Wait(w) => (
            w.label.clone(),
            outcome.map(|o| {
                if o {
                    config.signal_success_label.clone()
                } else {
                    config.signal_timeout_label.clone()
                }
            }),
        ),
    };
    let label = node_label(&name, config.split_names_by_words);
    match outcome_label {
        Some(o) => format!("{label}:{o}"),
        None => label,
    }
}

/// Renders the full path-list section for one workflow's generated paths.
pub fn render(paths: &[RenderedPath], config: &Configuration) -> String {
    let mut out = String::new();
    out.push_str(&format!("Execution Paths ({} total):\n", paths.len()));
    for (i, path) in paths.iter().enumerate() {
        let mut segments = vec![config.start_node_label.clone()];
        segments.extend(
            path.steps
                .iter()
                .map(|s| step_label(&s.node, s.outcome, config)),
        );
        segments.push(config.end_node_label.clone());
        out.push_str(&format!("Path {}: {}\n", i + 1, segments.join(" \u{2192} ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ActivityCall, SourceLoc};
    use flow_config::ConfigurationBuilder;

    #[test]
    fn linear_single_path() {
        let config = ConfigurationBuilder::new()
            .split_names_by_words(false)
            .build()
            .unwrap();
        let path = RenderedPath {
            steps: vec![
                super::super::model::PathStep {
                    node: GraphNode::Activity(ActivityCall {
                        display_name: "validate_input".to_string(),
                        order_index: 0,
                        loc: SourceLoc::new(1, 1),
                    }),
                    outcome: None,
                },
                super::super::model::PathStep {
                    node: GraphNode::Activity(ActivityCall {
                        display_name: "save_result".to_string(),
                        order_index: 1,
                        loc: SourceLoc::new(2, 1),
                    }),
                    outcome: None,
                },
            ],
        };
        let rendered = render(&[path], &config);
        assert_eq!(
            rendered,
            "Execution Paths (1 total):\nPath 1: Start \u{2192} validate_input \u{2192} save_result \u{2192} End\n"
        );
    }
}
