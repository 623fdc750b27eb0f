use std::path::PathBuf;

use orion_error::prelude::*;

use crate::error::{ConfigReason, ConfigResult};
use crate::types::{
    ChildWorkflowExpansion, OutputFormat, SignalResolutionStrategy, SignalVisualizationMode,
};

// ---------------------------------------------------------------------------
// Configuration (resolved, validated)
// ---------------------------------------------------------------------------

/// Immutable configuration threaded through every stage of the analysis
/// pipeline. Build one with [`ConfigurationBuilder`]; a `Configuration`
/// cannot be constructed any other way, so a validated value is the only
/// value that exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub split_names_by_words: bool,
    pub start_node_label: String,
    pub end_node_label: String,
    pub decision_true_label: String,
    pub decision_false_label: String,
    pub signal_success_label: String,
    pub signal_timeout_label: String,
    pub max_decision_points: usize,
    pub max_paths: usize,
    pub suppress_validation: bool,
    pub include_validation_report: bool,
    pub include_path_list: bool,
    pub output_format: OutputFormat,
    pub graph_output_file: Option<PathBuf>,
    pub child_workflow_expansion: ChildWorkflowExpansion,
    pub signal_resolution_strategy: SignalResolutionStrategy,
    pub signal_visualization_mode: SignalVisualizationMode,
    pub signal_max_discovery_depth: usize,
    pub warn_unresolved_signals: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        ConfigurationBuilder::new()
            .build()
            .expect("default configuration must validate")
    }
}

// ---------------------------------------------------------------------------
// ConfigurationBuilder (raw, pre-validation)
// ---------------------------------------------------------------------------

/// Builder for [`Configuration`]. Every setter is optional; fields left
/// unset resolve to the documented defaults from §3 of the specification.
/// `build()` runs [`crate::validate::validate`] once before returning, so
/// construction errors surface as a single, explicit [`ConfigReason`]
/// rather than as a typo discovered mid-analysis.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationBuilder {
    split_names_by_words: Option<bool>,
    start_node_label: Option<String>,
    end_node_label: Option<String>,
    decision_true_label: Option<String>,
    decision_false_label: Option<String>,
    signal_success_label: Option<String>,
    signal_timeout_label: Option<String>,
    max_decision_points: Option<usize>,
    max_paths: Option<usize>,
    suppress_validation: Option<bool>,
    include_validation_report: Option<bool>,
    include_path_list: Option<bool>,
    output_format: Option<OutputFormat>,
    graph_output_file: Option<PathBuf>,
    child_workflow_expansion: Option<ChildWorkflowExpansion>,
    signal_resolution_strategy: Option<SignalResolutionStrategy>,
    signal_visualization_mode: Option<SignalVisualizationMode>,
    signal_max_discovery_depth: Option<usize>,
    warn_unresolved_signals: Option<bool>,
}

macro_rules! setter {
    ($field:ident, $ty:ty) => {
        pub fn $field(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

impl ConfigurationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setter!(split_names_by_words, bool);
    setter!(suppress_validation, bool);
    setter!(include_validation_report, bool);
    setter!(include_path_list, bool);
    setter!(max_decision_points, usize);
    setter!(max_paths, usize);
    setter!(signal_max_discovery_depth, usize);
    setter!(warn_unresolved_signals, bool);
    setter!(output_format, OutputFormat);
    setter!(child_workflow_expansion, ChildWorkflowExpansion);
    setter!(signal_resolution_strategy, SignalResolutionStrategy);
    setter!(signal_visualization_mode, SignalVisualizationMode);

    pub fn start_node_label(mut self, value: impl Into<String>) -> Self {
        self.start_node_label = Some(value.into());
        self
    }

    pub fn end_node_label(mut self, value: impl Into<String>) -> Self {
        self.end_node_label = Some(value.into());
        self
    }

    pub fn decision_true_label(mut self, value: impl Into<String>) -> Self {
        self.decision_true_label = Some(value.into());
        self
    }

    pub fn decision_false_label(mut self, value: impl Into<String>) -> Self {
        self.decision_false_label = Some(value.into());
        self
    }

    pub fn signal_success_label(mut self, value: impl Into<String>) -> Self {
        self.signal_success_label = Some(value.into());
        self
    }

    pub fn signal_timeout_label(mut self, value: impl Into<String>) -> Self {
        self.signal_timeout_label = Some(value.into());
        self
    }

    pub fn graph_output_file(mut self, value: impl Into<PathBuf>) -> Self {
        self.graph_output_file = Some(value.into());
        self
    }

    /// Resolve defaults and validate. The only way to obtain a [`Configuration`].
    pub fn build(self) -> ConfigResult<Configuration> {
        let config = Configuration {
            split_names_by_words: self.split_names_by_words.unwrap_or(true),
            start_node_label: self.start_node_label.unwrap_or_else(|| "Start".to_string()),
            end_node_label: self.end_node_label.unwrap_or_else(|| "End".to_string()),
            decision_true_label: self.decision_true_label.unwrap_or_else(|| "yes".to_string()),
            decision_false_label: self
                .decision_false_label
                .unwrap_or_else(|| "no".to_string()),
            signal_success_label: self
                .signal_success_label
                .unwrap_or_else(|| "Signaled".to_string()),
            signal_timeout_label: self
                .signal_timeout_label
                .unwrap_or_else(|| "Timeout".to_string()),
            max_decision_points: self.max_decision_points.unwrap_or(10),
            max_paths: self.max_paths.unwrap_or(1024),
            suppress_validation: self.suppress_validation.unwrap_or(false),
            include_validation_report: self.include_validation_report.unwrap_or(true),
            include_path_list: self.include_path_list.unwrap_or(true),
            output_format: self.output_format.unwrap_or(OutputFormat::Full),
            graph_output_file: self.graph_output_file,
            child_workflow_expansion: self
                .child_workflow_expansion
                .unwrap_or(ChildWorkflowExpansion::Reference),
            signal_resolution_strategy: self
                .signal_resolution_strategy
                .unwrap_or(SignalResolutionStrategy::Hybrid),
            signal_visualization_mode: self
                .signal_visualization_mode
                .unwrap_or(SignalVisualizationMode::Subgraph),
            signal_max_discovery_depth: self.signal_max_discovery_depth.unwrap_or(10),
            warn_unresolved_signals: self.warn_unresolved_signals.unwrap_or(true),
        };

        crate::validate::validate(&config).owe(ConfigReason::InvalidValue)?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let c = ConfigurationBuilder::new().build().unwrap();
        assert!(c.split_names_by_words);
        assert_eq!(c.start_node_label, "Start");
        assert_eq!(c.end_node_label, "End");
        assert_eq!(c.decision_true_label, "yes");
        assert_eq!(c.decision_false_label, "no");
        assert_eq!(c.signal_success_label, "Signaled");
        assert_eq!(c.signal_timeout_label, "Timeout");
        assert_eq!(c.max_decision_points, 10);
        assert_eq!(c.max_paths, 1024);
        assert!(!c.suppress_validation);
        assert_eq!(c.output_format, OutputFormat::Full);
        assert_eq!(c.child_workflow_expansion, ChildWorkflowExpansion::Reference);
        assert_eq!(c.signal_max_discovery_depth, 10);
        assert!(c.warn_unresolved_signals);
    }

    #[test]
    fn zero_max_decision_points_rejected() {
        let err = ConfigurationBuilder::new().max_decision_points(0).build();
        assert!(err.is_err());
    }

    #[test]
    fn zero_max_paths_rejected() {
        let err = ConfigurationBuilder::new().max_paths(0).build();
        assert!(err.is_err());
    }

    #[test]
    fn builder_overrides_apply() {
        let c = ConfigurationBuilder::new()
            .max_decision_points(5)
            .start_node_label("Begin")
            .build()
            .unwrap();
        assert_eq!(c.max_decision_points, 5);
        assert_eq!(c.start_node_label, "Begin");
    }
}
