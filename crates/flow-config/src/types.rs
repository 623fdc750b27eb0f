use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// OutputFormat
// ---------------------------------------------------------------------------

/// Which sections of the rendered analysis the facade concatenates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Only the flowchart diagram.
    DiagramOnly,
    /// Only the enumerated path list.
    PathsOnly,
    /// Diagram, path list, and validation report, each gated by its own
    /// `include_*` flag.
    Full,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "diagram-only" => Ok(Self::DiagramOnly),
            "paths-only" => Ok(Self::PathsOnly),
            "full" => Ok(Self::Full),
            other => anyhow::bail!(
                "unknown output_format {other:?} (expected diagram-only|paths-only|full)"
            ),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::DiagramOnly => "diagram-only",
            Self::PathsOnly => "paths-only",
            Self::Full => "full",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// ChildWorkflowExpansion
// ---------------------------------------------------------------------------

/// How child-workflow calls are rendered and whether they expand the parent's
/// path set (see §4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildWorkflowExpansion {
    /// Each child call is a single compound node; parent path count unaffected.
    Reference,
    /// The parent's path set is multiplied by the child's path set.
    Inline,
    /// Each workflow becomes a bounded subgraph group in the diagram.
    Subgraph,
}

impl FromStr for ChildWorkflowExpansion {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "reference" => Ok(Self::Reference),
            "inline" => Ok(Self::Inline),
            "subgraph" => Ok(Self::Subgraph),
            other => anyhow::bail!(
                "unknown child_workflow_expansion {other:?} (expected reference|inline|subgraph)"
            ),
        }
    }
}

impl fmt::Display for ChildWorkflowExpansion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Reference => "reference",
            Self::Inline => "inline",
            Self::Subgraph => "subgraph",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// SignalResolutionStrategy
// ---------------------------------------------------------------------------

/// How the cross-workflow linker matches an external-signal send to a
/// receiving workflow (see §4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalResolutionStrategy {
    /// Match the signal name against every discovered workflow's signal-handler names.
    ByName,
    /// Match the target pattern against a configured mapping of patterns to workflow names.
    Explicit,
    /// Try `Explicit` first, fall back to `ByName`.
    Hybrid,
}

impl FromStr for SignalResolutionStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "by-name" => Ok(Self::ByName),
            "explicit" => Ok(Self::Explicit),
            "hybrid" => Ok(Self::Hybrid),
            other => anyhow::bail!(
                "unknown signal_resolution_strategy {other:?} (expected by-name|explicit|hybrid)"
            ),
        }
    }
}

impl fmt::Display for SignalResolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ByName => "by-name",
            Self::Explicit => "explicit",
            Self::Hybrid => "hybrid",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// SignalVisualizationMode
// ---------------------------------------------------------------------------

/// How peer workflows connected via signals are grouped in the diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalVisualizationMode {
    /// Each workflow keeps its own subgraph group.
    Subgraph,
    /// All workflows are flattened into a single unified graph.
    Unified,
}

impl FromStr for SignalVisualizationMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "subgraph" => Ok(Self::Subgraph),
            "unified" => Ok(Self::Unified),
            other => {
                anyhow::bail!("unknown signal_visualization_mode {other:?} (expected subgraph|unified)")
            }
        }
    }
}

impl fmt::Display for SignalVisualizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Subgraph => "subgraph",
            Self::Unified => "unified",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_roundtrip() {
        for s in ["diagram-only", "paths-only", "full"] {
            let v: OutputFormat = s.parse().unwrap();
            assert_eq!(v.to_string(), s);
        }
    }

    #[test]
    fn child_workflow_expansion_roundtrip() {
        for s in ["reference", "inline", "subgraph"] {
            let v: ChildWorkflowExpansion = s.parse().unwrap();
            assert_eq!(v.to_string(), s);
        }
    }

    #[test]
    fn unknown_output_format_rejected() {
        assert!("weird".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn unknown_signal_strategy_rejected() {
        assert!("guess".parse::<SignalResolutionStrategy>().is_err());
    }
}
