use derive_more::From;
use orion_error::{ErrorCode, StructError, UvsReason};

/// The unified error taxonomy for the whole analysis pipeline (§4.7).
/// Every kind of failure the specification enumerates — parse, unsupported
/// construct, decision/wait usage, path generation, and cross-workflow
/// linkage — is a variant here, so callers match on one type regardless of
/// which stage failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error, From)]
pub enum FlowReason {
    /// Input cannot be read, or has no workflow/run-method/signal-handler
    /// definition the locator recognises, or fails to parse.
    #[error("parse error")]
    Parse,
    /// A call-site shape is control-flow-bearing but not in the supported
    /// set (loops, comprehensions, exception-driven branching, dynamic
    /// dispatch on a computed target).
    #[error("unsupported construct")]
    UnsupportedConstruct,
    /// A decision/wait helper was invoked with the wrong arity or a
    /// non-literal name argument.
    #[error("decision/wait usage error")]
    DecisionWaitUsage,
    /// A safety gate in the branch-point engine tripped, or a rendering
    /// invariant was violated.
    #[error("path generation error")]
    Generation,
    /// A referenced child or signal-peer workflow could not be located, or
    /// a cycle was detected while linking.
    #[error("cross-workflow linkage error")]
    Linkage,
    /// Configuration failed to validate.
    #[error("configuration error")]
    Configuration,
    #[error("{0}")]
    Uvs(UvsReason),
}

impl ErrorCode for FlowReason {
    fn error_code(&self) -> i32 {
        match self {
            Self::Parse => 3001,
            Self::UnsupportedConstruct => 3002,
            Self::DecisionWaitUsage => 3003,
            Self::Generation => 3004,
            Self::Linkage => 3005,
            Self::Configuration => 3006,
            Self::Uvs(u) => u.error_code(),
        }
    }
}

pub type FlowError = StructError<FlowReason>;
pub type FlowResult<T> = Result<T, FlowError>;

/// Build a parse error carrying file path, line, and a concrete suggestion —
/// the shape every user-visible error must have per §7.
pub fn parse_error(
    path: impl std::fmt::Display,
    line: Option<usize>,
    message: impl std::fmt::Display,
    suggestion: impl std::fmt::Display,
) -> FlowError {
    let location = match line {
        Some(l) => format!("{path}:{l}"),
        None => path.to_string(),
    };
    StructError::from(FlowReason::Parse)
        .with_detail(format!("{location}: {message} (suggestion: {suggestion})"))
}

pub fn unsupported_construct_error(
    path: impl std::fmt::Display,
    line: usize,
    kind: impl std::fmt::Display,
    suggestion: impl std::fmt::Display,
) -> FlowError {
    StructError::from(FlowReason::UnsupportedConstruct).with_detail(format!(
        "{path}:{line}: unsupported construct `{kind}` (suggestion: {suggestion})"
    ))
}

pub fn decision_wait_usage_error(
    path: impl std::fmt::Display,
    line: usize,
    helper: impl std::fmt::Display,
    message: impl std::fmt::Display,
) -> FlowError {
    StructError::from(FlowReason::DecisionWaitUsage).with_detail(format!(
        "{path}:{line}: `{helper}`: {message} (suggestion: inline the literal argument)"
    ))
}

pub fn generation_error(message: impl std::fmt::Display) -> FlowError {
    StructError::from(FlowReason::Generation).with_detail(message.to_string())
}

pub fn linkage_error(message: impl std::fmt::Display) -> FlowError {
    StructError::from(FlowReason::Linkage).with_detail(message.to_string())
}
