//! The branch-point engine, cross-workflow linker, and the fixed-stage
//! analysis pipeline built on top of them.

pub mod engine;
pub mod error;
pub mod facade;
pub mod linker;

pub use error::{FlowError, FlowReason, FlowResult};
pub use facade::{analyze_signal_graph, analyze_workflow, analyze_workflow_graph};
pub use linker::WorkflowIndex;
