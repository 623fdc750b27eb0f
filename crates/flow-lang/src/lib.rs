//! Static analysis of Temporal workflow source files: parsing, call-site
//! classification, validation, and flowchart/path rendering. Never loads or
//! executes the analysed workflow.

pub mod ast;
pub mod classify;
pub mod error;
pub mod locate;
pub mod names;
pub mod render;
pub mod source;
pub mod validate;

pub use ast::Workflow;
pub use error::{FlowError, FlowReason, FlowResult};
