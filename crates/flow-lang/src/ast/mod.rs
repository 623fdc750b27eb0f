mod calls;
mod loc;
mod workflow;

pub use calls::*;
pub use loc::*;
pub use workflow::*;

pub use crate::names::DecisionId;
