//! Re-exports flow-lang's error taxonomy: one `FlowReason` enum spans the
//! whole pipeline (§4.7), so the engine and linker raise the same
//! `FlowError` the classifier does rather than defining a parallel one.

pub use flow_lang::error::{
    decision_wait_usage_error, generation_error, linkage_error, parse_error,
    unsupported_construct_error, FlowError, FlowReason, FlowResult,
};
