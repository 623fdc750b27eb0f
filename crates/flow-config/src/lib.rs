pub mod builder;
pub mod error;
pub mod types;
pub mod validate;

pub use builder::{Configuration, ConfigurationBuilder};
pub use error::{ConfigError, ConfigReason, ConfigResult};
pub use types::{
    ChildWorkflowExpansion, OutputFormat, SignalResolutionStrategy, SignalVisualizationMode,
};
