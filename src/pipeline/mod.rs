pub mod config;
mod extract;
mod load;
pub mod orchestrator;
mod source;
mod transform;
pub mod types;

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use orchestrator::Pipeline;
pub use types::{FailureKind, ItemFailure, Order, PipelineError, Product, RunSummary};
