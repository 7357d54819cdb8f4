//! Per-project pipeline driver and the concurrent batch runner

pub mod batch;
pub mod context;
pub mod orchestrator;
pub mod report;

pub use batch::{BatchRunner, ProjectOutcome};
pub use context::ProjectInput;
pub use orchestrator::Pipeline;
pub use report::PipelineReport;
