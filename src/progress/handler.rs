//! Progress handler trait and events

use crate::diagnostics::Stage;
use std::time::Duration;

/// Events emitted while a project moves through the pipeline
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Project run started
    Started { project: String },

    StageStarted { project: String, stage: Stage },

    StageComplete {
        project: String,
        stage: Stage,
        duration: Duration,
    },

    /// Project run produced its segment list
    Completed {
        project: String,
        segments: usize,
        diagnostics: usize,
        total_time: Duration,
    },

    Failed { project: String, error: String },
}

/// Trait for handling progress events during a run
pub trait ProgressHandler: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}
