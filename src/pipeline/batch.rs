//! Runs many projects concurrently on the blocking pool
//!
//! Each project runs synchronously on its own worker. A semaphore bounds how
//! many run at once, and cancellation is checked before a project starts, never
//! in the middle of one. One project failing never affects the others.

use super::context::ProjectInput;
use super::orchestrator::Pipeline;
use super::report::PipelineReport;
use crate::error::PipelineError;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub enum ProjectOutcome {
    Completed(Box<PipelineReport>),
    Failed { project: String, error: PipelineError },
    /// Cancelled before it started
    Skipped { project: String },
}

impl ProjectOutcome {
    pub fn project(&self) -> &str {
        match self {
            Self::Completed(report) => &report.project,
            Self::Failed { project, .. } | Self::Skipped { project } => project,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

pub struct BatchRunner {
    pipeline: Pipeline,
    concurrency: usize,
    cancel: CancellationToken,
}

impl BatchRunner {
    /// `concurrency` is clamped to at least one
    pub fn new(pipeline: Pipeline, concurrency: usize) -> Self {
        Self {
            pipeline,
            concurrency: concurrency.max(1),
            cancel: CancellationToken::new(),
        }
    }

    /// Token that stops projects which have not started yet
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Outcomes in input order
    pub async fn run(&self, inputs: Vec<ProjectInput>) -> Vec<ProjectOutcome> {
        info!(
            projects = inputs.len(),
            concurrency = self.concurrency,
            "Starting batch"
        );
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        let handles: Vec<_> = inputs
            .into_iter()
            .map(|input| {
                let semaphore = semaphore.clone();
                let cancel = self.cancel.clone();
                let pipeline = self.pipeline.clone();
                let project = input.basename.clone();

                let handle = tokio::spawn(async move {
                    let Ok(_permit) = semaphore.acquire_owned().await else {
                        return ProjectOutcome::Skipped {
                            project: input.basename,
                        };
                    };
                    if cancel.is_cancelled() {
                        debug!(project = %input.basename, "Batch cancelled, skipping project");
                        return ProjectOutcome::Skipped {
                            project: input.basename,
                        };
                    }

                    let project = input.basename.clone();
                    let joined = tokio::task::spawn_blocking(move || pipeline.run(&input)).await;
                    match joined {
                        Ok(Ok(report)) => ProjectOutcome::Completed(Box::new(report)),
                        Ok(Err(error)) => ProjectOutcome::Failed { project, error },
                        Err(e) => ProjectOutcome::Failed {
                            project,
                            error: PipelineError::Worker(e.to_string()),
                        },
                    }
                });
                (project, handle)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (project, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => ProjectOutcome::Failed {
                    project,
                    error: PipelineError::Worker(e.to_string()),
                },
            };
            if let ProjectOutcome::Failed { project, error } = &outcome {
                warn!(project = %project, kind = error.kind(), error = %error, "Project failed");
            }
            outcomes.push(outcome);
        }

        let completed = outcomes.iter().filter(|o| o.is_completed()).count();
        info!(
            completed,
            failed = outcomes
                .iter()
                .filter(|o| matches!(o, ProjectOutcome::Failed { .. }))
                .count(),
            skipped = outcomes
                .iter()
                .filter(|o| matches!(o, ProjectOutcome::Skipped { .. }))
                .count(),
            "Batch complete"
        );
        outcomes
    }
}
