//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { project } => {
                info!(project = %project, "Starting segment generation");
            }
            ProgressEvent::StageStarted { project, stage } => {
                debug!(project = %project, stage = %stage, "Stage started");
            }
            ProgressEvent::StageComplete {
                project,
                stage,
                duration,
            } => {
                info!(
                    project = %project,
                    stage = %stage,
                    duration_ms = duration.as_millis() as u64,
                    "Stage complete"
                );
            }
            ProgressEvent::Completed {
                project,
                segments,
                diagnostics,
                total_time,
            } => {
                info!(
                    project = %project,
                    segments,
                    diagnostics,
                    total_time_ms = total_time.as_millis() as u64,
                    "Segment generation complete"
                );
            }
            ProgressEvent::Failed { project, error } => {
                warn!(project = %project, error = %error, "Segment generation failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Stage;
    use std::time::Duration;

    #[test]
    fn test_logging_all_events() {
        let handler = LoggingHandler;

        let events = vec![
            ProgressEvent::Started {
                project: "shop".to_string(),
            },
            ProgressEvent::StageStarted {
                project: "shop".to_string(),
                stage: Stage::Framework,
            },
            ProgressEvent::StageComplete {
                project: "shop".to_string(),
                stage: Stage::Framework,
                duration: Duration::from_millis(4),
            },
            ProgressEvent::Completed {
                project: "shop".to_string(),
                segments: 3,
                diagnostics: 1,
                total_time: Duration::from_millis(20),
            },
            ProgressEvent::Failed {
                project: "shop".to_string(),
                error: "No build image registered for Java version '1.7'".to_string(),
            },
        ];

        for event in events {
            handler.on_progress(&event);
        }
    }
}
