//! Output formatting for the CLI
//!
//! Segment documents and batch summaries render as JSON, YAML or a short
//! human-readable listing.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::output::schema::SegmentDocument;
use crate::pipeline::ProjectOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Human,
}

/// One line of a batch summary
#[derive(Debug, Serialize)]
pub struct ProjectSummary<'a> {
    pub project: &'a str,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<SegmentDocument>,
}

impl<'a> From<&'a ProjectOutcome> for ProjectSummary<'a> {
    fn from(outcome: &'a ProjectOutcome) -> Self {
        match outcome {
            ProjectOutcome::Completed(report) => Self {
                project: &report.project,
                status: "completed",
                error_kind: None,
                error: None,
                document: Some(report.document()),
            },
            ProjectOutcome::Failed { project, error } => Self {
                project,
                status: "failed",
                error_kind: Some(error.kind()),
                error: Some(error.to_string()),
                document: None,
            },
            ProjectOutcome::Skipped { project } => Self {
                project,
                status: "skipped",
                error_kind: None,
                error: None,
                document: None,
            },
        }
    }
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_document(&self, document: &SegmentDocument) -> Result<String> {
        match self.format {
            OutputFormat::Json => document.to_json(),
            OutputFormat::Yaml => document.to_yaml(),
            OutputFormat::Human => Ok(document.to_string()),
        }
    }

    pub fn format_batch(&self, outcomes: &[ProjectOutcome]) -> Result<String> {
        let summaries: Vec<ProjectSummary<'_>> = outcomes.iter().map(ProjectSummary::from).collect();

        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&summaries)
                .context("Failed to serialize batch summary to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(&summaries).context("Failed to serialize batch summary to YAML")
            }
            OutputFormat::Human => Ok(format_batch_human(&summaries)),
        }
    }
}

fn format_batch_human(summaries: &[ProjectSummary<'_>]) -> String {
    let mut out = String::new();
    for summary in summaries {
        match (&summary.document, &summary.error) {
            (Some(document), _) => {
                let segments: Vec<_> = document
                    .segments
                    .iter()
                    .map(|s| s.segment_id.dir_name())
                    .collect();
                out.push_str(&format!("✓ {}: {}\n", summary.project, segments.join(", ")));
            }
            (None, Some(error)) => out.push_str(&format!("✗ {}: {}\n", summary.project, error)),
            (None, None) => out.push_str(&format!("- {}: {}\n", summary.project, summary.status)),
        }
    }

    let completed = summaries.iter().filter(|s| s.status == "completed").count();
    out.push_str(&format!("\n{}/{} projects completed\n", completed, summaries.len()));
    out
}
