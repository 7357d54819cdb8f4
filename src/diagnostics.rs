//! Soft warnings collected while running one project

use serde::Serialize;
use tracing::warn;

crate::define_id_enum! {
    /// Pipeline stage that raised a diagnostic
    Stage {
        Capture => "capture" : "Capture",
        Metadata => "metadata" : "Metadata",
        Framework => "framework" : "Framework",
        Server => "server" : "Server",
        Manifest => "manifest" : "Manifest",
        Segments => "segments" : "Segments",
        Classifier => "classifier" : "Classifier",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub stage: Stage,
    pub message: String,
}

/// Ordered list of recoverable problems. Each entry is also logged at `warn`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, stage: Stage, message: impl Into<String>) {
        let message = message.into();
        warn!(stage = %stage, "{}", message);
        self.entries.push(Diagnostic { stage, message });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn for_stage(&self, stage: Stage) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.stage == stage)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
