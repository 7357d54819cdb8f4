//! segbox - heuristic Dockerfile segment composer for scanned Java projects
//!
//! segbox takes the capture of an already-scanned Java project (categorized
//! file lists plus a coarse build-type tag) and decides, through layered
//! heuristics, how to containerize it: which framework and application server
//! it uses, which runtime image is compatible, and which ordered Dockerfile
//! segments make up the final build artifact.
//!
//! # Pipeline
//!
//! Every project runs the same strictly sequential stages:
//!
//! 1. [`metadata`]: versions, hierarchy, packaging and config-server facts from
//!    the Maven descriptor chain
//! 2. [`framework`]: rule-first framework detection, then port / artifact / app
//!    name extraction with a heuristic fallback
//! 3. [`server`]: weighted voting among Tomcat, JBoss and Liberty, then a
//!    compatible image from the [`catalog`]
//! 4. [`manifest`]: memory and start-command overrides from platform manifests
//! 5. [`segments`]: the ordered, parameterized segment list and its rendering
//!
//! Recoverable problems never abort a run; they are collected as
//! [`Diagnostics`]. Fatal problems surface as [`PipelineError`].
//!
//! # Example
//!
//! ```no_run
//! use segbox::{Catalog, Pipeline, ProjectInput, RealFileSystem};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let fs = Arc::new(RealFileSystem::new());
//! let input = ProjectInput::load(fs.as_ref(), "./petclinic", Path::new("./capture"))?;
//! let pipeline = Pipeline::new(fs, Arc::new(Catalog::builtin()));
//!
//! let report = pipeline.run(&input)?;
//! println!("{}", report.document().to_json()?);
//! # Ok::<(), anyhow::Error>(())
//! ```

mod id_enum_macro;

pub mod capture;
pub mod catalog;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod framework;
pub mod fs;
pub mod manifest;
pub mod maven;
pub mod metadata;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod segments;
pub mod server;
pub mod util;

pub use capture::{BuildType, CaptureLoader, CapturedData, FileCategory};
pub use catalog::{Catalog, CatalogError};
pub use classifier::{ClassificationService, ClassifierError, HttpClassifier};
pub use config::{ConfigError, SegboxConfig};
pub use diagnostics::{Diagnostic, Diagnostics, Stage};
pub use error::PipelineError;
pub use fs::{FileSystem, MockFileSystem, RealFileSystem};
pub use output::schema::SegmentDocument;
pub use pipeline::{BatchRunner, Pipeline, PipelineReport, ProjectInput, ProjectOutcome};
pub use progress::{LoggingHandler, ProgressEvent, ProgressHandler};
pub use segments::{SegmentError, SegmentKind, SegmentList};
pub use server::ServerType;
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
