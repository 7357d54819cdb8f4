use segbox::catalog::introspect;
use segbox::cli::commands::{BatchArgs, CatalogCommands, CliArgs, Commands, DeriveArgs, GenerateArgs};
use segbox::cli::output::{OutputFormat, OutputFormatter};
use segbox::config::SegboxConfig;
use segbox::fs::{FileSystem, RealFileSystem};
use segbox::pipeline::{BatchRunner, Pipeline, ProjectInput, ProjectOutcome};
use segbox::progress::LoggingHandler;
use segbox::segments::{ArtifactSink, FileSink};
use segbox::util::logging::{self, LoggingConfig};
use segbox::{NAME, VERSION};

use clap::Parser;
use std::env;
use std::path::Path;
use std::process;
use std::sync::Arc;
use tracing::{debug, error, info, Level};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("{} v{} starting", NAME, VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Generate(generate_args) => handle_generate(generate_args, args.quiet),
        Commands::Batch(batch_args) => handle_batch(batch_args, args.quiet),
        Commands::Catalog(CatalogCommands::Derive(derive_args)) => handle_catalog_derive(derive_args),
    };

    process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let level = if let Some(level_str) = &args.log_level {
        logging::parse_level(level_str)
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        let level_str = env::var("SEGBOX_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        logging::parse_level(&level_str)
    };

    let use_json = env::var("SEGBOX_LOG_JSON")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);

    logging::init_logging(LoggingConfig {
        use_json,
        ..LoggingConfig::with_level(level)
    });
}

fn load_config() -> Option<SegboxConfig> {
    let config = SegboxConfig::default();
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        eprintln!("\nPlease check your SEGBOX_* environment variables.");
        return None;
    }
    debug!("{}", config);
    Some(config)
}

/// Pipeline wired from configuration. The classifier's blocking HTTP client is
/// created here, outside any async runtime.
fn build_pipeline(config: &SegboxConfig, fs: Arc<dyn FileSystem>) -> Option<Pipeline> {
    let catalog = match config.load_catalog(fs.as_ref()) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Failed to load image catalog: {}", e);
            return None;
        }
    };
    let templates = config.load_templates(fs.as_ref());

    let mut pipeline = Pipeline::new(fs, Arc::new(catalog))
        .with_templates(templates)
        .with_progress(Arc::new(LoggingHandler));

    match config.classifier() {
        Ok(Some(classifier)) => {
            info!(url = ?config.classifier_url, "Classification service enabled");
            pipeline = pipeline.with_classifier(classifier);
        }
        Ok(None) => {}
        Err(e) => {
            error!("Failed to initialize classification client: {}", e);
            return None;
        }
    }

    Some(pipeline)
}

fn emit(output: &str) {
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }
}

fn handle_generate(args: &GenerateArgs, quiet: bool) -> i32 {
    let Some(config) = load_config() else {
        return 1;
    };

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem::new());
    if !fs.is_dir(&args.app_path) {
        error!("App path is not a directory: {}", args.app_path.display());
        return 1;
    }

    let mut input = match ProjectInput::load(fs.as_ref(), &args.app_path, &args.capture_dir) {
        Ok(input) => input,
        Err(e) => {
            error!("Failed to load capture: {:#}", e);
            return 1;
        }
    };
    if let Some(basename) = &args.basename {
        input = input.with_basename(basename.clone());
    }

    let Some(pipeline) = build_pipeline(&config, fs) else {
        return 1;
    };

    let report = match pipeline.run(&input) {
        Ok(report) => report,
        Err(e) => {
            error!(kind = e.kind(), "Segment generation failed: {}", e);
            return 1;
        }
    };

    let document = report.document();
    if let Err(e) = document.validate() {
        error!("Generated document is invalid: {:#}", e);
        return 1;
    }

    if let Some(output_dir) = &args.output_dir {
        let sink = FileSink::new(output_dir);
        if let Err(e) = report.persist(&sink) {
            error!("Failed to write artifact: {}", e);
            return 1;
        }
        if !quiet {
            eprintln!("Artifact written to: {}", sink.target().display());
        }
    }

    let formatter = OutputFormatter::new(OutputFormat::from(args.format));
    match formatter.format_document(&document) {
        Ok(output) => {
            emit(&output);
            0
        }
        Err(e) => {
            error!("Failed to format output: {:#}", e);
            1
        }
    }
}

fn handle_batch(args: &BatchArgs, quiet: bool) -> i32 {
    let Some(mut config) = load_config() else {
        return 1;
    };
    if let Some(concurrency) = args.concurrency {
        config.batch_concurrency = concurrency;
        if let Err(e) = config.validate() {
            error!("Configuration error: {}", e);
            return 1;
        }
    }

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem::new());
    let mut inputs = Vec::with_capacity(args.projects.len());
    for spec in &args.projects {
        match ProjectInput::load(fs.as_ref(), &spec.app_path, &spec.capture_dir) {
            Ok(input) => inputs.push(input),
            Err(e) => {
                error!(
                    "Failed to load capture for {}: {:#}",
                    spec.app_path.display(),
                    e
                );
                return 1;
            }
        }
    }

    let Some(pipeline) = build_pipeline(&config, fs) else {
        return 1;
    };
    let runner = BatchRunner::new(pipeline, config.batch_concurrency);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start async runtime: {}", e);
            return 1;
        }
    };

    let cancel = runner.cancellation_token();
    let outcomes = runtime.block_on(async {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted, finishing running projects and skipping the rest");
                cancel.cancel();
            }
        });
        runner.run(inputs).await
    });
    runtime.shutdown_background();

    if let Some(output_dir) = &args.output_dir {
        for outcome in &outcomes {
            if let ProjectOutcome::Completed(report) = outcome {
                let sink = FileSink::new(output_dir.join(&report.project));
                if let Err(e) = sink.persist(&report.rendered) {
                    error!(project = %report.project, "Failed to write artifact: {}", e);
                } else if !quiet {
                    eprintln!("Artifact written to: {}", sink.target().display());
                }
            }
        }
    }

    let formatter = OutputFormatter::new(OutputFormat::from(args.format));
    match formatter.format_batch(&outcomes) {
        Ok(output) => emit(&output),
        Err(e) => {
            error!("Failed to format output: {:#}", e);
            return 1;
        }
    }

    if outcomes.iter().all(ProjectOutcome::is_completed) {
        0
    } else {
        2
    }
}

fn handle_catalog_derive(args: &DeriveArgs) -> i32 {
    let fs = RealFileSystem::new();
    let derived = match introspect::derive_from_dir(&fs, &args.images_dir) {
        Ok(derived) => derived,
        Err(e) => {
            error!("Failed to derive catalog: {}", e);
            return 1;
        }
    };
    info!(
        families = derived.consolidated.len(),
        configs = derived.configs.len(),
        "Derived image catalog"
    );

    let output = match serde_json::to_string_pretty(&derived.consolidated) {
        Ok(output) => output,
        Err(e) => {
            error!("Failed to serialize consolidated images: {}", e);
            return 1;
        }
    };

    match &args.output {
        Some(path) => write_output(path, &output),
        None => {
            emit(&output);
            0
        }
    }
}

fn write_output(path: &Path, output: &str) -> i32 {
    match std::fs::write(path, output) {
        Ok(()) => {
            eprintln!("Output written to: {}", path.display());
            0
        }
        Err(e) => {
            error!("Failed to write output file {}: {}", path.display(), e);
            1
        }
    }
}
