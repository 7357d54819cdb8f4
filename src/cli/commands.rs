use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Heuristic Dockerfile segment composer for scanned Java projects
#[derive(Parser, Debug)]
#[command(
    name = "segbox",
    about = "Heuristic Dockerfile segment composer for scanned Java projects",
    version,
    author,
    long_about = "segbox reads the capture of an already-scanned Java project, detects its \
                  build tool, framework and application server, picks a compatible runtime \
                  image and composes the ordered Dockerfile segments that containerize it."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Compose segments for one project",
        long_about = "Runs the detection pipeline for one project and prints the segment \
                      document. With --output-dir the concatenated Dockerfile template is \
                      written as well.\n\n\
                      Examples:\n  \
                      segbox generate --app-path ./petclinic --capture-dir ./capture\n  \
                      segbox generate --app-path ./petclinic --capture-dir ./capture --format yaml --output-dir ./out"
    )]
    Generate(GenerateArgs),

    #[command(
        about = "Compose segments for many projects concurrently",
        long_about = "Each project is given as APP_PATH=CAPTURE_DIR. Failures are reported \
                      per project and never stop the others.\n\n\
                      Examples:\n  \
                      segbox batch ./shop=./captures/shop ./billing=./captures/billing"
    )]
    Batch(BatchArgs),

    #[command(subcommand, about = "Image catalog maintenance")]
    Catalog(CatalogCommands),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(long, value_name = "PATH", help = "Root directory of the project")]
    pub app_path: PathBuf,

    #[arg(long, value_name = "DIR", help = "Directory holding the scan output files")]
    pub capture_dir: PathBuf,

    #[arg(long, help = "Project name (defaults to the app path's directory name)")]
    pub basename: Option<String>,

    #[arg(short = 'f', long, value_enum, default_value = "json", help = "Output format")]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "DIR",
        help = "Write Dockerfile-full_template into this directory"
    )]
    pub output_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    #[arg(
        value_name = "APP_PATH=CAPTURE_DIR",
        required = true,
        value_parser = parse_project_spec,
        help = "Projects to process"
    )]
    pub projects: Vec<ProjectSpec>,

    #[arg(long, value_name = "N", help = "Projects processed at once (overrides SEGBOX_BATCH_CONCURRENCY)")]
    pub concurrency: Option<usize>,

    #[arg(
        short = 'o',
        long,
        value_name = "DIR",
        help = "Write each project's artifact into DIR/<basename>"
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(short = 'f', long, value_enum, default_value = "json", help = "Output format")]
    pub format: OutputFormatArg,
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    #[command(
        about = "Derive compatibility tables from image inspect documents",
        long_about = "Reads <images-dir>/<family>/<tag>.json docker inspect documents and \
                     prints the consolidated family -> tag -> Java version dump."
    )]
    Derive(DeriveArgs),
}

#[derive(Args, Debug, Clone)]
pub struct DeriveArgs {
    #[arg(long, value_name = "DIR", help = "Directory of image inspect documents")]
    pub images_dir: PathBuf,

    #[arg(short = 'o', long, value_name = "FILE", help = "Write output to file instead of stdout")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSpec {
    pub app_path: PathBuf,
    pub capture_dir: PathBuf,
}

fn parse_project_spec(s: &str) -> Result<ProjectSpec, String> {
    match s.split_once('=') {
        Some((app, capture)) if !app.is_empty() && !capture.is_empty() => Ok(ProjectSpec {
            app_path: PathBuf::from(app),
            capture_dir: PathBuf::from(capture),
        }),
        _ => Err(format!(
            "Invalid project '{}'. Expected APP_PATH=CAPTURE_DIR",
            s
        )),
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
