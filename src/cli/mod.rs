pub mod commands;
pub mod output;

pub use commands::{BatchArgs, CatalogCommands, CliArgs, Commands, DeriveArgs, GenerateArgs, ProjectSpec};
pub use output::{OutputFormat, OutputFormatter};
