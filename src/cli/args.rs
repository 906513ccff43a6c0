//! Command-line arguments

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    attrs::AttrsArgs, completions::CompletionsArgs, init::InitArgs, matching::MatchArgs,
    next::NextArgs,
};

#[derive(Parser, Debug)]
#[command(
    name = "varsel",
    version,
    about = "Narrow configurable product templates down to a single stocked variant",
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value = "auto")]
    pub format: OutputFormat,

    /// Log filter (e.g. `debug`, `warn,varsel=trace`); overrides VARSEL_LOG
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Run as if started in this directory
    #[arg(long = "project", short = 'C', global = true, value_name = "DIR")]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a project in the current directory
    Init(InitArgs),

    /// Import catalog files into the database
    Sync,

    /// List configurable templates
    Templates,

    /// Show a template's attributes and the values worth offering
    Attrs(AttrsArgs),

    /// Narrow a template by selected attribute values
    Next(NextArgs),

    /// Find item codes matching attribute filters
    Match(MatchArgs),

    /// Serve JSON-lines requests on stdin
    Rpc,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Output format for command results
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Tables for lists, YAML for single results
    #[default]
    Auto,
    Yaml,
    Json,
    Tsv,
    Csv,
    /// Bare item codes or values, one per line
    Id,
}
