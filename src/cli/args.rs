//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    cfg::CfgCommands, completions::CompletionsArgs, config::ConfigCommands, init::InitArgs,
    parts::PartsCommands, roll::RollArgs, thk::ThkCommands,
};

#[derive(Parser)]
#[command(name = "filmtk")]
#[command(author, version, about = "Film Roll Toolkit")]
#[command(long_about = "Manage film-roll parameters and thickness measurements against a parts catalog, and compute label yield per roll.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .filmtk/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new filmtk project
    Init(InitArgs),

    /// Browse the reference parts catalog
    #[command(subcommand)]
    Parts(PartsCommands),

    /// Film parameters per part number (thickness, core, eye-mark set, labels)
    #[command(subcommand)]
    Cfg(CfgCommands),

    /// Thickness measurements per part number (9 samples, mean, stdev)
    #[command(subcommand)]
    Thk(ThkCommands),

    /// Calculate labels per roll for a list of roll diameters
    Roll(RollArgs),

    /// View or change configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pick based on context (table for lists, text for single records)
    #[default]
    Auto,
    /// Boxed table
    Table,
    /// Tab-separated values
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just part numbers, one per line
    Id,
}
