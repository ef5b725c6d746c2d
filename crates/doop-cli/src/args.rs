//! Command-line argument definitions for the DOOP CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the input model, optional graph output,
//! configuration file, report format and logging verbosity.

use clap::{Parser, ValueEnum};

/// How failed runs are reported on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Source snippets with labelled spans.
    #[default]
    Fancy,
    /// One `Error:` line per diagnostic, grouped by file.
    Plain,
    /// `{"errors": [...]}` with one record per diagnostic.
    Json,
}

/// Command-line arguments for the DOOP architecture tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input DOOP file
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Write the relationship graph as Graphviz DOT to this file
    #[arg(short, long)]
    pub dot: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Error report format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Fancy)]
    pub format: ReportFormat,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}
