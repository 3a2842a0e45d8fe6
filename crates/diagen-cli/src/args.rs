//! Command-line argument definitions for the Diagen CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, logging verbosity, and per-run compiler overrides.

use clap::Parser;

/// Command-line arguments for the Diagen diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input Diagen file
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output SVG file
    #[arg(short, long, default_value = "out.svg")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Fail on validation errors instead of reporting them as warnings
    #[arg(long)]
    pub strict: bool,

    /// Theme name, overriding the configuration and the document
    #[arg(long)]
    pub theme: Option<String>,
}
