//! findunexp CLI tool.
//!
//! Usage:
//! ```bash
//! findunexp [--import-pattern REGEX] [--root DIR]... [--format text|compact|json]
//! ```

use anyhow::Result;
use clap::Parser;
use findunexp_core::ReportFormat;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Finds Go struct types that embed a pointer to an unexported type
#[derive(Parser, Debug)]
#[command(name = "findunexp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Only check packages whose import path matches this regex
    #[arg(long, alias = "importPattern", value_name = "REGEX")]
    import_pattern: Option<String>,

    /// GOPATH-style root holding a `src/` tree (can be specified multiple times)
    #[arg(long, value_name = "DIR")]
    root: Vec<PathBuf>,

    /// Go installation root, searched before the other roots
    #[arg(long, value_name = "DIR")]
    goroot: Option<PathBuf>,

    /// Additional build tags (comma-separated)
    #[arg(long, value_delimiter = ',')]
    tags: Vec<String>,

    /// Import-path glob to skip (can be specified multiple times)
    #[arg(long, value_name = "GLOB")]
    exclude: Vec<String>,

    /// Output format
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Output format for reported structs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Position line followed by the reconstructed declaration.
    #[default]
    Text,
    /// One line per struct.
    Compact,
    /// One JSON object per line.
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Self::Text,
            OutputFormat::Compact => Self::Compact,
            OutputFormat::Json => Self::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    commands::scan::run(&cli)
}
