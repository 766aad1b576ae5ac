//! Command-line argument definitions.

use std::path::PathBuf;

use clap::Parser;

/// Claude session timeline viewer.
///
/// Reads Claude session logs, groups activity by project, and renders a
/// density-colored timeline bar per project.
#[derive(Debug, Parser)]
#[command(name = "ccline", version, about, long_about = None)]
pub struct Cli {
    /// How many days back to include (defaults from config).
    #[arg(short, long, conflicts_with = "all")]
    pub days: Option<u32>,

    /// Include the full history instead of a recent window.
    #[arg(short, long)]
    pub all: bool,

    /// Only show projects whose name contains this text.
    #[arg(short, long, value_name = "NAME")]
    pub project: Option<String>,

    /// Group linked git worktrees under their main checkout.
    #[arg(short, long)]
    pub worktrees: bool,

    /// Override the output width in columns.
    #[arg(long, value_name = "COLS")]
    pub width: Option<u16>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
