use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Duration, Local};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ccline_cli::{Cli, Config, display};
use ccline_core::{GroupingMode, RepoResolver, TimeWindow, Timeline, aggregate, load_events};

/// Conventional locations of Claude session logs.
fn default_log_roots() -> Vec<PathBuf> {
    let Some(home) = dirs::home_dir() else {
        return Vec::new();
    };
    vec![
        home.join(".claude").join("projects"),
        home.join(".config").join("claude").join("projects"),
    ]
}

/// Keep only the timeline groups whose project name matches `filter`,
/// case-insensitively. Children follow their parent's fate so groups
/// stay intact.
fn retain_matching(timelines: &mut Vec<Timeline>, filter: &str) {
    let needle = filter.to_lowercase();
    timelines.retain(|timeline| {
        let group_name = timeline
            .parent_project()
            .unwrap_or(&timeline.project_name);
        group_name.to_lowercase().contains(&needle)
    });
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let window = if cli.all {
        None
    } else {
        let days = cli.days.unwrap_or(config.days).max(1);
        let end = Local::now();
        Some(TimeWindow {
            start: end - Duration::days(i64::from(days)),
            end,
        })
    };

    let events = load_events(&default_log_roots(), window).context("no data source found")?;

    let mode = if cli.worktrees {
        GroupingMode::Hierarchical
    } else {
        GroupingMode::Consolidated
    };
    let resolver = RepoResolver::new();
    let mut timelines = aggregate(events, mode, &resolver);

    if let Some(filter) = cli.project.as_deref() {
        retain_matching(&mut timelines, filter);
    }

    if timelines.is_empty() {
        println!("No session activity found.");
        return Ok(());
    }

    // All-time mode derives the display window from the data itself.
    let (start, end) = match window {
        Some(window) => (window.start, window.end),
        None => {
            let start = timelines
                .iter()
                .map(|t| t.start_time)
                .min()
                .unwrap_or_else(Local::now);
            let end = timelines
                .iter()
                .map(|t| t.end_time)
                .max()
                .unwrap_or_else(Local::now);
            (start, end)
        }
    };

    let width = display::timeline_width(cli.width);
    let report = display::render_report(
        &timelines,
        start,
        end,
        width,
        &config,
        std::io::stdout().is_terminal(),
    );
    print!("{report}");

    Ok(())
}
