//! Terminal report rendering.
//!
//! Takes aggregated timelines and lays them out as one density bar per
//! project, with an hour/day axis header and per-row activity stats.

use std::fmt::Write as _;

use chrono::{DateTime, Local};
use crossterm::style::{Color, Stylize};

use ccline_core::{DensityLevel, Timeline, TimelineKind, density_levels, time_axis};

use crate::config::Config;

/// Width of the project-name column.
const NAME_WIDTH: usize = 30;

/// Fixed columns around the bar: separators plus the events, active
/// time, and token columns.
const STATS_WIDTH: usize = 26;

/// Narrowest density bar worth drawing.
const MIN_TIMELINE_WIDTH: usize = 20;

/// Terminal width assumed when the size cannot be queried (e.g. piped
/// output).
const FALLBACK_COLUMNS: usize = 120;

/// Density bar width for a terminal (or overridden) column count,
/// clamped so a cramped terminal still renders something legible.
#[must_use]
pub fn timeline_width(override_columns: Option<u16>) -> usize {
    let columns = override_columns.map_or_else(
        || crossterm::terminal::size().map_or(FALLBACK_COLUMNS, |(cols, _)| usize::from(cols)),
        usize::from,
    );
    columns
        .saturating_sub(NAME_WIDTH + STATS_WIDTH)
        .max(MIN_TIMELINE_WIDTH)
}

/// Render the full report for a window.
///
/// `use_color` off emits the same layout with unstyled glyphs, for
/// piped output and tests.
#[must_use]
pub fn render_report(
    timelines: &[Timeline],
    window_start: DateTime<Local>,
    window_end: DateTime<Local>,
    width: usize,
    config: &Config,
    use_color: bool,
) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Claude activity {} to {}",
        window_start.format("%Y-%m-%d %H:%M"),
        window_end.format("%Y-%m-%d %H:%M"),
    );
    out.push('\n');

    let axis = time_axis(window_start, window_end, width);
    let _ = writeln!(out, "{:<NAME_WIDTH$} {axis} {:>6} {:>7} {:>9}", "Project", "Events", "Active", "Tokens");

    for timeline in timelines {
        let levels = density_levels(&timeline.events, window_start, window_end, width);
        let bar = density_bar(&levels, config, use_color);
        let _ = writeln!(
            out,
            "{:<NAME_WIDTH$} {bar} {:>6} {:>7} {:>9}",
            row_name(timeline),
            timeline.event_count(),
            format_minutes(timeline.active_minutes),
            format_tokens(timeline.total_input_tokens + timeline.total_output_tokens),
        );
    }

    out.push('\n');
    let total_events: usize = timelines.iter().map(Timeline::event_count).sum();
    let total_minutes: u64 = timelines.iter().map(|t| u64::from(t.active_minutes)).sum();
    let _ = writeln!(
        out,
        "{} {}, {total_events} events, {} active",
        timelines.len(),
        if timelines.len() == 1 { "project" } else { "projects" },
        format_minutes_u64(total_minutes),
    );

    out
}

/// Display name for a row, with children indented under their parent.
fn row_name(timeline: &Timeline) -> String {
    let name = match &timeline.kind {
        TimelineKind::Child { .. } => format!("  └─ {}", timeline.project_name),
        TimelineKind::Standalone | TimelineKind::Parent => timeline.project_name.clone(),
    };
    truncate_name(&name, NAME_WIDTH)
}

/// Truncate to `max` display characters, marking the cut with `...`.
fn truncate_name(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        return name.to_string();
    }
    let mut truncated: String = name.chars().take(max.saturating_sub(3)).collect();
    truncated.push_str("...");
    truncated
}

/// One glyph per bucket, colored by density level.
fn density_bar(levels: &[DensityLevel], config: &Config, use_color: bool) -> String {
    let mut bar = String::new();
    for level in levels {
        if use_color {
            let code = config.palette[usize::from(level.value())];
            let styled = config.glyph.to_string().with(Color::AnsiValue(code));
            let _ = write!(bar, "{styled}");
        } else {
            bar.push(config.glyph);
        }
    }
    bar
}

/// Formats minutes as "Xh Ym" past the hour mark, "Xm" below it.
fn format_minutes(minutes: u32) -> String {
    format_minutes_u64(u64::from(minutes))
}

fn format_minutes_u64(minutes: u64) -> String {
    if minutes >= 60 {
        format!("{}h {}m", minutes / 60, minutes % 60)
    } else {
        format!("{minutes}m")
    }
}

/// Formats a token count compactly: plain below 1000, then `k`/`M`.
#[expect(clippy::cast_precision_loss, reason = "token counts are display-only")]
fn format_tokens(tokens: u64) -> String {
    if tokens < 1_000 {
        format!("{tokens}")
    } else if tokens < 1_000_000 {
        format!("{:.1}k", tokens as f64 / 1_000.0)
    } else {
        format!("{:.1}M", tokens as f64 / 1_000_000.0)
    }
}
