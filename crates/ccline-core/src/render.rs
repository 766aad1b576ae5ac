//! Density timeline rendering.
//!
//! Events are bucketed into fixed time slots across a display width and
//! each bucket quantized to a small ordinal scale, normalized against the
//! busiest bucket of the same timeline so every row's own peak reaches
//! the top level. The output is the level sequence; mapping levels to
//! glyph colors is a presentation concern.

use chrono::{DateTime, Datelike, Days, Duration, Local, Timelike};

use crate::event::SessionEvent;

/// Windows longer than this get day labels on the axis instead of hours.
const DAY_AXIS_THRESHOLD_SECS: i64 = 48 * 3600;

/// Ordinal 0-4 classification of a time bucket's relative event count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DensityLevel(u8);

impl DensityLevel {
    /// No events in the bucket.
    pub const IDLE: Self = Self(0);
    /// The busiest bucket of the timeline.
    pub const MAX: Self = Self(4);

    /// Quantize a bucket count against the row's maximum.
    ///
    /// The exact shape of this mapping is load-bearing for visual
    /// parity: `min(4, floor(count / max * 4) + 1)` for non-empty
    /// buckets, level 0 otherwise.
    fn quantize(count: usize, max_count: usize) -> Self {
        if count == 0 {
            return Self::IDLE;
        }
        let level = (count * 4 / max_count.max(1)) + 1;
        Self(u8::try_from(level.min(4)).unwrap_or(4))
    }

    /// The raw level, in `0..=4`.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn is_idle(self) -> bool {
        self.0 == 0
    }
}

/// Compute the density level for each of `width` time buckets.
///
/// Event offsets into the window map linearly onto bucket indices and
/// are clamped to the valid range, so strays just outside the window
/// land on the edge buckets. A `width` of zero is a caller contract
/// violation and yields an empty sequence.
#[must_use]
pub fn density_levels(
    events: &[SessionEvent],
    window_start: DateTime<Local>,
    window_end: DateTime<Local>,
    width: usize,
) -> Vec<DensityLevel> {
    let counts = bucket_counts(events, window_start, window_end, width);
    let max_count = counts.iter().copied().max().unwrap_or(0).max(1);
    counts
        .into_iter()
        .map(|count| DensityLevel::quantize(count, max_count))
        .collect()
}

fn bucket_counts(
    events: &[SessionEvent],
    window_start: DateTime<Local>,
    window_end: DateTime<Local>,
    width: usize,
) -> Vec<usize> {
    let mut counts = vec![0usize; width];
    if width == 0 {
        return counts;
    }

    let total_ms = (window_end - window_start).num_milliseconds();
    for event in events {
        let index = if total_ms <= 0 {
            0
        } else {
            let offset_ms = (event.timestamp - window_start).num_milliseconds();
            linear_index(offset_ms, total_ms, width)
        };
        counts[index] += 1;
    }
    counts
}

/// Map a window offset linearly to a bucket index, clamped to
/// `[0, width)`.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    reason = "offsets and widths are far below f64 precision limits"
)]
fn linear_index(offset: i64, total: i64, width: usize) -> usize {
    let fraction = offset as f64 / total as f64;
    let index = (fraction * width as f64).floor() as i64;
    usize::try_from(index.clamp(0, width as i64 - 1)).unwrap_or(0)
}

/// Build a `width`-character axis label row for the window: even-hour
/// `HH` marks for short windows, `MM/DD` marks at local midnights for
/// windows longer than two days.
#[must_use]
pub fn time_axis(window_start: DateTime<Local>, window_end: DateTime<Local>, width: usize) -> String {
    let mut cells = vec![' '; width];
    let total_secs = (window_end - window_start).num_seconds();

    if width > 0 && total_secs > 0 {
        if total_secs <= DAY_AXIS_THRESHOLD_SECS {
            hour_marks(&mut cells, window_start, total_secs);
        } else {
            day_marks(&mut cells, window_start, window_end, total_secs);
        }
    }

    cells.into_iter().collect()
}

fn hour_marks(cells: &mut [char], window_start: DateTime<Local>, total_secs: i64) {
    let width = cells.len();
    for hour_offset in 0..=(total_secs / 3600) {
        let tick = window_start + Duration::hours(hour_offset);
        // Even hours only, for a less crowded axis.
        if tick.hour() % 2 != 0 {
            continue;
        }
        let position = linear_index(hour_offset * 3600, total_secs, width);
        place_label(cells, position, &format!("{:02}", tick.hour()));
    }
}

fn day_marks(
    cells: &mut [char],
    window_start: DateTime<Local>,
    window_end: DateTime<Local>,
    total_secs: i64,
) {
    let width = cells.len();
    for day_offset in 0..=(total_secs / 86_400 + 1) {
        let Ok(day_offset) = u64::try_from(day_offset) else {
            break;
        };
        let Some(naive) = (window_start.date_naive() + Days::new(day_offset)).and_hms_opt(0, 0, 0)
        else {
            continue;
        };
        let Some(tick) = naive.and_local_timezone(Local).earliest() else {
            continue;
        };
        if tick < window_start || tick > window_end {
            continue;
        }

        let offset_secs = (tick - window_start).num_seconds();
        let position = linear_index(offset_secs, total_secs, width);
        place_label(cells, position, &format!("{:02}/{:02}", tick.month(), tick.day()));
    }
}

/// Write a label into the axis if it fits and the slots are still free.
fn place_label(cells: &mut [char], position: usize, label: &str) {
    let end = position + label.len();
    if end > cells.len() || cells[position..end].iter().any(|&c| c != ' ') {
        return;
    }
    for (offset, ch) in label.chars().enumerate() {
        cells[position + offset] = ch;
    }
}
