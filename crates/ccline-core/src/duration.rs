//! Active-duration estimation from inter-event gaps.

use crate::event::SessionEvent;

/// Maximum inter-event gap, in minutes, still counted as active time.
///
/// Gaps longer than this are treated as breaks (lunch, meetings,
/// overnight) and contribute nothing.
pub const INACTIVITY_THRESHOLD_MINUTES: i64 = 5;

/// Minutes credited to a group too small to measure (zero or one event).
const MINIMUM_ENGAGEMENT_MINUTES: u32 = 5;

/// Estimate minutes of genuine engagement for a group of events.
///
/// Consecutive pairs closer than [`INACTIVITY_THRESHOLD_MINUTES`]
/// contribute their gap; longer gaps contribute nothing. The result is
/// rounded to the nearest whole minute and can legitimately be zero for
/// two or more events far apart. Input order does not matter; events are
/// sorted internally.
#[must_use]
pub fn active_minutes(events: &[SessionEvent]) -> u32 {
    if events.len() <= 1 {
        return MINIMUM_ENGAGEMENT_MINUTES;
    }

    let mut timestamps: Vec<_> = events.iter().map(|e| e.timestamp).collect();
    timestamps.sort_unstable();

    let threshold_ms = INACTIVITY_THRESHOLD_MINUTES * 60_000;
    let mut active_ms: i64 = 0;

    for pair in timestamps.windows(2) {
        let gap_ms = (pair[1] - pair[0]).num_milliseconds();
        if gap_ms <= threshold_ms {
            active_ms += gap_ms;
        }
    }

    // Round half-up to whole minutes.
    u32::try_from((active_ms + 30_000) / 60_000).unwrap_or(u32::MAX)
}
