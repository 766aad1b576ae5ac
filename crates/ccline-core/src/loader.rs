//! Session log discovery and loading.
//!
//! Log roots are probed, `.jsonl` files discovered recursively, parsed in
//! parallel, and the resulting events filtered against the requested time
//! window. Everything short of "no root exists at all" is best-effort:
//! unreadable directories and files are skipped, malformed lines
//! discarded.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use rayon::prelude::*;
use thiserror::Error;

use crate::event::{LogRecord, SessionEvent, parse_line};

/// Buffer size for `BufReader` (64KB for large session logs).
const BUFFER_SIZE: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum LoadError {
    /// None of the candidate log roots exist. The only fatal discovery
    /// error; a single missing root is normal.
    #[error("no session log roots found (checked {checked:?})")]
    NoLogRoots { checked: Vec<PathBuf> },
}

/// Inclusive time window for event filtering, in local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
}

impl TimeWindow {
    /// Whether `timestamp` falls inside the window (inclusive on both
    /// ends).
    #[must_use]
    pub fn contains(&self, timestamp: DateTime<Local>) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }
}

/// Load all message events from `roots`, filtered to `window` when one
/// is given (`None` means all-time).
///
/// Returns the events in no particular order; callers sort by timestamp
/// where it matters.
pub fn load_events(
    roots: &[PathBuf],
    window: Option<TimeWindow>,
) -> Result<Vec<SessionEvent>, LoadError> {
    let existing: Vec<&PathBuf> = roots.iter().filter(|root| root.is_dir()).collect();
    if existing.is_empty() {
        return Err(LoadError::NoLogRoots {
            checked: roots.to_vec(),
        });
    }

    let mut files: Vec<PathBuf> = Vec::new();
    for root in existing {
        collect_log_files(root, &mut files);
    }
    tracing::debug!(count = files.len(), "discovered session log files");

    // Logs only grow, so a file untouched since before the window start
    // cannot contain in-window lines; skip it without reading.
    if let Some(window) = window {
        files.retain(|path| modified_since(path, window.start));
    }

    let mut events: Vec<SessionEvent> = files
        .par_iter()
        .filter_map(|path| match parse_log_file(path) {
            Ok(events) => Some(events),
            Err(error) => {
                tracing::warn!(path = ?path, error = %error, "skipping unreadable session log");
                None
            }
        })
        .flatten()
        .collect();

    if let Some(window) = window {
        events.retain(|event| window.contains(event.timestamp));
    }

    tracing::debug!(count = events.len(), "loaded session events");
    Ok(events)
}

/// Parse one session log file into message events.
///
/// Blank lines are skipped; lines failing structural validation are
/// discarded without aborting the file; metadata records (summaries) are
/// not activity and are dropped here.
pub fn parse_log_file(path: &Path) -> std::io::Result<Vec<SessionEvent>> {
    let file = File::open(path)?;
    let reader = BufReader::with_capacity(BUFFER_SIZE, file);
    let mut events = Vec::new();

    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(error) => {
                // Keep what parsed so far; a torn tail is not fatal.
                tracing::warn!(path = ?path, error = %error, "stopped reading mid-file");
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match parse_line(&line) {
            Some(LogRecord::Message(event)) => events.push(event),
            Some(LogRecord::Metadata(_)) => {
                tracing::trace!("skipping metadata record");
            }
            None => {
                tracing::trace!("skipping malformed line");
            }
        }
    }

    Ok(events)
}

/// Recursively collect `.jsonl` files under `dir`, skipping anything
/// that cannot be listed.
fn collect_log_files(dir: &Path, files: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(error) => {
            tracing::warn!(path = ?dir, error = %error, "skipping unreadable directory");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_log_files(&path, files);
        } else if path.extension().is_some_and(|ext| ext == "jsonl") {
            files.push(path);
        }
    }
}

/// Whether the file's mtime is at or after `start`. Files with
/// unreadable metadata are kept; the line-level window filter still
/// applies.
fn modified_since(path: &Path, start: DateTime<Local>) -> bool {
    match std::fs::metadata(path).and_then(|meta| meta.modified()) {
        Ok(mtime) => DateTime::<Local>::from(mtime) >= start,
        Err(error) => {
            tracing::debug!(path = ?path, error = %error, "could not read mtime");
            true
        }
    }
}
