//! Core domain logic for the session timeline viewer.
//!
//! This crate contains the fundamental types and logic for:
//! - Loading: discovering and parsing Claude session logs
//! - Aggregation: grouping events into per-project timelines
//! - Density: bucketing events for terminal timeline bars

pub mod duration;
pub mod event;
pub mod loader;
pub mod render;
pub mod repo;
pub mod timeline;

pub use duration::{INACTIVITY_THRESHOLD_MINUTES, active_minutes};
pub use event::{LogRecord, MetadataRecord, SessionEvent, parse_line};
pub use loader::{LoadError, TimeWindow, load_events, parse_log_file};
pub use render::{DensityLevel, density_levels, time_axis};
pub use repo::{RepoResolver, is_canonical_checkout, parse_remote_name};
pub use timeline::{GroupingMode, Timeline, TimelineKind, aggregate};
