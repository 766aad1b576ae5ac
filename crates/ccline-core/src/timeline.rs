//! Grouping events into per-project timelines.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Local};

use crate::duration::active_minutes;
use crate::event::SessionEvent;
use crate::repo::{RepoResolver, is_canonical_checkout};

/// How events are grouped into timelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupingMode {
    /// All working directories of one repository merged into a single
    /// timeline.
    #[default]
    Consolidated,
    /// Each working directory kept separate, linked to a synthesized
    /// parent by shared repository identity.
    Hierarchical,
}

/// Where a timeline sits in the grouping hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineKind {
    /// The only timeline for its repository identity.
    Standalone,
    /// The main directory of a repository that also has worktree
    /// children.
    Parent,
    /// One worktree directory of a repository, linked to its parent by
    /// name.
    Child { parent: String },
}

/// One project's merged session record for a run.
#[derive(Debug, Clone)]
pub struct Timeline {
    /// Display identity: the resolved repository name, or a derived
    /// child label in hierarchical mode.
    pub project_name: String,
    /// Representative working directory; empty in consolidated mode,
    /// where several directories may have been merged.
    pub directory: String,
    pub kind: TimelineKind,
    /// Events in ascending timestamp order; never empty.
    pub events: Vec<SessionEvent>,
    /// Timestamp of the first event.
    pub start_time: DateTime<Local>,
    /// Timestamp of the last event.
    pub end_time: DateTime<Local>,
    /// Estimated minutes of genuine engagement.
    pub active_minutes: u32,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
}

impl Timeline {
    /// Build a timeline from a group's events; `None` for an empty
    /// group (zero-event groups are never materialized).
    fn from_events(
        project_name: String,
        directory: String,
        kind: TimelineKind,
        mut events: Vec<SessionEvent>,
    ) -> Option<Self> {
        events.sort_by_key(|event| event.timestamp);
        let start_time = events.first()?.timestamp;
        let end_time = events.last()?.timestamp;
        let active = active_minutes(&events);
        let total_input_tokens = events.iter().map(|e| u64::from(e.input_tokens)).sum();
        let total_output_tokens = events.iter().map(|e| u64::from(e.output_tokens)).sum();

        Some(Self {
            project_name,
            directory,
            kind,
            events,
            start_time,
            end_time,
            active_minutes: active,
            total_input_tokens,
            total_output_tokens,
        })
    }

    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Name of the parent timeline, for child rows.
    #[must_use]
    pub fn parent_project(&self) -> Option<&str> {
        match &self.kind {
            TimelineKind::Child { parent } => Some(parent),
            TimelineKind::Standalone | TimelineKind::Parent => None,
        }
    }
}

/// Group events into timelines under the given mode.
///
/// Output is ordered by descending event count; in hierarchical mode a
/// parent is immediately followed by its children (children themselves
/// by descending count), with the parent ranked by its own count.
#[must_use]
pub fn aggregate(
    events: Vec<SessionEvent>,
    mode: GroupingMode,
    resolver: &RepoResolver,
) -> Vec<Timeline> {
    match mode {
        GroupingMode::Consolidated => consolidated(events, resolver),
        GroupingMode::Hierarchical => hierarchical(events, resolver),
    }
}

fn consolidated(events: Vec<SessionEvent>, resolver: &RepoResolver) -> Vec<Timeline> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<SessionEvent>> = HashMap::new();

    for event in events {
        let identity = resolver.resolve(&event.directory);
        if !groups.contains_key(&identity) {
            order.push(identity.clone());
        }
        groups.entry(identity).or_default().push(event);
    }

    let mut timelines: Vec<Timeline> = order
        .into_iter()
        .filter_map(|identity| {
            let group = groups.remove(&identity)?;
            Timeline::from_events(identity, String::new(), TimelineKind::Standalone, group)
        })
        .collect();

    timelines.sort_by(|a, b| b.event_count().cmp(&a.event_count()));
    timelines
}

fn hierarchical(mut events: Vec<SessionEvent>, resolver: &RepoResolver) -> Vec<Timeline> {
    // Timestamp order makes "first appearance" deterministic for both
    // directory buckets and main-directory tie-breaks.
    events.sort_by_key(|event| event.timestamp);

    let mut dir_order: Vec<String> = Vec::new();
    let mut dir_events: HashMap<String, Vec<SessionEvent>> = HashMap::new();
    for event in events {
        if !dir_events.contains_key(&event.directory) {
            dir_order.push(event.directory.clone());
        }
        dir_events
            .entry(event.directory.clone())
            .or_default()
            .push(event);
    }

    let mut identity_order: Vec<String> = Vec::new();
    let mut identity_dirs: HashMap<String, Vec<String>> = HashMap::new();
    for directory in dir_order {
        let identity = resolver.resolve(&directory);
        if !identity_dirs.contains_key(&identity) {
            identity_order.push(identity.clone());
        }
        identity_dirs.entry(identity).or_default().push(directory);
    }

    let mut groups: Vec<Vec<Timeline>> = Vec::new();

    for identity in identity_order {
        let Some(directories) = identity_dirs.remove(&identity) else {
            continue;
        };

        if let [directory] = directories.as_slice() {
            let Some(group) = dir_events.remove(directory) else {
                continue;
            };
            if let Some(timeline) = Timeline::from_events(
                identity,
                directory.clone(),
                TimelineKind::Standalone,
                group,
            ) {
                groups.push(vec![timeline]);
            }
            continue;
        }

        // Several directories share this identity: the canonical
        // checkout (or the first seen) becomes the parent row.
        let main_index = directories
            .iter()
            .position(|d| is_canonical_checkout(d))
            .unwrap_or(0);
        let main_directory = directories[main_index].clone();

        let mut group: Vec<Timeline> = Vec::new();
        if let Some(parent_events) = dir_events.remove(&main_directory) {
            if let Some(parent) = Timeline::from_events(
                identity.clone(),
                main_directory.clone(),
                TimelineKind::Parent,
                parent_events,
            ) {
                group.push(parent);
            }
        }

        let mut children: Vec<Timeline> = directories
            .iter()
            .enumerate()
            .filter(|&(index, _)| index != main_index)
            .filter_map(|(_, directory)| {
                let child_events = dir_events.remove(directory)?;
                Timeline::from_events(
                    child_label(directory, &main_directory),
                    directory.clone(),
                    TimelineKind::Child {
                        parent: identity.clone(),
                    },
                    child_events,
                )
            })
            .collect();
        children.sort_by(|a, b| b.event_count().cmp(&a.event_count()));
        group.extend(children);

        if !group.is_empty() {
            groups.push(group);
        }
    }

    // Rank each parent/standalone row by its own event count, keeping
    // its children adjacent.
    groups.sort_by(|a, b| {
        let a_count = a.first().map_or(0, Timeline::event_count);
        let b_count = b.first().map_or(0, Timeline::event_count);
        b_count.cmp(&a_count)
    });
    groups.into_iter().flatten().collect()
}

/// Display label for a child directory: its path suffix relative to the
/// main directory (`/` folded to `-`), or its basename when no
/// distinguishing suffix exists.
fn child_label(directory: &str, main_directory: &str) -> String {
    directory
        .strip_prefix(main_directory)
        .filter(|suffix| suffix.starts_with('/'))
        .map(|suffix| suffix.trim_start_matches('/').replace('/', "-"))
        .filter(|label| !label.is_empty())
        .unwrap_or_else(|| {
            Path::new(directory)
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("unknown")
                .to_string()
        })
}
