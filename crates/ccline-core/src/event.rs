//! Log record model and line parsing.
//!
//! Each line of a session log is a self-describing JSON record. Lines are
//! parsed independently: a malformed line is discarded without affecting
//! its neighbors, and unknown fields are tolerated for forward
//! compatibility.

use chrono::{DateTime, Local};
use serde::Deserialize;

/// Maximum length of the stored content preview, in bytes.
const PREVIEW_LENGTH: usize = 100;

/// One validated, message-bearing line of a session log.
#[derive(Debug, Clone)]
pub struct SessionEvent {
    /// When the message was emitted, in local time.
    pub timestamp: DateTime<Local>,
    /// Opaque session grouping identifier; empty if absent.
    pub session_id: String,
    /// Working directory at emission time; `"unknown"` if absent.
    pub directory: String,
    /// Message role, the record's `type` tag, or `"unknown"`.
    pub message_type: String,
    /// First bytes of the message content, newlines flattened.
    pub content_preview: String,
    /// Record UUID; empty if absent.
    pub uuid: String,
    /// Input tokens reported on assistant messages.
    pub input_tokens: u32,
    /// Output tokens reported on assistant messages.
    pub output_tokens: u32,
}

/// A metadata record, such as a conversation summary.
///
/// Metadata records carry no activity timestamp and are never fed into
/// aggregation; they are surfaced separately so callers can decide what
/// to do with them.
#[derive(Debug, Clone)]
pub struct MetadataRecord {
    /// The record's `type` tag.
    pub record_type: String,
    /// Summary text, when the record carries one.
    pub summary: Option<String>,
}

/// A successfully parsed log line.
#[derive(Debug, Clone)]
pub enum LogRecord {
    /// A message-bearing record that counts as activity.
    Message(SessionEvent),
    /// A metadata record (e.g. a summary) that does not.
    Metadata(MetadataRecord),
}

/// Minimal wire shape for typed deserialization. Extra fields are ignored.
#[derive(Debug, Deserialize)]
struct RawRecord {
    timestamp: Option<String>,
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
    cwd: Option<String>,
    #[serde(rename = "type")]
    record_type: Option<String>,
    uuid: Option<String>,
    summary: Option<String>,
    message: Option<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    role: Option<String>,
    content: Option<RawContent>,
    usage: Option<RawUsage>,
}

/// Message content is either a plain string or an array of typed blocks.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawContent {
    Text(String),
    Blocks(Vec<RawBlock>),
    Other(serde_json::Value),
}

#[derive(Debug, Deserialize)]
struct RawBlock {
    #[serde(rename = "type")]
    block_type: Option<String>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawUsage {
    input_tokens: Option<u32>,
    output_tokens: Option<u32>,
}

/// Parse one log line.
///
/// Returns `None` when the line fails structural validation: not JSON,
/// or a message record with a missing or unparseable timestamp.
#[must_use]
pub fn parse_line(line: &str) -> Option<LogRecord> {
    let raw: RawRecord = serde_json::from_str(line).ok()?;

    if raw.record_type.as_deref() == Some("summary") {
        return Some(LogRecord::Metadata(MetadataRecord {
            record_type: "summary".to_string(),
            summary: raw.summary,
        }));
    }

    let timestamp = raw
        .timestamp
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())?
        .with_timezone(&Local);

    let (message_type, content_preview, input_tokens, output_tokens) = match raw.message {
        Some(message) => {
            let role = message
                .role
                .or(raw.record_type)
                .unwrap_or_else(|| "unknown".to_string());
            let preview = preview(&content_text(message.content.as_ref()));
            let (input, output) = if role == "assistant" {
                message
                    .usage
                    .map_or((0, 0), |u| {
                        (u.input_tokens.unwrap_or(0), u.output_tokens.unwrap_or(0))
                    })
            } else {
                (0, 0)
            };
            (role, preview, input, output)
        }
        None => (
            raw.record_type.unwrap_or_else(|| "unknown".to_string()),
            String::new(),
            0,
            0,
        ),
    };

    Some(LogRecord::Message(SessionEvent {
        timestamp,
        session_id: raw.session_id.unwrap_or_default(),
        directory: raw.cwd.unwrap_or_else(|| "unknown".to_string()),
        message_type,
        content_preview,
        uuid: raw.uuid.unwrap_or_default(),
        input_tokens,
        output_tokens,
    }))
}

/// Flatten message content to plain text.
///
/// String content is taken as-is; block content contributes the text of
/// its `text` blocks, joined with spaces.
fn content_text(content: Option<&RawContent>) -> String {
    match content {
        Some(RawContent::Text(text)) => text.clone(),
        Some(RawContent::Blocks(blocks)) => blocks
            .iter()
            .filter(|b| b.block_type.as_deref() == Some("text"))
            .filter_map(|b| b.text.as_deref())
            .collect::<Vec<_>>()
            .join(" "),
        Some(RawContent::Other(value)) => value.to_string(),
        None => String::new(),
    }
}

/// Truncate to `PREVIEW_LENGTH` bytes on a char boundary, flattening
/// newlines so the preview stays on one display row.
fn preview(content: &str) -> String {
    let flattened = content.replace('\n', " ");
    if flattened.len() <= PREVIEW_LENGTH {
        return flattened;
    }

    let mut end = PREVIEW_LENGTH;
    while end > 0 && !flattened.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &flattened[..end])
}
