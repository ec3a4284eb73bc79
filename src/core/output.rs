//! What the CLI prints: the JSON run envelope and bounded text previews.

use serde_json::Value as JsonValue;
use std::time::{SystemTime, UNIX_EPOCH};
use ulid::Ulid;

pub const ENVELOPE_VERSION: &str = "1.0.0";

/// Wrap a command payload with run metadata. Object payloads are merged at
/// the top level; anything else lands under `"data"`.
pub fn envelope(cmd: &str, payload: JsonValue) -> JsonValue {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let mut doc = serde_json::json!({
        "envelope_version": ENVELOPE_VERSION,
        "tool": concat!("routescout/", env!("CARGO_PKG_VERSION")),
        "run_id": Ulid::new().to_string(),
        "ts": ts,
        "cmd": cmd,
        "status": "ok",
    });
    if let Some(obj) = doc.as_object_mut() {
        match payload {
            JsonValue::Object(fields) => obj.extend(fields),
            JsonValue::Null => {}
            other => {
                obj.insert("data".to_string(), other);
            }
        }
    }
    doc
}

pub fn print_envelope(cmd: &str, payload: JsonValue) {
    println!("{}", envelope(cmd, payload));
}

/// First `max_chars` characters of `body`, with `...` appended when cut.
/// An empty body has no preview.
pub fn preview(body: &str, max_chars: usize) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        Some(format!("{}...", head))
    } else {
        Some(head)
    }
}

/// Collapse whitespace and bound length for one-line terminal display.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    preview(&collapsed, max_chars).unwrap_or_default()
}
