// src/model/parser.rs
//! Turns raw completion text into a [`ContentRecord`].
//!
//! Exactly one condition is fatal: the unwrapped text is not a JSON object.
//! Every field the model left out, misspelled by case, or typed oddly is
//! read leniently and otherwise defaulted to the empty string.

use super::record::{ContentRecord, Platform, PlatformContent};
use crate::error::ParseError;
use crate::text::truncate_chars;
use crate::types::RawCompletion;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// An opening fence with its optional language tag. Tags start with a
/// letter, so a fenced bare value such as ```` ```42``` ```` keeps its body.
const OPENING_FENCE: &str = r"\A```(?:[A-Za-z][A-Za-z0-9_-]*)?[ \t]*\r?\n?";

/// A fence that encloses the whole text, capturing everything between the
/// first and the last fence.
static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?s){}(.*)```\z", OPENING_FENCE))
        .expect("fenced block pattern should compile")
});

static OPENED_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(OPENING_FENCE).expect("opening fence pattern should compile"));

const TAG_SEPARATOR: &str = ", ";
const HASHTAG_SEPARATOR: &str = " ";
const PARSE_ERROR_PREVIEW_CHARS: usize = 80;

/// Parses a completion into a fully populated record.
pub fn parse_completion(raw: &RawCompletion) -> Result<ContentRecord, ParseError> {
    let body = strip_code_fences(raw.as_str());
    if body.is_empty() {
        return Err(ParseError::Empty);
    }

    let value = match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(source) => match outermost_object(raw.as_str()) {
            Some(value) => {
                log::debug!("Completion had text around its JSON object; using the object");
                value
            }
            None => {
                return Err(ParseError::InvalidJson {
                    source,
                    preview: truncate_chars(body, PARSE_ERROR_PREVIEW_CHARS).to_string(),
                })
            }
        },
    };

    match value {
        Value::Object(map) => Ok(record_from_object(&map)),
        other => Err(ParseError::NotAnObject {
            found: json_type_name(&other),
        }),
    }
}

/// Removes Markdown code fences (```` ```json ```` / ```` ``` ````) that
/// enclose the whole completion, and surrounding whitespace.
///
/// Fences inside the text, such as an inline code span in a caption, are
/// left alone. Unfenced text passes through trimmed, so fenced and unfenced
/// forms of the same completion parse identically.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    if let Some(inner) = FENCED_BLOCK.captures(trimmed).and_then(|c| c.get(1)) {
        return inner.as_str().trim();
    }

    // A fence that was opened or closed but not both, e.g. a truncated reply.
    let without_open = match OPENED_FENCE.find(trimmed) {
        Some(fence) => &trimmed[fence.end()..],
        None => trimmed,
    };
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

/// The first `{` through the last `}`, if that span is itself valid JSON.
fn outermost_object(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

fn record_from_object(map: &Map<String, Value>) -> ContentRecord {
    let platforms = Platform::ALL
        .into_iter()
        .map(|platform| (platform, platform_from_value(map, platform)))
        .collect();

    ContentRecord {
        title: text_field(map, "Title", TAG_SEPARATOR),
        summary: text_field(map, "Summary", TAG_SEPARATOR),
        platforms,
        reel_script: text_field(map, "ReelScript", "\n"),
    }
}

fn platform_from_value(map: &Map<String, Value>, platform: Platform) -> PlatformContent {
    match lookup(map, platform.name()) {
        Some(Value::Object(fields)) => {
            // Models swap Caption and Description between platforms freely.
            let caption = lookup(fields, platform.caption_key())
                .or_else(|| lookup(fields, "Caption"))
                .or_else(|| lookup(fields, "Description"))
                .map(|v| coerce_to_text(v, TAG_SEPARATOR))
                .unwrap_or_default();

            PlatformContent {
                caption,
                tags: text_field(fields, "Tags", TAG_SEPARATOR),
                hashtags: text_field(fields, "Hashtags", HASHTAG_SEPARATOR),
            }
        }
        Some(Value::String(caption)) => PlatformContent {
            caption: caption.clone(),
            ..PlatformContent::default()
        },
        Some(other) => {
            log::debug!(
                "Completion field '{}' is {}, expected an object; defaulting",
                platform,
                json_type_name(other)
            );
            PlatformContent::default()
        }
        None => {
            log::debug!("Completion has no '{}' section; defaulting to empty", platform);
            PlatformContent::default()
        }
    }
}

fn text_field(map: &Map<String, Value>, key: &str, separator: &str) -> String {
    match lookup(map, key) {
        Some(value) => coerce_to_text(value, separator),
        None => {
            log::debug!("Completion has no '{}' field; defaulting to empty", key);
            String::new()
        }
    }
}

/// Exact key first, then a match ignoring case, spaces, and punctuation
/// (`reel_script`, `Reel Script`, and `reelScript` all find `ReelScript`).
fn lookup<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).or_else(|| {
        let wanted = normalize_key(key);
        map.iter()
            .find(|(candidate, _)| normalize_key(candidate) == wanted)
            .map(|(_, value)| value)
    })
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn coerce_to_text(value: &Value, separator: &str) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| coerce_to_text(item, separator))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(separator),
        Value::Null | Value::Object(_) => String::new(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
