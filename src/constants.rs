// src/constants.rs
//! Domain constants that define the operational boundaries of the system.
//!
//! Each constant is named for the domain concept it constrains, not its
//! technical role.

// ---------------------------------------------------------------------------
// Generation service
// ---------------------------------------------------------------------------

/// Model used when a request does not name one.
pub const DEFAULT_MODEL_ID: &str = "gemini-2.0-flash";

/// Base URL of the generation service's model collection.
pub const GENERATION_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Upper bound on the generated title, in words.
pub const TITLE_MAX_WORDS: usize = 12;

/// Length of the short-form video script, in seconds.
pub const REEL_SCRIPT_SECONDS: u32 = 60;

/// MIME type assumed for audio when the caller does not supply one.
pub const DEFAULT_AUDIO_MIME_TYPE: &str = "audio/wav";

// ---------------------------------------------------------------------------
// Notion API boundaries
// ---------------------------------------------------------------------------

pub const NOTION_API_BASE_URL: &str = "https://api.notion.com/v1";

pub const NOTION_VERSION: &str = "2022-06-28";

/// UTF-16 code units Notion accepts in a single rich-text object.
///
/// Notion measures length as a JavaScript string does, so an emoji outside
/// the Basic Multilingual Plane counts twice. Longer property values are split across several objects rather than
/// truncated.
pub const NOTION_RICH_TEXT_LIMIT: usize = 2000;

/// Characters of the serialized record shown in the page's preview block.
pub const RECORD_PREVIEW_CHAR_CAP: usize = 2000;

/// Title given to the page when the model produced none.
pub const UNTITLED_PAGE: &str = "Untitled";

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// Per-request timeout for every outbound call, in seconds.
///
/// Generation of a full content set routinely takes tens of seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 120;

pub const SOURCE_USER_AGENT: &str = concat!("content2notion/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// HTTP surface
// ---------------------------------------------------------------------------

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";

/// Largest request body the HTTP surface accepts (audio uploads included).
pub const MAX_REQUEST_BODY_BYTES: usize = 25 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Maximum characters shown when previewing error response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 200;
