use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// A Notion object id, typed by what it identifies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Id<T> {
    value: String,
    _phantom: PhantomData<T>,
}

/// Marks page ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DatabaseMarker;

/// A created page.
pub type PageId = Id<PageMarker>;
/// The database a generated record is filed into.
pub type ContainerId = Id<DatabaseMarker>;

impl<T> Id<T> {
    /// Parse a caller-supplied ID.
    ///
    /// Inputs that look like Notion IDs (32 hex digits, dashed or not, or a
    /// Notion URL ending in one) are normalized. Anything else is kept
    /// verbatim: the workspace service is the authority on whether it exists.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ValidationError::EmptyField("workspaceContainerId"));
        }

        let value = normalize_notion_id(input).unwrap_or_else(|| input.to_string());
        Ok(Self {
            value,
            _phantom: PhantomData,
        })
    }

    /// Wraps a value already known to be in normalized form.
    pub(crate) fn from_normalized(value: String) -> Self {
        Self {
            value,
            _phantom: PhantomData,
        }
    }

    /// The normalized form: 32 lowercase hex digits for Notion ids.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// The 8-4-4-4-12 form the API expects in request bodies.
    pub fn to_dashed(&self) -> String {
        if is_notion_hex(&self.value) {
            format!(
                "{}-{}-{}-{}-{}",
                &self.value[0..8],
                &self.value[8..12],
                &self.value[12..16],
                &self.value[16..20],
                &self.value[20..32]
            )
        } else {
            self.value.clone()
        }
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_normalized(value))
    }
}

fn is_notion_hex(value: &str) -> bool {
    value.len() == 32 && value.chars().all(|c| c.is_ascii_hexdigit())
}

/// Reduce the Notion ID formats (plain, dashed, URL) to 32 lowercase hex digits.
fn normalize_notion_id(input: &str) -> Option<String> {
    let candidate = if input.starts_with("http://") || input.starts_with("https://") {
        extract_id_from_url(input)?
    } else {
        input
    };

    let normalized = candidate.replace('-', "");
    is_notion_hex(&normalized).then(|| normalized.to_lowercase())
}

/// Finds the trailing id segment of a Notion page or database URL.
fn extract_id_from_url(url: &str) -> Option<&str> {
    // Database links carry a `?v=` view suffix
    let url = url.split(['?', '#']).next()?.trim_end_matches('/');

    // Format: https://www.notion.so/[workspace]/[title]-[id]
    if let Some(pos) = url.rfind('-') {
        let potential_id = &url[pos + 1..];
        if potential_id.len() == 32 {
            return Some(potential_id);
        }
    }

    // Format: https://www.notion.so/[id]
    if let Some(pos) = url.rfind('/') {
        let potential_id = &url[pos + 1..];
        if potential_id.len() == 32 || (potential_id.len() == 36 && potential_id.contains('-')) {
            return Some(potential_id);
        }
    }

    None
}
