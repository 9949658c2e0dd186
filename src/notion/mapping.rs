// src/notion/mapping.rs
//! Maps a validated [`ContentRecord`] onto a Notion page-creation request.
//!
//! Which database property receives which record field is a table
//! ([`PropertySchema`]), not code. The built-in table matches the canonical
//! content database layout; a JSON file can replace it.

use super::requests::{PageCreateRequest, PageParent, ParagraphBlock, PropertyValue, RichText};
use crate::constants::{NOTION_RICH_TEXT_LIMIT, RECORD_PREVIEW_CHAR_CAP, UNTITLED_PAGE};
use crate::model::{ContentRecord, Platform, PlatformField, RecordField};
use crate::text::{chunk_utf16, truncate_chars};
use crate::types::{ContainerId, PropertyName, ValidatedUrl};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// The Notion property types a record field can be written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Title,
    RichText,
    Url,
}

/// Where a property's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ValueSource {
    Record(RecordField),
    /// The content reference, when it was a URL.
    SourceUrl,
}

impl FromStr for ValueSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SourceUrl" => Ok(Self::SourceUrl),
            other => other.parse().map(Self::Record),
        }
    }
}

impl TryFrom<String> for ValueSource {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ValueSource> for String {
    fn from(source: ValueSource) -> Self {
        source.to_string()
    }
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record(field) => write!(f, "{}", field),
            Self::SourceUrl => f.write_str("SourceUrl"),
        }
    }
}

/// One row of the schema table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMapping {
    pub property: PropertyName,
    pub kind: PropertyKind,
    pub source: ValueSource,
}

impl PropertyMapping {
    pub fn new(property: &str, kind: PropertyKind, source: ValueSource) -> Self {
        Self {
            property: PropertyName::new(property),
            kind,
            source,
        }
    }
}

/// The property table used for every page, in request order.
///
/// Deserialization enforces the table rules: at least one row, unique
/// property names, at most one title property, and `SourceUrl` only into a
/// url property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SchemaTable")]
pub struct PropertySchema {
    properties: Vec<PropertyMapping>,
}

#[derive(Deserialize)]
struct SchemaTable {
    properties: Vec<PropertyMapping>,
}

impl TryFrom<SchemaTable> for PropertySchema {
    type Error = String;

    fn try_from(table: SchemaTable) -> Result<Self, Self::Error> {
        Self::new(table.properties)
    }
}

impl PropertySchema {
    pub fn new(properties: Vec<PropertyMapping>) -> Result<Self, String> {
        if properties.is_empty() {
            return Err("schema maps no properties".to_string());
        }

        let mut seen = HashSet::new();
        for mapping in &properties {
            if !seen.insert(mapping.property.as_str()) {
                return Err(format!("property '{}' is mapped twice", mapping.property));
            }
            if mapping.source == ValueSource::SourceUrl && mapping.kind != PropertyKind::Url {
                return Err(format!(
                    "property '{}' takes SourceUrl but is not a url property",
                    mapping.property
                ));
            }
        }

        let titles = properties
            .iter()
            .filter(|m| m.kind == PropertyKind::Title)
            .count();
        if titles > 1 {
            return Err(format!("{} title properties; Notion allows one", titles));
        }

        Ok(Self { properties })
    }

    pub fn properties(&self) -> &[PropertyMapping] {
        &self.properties
    }

    /// The mapping for a property name, if the table has one.
    pub fn get(&self, property: &str) -> Option<&PropertyMapping> {
        self.properties
            .iter()
            .find(|m| m.property.as_str() == property)
    }
}

impl Default for PropertySchema {
    fn default() -> Self {
        use PropertyKind::{RichText, Title, Url};

        let caption = |platform| {
            ValueSource::Record(RecordField::Platform(platform, PlatformField::Caption))
        };
        let mut properties = vec![
            PropertyMapping::new("Name", Title, ValueSource::Record(RecordField::Title)),
            PropertyMapping::new("URL", Url, ValueSource::SourceUrl),
            PropertyMapping::new("Title", RichText, ValueSource::Record(RecordField::Title)),
            PropertyMapping::new(
                "Summary",
                RichText,
                ValueSource::Record(RecordField::Summary),
            ),
        ];
        properties.extend(
            Platform::ALL
                .into_iter()
                .map(|platform| PropertyMapping::new(platform.name(), RichText, caption(platform))),
        );
        properties.push(PropertyMapping::new(
            "ReelScript",
            RichText,
            ValueSource::Record(RecordField::ReelScript),
        ));

        Self { properties }
    }
}

/// Builds the page-creation request for `record`.
///
/// Property text is carried in full, split across rich-text objects when it
/// exceeds Notion's per-object limit. The body holds one paragraph with a
/// pretty-printed preview of the whole record, cut at
/// [`RECORD_PREVIEW_CHAR_CAP`] characters.
pub fn map_record(
    record: &ContentRecord,
    schema: &PropertySchema,
    container: &ContainerId,
    source_url: Option<&ValidatedUrl>,
) -> PageCreateRequest {
    let mut properties = IndexMap::with_capacity(schema.properties().len());

    for mapping in schema.properties() {
        let value = match mapping.source {
            ValueSource::Record(field) => record.field(field),
            ValueSource::SourceUrl => match source_url {
                Some(url) => url.as_str(),
                None => continue,
            },
        };
        properties.insert(
            mapping.property.as_str().to_string(),
            property_value(mapping.kind, value),
        );
    }

    PageCreateRequest {
        parent: PageParent::database(container.to_dashed()),
        properties,
        children: vec![ParagraphBlock::new(rich_text(&record_preview(record)))],
    }
}

fn property_value(kind: PropertyKind, value: &str) -> PropertyValue {
    match kind {
        PropertyKind::Title if value.is_empty() => PropertyValue::Title(rich_text(UNTITLED_PAGE)),
        PropertyKind::Title => PropertyValue::Title(rich_text(value)),
        PropertyKind::RichText => PropertyValue::RichText(rich_text(value)),
        PropertyKind::Url if value.is_empty() => PropertyValue::Url(None),
        PropertyKind::Url => PropertyValue::Url(Some(value.to_string())),
    }
}

fn rich_text(value: &str) -> Vec<RichText> {
    chunk_utf16(value, NOTION_RICH_TEXT_LIMIT)
        .into_iter()
        .map(RichText::plain)
        .collect()
}

/// The record as pretty JSON, bounded to the preview cap.
pub fn record_preview(record: &ContentRecord) -> String {
    let json = match serde_json::to_string_pretty(record) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("Could not render record preview: {}", e);
            return String::new();
        }
    };
    truncate_chars(&json, RECORD_PREVIEW_CHAR_CAP).to_string()
}

/// Reads a property's text back out of a request, joining split rich text.
///
/// Returns `None` when the request does not carry the property.
pub fn property_text(request: &PageCreateRequest, property: &str) -> Option<String> {
    request.properties.get(property).map(PropertyValue::plain_text)
}
