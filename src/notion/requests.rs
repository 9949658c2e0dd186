// src/notion/requests.rs
//! Wire types for `POST /v1/pages`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageCreateRequest {
    pub parent: PageParent,
    pub properties: IndexMap<String, PropertyValue>,
    pub children: Vec<ParagraphBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParent {
    pub database_id: String,
}

impl PageParent {
    pub fn database(database_id: String) -> Self {
        Self { database_id }
    }
}

/// A property value in the shape Notion expects, e.g. `{"rich_text": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyValue {
    Title(Vec<RichText>),
    RichText(Vec<RichText>),
    Url(Option<String>),
}

impl PropertyValue {
    pub fn plain_text(&self) -> String {
        match self {
            Self::Title(parts) | Self::RichText(parts) => join_plain_text(parts),
            Self::Url(url) => url.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RichText {
    Text { text: TextContent },
}

impl RichText {
    pub fn plain(content: &str) -> Self {
        Self::Text {
            text: TextContent {
                content: content.to_string(),
            },
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::Text { text } => &text.content,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    pub content: String,
}

/// `{"object": "block", "type": "paragraph", "paragraph": {"rich_text": [...]}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphBlock {
    pub object: String,
    #[serde(rename = "type")]
    pub block_type: String,
    pub paragraph: Paragraph,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub rich_text: Vec<RichText>,
}

impl ParagraphBlock {
    pub fn new(rich_text: Vec<RichText>) -> Self {
        Self {
            object: "block".to_string(),
            block_type: "paragraph".to_string(),
            paragraph: Paragraph { rich_text },
        }
    }

    pub fn plain_text(&self) -> String {
        join_plain_text(&self.paragraph.rich_text)
    }
}

fn join_plain_text(parts: &[RichText]) -> String {
    parts.iter().map(RichText::content).collect()
}
