// src/model/record.rs
//! The validated content set produced for one source document.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::str::FromStr;

/// The social platforms a content set is written for, in prompt order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Platform {
    Facebook,
    LinkedIn,
    Threads,
    YouTube,
    Instagram,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Facebook,
        Platform::LinkedIn,
        Platform::Threads,
        Platform::YouTube,
        Platform::Instagram,
    ];

    /// The key used for this platform in completion JSON.
    pub fn name(self) -> &'static str {
        match self {
            Platform::Facebook => "Facebook",
            Platform::LinkedIn => "LinkedIn",
            Platform::Threads => "Threads",
            Platform::YouTube => "YouTube",
            Platform::Instagram => "Instagram",
        }
    }

    /// The key holding the main post text. YouTube posts carry a description
    /// rather than a caption.
    pub fn caption_key(self) -> &'static str {
        match self {
            Platform::YouTube => "Description",
            _ => "Caption",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown platform '{}'", s))
    }
}

/// Post text for one platform. Every field defaults to the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformContent {
    /// Caption, or description for YouTube.
    pub caption: String,
    pub tags: String,
    pub hashtags: String,
}

impl PlatformContent {
    pub fn field(&self, field: PlatformField) -> &str {
        match field {
            PlatformField::Caption => &self.caption,
            PlatformField::Tags => &self.tags,
            PlatformField::Hashtags => &self.hashtags,
        }
    }
}

static EMPTY_PLATFORM: PlatformContent = PlatformContent {
    caption: String::new(),
    tags: String::new(),
    hashtags: String::new(),
};

/// One of the three per-platform values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformField {
    Caption,
    Tags,
    Hashtags,
}

/// The validated result of parsing a completion.
///
/// Always holds an entry for every [`Platform`]; missing values are empty
/// strings, never absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRecord {
    pub title: String,
    pub summary: String,
    pub platforms: IndexMap<Platform, PlatformContent>,
    pub reel_script: String,
}

impl Default for ContentRecord {
    fn default() -> Self {
        Self {
            title: String::new(),
            summary: String::new(),
            platforms: Platform::ALL
                .into_iter()
                .map(|p| (p, PlatformContent::default()))
                .collect(),
            reel_script: String::new(),
        }
    }
}

impl ContentRecord {
    pub fn platform(&self, platform: Platform) -> &PlatformContent {
        self.platforms.get(&platform).unwrap_or(&EMPTY_PLATFORM)
    }

    /// Reads a single field by its configurable name.
    pub fn field(&self, field: RecordField) -> &str {
        match field {
            RecordField::Title => &self.title,
            RecordField::Summary => &self.summary,
            RecordField::ReelScript => &self.reel_script,
            RecordField::Platform(platform, part) => self.platform(platform).field(part),
        }
    }

    /// Whether the model produced nothing at all.
    pub fn is_blank(&self) -> bool {
        self.title.is_empty()
            && self.summary.is_empty()
            && self.reel_script.is_empty()
            && self.platforms.values().all(|p| *p == PlatformContent::default())
    }
}

/// Addresses one string in a [`ContentRecord`], as written in property
/// schema tables: `Title`, `Summary`, `ReelScript`, or `<Platform>.<Field>`
/// such as `YouTube.Description` or `Instagram.Hashtags`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    Title,
    Summary,
    ReelScript,
    Platform(Platform, PlatformField),
}

impl FromStr for RecordField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Title" => return Ok(Self::Title),
            "Summary" => return Ok(Self::Summary),
            "ReelScript" => return Ok(Self::ReelScript),
            _ => {}
        }

        let (platform, part) = s
            .split_once('.')
            .ok_or_else(|| format!("unknown record field '{}'", s))?;
        let platform: Platform = platform.parse()?;
        let part = match part {
            "Caption" | "Description" => PlatformField::Caption,
            "Tags" => PlatformField::Tags,
            "Hashtags" => PlatformField::Hashtags,
            other => return Err(format!("unknown platform field '{}' in '{}'", other, s)),
        };
        Ok(Self::Platform(platform, part))
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Title => f.write_str("Title"),
            Self::Summary => f.write_str("Summary"),
            Self::ReelScript => f.write_str("ReelScript"),
            Self::Platform(platform, part) => {
                let part = match part {
                    PlatformField::Caption => platform.caption_key(),
                    PlatformField::Tags => "Tags",
                    PlatformField::Hashtags => "Hashtags",
                };
                write!(f, "{}.{}", platform, part)
            }
        }
    }
}

/// Serializes in the same shape the prompt asks the model for.
impl Serialize for ContentRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Platform::ALL.len() + 3))?;
        map.serialize_entry("Title", &self.title)?;
        map.serialize_entry("Summary", &self.summary)?;
        for platform in Platform::ALL {
            map.serialize_entry(
                platform.name(),
                &PlatformEntry(platform, self.platform(platform)),
            )?;
        }
        map.serialize_entry("ReelScript", &self.reel_script)?;
        map.end()
    }
}

struct PlatformEntry<'a>(Platform, &'a PlatformContent);

impl Serialize for PlatformEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let PlatformEntry(platform, content) = self;
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry(platform.caption_key(), &content.caption)?;
        map.serialize_entry("Tags", &content.tags)?;
        map.serialize_entry("Hashtags", &content.hashtags)?;
        map.end()
    }
}
