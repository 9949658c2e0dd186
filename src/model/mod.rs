// src/model/mod.rs
//! The content record model and the completion parser that produces it.

pub mod parser;
pub mod record;

pub use parser::{parse_completion, strip_code_fences};
pub use record::{ContentRecord, Platform, PlatformContent, PlatformField, RecordField};
