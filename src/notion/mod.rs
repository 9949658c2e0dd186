// src/notion/mod.rs
//! Persistence into a Notion database: the ability to file a record as a page.

pub mod client;
pub mod mapping;
pub mod parser;
pub mod requests;

use crate::error::PersistenceError;
use crate::model::ContentRecord;
use crate::types::{ContainerId, PageId, ValidatedUrl, WorkspaceToken};
use serde::Serialize;

pub use client::NotionHttpClient;
pub use mapping::{map_record, PropertyKind, PropertyMapping, PropertySchema, ValueSource};
pub use requests::{PageCreateRequest, PropertyValue};

/// Acknowledgement for a created page. The pipeline keeps nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedPage {
    pub id: PageId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// The ability to create pages in a workspace.
///
/// Business logic depends on this trait, never on HTTP details.
#[async_trait::async_trait]
pub trait WorkspaceRepository: Send + Sync {
    async fn create_page(
        &self,
        request: &PageCreateRequest,
        token: &WorkspaceToken,
    ) -> Result<CreatedPage, PersistenceError>;
}

/// Where and how a record is filed.
#[derive(Debug, Clone, Copy)]
pub struct PersistTarget<'a> {
    pub container: &'a ContainerId,
    pub token: &'a WorkspaceToken,
    pub schema: &'a PropertySchema,
}

/// Maps `record` and writes it with a single create call.
pub async fn persist(
    record: &ContentRecord,
    source_url: Option<&ValidatedUrl>,
    target: PersistTarget<'_>,
    repository: &dyn WorkspaceRepository,
) -> Result<CreatedPage, PersistenceError> {
    let request = map_record(record, target.schema, target.container, source_url);
    repository
        .create_page(&request, target.token)
        .await
        .inspect_err(|e| {
            if e.is_schema_mismatch() {
                log::warn!(
                    "Database properties do not match the schema table; check names and types or pass --schema"
                );
            }
        })
}
