//! Storage seam for extracted text.
//!
//! The document record store belongs to the host application. This crate
//! only needs to hand over the cleaned text of a successful extraction, so the
//! whole contract is a single async method. [`MemoryDocumentStore`] keeps the
//! text in memory for tests and local runs.

use crate::{DealdocError, Result};
use async_trait::async_trait;
use dashmap::DashMap;

/// Persists extracted text against a document record.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Replace the stored text of `document_id`.
    ///
    /// # Errors
    ///
    /// `DealdocError::Storage` when the record cannot be updated.
    async fn update_document_text(&self, document_id: &str, text: &str) -> Result<()>;
}

/// In-memory [`DocumentStore`].
///
/// # Example
///
/// ```rust
/// use dealdoc::store::{DocumentStore, MemoryDocumentStore};
///
/// # async fn example() -> dealdoc::Result<()> {
/// let store = MemoryDocumentStore::new();
/// store.update_document_text("doc-1", "Extracted text").await?;
/// assert_eq!(store.get("doc-1").as_deref(), Some("Extracted text"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: DashMap<String, String>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, document_id: &str) -> Option<String> {
        self.documents.get(document_id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn update_document_text(&self, document_id: &str, text: &str) -> Result<()> {
        if document_id.trim().is_empty() {
            return Err(DealdocError::storage("Document id must not be empty"));
        }

        self.documents.insert(document_id.to_string(), text.to_string());
        tracing::debug!(document_id, length = text.chars().count(), "Stored extracted text");
        Ok(())
    }
}
