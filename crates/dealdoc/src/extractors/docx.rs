//! DOCX (Microsoft Word) extractor.
//!
//! OOXML parsing is delegated to a [`TextBackend`] (by default `docx-lite`).
//! This extractor owns the signature check, the DOCX-specific post-cleaning
//! and the minimum-length rule.

use crate::core::config::ExtractionConfig;
use crate::core::mime::{DocumentFormat, verify_signature};
use crate::plugins::{DocumentExtractor, Plugin, TextBackend};
use crate::types::{ExtractionStrategy, RawExtraction};
use crate::{DealdocError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// DOCX extractor.
pub struct DocxExtractor {
    backend: Arc<dyn TextBackend>,
}

impl DocxExtractor {
    /// Create a DOCX extractor backed by `docx-lite`.
    #[cfg(feature = "office")]
    pub fn new() -> Self {
        Self::with_backend(Arc::new(crate::plugins::DocxLiteBackend))
    }

    /// Create a DOCX extractor with a custom text backend.
    pub fn with_backend(backend: Arc<dyn TextBackend>) -> Self {
        Self { backend }
    }

    /// Name of the backend doing the OOXML parsing.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }
}

#[cfg(feature = "office")]
impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for DocxExtractor {
    fn name(&self) -> &str {
        "docx-extractor"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn initialize(&self) -> Result<()> {
        self.backend.initialize()
    }

    fn shutdown(&self) -> Result<()> {
        self.backend.shutdown()
    }

    fn description(&self) -> &str {
        "Extracts text from DOCX files through a pluggable OOXML backend"
    }
}

#[async_trait]
impl DocumentExtractor for DocxExtractor {
    async fn extract_bytes(&self, content: &[u8], config: &ExtractionConfig) -> Result<RawExtraction> {
        verify_signature(DocumentFormat::Docx, content)?;

        let raw = self.backend.extract_text(content).await.map_err(|e| {
            tracing::warn!(backend = self.backend.name(), error = %e, "DOCX backend failed");
            DealdocError::parsing_with_source(format!("DOCX backend {} failed", self.backend.name()), e)
        })?;

        let text = clean_docx_text(&raw);
        let length = text.chars().count();
        if length < config.docx.min_chars {
            tracing::debug!(length, min_chars = config.docx.min_chars, "DOCX text below minimum");
            return Err(DealdocError::InsufficientText(format!(
                "The DOCX file contains too little text to process ({} characters). It may be empty or contain only images.",
                length
            )));
        }

        Ok(RawExtraction::new(text, ExtractionStrategy::DocxLibrary))
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }
}

/// Post-clean backend output: `\r\n` to `\n`, trim every line and keep at
/// most one blank line between paragraphs.
pub fn clean_docx_text(raw: &str) -> String {
    let normalized = raw.replace("\r\n", "\n");
    let mut result = String::with_capacity(normalized.len());
    let mut previous_blank = true;

    for line in normalized.split('\n') {
        let line = line.trim();
        if line.is_empty() {
            if !previous_blank {
                result.push('\n');
            }
            previous_blank = true;
        } else {
            result.push_str(line);
            result.push('\n');
            previous_blank = false;
        }
    }

    result.trim_end().to_string()
}
