//! Library backends for the formats whose parsing is delegated.
//!
//! The DOCX extractor and the first PDF strategy do not parse their formats
//! themselves. They call a backend, and the default backends wrap `docx-lite`
//! and `pdf-extract`. Both libraries are synchronous and CPU-bound, so the
//! calls run on tokio's blocking pool through
//! [`run_blocking_guarded`](crate::utils::run_blocking_guarded), which also
//! contains their panics.

use crate::Result;
use crate::plugins::Plugin;
use async_trait::async_trait;

/// Converts an OOXML word-processing document (DOCX) to plain text.
#[async_trait]
pub trait TextBackend: Plugin {
    /// Return the document's text, paragraphs separated by newlines.
    ///
    /// # Errors
    ///
    /// `DealdocError::Parsing` if the archive or its XML cannot be read.
    async fn extract_text(&self, content: &[u8]) -> Result<String>;
}

/// Reads the text layer of a PDF.
#[async_trait]
pub trait PdfTextBackend: Plugin {
    /// Return the text of every page in reading order.
    ///
    /// # Errors
    ///
    /// `DealdocError::Parsing` on malformed PDFs or unsupported features.
    async fn extract_text(&self, content: &[u8]) -> Result<String>;
}

/// Default [`TextBackend`] built on `docx-lite`.
#[cfg(feature = "office")]
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxLiteBackend;

#[cfg(feature = "office")]
impl Plugin for DocxLiteBackend {
    fn name(&self) -> &str {
        "docx-lite"
    }

    fn version(&self) -> String {
        "0.2".to_string()
    }

    fn description(&self) -> &str {
        "Streaming DOCX text extraction"
    }
}

#[cfg(feature = "office")]
#[async_trait]
impl TextBackend for DocxLiteBackend {
    async fn extract_text(&self, content: &[u8]) -> Result<String> {
        crate::utils::run_blocking_guarded("docx-lite", content, |bytes| {
            docx_lite::extract_text_from_bytes(bytes)
                .map_err(|e| crate::DealdocError::parsing(format!("DOCX text extraction failed: {}", e)))
        })
        .await
    }
}

/// Default [`PdfTextBackend`] built on `pdf-extract`.
#[cfg(feature = "pdf")]
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractBackend;

#[cfg(feature = "pdf")]
impl Plugin for PdfExtractBackend {
    fn name(&self) -> &str {
        "pdf-extract"
    }

    fn version(&self) -> String {
        "0.9".to_string()
    }

    fn description(&self) -> &str {
        "Text-layer extraction with font encoding support"
    }
}

#[cfg(feature = "pdf")]
#[async_trait]
impl PdfTextBackend for PdfExtractBackend {
    async fn extract_text(&self, content: &[u8]) -> Result<String> {
        crate::utils::run_blocking_guarded("pdf-extract", content, |bytes| {
            pdf_extract::extract_text_from_mem(bytes)
                .map_err(|e| crate::DealdocError::parsing(format!("PDF text layer extraction failed: {}", e)))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "office")]
    #[tokio::test]
    async fn test_docx_lite_rejects_non_zip() {
        let backend = DocxLiteBackend;
        let result = backend.extract_text(b"PK\x03\x04 definitely not a docx").await;
        assert!(matches!(result, Err(crate::DealdocError::Parsing { .. })));
    }

    #[cfg(feature = "pdf")]
    #[tokio::test]
    async fn test_pdf_extract_rejects_garbage() {
        let backend = PdfExtractBackend;
        let result = backend.extract_text(b"%PDF-1.4 truncated").await;
        assert!(matches!(result, Err(crate::DealdocError::Parsing { .. })));
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn test_backend_names() {
        assert_eq!(PdfExtractBackend.name(), "pdf-extract");
        assert!(!PdfExtractBackend.description().is_empty());
    }
}
