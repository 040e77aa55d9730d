//! PDF document extractor.

use crate::Result;
use crate::core::config::ExtractionConfig;
use crate::core::mime::{DocumentFormat, verify_signature};
use crate::pdf::PdfCascade;
use crate::plugins::{DocumentExtractor, PdfTextBackend, Plugin};
use crate::types::RawExtraction;
use async_trait::async_trait;
use std::sync::Arc;

/// PDF extractor driving the three-strategy [`PdfCascade`].
pub struct PdfExtractor {
    cascade: PdfCascade,
}

impl PdfExtractor {
    pub fn new() -> Self {
        Self::with_cascade(PdfCascade::new())
    }

    /// Swap the text-layer backend used by the first strategy.
    pub fn with_backend(backend: Arc<dyn PdfTextBackend>) -> Self {
        Self::with_cascade(PdfCascade::with_structured_backend(backend))
    }

    pub fn with_cascade(cascade: PdfCascade) -> Self {
        Self { cascade }
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for PdfExtractor {
    fn name(&self) -> &str {
        "pdf-extractor"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn description(&self) -> &str {
        "Extracts text from PDF files with a structured, content-stream and raw-scan fallback cascade"
    }
}

#[async_trait]
impl DocumentExtractor for PdfExtractor {
    async fn extract_bytes(&self, content: &[u8], config: &ExtractionConfig) -> Result<RawExtraction> {
        verify_signature(DocumentFormat::Pdf, content)?;
        self.cascade.run(content, &config.pdf).await
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DealdocError;
    use crate::pdf::test_support::build_pdf;
    use crate::types::ExtractionStrategy;

    struct BrokenBackend;

    impl Plugin for BrokenBackend {
        fn name(&self) -> &str {
            "broken"
        }

        fn version(&self) -> String {
            "0.0.0".to_string()
        }
    }

    #[async_trait]
    impl PdfTextBackend for BrokenBackend {
        async fn extract_text(&self, _content: &[u8]) -> Result<String> {
            Err(DealdocError::parsing("no text layer"))
        }
    }

    #[tokio::test]
    async fn test_rejects_wrong_signature() {
        let extractor = PdfExtractor::with_backend(Arc::new(BrokenBackend));
        let err = extractor
            .extract_bytes(b"PK\x03\x04 not a pdf", &ExtractionConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, DealdocError::SignatureMismatch(_)));
    }

    #[tokio::test]
    async fn test_falls_back_to_content_streams() {
        let pdf = build_pdf(&[&["Series A preferred stock purchase agreement"]]);
        let extractor = PdfExtractor::with_backend(Arc::new(BrokenBackend));

        let raw = extractor.extract_bytes(&pdf, &ExtractionConfig::default()).await.unwrap();

        assert_eq!(raw.strategy, ExtractionStrategy::PdfContentStream);
        assert!(raw.text.starts_with("--- Page 1 ---"));
        assert!(raw.text.contains("Series A preferred stock purchase agreement"));
    }

    #[test]
    fn test_plugin_metadata() {
        let extractor = PdfExtractor::default();
        assert_eq!(extractor.name(), "pdf-extractor");
        assert_eq!(extractor.format(), DocumentFormat::Pdf);
    }
}
