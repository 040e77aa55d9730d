//! First cascade strategy: the PDF's logical text layer.

use super::cascade::PdfStrategy;
use crate::Result;
use crate::core::config::PdfConfig;
use crate::plugins::PdfTextBackend;
use crate::types::{ExtractionStrategy, RawExtraction};
use async_trait::async_trait;
use std::sync::Arc;

/// Reads the text layer through a [`PdfTextBackend`].
pub struct StructuredStrategy {
    backend: Arc<dyn PdfTextBackend>,
}

impl StructuredStrategy {
    pub fn new(backend: Arc<dyn PdfTextBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }
}

impl Default for StructuredStrategy {
    fn default() -> Self {
        Self::new(Arc::new(crate::plugins::PdfExtractBackend))
    }
}

#[async_trait]
impl PdfStrategy for StructuredStrategy {
    fn strategy(&self) -> ExtractionStrategy {
        ExtractionStrategy::PdfStructured
    }

    fn min_chars(&self, config: &PdfConfig) -> usize {
        config.structured_min_chars
    }

    async fn extract(&self, content: &[u8], _config: &PdfConfig) -> Result<RawExtraction> {
        let text = self.backend.extract_text(content).await?;
        Ok(RawExtraction::new(text, ExtractionStrategy::PdfStructured))
    }
}
