//! Plain text extractor.

use crate::Result;
use crate::core::config::ExtractionConfig;
use crate::core::mime::DocumentFormat;
use crate::plugins::{DocumentExtractor, Plugin};
use crate::types::{ExtractionStrategy, RawExtraction};
use async_trait::async_trait;

const UTF8_BOM: char = '\u{FEFF}';

/// Plain text extractor.
///
/// Decodes UTF-8 leniently: invalid sequences become U+FFFD instead of failing
/// the upload.
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    /// Create a new plain text extractor.
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlainTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for PlainTextExtractor {
    fn name(&self) -> &str {
        "plain-text-extractor"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn description(&self) -> &str {
        "Extracts content from plain text files"
    }
}

#[async_trait]
impl DocumentExtractor for PlainTextExtractor {
    async fn extract_bytes(&self, content: &[u8], _config: &ExtractionConfig) -> Result<RawExtraction> {
        Ok(RawExtraction::new(decode_text(content), ExtractionStrategy::PlainText))
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::PlainText
    }
}

/// Lenient UTF-8 decode with the byte-order mark removed.
pub fn decode_text(content: &[u8]) -> String {
    let text = String::from_utf8_lossy(content);
    match text.strip_prefix(UTF8_BOM) {
        Some(rest) => rest.to_string(),
        None => text.into_owned(),
    }
}
