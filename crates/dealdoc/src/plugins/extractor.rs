//! Document extractor trait.
//!
//! Each supported [`DocumentFormat`] has exactly one extractor. The
//! orchestrator picks it with a `match` on the sniffed format, so there is no
//! registry or priority system.

use crate::Result;
use crate::core::config::ExtractionConfig;
use crate::core::mime::DocumentFormat;
use crate::plugins::Plugin;
use crate::types::RawExtraction;
use async_trait::async_trait;

/// Turns the bytes of one document format into raw text.
///
/// Implementations return the text exactly as their strategy produced it.
/// Shared cleaning and the final plausibility gate are applied by the
/// orchestrator, not here.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use dealdoc::core::config::ExtractionConfig;
/// use dealdoc::core::mime::DocumentFormat;
/// use dealdoc::plugins::{DocumentExtractor, Plugin};
/// use dealdoc::types::{ExtractionStrategy, RawExtraction};
/// use dealdoc::Result;
///
/// struct ShoutingTextExtractor;
///
/// impl Plugin for ShoutingTextExtractor {
///     fn name(&self) -> &str { "shouting-text" }
///     fn version(&self) -> String { "1.0.0".to_string() }
/// }
///
/// #[async_trait]
/// impl DocumentExtractor for ShoutingTextExtractor {
///     async fn extract_bytes(&self, content: &[u8], _config: &ExtractionConfig) -> Result<RawExtraction> {
///         let text = String::from_utf8_lossy(content).to_uppercase();
///         Ok(RawExtraction::new(text, ExtractionStrategy::PlainText))
///     }
///
///     fn format(&self) -> DocumentFormat {
///         DocumentFormat::PlainText
///     }
/// }
/// ```
#[async_trait]
pub trait DocumentExtractor: Plugin {
    /// Extract raw text from the document bytes.
    ///
    /// # Errors
    ///
    /// - `DealdocError::Parsing` when a parser or delegated library fails
    /// - `DealdocError::Encrypted` for encrypted PDFs
    /// - `DealdocError::ExtractionExhausted` when no strategy found usable text
    /// - `DealdocError::InsufficientText` when the format's own minimum is not met
    async fn extract_bytes(&self, content: &[u8], config: &ExtractionConfig) -> Result<RawExtraction>;

    /// The format this extractor handles.
    fn format(&self) -> DocumentFormat;
}
