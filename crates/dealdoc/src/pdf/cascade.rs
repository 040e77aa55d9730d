//! Ordered fallback over the PDF strategies.

use super::content_stream::ContentStreamStrategy;
use super::error::PdfError;
use super::raw_scan::RawScanStrategy;
use super::structured::StructuredStrategy;
use crate::core::config::PdfConfig;
use crate::plugins::PdfTextBackend;
use crate::text::normalize_text;
use crate::types::{ExtractionStrategy, RawExtraction};
use crate::{DealdocError, Result};
use async_trait::async_trait;
use std::sync::Arc;

const ENCRYPT_MARKER: &[u8] = b"/Encrypt";

/// One way of getting text out of a PDF.
///
/// Strategies are independent: each can be run and tested on its own, and
/// the cascade only looks at the text they return.
#[async_trait]
pub trait PdfStrategy: Send + Sync {
    /// Which method this is, reported as the extraction method on success.
    fn strategy(&self) -> ExtractionStrategy;

    /// Minimum [`gate_length`](PdfStrategy::gate_length) for the output to be accepted.
    fn min_chars(&self, config: &PdfConfig) -> usize;

    /// Length the gate compares against: characters of the normalized text.
    fn gate_length(&self, raw: &RawExtraction) -> usize {
        normalize_text(&raw.text).chars().count()
    }

    /// Run the strategy.
    ///
    /// # Errors
    ///
    /// Any error is logged by the cascade and treated like output that failed
    /// its gate.
    async fn extract(&self, content: &[u8], config: &PdfConfig) -> Result<RawExtraction>;
}

/// True when the raw bytes reference an encryption dictionary.
pub fn is_encrypted(content: &[u8]) -> bool {
    memchr::memmem::find(content, ENCRYPT_MARKER).is_some()
}

/// Runs [`PdfStrategy`]s in priority order and stops at the first pass.
pub struct PdfCascade {
    strategies: Vec<Arc<dyn PdfStrategy>>,
}

impl PdfCascade {
    /// Structured (pdf-extract), content-stream, raw scan.
    pub fn new() -> Self {
        Self::with_structured_backend(Arc::new(crate::plugins::PdfExtractBackend))
    }

    /// Default cascade with a custom text-layer backend for the first strategy.
    pub fn with_structured_backend(backend: Arc<dyn PdfTextBackend>) -> Self {
        Self::with_strategies(vec![
            Arc::new(StructuredStrategy::new(backend)),
            Arc::new(ContentStreamStrategy),
            Arc::new(RawScanStrategy),
        ])
    }

    /// Cascade over an explicit strategy list, tried in the given order.
    pub fn with_strategies(strategies: Vec<Arc<dyn PdfStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategies(&self) -> impl Iterator<Item = ExtractionStrategy> + '_ {
        self.strategies.iter().map(|s| s.strategy())
    }

    /// Extract text with the first strategy whose output passes its gate.
    ///
    /// # Errors
    ///
    /// - `DealdocError::Encrypted` when the file carries an `/Encrypt` marker;
    ///   no strategy is attempted
    /// - `DealdocError::ExtractionExhausted` when every strategy failed or
    ///   fell short of its gate
    pub async fn run(&self, content: &[u8], config: &PdfConfig) -> Result<RawExtraction> {
        if is_encrypted(content) {
            tracing::debug!("PDF carries an /Encrypt marker, skipping all strategies");
            return Err(PdfError::Encrypted.into());
        }

        for strategy in &self.strategies {
            let method = strategy.strategy();
            let min_chars = strategy.min_chars(config);
            tracing::debug!(strategy = %method, "Trying PDF strategy");

            match strategy.extract(content, config).await {
                Ok(raw) => {
                    let length = strategy.gate_length(&raw);
                    if length >= min_chars {
                        tracing::debug!(strategy = %method, length, "PDF strategy passed its gate");
                        return Ok(raw);
                    }
                    tracing::debug!(strategy = %method, length, min_chars, "PDF strategy output below gate");
                }
                Err(e) => {
                    tracing::warn!(strategy = %method, error = %e, "PDF strategy failed");
                }
            }
        }

        Err(DealdocError::ExtractionExhausted(
            "Could not extract text from this PDF. It may be encrypted, scanned/image-based, or corrupted. \
             Try uploading a text-based PDF or a DOCX version of the document."
                .to_string(),
        ))
    }
}

impl Default for PdfCascade {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedStrategy {
        method: ExtractionStrategy,
        output: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl FixedStrategy {
        fn new(method: ExtractionStrategy, output: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                method,
                output,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PdfStrategy for FixedStrategy {
        fn strategy(&self) -> ExtractionStrategy {
            self.method
        }

        fn min_chars(&self, _config: &PdfConfig) -> usize {
            10
        }

        async fn extract(&self, _content: &[u8], _config: &PdfConfig) -> Result<RawExtraction> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.output {
                Some(text) => Ok(RawExtraction::new(text, self.method)),
                None => Err(DealdocError::parsing("strategy blew up")),
            }
        }
    }

    #[tokio::test]
    async fn test_first_passing_strategy_wins() {
        let first = FixedStrategy::new(ExtractionStrategy::PdfStructured, Some("a long enough text layer"));
        let second = FixedStrategy::new(ExtractionStrategy::PdfContentStream, Some("should never run"));
        let cascade = PdfCascade::with_strategies(vec![first.clone(), second.clone()]);

        let raw = cascade.run(b"%PDF-1.7", &PdfConfig::default()).await.unwrap();

        assert_eq!(raw.strategy, ExtractionStrategy::PdfStructured);
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 0);
    }

    #[tokio::test]
    async fn test_errors_and_short_output_fall_through() {
        let failing = FixedStrategy::new(ExtractionStrategy::PdfStructured, None);
        let short = FixedStrategy::new(ExtractionStrategy::PdfContentStream, Some("  tiny \n "));
        let last = FixedStrategy::new(ExtractionStrategy::PdfRawScan, Some("recovered from raw bytes"));
        let cascade = PdfCascade::with_strategies(vec![failing.clone(), short.clone(), last.clone()]);

        let raw = cascade.run(b"%PDF-1.7", &PdfConfig::default()).await.unwrap();

        assert_eq!(raw.strategy, ExtractionStrategy::PdfRawScan);
        assert_eq!((failing.calls(), short.calls(), last.calls()), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_gate_measured_after_normalization() {
        let padded = FixedStrategy::new(ExtractionStrategy::PdfStructured, Some("a\u{0}\u{0}\u{0}   \n\n\n\n\n\n   b"));
        let cascade = PdfCascade::with_strategies(vec![padded]);

        let err = cascade.run(b"%PDF-1.7", &PdfConfig::default()).await.unwrap_err();
        assert!(matches!(err, DealdocError::ExtractionExhausted(_)));
    }

    #[tokio::test]
    async fn test_exhausted_reason() {
        let cascade = PdfCascade::with_strategies(vec![FixedStrategy::new(ExtractionStrategy::PdfRawScan, None)]);
        let err = cascade.run(b"%PDF-1.7", &PdfConfig::default()).await.unwrap_err();

        let message = err.to_string();
        assert!(message.contains("encrypted"));
        assert!(message.contains("scanned/image-based"));
        assert!(message.contains("corrupted"));
    }

    #[tokio::test]
    async fn test_encrypted_short_circuits() {
        let strategy = FixedStrategy::new(ExtractionStrategy::PdfStructured, Some("would have worked fine"));
        let cascade = PdfCascade::with_strategies(vec![strategy.clone()]);

        let err = cascade
            .run(b"%PDF-1.6\ntrailer << /Encrypt 5 0 R >>", &PdfConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, DealdocError::Encrypted(_)));
        assert!(err.to_string().contains("encrypted"));
        assert_eq!(strategy.calls(), 0);
    }

    #[test]
    fn test_default_order() {
        let order: Vec<_> = PdfCascade::new().strategies().collect();
        assert_eq!(
            order,
            vec![
                ExtractionStrategy::PdfStructured,
                ExtractionStrategy::PdfContentStream,
                ExtractionStrategy::PdfRawScan,
            ]
        );
    }

    #[test]
    fn test_is_encrypted() {
        assert!(is_encrypted(b"<< /Encrypt 12 0 R /Root 1 0 R >>"));
        assert!(!is_encrypted(b"<< /Root 1 0 R >> (Encrypt this)"));
    }
}
