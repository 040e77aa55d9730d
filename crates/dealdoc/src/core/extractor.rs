//! Main extraction entry points.
//!
//! The orchestrator runs one document through the pipeline: size check,
//! format sniffing, signature verification, dispatch to the format's
//! extractor, normalization and the final plausibility gate. Every problem
//! with the document itself ends up as an [`ExtractionOutcome::Failure`] with
//! a reason that can be shown to the uploader; only IO errors on file-based
//! entry points and task panics in batches surface as `Err`.
//!
//! # Functions
//!
//! - [`extract`] - Extract a [`SourceFile`]
//! - [`extract_bytes`] - Extract from a byte slice and a declared MIME type
//! - [`extract_file`] - Extract from a path, detecting the MIME type from its extension
//! - [`batch_extract`] - Extract many sources concurrently

use crate::core::config::ExtractionConfig;
use crate::core::mime::{DocumentFormat, detect_mime_type, sniff_format, verify_signature};
use crate::extractors::{DocxExtractor, PlainTextExtractor, RtfExtractor};
use crate::plugins::{DocumentExtractor, TextBackend};
use crate::text::normalize_text;
use crate::types::{ExtractedText, ExtractionFailure, ExtractionOutcome, FailureKind, SourceFile};
use crate::{DealdocError, Result};
use std::path::Path;
use std::sync::Arc;

#[cfg(feature = "pdf")]
use crate::plugins::PdfTextBackend;

/// Extraction pipeline with one extractor per supported format.
///
/// Cheap to clone; clones share the extractors.
///
/// # Example
///
/// ```rust,no_run
/// use dealdoc::{Extractor, ExtractionConfig, SourceFile};
///
/// # async fn example() {
/// let extractor = Extractor::new(ExtractionConfig::default());
/// let source = SourceFile::new(b"Quarterly update for investors".to_vec(), "text/plain");
/// let outcome = extractor.extract(&source).await;
/// assert!(outcome.is_success());
/// # }
/// ```
#[derive(Clone)]
pub struct Extractor {
    config: Arc<ExtractionConfig>,
    plain_text: Arc<dyn DocumentExtractor>,
    rtf: Arc<dyn DocumentExtractor>,
    docx: Option<Arc<dyn DocumentExtractor>>,
    pdf: Option<Arc<dyn DocumentExtractor>>,
}

impl Extractor {
    /// Pipeline with the default extractors for every enabled feature.
    pub fn new(config: ExtractionConfig) -> Self {
        #[cfg(feature = "office")]
        let docx: Option<Arc<dyn DocumentExtractor>> = Some(Arc::new(DocxExtractor::new()));
        #[cfg(not(feature = "office"))]
        let docx: Option<Arc<dyn DocumentExtractor>> = None;

        #[cfg(feature = "pdf")]
        let pdf: Option<Arc<dyn DocumentExtractor>> = Some(Arc::new(crate::extractors::PdfExtractor::new()));
        #[cfg(not(feature = "pdf"))]
        let pdf: Option<Arc<dyn DocumentExtractor>> = None;

        Self {
            config: Arc::new(config),
            plain_text: Arc::new(PlainTextExtractor::new()),
            rtf: Arc::new(RtfExtractor::new()),
            docx,
            pdf,
        }
    }

    pub fn builder() -> ExtractorBuilder {
        ExtractorBuilder::default()
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Formats this pipeline can currently handle.
    pub fn supported_formats(&self) -> Vec<DocumentFormat> {
        [
            DocumentFormat::Pdf,
            DocumentFormat::Docx,
            DocumentFormat::Rtf,
            DocumentFormat::PlainText,
        ]
        .into_iter()
        .filter(|format| self.extractor_for(*format).is_ok())
        .collect()
    }

    fn installed(&self) -> impl Iterator<Item = &Arc<dyn DocumentExtractor>> {
        [Some(&self.plain_text), Some(&self.rtf), self.docx.as_ref(), self.pdf.as_ref()]
            .into_iter()
            .flatten()
    }

    /// Release the resources held by every installed extractor.
    ///
    /// Failures are logged and do not stop the remaining extractors.
    pub fn shutdown(&self) {
        for extractor in self.installed() {
            if let Err(e) = extractor.shutdown() {
                tracing::warn!(extractor = extractor.name(), error = %e, "Extractor shutdown failed");
            }
        }
    }

    fn extractor_for(&self, format: DocumentFormat) -> Result<&Arc<dyn DocumentExtractor>> {
        let (slot, feature) = match format {
            DocumentFormat::PlainText => return Ok(&self.plain_text),
            DocumentFormat::Rtf => return Ok(&self.rtf),
            DocumentFormat::Docx => (&self.docx, "office"),
            DocumentFormat::Pdf => (&self.pdf, "pdf"),
        };

        slot.as_ref().ok_or_else(|| {
            DealdocError::UnsupportedFormat(format!(
                "{} extraction is not available: this build requires the `{}` feature.",
                format.label(),
                feature
            ))
        })
    }

    /// Run one document through the pipeline.
    ///
    /// Never panics and never returns an error: every problem becomes a
    /// [`ExtractionOutcome::Failure`].
    #[tracing::instrument(
        skip(self, source),
        fields(
            extraction.mime_type = source.mime_type(),
            extraction.size_bytes = source.len(),
        )
    )]
    pub async fn extract(&self, source: &SourceFile) -> ExtractionOutcome {
        match self.run(source).await {
            Ok(extracted) => {
                tracing::info!(
                    method = %extracted.method,
                    extracted_length = extracted.extracted_length,
                    original_length = extracted.original_length,
                    truncated = extracted.truncated,
                    "Extraction succeeded"
                );
                ExtractionOutcome::Success(extracted)
            }
            Err(failure) => {
                tracing::warn!(kind = ?failure.kind, reason = %failure.reason, "Extraction failed");
                ExtractionOutcome::Failure(failure)
            }
        }
    }

    async fn run(&self, source: &SourceFile) -> std::result::Result<ExtractedText, ExtractionFailure> {
        if let Some(declared) = source.declared_size()
            && declared != source.len()
        {
            return Err(ExtractionFailure::new(
                FailureKind::SizeMismatch,
                format!(
                    "The upload is incomplete: expected {} bytes but received {}. Please upload the file again.",
                    declared,
                    source.len()
                ),
            ));
        }

        let format = sniff_format(source.mime_type()).map_err(|e| ExtractionFailure::from_error(&e, "document"))?;
        let subject = format.label();

        verify_signature(format, source.content()).map_err(|e| ExtractionFailure::from_error(&e, subject))?;

        let extractor = self
            .extractor_for(format)
            .map_err(|e| ExtractionFailure::from_error(&e, subject))?;

        tracing::debug!(format = %format, extractor = extractor.name(), "Dispatching document");

        let raw = extractor
            .extract_bytes(source.content(), &self.config)
            .await
            .map_err(|e| {
                tracing::warn!(format = %format, extractor = extractor.name(), error = ?e, "Extractor failed");
                ExtractionFailure::from_error(&e, subject)
            })?;

        let original_length = raw.text.chars().count();
        let text = if self.config.enable_cleaning {
            normalize_text(&raw.text)
        } else {
            raw.text
        };

        let readable_length = text.trim().chars().count();
        if readable_length == 0 || readable_length < self.config.min_output_chars {
            return Err(ExtractionFailure::new(
                FailureKind::InsufficientText,
                format!(
                    "The {} file contains too little readable text ({} characters). It may be empty or contain only images.",
                    subject, readable_length
                ),
            ));
        }

        Ok(ExtractedText {
            extracted_length: text.chars().count(),
            text,
            method: raw.strategy,
            original_length,
            truncated: raw.truncated,
            pages_processed: raw.pages_processed,
        })
    }

    /// Extract many sources concurrently, preserving input order.
    ///
    /// Concurrency is bounded by `max_concurrent_extractions`
    /// (default `num_cpus * 2`).
    ///
    /// # Errors
    ///
    /// `DealdocError::Other` if an extraction task panicked.
    #[tracing::instrument(skip(self, sources), fields(extraction.batch_size = sources.len()))]
    pub async fn batch_extract(&self, sources: Vec<SourceFile>) -> Result<Vec<ExtractionOutcome>> {
        use tokio::sync::Semaphore;
        use tokio::task::JoinSet;

        if sources.is_empty() {
            return Ok(vec![]);
        }

        let max_concurrent = self
            .config
            .max_concurrent_extractions
            .unwrap_or_else(|| num_cpus::get() * 2)
            .max(1);
        let semaphore = Arc::new(Semaphore::new(max_concurrent));

        let mut tasks = JoinSet::new();
        let count = sources.len();

        for (index, source) in sources.into_iter().enumerate() {
            let extractor = self.clone();
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                (index, extractor.extract(&source).await)
            });
        }

        let mut results: Vec<Option<ExtractionOutcome>> = vec![None; count];

        while let Some(task_result) = tasks.join_next().await {
            match task_result {
                Ok((index, outcome)) => results[index] = Some(outcome),
                Err(join_err) => {
                    return Err(DealdocError::Other(format!("Extraction task panicked: {}", join_err)));
                }
            }
        }

        results
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| DealdocError::Other("Batch extraction lost a result".to_string()))
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}

/// Builder for [`Extractor`] with replaceable extractors and backends.
#[derive(Default)]
pub struct ExtractorBuilder {
    config: ExtractionConfig,
    overrides: Vec<Arc<dyn DocumentExtractor>>,
}

impl ExtractorBuilder {
    pub fn config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the extractor for the format it reports.
    pub fn extractor(mut self, extractor: Arc<dyn DocumentExtractor>) -> Self {
        self.overrides.push(extractor);
        self
    }

    /// Use a custom OOXML backend for DOCX files.
    pub fn docx_backend(self, backend: Arc<dyn TextBackend>) -> Self {
        self.extractor(Arc::new(DocxExtractor::with_backend(backend)))
    }

    /// Use a custom text-layer backend for the first PDF strategy.
    #[cfg(feature = "pdf")]
    pub fn pdf_backend(self, backend: Arc<dyn PdfTextBackend>) -> Self {
        self.extractor(Arc::new(crate::extractors::PdfExtractor::with_backend(backend)))
    }

    /// Validate the configuration, assemble the pipeline and initialize every
    /// installed extractor.
    ///
    /// # Errors
    ///
    /// `DealdocError::Validation` if the configuration is invalid, or the
    /// error of the first extractor whose `initialize` fails.
    pub fn build(self) -> Result<Extractor> {
        self.config.validate()?;

        let mut extractor = Extractor::new(self.config);
        for replacement in self.overrides {
            match replacement.format() {
                DocumentFormat::PlainText => extractor.plain_text = replacement,
                DocumentFormat::Rtf => extractor.rtf = replacement,
                DocumentFormat::Docx => extractor.docx = Some(replacement),
                DocumentFormat::Pdf => extractor.pdf = Some(replacement),
            }
        }

        for installed in extractor.installed() {
            installed.initialize().inspect_err(|e| {
                tracing::error!(extractor = installed.name(), error = %e, "Extractor initialization failed");
            })?;
        }
        Ok(extractor)
    }
}

/// Extract a single [`SourceFile`] with the default extractors.
pub async fn extract(source: &SourceFile, config: &ExtractionConfig) -> ExtractionOutcome {
    Extractor::new(config.clone()).extract(source).await
}

/// Extract text from bytes with a declared MIME type.
///
/// # Example
///
/// ```rust,no_run
/// use dealdoc::{ExtractionConfig, extract_bytes};
///
/// # async fn example() {
/// let outcome = extract_bytes(b"{\\rtf1 Hello World}", "application/rtf", &ExtractionConfig::default()).await;
/// assert_eq!(outcome.text(), Some("Hello World"));
/// # }
/// ```
pub async fn extract_bytes(content: &[u8], mime_type: &str, config: &ExtractionConfig) -> ExtractionOutcome {
    extract(&SourceFile::new(content.to_vec(), mime_type), config).await
}

/// Extract text from a file on disk.
///
/// The MIME type is detected from the extension unless `mime_type` is given.
///
/// # Errors
///
/// Returns `DealdocError::Io` when the file cannot be read; IO errors always
/// bubble up. Undetectable or unsupported types are reported as a failed
/// outcome like any other format problem.
#[tracing::instrument(skip(path, config), fields(extraction.path = %path.as_ref().display()))]
pub async fn extract_file(
    path: impl AsRef<Path>,
    mime_type: Option<&str>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutcome> {
    let path = path.as_ref();

    let mime_type = match mime_type {
        Some(mime_type) => mime_type.to_string(),
        None => match detect_mime_type(path) {
            Ok(detected) => detected,
            Err(e) => {
                tracing::warn!(error = %e, "Could not detect MIME type");
                return Ok(ExtractionOutcome::Failure(ExtractionFailure::from_error(&e, "document")));
            }
        },
    };

    let content = tokio::fs::read(path).await?;
    let mut source = SourceFile::new(content, mime_type);
    if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
        source = source.with_file_name(name);
    }

    Ok(extract(&source, config).await)
}

/// Extract many sources concurrently with the default extractors.
///
/// # Errors
///
/// `DealdocError::Other` if an extraction task panicked.
pub async fn batch_extract(sources: Vec<SourceFile>, config: &ExtractionConfig) -> Result<Vec<ExtractionOutcome>> {
    Extractor::new(config.clone()).batch_extract(sources).await
}
