use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::DealdocError;

// ============================================================================
// Input
// ============================================================================

/// An uploaded document awaiting extraction.
///
/// The byte buffer is shared read-only; cloning a `SourceFile` never copies the
/// document bytes.
#[derive(Debug, Clone)]
pub struct SourceFile {
    content: Arc<[u8]>,
    mime_type: String,
    file_name: Option<String>,
    declared_size: Option<usize>,
}

impl SourceFile {
    pub fn new(content: impl Into<Arc<[u8]>>, mime_type: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            mime_type: mime_type.into(),
            file_name: None,
            declared_size: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Record the size the uploader claimed for this file.
    ///
    /// The orchestrator rejects the file when the buffer length differs.
    pub fn with_declared_size(mut self, declared_size: usize) -> Self {
        self.declared_size = Some(declared_size);
        self
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn declared_size(&self) -> Option<usize> {
        self.declared_size
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

// ============================================================================
// Strategies
// ============================================================================

/// Which method produced the extracted text. Diagnostic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtractionStrategy {
    #[serde(rename = "plain_text")]
    PlainText,
    #[serde(rename = "rtf_parse")]
    RtfParse,
    #[serde(rename = "docx_library")]
    DocxLibrary,
    #[serde(rename = "pdf_structured")]
    PdfStructured,
    #[serde(rename = "pdf_contentstream")]
    PdfContentStream,
    #[serde(rename = "pdf_rawscan")]
    PdfRawScan,
}

impl ExtractionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStrategy::PlainText => "plain_text",
            ExtractionStrategy::RtfParse => "rtf_parse",
            ExtractionStrategy::DocxLibrary => "docx_library",
            ExtractionStrategy::PdfStructured => "pdf_structured",
            ExtractionStrategy::PdfContentStream => "pdf_contentstream",
            ExtractionStrategy::PdfRawScan => "pdf_rawscan",
        }
    }
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw output of a format extractor, before shared cleaning and the final gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawExtraction {
    pub text: String,
    pub strategy: ExtractionStrategy,
    /// True when a page cap stopped extraction before the end of the document.
    pub truncated: bool,
    pub pages_processed: Option<usize>,
}

impl RawExtraction {
    pub fn new(text: impl Into<String>, strategy: ExtractionStrategy) -> Self {
        Self {
            text: text.into(),
            strategy,
            truncated: false,
            pages_processed: None,
        }
    }
}

// ============================================================================
// Output
// ============================================================================

/// Successful extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedText {
    pub text: String,
    pub method: ExtractionStrategy,
    /// Character count of `text` (after cleaning).
    pub extracted_length: usize,
    /// Character count of the extractor output before cleaning.
    pub original_length: usize,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages_processed: Option<usize>,
}

/// Coarse classification of why an extraction failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    UnsupportedFormat,
    SignatureMismatch,
    SizeMismatch,
    InvalidInput,
    Encrypted,
    ExtractionExhausted,
    LibraryFailure,
    InsufficientText,
    Internal,
}

impl FailureKind {
    /// Whether the failure is caused by the uploaded file rather than by the service.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, FailureKind::Internal)
    }
}

/// Failed extraction with a reason that can be shown to the uploader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionFailure {
    pub kind: FailureKind,
    pub reason: String,
}

impl ExtractionFailure {
    pub fn new(kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }

    /// Convert an internal error into a user-facing failure.
    ///
    /// `subject` names the document type ("PDF", "DOCX", ...) for messages that
    /// must not leak library detail.
    pub fn from_error(err: &DealdocError, subject: &str) -> Self {
        match err {
            DealdocError::UnsupportedFormat(msg) => Self::new(FailureKind::UnsupportedFormat, msg.clone()),
            DealdocError::SignatureMismatch(msg) => Self::new(FailureKind::SignatureMismatch, msg.clone()),
            DealdocError::Encrypted(msg) => Self::new(FailureKind::Encrypted, msg.clone()),
            DealdocError::ExtractionExhausted(msg) => Self::new(FailureKind::ExtractionExhausted, msg.clone()),
            DealdocError::InsufficientText(msg) => Self::new(FailureKind::InsufficientText, msg.clone()),
            DealdocError::Validation { message, .. } => Self::new(FailureKind::InvalidInput, message.clone()),
            DealdocError::Parsing { .. } => Self::new(
                FailureKind::LibraryFailure,
                format!(
                    "Could not read the {} file. It may be corrupted or password-protected.",
                    subject
                ),
            ),
            DealdocError::Io(_)
            | DealdocError::Serialization { .. }
            | DealdocError::Storage { .. }
            | DealdocError::Other(_) => Self::new(
                FailureKind::Internal,
                format!(
                    "Text extraction for this {} file failed unexpectedly. Please retry the upload.",
                    subject
                ),
            ),
        }
    }
}

impl fmt::Display for ExtractionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

/// Result of one extraction request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtractionOutcome {
    Success(ExtractedText),
    Failure(ExtractionFailure),
}

impl ExtractionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionOutcome::Success(_))
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            ExtractionOutcome::Success(extracted) => Some(&extracted.text),
            ExtractionOutcome::Failure(_) => None,
        }
    }

    pub fn method(&self) -> Option<ExtractionStrategy> {
        match self {
            ExtractionOutcome::Success(extracted) => Some(extracted.method),
            ExtractionOutcome::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&ExtractionFailure> {
        match self {
            ExtractionOutcome::Success(_) => None,
            ExtractionOutcome::Failure(failure) => Some(failure),
        }
    }

    pub fn into_result(self) -> std::result::Result<ExtractedText, ExtractionFailure> {
        match self {
            ExtractionOutcome::Success(extracted) => Ok(extracted),
            ExtractionOutcome::Failure(failure) => Err(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_file_shares_buffer() {
        let file = SourceFile::new(b"hello".to_vec(), "text/plain").with_file_name("a.txt");
        let clone = file.clone();
        assert_eq!(clone.content().as_ptr(), file.content().as_ptr());
        assert_eq!(clone.file_name(), Some("a.txt"));
        assert_eq!(file.len(), 5);
    }

    #[test]
    fn test_strategy_serialization_names() {
        let json = serde_json::to_string(&ExtractionStrategy::PdfContentStream).unwrap();
        assert_eq!(json, "\"pdf_contentstream\"");
        assert_eq!(ExtractionStrategy::PdfRawScan.to_string(), "pdf_rawscan");
        assert_eq!(ExtractionStrategy::DocxLibrary.as_str(), "docx_library");
    }

    #[test]
    fn test_failure_hides_library_detail() {
        let err = DealdocError::parsing("zip central directory offset 0xdeadbeef out of range");
        let failure = ExtractionFailure::from_error(&err, "DOCX");
        assert_eq!(failure.kind, FailureKind::LibraryFailure);
        assert!(!failure.reason.contains("0xdeadbeef"));
        assert!(failure.reason.contains("corrupted or password-protected"));
    }

    #[test]
    fn test_internal_failure_is_server_side() {
        let err = DealdocError::Other("task join failed".to_string());
        let failure = ExtractionFailure::from_error(&err, "PDF");
        assert_eq!(failure.kind, FailureKind::Internal);
        assert!(!failure.kind.is_client_error());
        assert!(FailureKind::Encrypted.is_client_error());
    }

    #[test]
    fn test_outcome_serialization_is_tagged() {
        let outcome = ExtractionOutcome::Failure(ExtractionFailure::new(FailureKind::Encrypted, "PDF is encrypted"));
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "failure");
        assert_eq!(value["kind"], "encrypted");
    }
}
