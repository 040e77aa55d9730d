//! Format sniffing and magic-byte verification.
//!
//! The declared MIME type decides which extractor runs. For the binary formats
//! (PDF, DOCX) the leading bytes must also match before any extraction work is
//! committed.

use crate::{DealdocError, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const PDF_LEGACY_MIME_TYPE: &str = "application/x-pdf";
pub const PLAIN_TEXT_MIME_TYPE: &str = "text/plain";
pub const RTF_MIME_TYPE: &str = "application/rtf";
pub const RTF_TEXT_MIME_TYPE: &str = "text/rtf";
pub const DOCX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const LEGACY_WORD_MIME_TYPE: &str = "application/msword";

/// `%PDF`
pub const PDF_SIGNATURE: &[u8] = b"%PDF";
/// ZIP local file header prefix; every DOCX is a ZIP container.
pub const ZIP_SIGNATURE: &[u8] = b"PK";

const SUPPORTED_FORMATS_HINT: &str = "Supported formats are PDF, DOCX, RTF and plain text.";

/// The closed set of formats the pipeline can extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    PlainText,
    Rtf,
    Docx,
    Pdf,
}

impl DocumentFormat {
    /// Canonical MIME type for the format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentFormat::PlainText => PLAIN_TEXT_MIME_TYPE,
            DocumentFormat::Rtf => RTF_MIME_TYPE,
            DocumentFormat::Docx => DOCX_MIME_TYPE,
            DocumentFormat::Pdf => PDF_MIME_TYPE,
        }
    }

    /// Short name used in user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentFormat::PlainText => "text",
            DocumentFormat::Rtf => "RTF",
            DocumentFormat::Docx => "DOCX",
            DocumentFormat::Pdf => "PDF",
        }
    }

    /// Magic bytes the content must start with, if the format has any.
    pub fn signature(&self) -> Option<&'static [u8]> {
        match self {
            DocumentFormat::Pdf => Some(PDF_SIGNATURE),
            DocumentFormat::Docx => Some(ZIP_SIGNATURE),
            DocumentFormat::PlainText | DocumentFormat::Rtf => None,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

static MIME_TO_FORMAT: Lazy<HashMap<&'static str, DocumentFormat>> = Lazy::new(|| {
    let mut m = HashMap::new();

    m.insert(PLAIN_TEXT_MIME_TYPE, DocumentFormat::PlainText);

    m.insert(RTF_MIME_TYPE, DocumentFormat::Rtf);
    m.insert(RTF_TEXT_MIME_TYPE, DocumentFormat::Rtf);

    m.insert(DOCX_MIME_TYPE, DocumentFormat::Docx);

    m.insert(PDF_MIME_TYPE, DocumentFormat::Pdf);
    m.insert(PDF_LEGACY_MIME_TYPE, DocumentFormat::Pdf);

    m
});

static EXT_TO_MIME: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();

    m.insert("txt", PLAIN_TEXT_MIME_TYPE);
    m.insert("text", PLAIN_TEXT_MIME_TYPE);
    m.insert("log", PLAIN_TEXT_MIME_TYPE);
    m.insert("pdf", PDF_MIME_TYPE);
    m.insert("rtf", RTF_MIME_TYPE);
    m.insert("docx", DOCX_MIME_TYPE);
    m.insert("doc", LEGACY_WORD_MIME_TYPE);

    m
});

/// Strip MIME parameters and lowercase the essence (`Text/Plain; charset=utf-8` -> `text/plain`).
fn mime_essence(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Map a declared MIME type to the format that handles it.
///
/// # Errors
///
/// Returns `DealdocError::UnsupportedFormat` for anything outside the four
/// supported formats, including legacy binary `.doc` files.
pub fn sniff_format(mime_type: &str) -> Result<DocumentFormat> {
    let essence = mime_essence(mime_type);

    if let Some(format) = MIME_TO_FORMAT.get(essence.as_str()) {
        return Ok(*format);
    }

    if essence == LEGACY_WORD_MIME_TYPE {
        return Err(DealdocError::UnsupportedFormat(format!(
            "Legacy Word documents (.doc) are not supported. Save the file as DOCX and upload it again. {}",
            SUPPORTED_FORMATS_HINT
        )));
    }

    let shown = if essence.is_empty() { "(empty)" } else { essence.as_str() };
    Err(DealdocError::UnsupportedFormat(format!(
        "File type {} is not supported. {}",
        shown, SUPPORTED_FORMATS_HINT
    )))
}

/// Check the leading bytes of `content` against the format's signature.
///
/// Formats without a signature (plain text, RTF) always pass.
///
/// # Errors
///
/// Returns `DealdocError::SignatureMismatch` when the header differs.
pub fn verify_signature(format: DocumentFormat, content: &[u8]) -> Result<()> {
    let Some(signature) = format.signature() else {
        return Ok(());
    };

    if content.starts_with(signature) {
        return Ok(());
    }

    Err(DealdocError::SignatureMismatch(format!(
        "Invalid {} file: the file header does not match declared type {}.",
        format.label(),
        format.mime_type()
    )))
}

/// Detect a MIME type from a file path's extension.
///
/// Falls back to `mime_guess` for extensions outside the built-in table.
///
/// # Errors
///
/// Returns `DealdocError::UnsupportedFormat` if the extension is unknown and
/// `DealdocError::Validation` if the path has no extension at all.
pub fn detect_mime_type(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();

    let extension = path.extension().and_then(|ext| ext.to_str()).map(|s| s.to_lowercase());

    if let Some(ext) = &extension
        && let Some(mime_type) = EXT_TO_MIME.get(ext.as_str())
    {
        return Ok(mime_type.to_string());
    }

    if let Some(mime) = mime_guess::from_path(path).first() {
        return Ok(mime.essence_str().to_string());
    }

    if let Some(ext) = extension {
        return Err(DealdocError::UnsupportedFormat(format!("Unknown extension: .{}", ext)));
    }

    Err(DealdocError::validation(format!(
        "Could not determine MIME type from file path: {}",
        path.display()
    )))
}
