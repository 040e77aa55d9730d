//! Second cascade strategy: text-showing operators in page content streams.
//!
//! Works on PDFs whose text layer the structured backend cannot read (odd
//! font encodings, broken cross-reference tables that `lopdf` still
//! recovers). Pages are visited in order up to a cap and each page's text is
//! introduced by a `--- Page N ---` delimiter.

use super::cascade::PdfStrategy;
use super::error::{PdfError, Result as PdfResult};
use crate::Result;
use crate::core::config::PdfConfig;
use crate::text::normalize_text;
use crate::types::{ExtractionStrategy, RawExtraction};
use async_trait::async_trait;
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use once_cell::sync::Lazy;
use regex::Regex;

/// A `TJ` adjustment more negative than this (thousandths of an em) is treated
/// as a word gap.
const KERNING_SPACE_THRESHOLD: f32 = -100.0;

static PAGE_DELIMITER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^--- Page \d+ ---$").expect("Page delimiter regex pattern is valid and should compile")
});

/// Text collected from page content streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentStreamText {
    pub text: String,
    pub pages_processed: usize,
    pub total_pages: usize,
}

impl ContentStreamText {
    /// True when the page cap left pages unread.
    pub fn truncated(&self) -> bool {
        self.total_pages > self.pages_processed
    }
}

/// Extracts text operators page by page with `lopdf`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContentStreamStrategy;

#[async_trait]
impl PdfStrategy for ContentStreamStrategy {
    fn strategy(&self) -> ExtractionStrategy {
        ExtractionStrategy::PdfContentStream
    }

    fn min_chars(&self, config: &PdfConfig) -> usize {
        config.content_stream_min_chars
    }

    /// Page delimiters do not count towards the gate.
    fn gate_length(&self, raw: &RawExtraction) -> usize {
        let without_delimiters = PAGE_DELIMITER.replace_all(&raw.text, "");
        normalize_text(&without_delimiters).chars().count()
    }

    async fn extract(&self, content: &[u8], config: &PdfConfig) -> Result<RawExtraction> {
        let max_pages = config.max_pages;
        let extracted = crate::utils::run_blocking_guarded("lopdf", content, move |bytes| {
            extract_content_streams(bytes, max_pages).map_err(crate::DealdocError::from)
        })
        .await?;

        if extracted.truncated() {
            tracing::debug!(
                pages_processed = extracted.pages_processed,
                total_pages = extracted.total_pages,
                "Content-stream extraction hit the page cap"
            );
        }

        let truncated = extracted.truncated();
        let mut raw = RawExtraction::new(extracted.text, ExtractionStrategy::PdfContentStream);
        raw.truncated = truncated;
        raw.pages_processed = Some(extracted.pages_processed);
        Ok(raw)
    }
}

/// Walk up to `max_pages` pages and collect the text their content streams show.
///
/// A page whose content cannot be decoded contributes an empty section
/// rather than failing the document.
///
/// # Errors
///
/// `PdfError::InvalidPdf` when `lopdf` cannot load the document at all.
pub fn extract_content_streams(content: &[u8], max_pages: usize) -> PdfResult<ContentStreamText> {
    let doc = Document::load_mem(content)?;
    let pages = doc.get_pages();
    let total_pages = pages.len();

    let mut text = String::new();
    let mut pages_processed = 0;

    for (&page_number, &page_id) in pages.iter().take(max_pages) {
        let page_text = match page_text(&doc, page_number, page_id) {
            Ok(page_text) => page_text,
            Err(e) => {
                tracing::debug!(page = page_number, error = %e, "Skipping undecodable page");
                String::new()
            }
        };

        if pages_processed > 0 {
            text.push_str("\n\n");
        }
        text.push_str(&format!("--- Page {} ---\n", page_number));
        text.push_str(page_text.trim());
        pages_processed += 1;
    }

    Ok(ContentStreamText {
        text,
        pages_processed,
        total_pages,
    })
}

fn page_text(doc: &Document, page_number: u32, page_id: ObjectId) -> PdfResult<String> {
    let decode_failed = |e: lopdf::Error| PdfError::PageDecodeFailed {
        page: page_number,
        message: e.to_string(),
    };

    let data = doc.get_page_content(page_id).map_err(decode_failed)?;
    let content = Content::decode(&data).map_err(decode_failed)?;

    let mut text = String::new();
    for operation in &content.operations {
        match operation.operator.as_str() {
            "Tj" | "TJ" => {
                for operand in &operation.operands {
                    push_operand_text(&mut text, operand);
                }
            }
            "'" | "\"" => {
                push_line_break(&mut text);
                if let Some(operand) = operation.operands.last() {
                    push_operand_text(&mut text, operand);
                }
            }
            "Td" | "TD" | "T*" | "ET" => push_line_break(&mut text),
            _ => {}
        }
    }

    Ok(text)
}

fn push_line_break(text: &mut String) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
}

fn push_operand_text(text: &mut String, operand: &Object) {
    match operand {
        Object::String(bytes, _) => text.push_str(&decode_pdf_string(bytes)),
        Object::Array(items) => {
            for item in items {
                match item {
                    Object::String(bytes, _) => text.push_str(&decode_pdf_string(bytes)),
                    Object::Integer(_) | Object::Real(_) => {
                        if item.as_float().is_ok_and(|adjustment| adjustment < KERNING_SPACE_THRESHOLD) {
                            text.push(' ');
                        }
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }
}

/// Decode a PDF string operand: UTF-16BE with BOM, otherwise Latin-1.
pub(crate) fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    bytes.iter().map(|&b| b as char).collect()
}
