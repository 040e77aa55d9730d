//! Built-in document extractors.
//!
//! One extractor per [`DocumentFormat`](crate::core::mime::DocumentFormat).
//! All of them implement the `DocumentExtractor` plugin trait and return the
//! raw, un-normalized text together with the method that produced it.

pub mod docx;
pub mod rtf;
pub mod text;

#[cfg(feature = "pdf")]
pub mod pdf;

pub use docx::{DocxExtractor, clean_docx_text};
pub use rtf::{RtfExtractor, extract_text_from_rtf};
pub use text::{PlainTextExtractor, decode_text};

#[cfg(feature = "pdf")]
pub use pdf::PdfExtractor;
