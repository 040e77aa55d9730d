//! dealdoc - text extraction for deal-room documents
//!
//! Uploaded documents (PDF, DOCX, RTF, plain text) arrive with a declared MIME
//! type. dealdoc checks the type against the file's signature, extracts
//! human-readable text with the matching extractor, cleans extraction
//! artifacts and reports either the text with diagnostics or a failure with a
//! reason that can be shown to the uploader.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use dealdoc::{ExtractionConfig, extract_file};
//!
//! # async fn example() -> dealdoc::Result<()> {
//! let outcome = extract_file("term-sheet.pdf", None, &ExtractionConfig::default()).await?;
//! match outcome.into_result() {
//!     Ok(extracted) => println!("{} chars via {}", extracted.extracted_length, extracted.method),
//!     Err(failure) => eprintln!("{}", failure.reason),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Core** (`core`): orchestration, format sniffing, configuration
//! - **Extractors** (`extractors`): one per format, behind the `DocumentExtractor` trait
//! - **PDF** (`pdf`): structured, content-stream and raw-scan strategies run as a cascade
//! - **Text** (`text`): the normalizer shared by every format
//! - **Store** (`store`): the seam that persists extracted text
//! - **API** (`api`, feature `api`): axum HTTP server

#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod extractors;
pub mod plugins;
pub mod store;
pub mod text;
pub mod types;
pub mod utils;

#[cfg(feature = "pdf")]
pub mod pdf;

#[cfg(feature = "api")]
pub mod api;

pub use error::{DealdocError, Result};
pub use types::*;

pub use core::config::{DocxConfig, ExtractionConfig, PdfConfig};
pub use core::extractor::{Extractor, ExtractorBuilder, batch_extract, extract, extract_bytes, extract_file};
pub use core::mime::{
    DOCX_MIME_TYPE, DocumentFormat, PDF_MIME_TYPE, PLAIN_TEXT_MIME_TYPE, RTF_MIME_TYPE, detect_mime_type,
    sniff_format, verify_signature,
};
pub use text::normalize_text;
