//! PDF text extraction cascade.
//!
//! PDFs range from clean text layers to malformed files where only brute-force
//! pattern matching recovers anything. [`PdfCascade`] tries three strategies
//! from most to least specific and stops at the first one whose output passes
//! its plausibility gate:
//!
//! 1. [`StructuredStrategy`] - text layer through a [`PdfTextBackend`](crate::plugins::PdfTextBackend)
//! 2. [`ContentStreamStrategy`] - text-showing operators of each page via `lopdf`
//! 3. [`RawScanStrategy`] - string literals and plaintext runs in the raw bytes
//!
//! Encrypted files are rejected before any strategy runs.
//!
//! # Example
//!
//! ```rust,no_run
//! use dealdoc::core::config::PdfConfig;
//! use dealdoc::pdf::PdfCascade;
//!
//! # async fn example() -> dealdoc::Result<()> {
//! let pdf_bytes = std::fs::read("term-sheet.pdf")?;
//! let raw = PdfCascade::new().run(&pdf_bytes, &PdfConfig::default()).await?;
//! println!("{} via {}", raw.text, raw.strategy);
//! # Ok(())
//! # }
//! ```

pub mod cascade;
pub mod content_stream;
pub mod error;
pub mod raw_scan;
pub mod structured;

pub use cascade::{PdfCascade, PdfStrategy, is_encrypted};
pub use content_stream::{ContentStreamStrategy, ContentStreamText, extract_content_streams};
pub use error::PdfError;
pub use raw_scan::{RawScanStrategy, scan_raw_text};
pub use structured::StructuredStrategy;
