//! Core extraction orchestration module.
//!
//! - **Entry points**: [`extract`], [`extract_bytes`], [`extract_file`] and [`batch_extract`]
//! - **Format sniffing**: mapping declared MIME types to [`DocumentFormat`] and checking file signatures
//! - **Configuration**: loading and validating [`ExtractionConfig`]
//!
//! # Example
//!
//! ```rust,no_run
//! use dealdoc::core::config::ExtractionConfig;
//! use dealdoc::core::extractor::extract_file;
//!
//! # async fn example() -> dealdoc::Result<()> {
//! let config = ExtractionConfig::default();
//! let outcome = extract_file("term-sheet.pdf", None, &config).await?;
//! if let Some(text) = outcome.text() {
//!     println!("{}", text);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod extractor;
pub mod mime;

pub use config::{DocxConfig, ExtractionConfig, PdfConfig};
pub use extractor::{Extractor, ExtractorBuilder, batch_extract, extract, extract_bytes, extract_file};
pub use mime::{DocumentFormat, detect_mime_type, sniff_format, verify_signature};
