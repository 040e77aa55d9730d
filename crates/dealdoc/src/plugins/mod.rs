//! Pluggable seams of the extraction pipeline.
//!
//! - [`Plugin`] - identification and lifecycle shared by every plugin
//! - [`DocumentExtractor`] - one per supported format
//! - [`TextBackend`] - OOXML word-processing to text, used by the DOCX extractor
//! - [`PdfTextBackend`] - text-layer extraction, the first PDF strategy
//!
//! Backends wrap third-party parsing libraries. Tests substitute mocks to
//! exercise the surrounding logic without real documents.

pub mod backend;
pub mod extractor;
pub mod traits;

pub use backend::{PdfTextBackend, TextBackend};
pub use extractor::DocumentExtractor;
pub use traits::Plugin;

#[cfg(feature = "office")]
pub use backend::DocxLiteBackend;

#[cfg(feature = "pdf")]
pub use backend::PdfExtractBackend;
