//! Error types for dealdoc.
//!
//! Every fallible operation inside the library returns [`DealdocError`]. The
//! orchestrator converts these into [`crate::types::ExtractionFailure`] values
//! before anything reaches a caller, so this type is mostly seen by extractor
//! and strategy implementations, the storage seam and the CLI.
//!
//! # Error Handling Policy
//!
//! **System errors bubble up unchanged:**
//! - `DealdocError::Io` (from `std::io::Error`) for file system problems.
//!
//! **Application errors carry context:**
//! - `Parsing` - a format library or parser pass failed on the input
//! - `Validation` - invalid configuration, request or input shape
//! - `UnsupportedFormat` - the declared MIME type is not handled
//! - `SignatureMismatch` - magic bytes do not match the declared type
//! - `Encrypted` - the document is encrypted and cannot be read
//! - `ExtractionExhausted` - every applicable strategy came up empty
//! - `InsufficientText` - extraction worked but produced too little text
//!
//! # Example
//!
//! ```rust
//! use dealdoc::{DealdocError, Result};
//!
//! fn read_upload(path: &str) -> Result<Vec<u8>> {
//!     let bytes = std::fs::read(path)?;
//!     if bytes.is_empty() {
//!         return Err(DealdocError::validation(format!("Upload is empty: {}", path)));
//!     }
//!     Ok(bytes)
//! }
//! ```
use thiserror::Error;

/// Result type alias using `DealdocError`.
pub type Result<T> = std::result::Result<T, DealdocError>;

/// Main error type for all dealdoc operations.
#[derive(Debug, Error)]
pub enum DealdocError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parsing error: {message}")]
    Parsing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Signature mismatch: {0}")]
    SignatureMismatch(String),

    #[error("Encrypted document: {0}")]
    Encrypted(String),

    #[error("Extraction exhausted: {0}")]
    ExtractionExhausted(String),

    #[error("Insufficient text: {0}")]
    InsufficientText(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for DealdocError {
    fn from(err: serde_json::Error) -> Self {
        DealdocError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<base64::DecodeError> for DealdocError {
    fn from(err: base64::DecodeError) -> Self {
        DealdocError::Validation {
            message: format!("Invalid base64 payload: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(feature = "pdf")]
impl From<crate::pdf::error::PdfError> for DealdocError {
    fn from(err: crate::pdf::error::PdfError) -> Self {
        match err {
            crate::pdf::error::PdfError::Encrypted => DealdocError::Encrypted(err.to_string()),
            _ => DealdocError::Parsing {
                message: err.to_string(),
                source: Some(Box::new(err)),
            },
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl DealdocError {
    error_constructor!(parsing, Parsing);
    error_constructor!(validation, Validation);
    error_constructor!(serialization, Serialization);
    error_constructor!(storage, Storage);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DealdocError = io_err.into();
        assert!(matches!(err, DealdocError::Io(_)));
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_parsing_error() {
        let err = DealdocError::parsing("invalid format");
        assert_eq!(err.to_string(), "Parsing error: invalid format");
    }

    #[test]
    fn test_parsing_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad data");
        let err = DealdocError::parsing_with_source("invalid format", source);
        assert_eq!(err.to_string(), "Parsing error: invalid format");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_validation_error() {
        let err = DealdocError::validation("invalid input");
        assert_eq!(err.to_string(), "Validation error: invalid input");
    }

    #[test]
    fn test_storage_error_with_source() {
        let source = std::io::Error::other("connection reset");
        let err = DealdocError::storage_with_source("update failed", source);
        assert_eq!(err.to_string(), "Storage error: update failed");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_unsupported_format_error() {
        let err = DealdocError::UnsupportedFormat("application/msword".to_string());
        assert_eq!(err.to_string(), "Unsupported format: application/msword");
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: DealdocError = json_err.into();
        assert!(matches!(err, DealdocError::Serialization { .. }));
    }

    #[test]
    fn test_base64_error_conversion() {
        use base64::Engine;
        let decode_err = base64::engine::general_purpose::STANDARD
            .decode("not base64!!")
            .unwrap_err();
        let err: DealdocError = decode_err.into();
        assert!(matches!(err, DealdocError::Validation { .. }));
        assert!(err.to_string().contains("base64"));
    }

    #[test]
    #[cfg(feature = "pdf")]
    fn test_pdf_error_conversion() {
        let err: DealdocError = crate::pdf::error::PdfError::InvalidPdf("corrupt".to_string()).into();
        assert!(matches!(err, DealdocError::Parsing { .. }));

        let err: DealdocError = crate::pdf::error::PdfError::Encrypted.into();
        assert!(matches!(err, DealdocError::Encrypted(_)));
    }

    #[test]
    fn test_io_error_bubbles_unchanged() {
        fn read_file() -> Result<String> {
            let content = std::fs::read_to_string("/nonexistent/dealdoc/file.txt")?;
            Ok(content)
        }

        assert!(matches!(read_file().unwrap_err(), DealdocError::Io(_)));
    }
}
