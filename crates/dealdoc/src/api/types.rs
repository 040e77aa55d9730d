//! API request and response types.
//!
//! Field names are camelCase on the wire to match the web client.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::extractor::Extractor;
use crate::store::DocumentStore;
use crate::types::{ExtractedText, ExtractionStrategy};

/// API server size limit configuration.
///
/// Uploads travel base64-encoded inside JSON, so the body limit must leave
/// room for the roughly 4/3 encoding overhead.
///
/// # Configuration via Environment Variables
///
/// ```bash
/// export DEALDOC_MAX_REQUEST_BODY_BYTES=52428800  # 50 MB
///
/// # or, in MB:
/// export DEALDOC_MAX_UPLOAD_SIZE_MB=50
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiSizeLimits {
    /// Maximum size of the entire request body in bytes. Default: 50 MB.
    pub max_request_body_bytes: usize,
}

impl Default for ApiSizeLimits {
    fn default() -> Self {
        Self::from_mb(50)
    }
}

impl ApiSizeLimits {
    pub fn new(max_request_body_bytes: usize) -> Self {
        Self { max_request_body_bytes }
    }

    /// ```
    /// use dealdoc::api::ApiSizeLimits;
    ///
    /// assert_eq!(ApiSizeLimits::from_mb(2).max_request_body_bytes, 2 * 1024 * 1024);
    /// ```
    pub fn from_mb(max_request_body_mb: usize) -> Self {
        Self {
            max_request_body_bytes: max_request_body_mb * 1024 * 1024,
        }
    }
}

/// `POST /extract` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    /// File content, standard base64
    pub file_base64: String,
    /// Declared MIME type of the file
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Byte size reported by the client; checked against the decoded payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<usize>,
    /// Document record that receives the text on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
}

/// Successful `POST /extract` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    pub success: bool,
    pub text: String,
    pub extracted_length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub metadata: ExtractResponseMetadata,
}

impl ExtractResponse {
    pub fn new(extracted: ExtractedText, file_name: Option<String>) -> Self {
        Self {
            success: true,
            extracted_length: extracted.extracted_length,
            file_name,
            metadata: ExtractResponseMetadata {
                extraction_method: extracted.method,
                original_length: extracted.original_length,
                truncated: extracted.truncated,
                pages_processed: extracted.pages_processed,
            },
            text: extracted.text,
        }
    }
}

/// Diagnostics about how the text was obtained.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponseMetadata {
    pub extraction_method: ExtractionStrategy,
    pub original_length: usize,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages_processed: Option<usize>,
}

/// Error body returned with every non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Server information response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub version: String,
    /// MIME types accepted by `POST /extract` in this build
    pub supported_mime_types: Vec<String>,
    pub persists_text: bool,
}

/// API server state.
#[derive(Clone)]
pub struct ApiState {
    pub extractor: Extractor,
    /// Receives extracted text when a request names a `documentId`
    pub store: Option<Arc<dyn DocumentStore>>,
}

impl ApiState {
    pub fn new(extractor: Extractor) -> Self {
        Self { extractor, store: None }
    }

    pub fn with_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }
}
