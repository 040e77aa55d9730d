//! REST API server for document text extraction.
//!
//! # Endpoints
//!
//! - `POST /extract` - Extract text from a base64-encoded file (JSON body)
//! - `GET /health` - Health check endpoint
//! - `GET /info` - Server information
//!
//! # Examples
//!
//! ```no_run
//! use dealdoc::api::serve;
//!
//! #[tokio::main]
//! async fn main() -> dealdoc::Result<()> {
//!     serve("127.0.0.1", 8000).await?;
//!     Ok(())
//! }
//! ```
//!
//! # cURL Examples
//!
//! ```bash
//! curl -X POST http://localhost:8000/extract \
//!      -H 'Content-Type: application/json' \
//!      -d "{\"fileBase64\": \"$(base64 -w0 nda.pdf)\", \"mimeType\": \"application/pdf\", \"fileName\": \"nda.pdf\"}"
//!
//! curl http://localhost:8000/health
//! ```

mod error;
mod handlers;
mod server;
mod types;

pub use error::ApiError;
pub use server::{
    create_router, create_router_with_limits, parse_size_limits_from_env, serve, serve_with_config, serve_with_state,
};
pub use types::{
    ApiSizeLimits, ApiState, ErrorResponse, ExtractRequest, ExtractResponse, ExtractResponseMetadata, HealthResponse,
    InfoResponse,
};
