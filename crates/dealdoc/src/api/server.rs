//! API server setup and configuration.

use std::net::{IpAddr, SocketAddr};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::core::extractor::Extractor;
use crate::{DealdocError, ExtractionConfig, Result};

use super::{
    handlers::{extract_handler, health_handler, info_handler, method_not_allowed_handler},
    types::{ApiSizeLimits, ApiState},
};

/// Parse size limits from environment variables.
///
/// `DEALDOC_MAX_REQUEST_BODY_BYTES` takes precedence over
/// `DEALDOC_MAX_UPLOAD_SIZE_MB`. Zero or unparsable values are ignored and the
/// default (50 MB) applies.
pub fn parse_size_limits_from_env() -> ApiSizeLimits {
    if let Ok(value) = std::env::var("DEALDOC_MAX_REQUEST_BODY_BYTES") {
        match value.parse::<usize>() {
            Ok(bytes) if bytes > 0 => {
                tracing::info!("Request body limit configured from environment: {} bytes", bytes);
                return ApiSizeLimits::new(bytes);
            }
            _ => tracing::warn!(
                "Ignoring DEALDOC_MAX_REQUEST_BODY_BYTES='{}', must be a positive integer",
                value
            ),
        }
    }

    if let Ok(value) = std::env::var("DEALDOC_MAX_UPLOAD_SIZE_MB") {
        match value.parse::<usize>() {
            Ok(mb) if mb > 0 => {
                tracing::info!("Request body limit configured from environment: {} MB", mb);
                return ApiSizeLimits::from_mb(mb);
            }
            _ => tracing::warn!(
                "Ignoring DEALDOC_MAX_UPLOAD_SIZE_MB='{}', must be a positive integer",
                value
            ),
        }
    }

    let limits = ApiSizeLimits::default();
    tracing::info!(
        "Request body limit: {} bytes (default) - configure with DEALDOC_MAX_REQUEST_BODY_BYTES or DEALDOC_MAX_UPLOAD_SIZE_MB",
        limits.max_request_body_bytes
    );
    limits
}

fn cors_layer_from_env() -> CorsLayer {
    let permissive = || CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    let Ok(origins_str) = std::env::var("DEALDOC_CORS_ORIGINS") else {
        tracing::warn!(
            "CORS configured to allow all origins (default). Set DEALDOC_CORS_ORIGINS to a \
             comma-separated list of allowed origins for production."
        );
        return permissive();
    };

    let origins: Vec<_> = origins_str
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!("DEALDOC_CORS_ORIGINS set but empty/invalid - falling back to permissive CORS");
        return permissive();
    }

    tracing::info!("CORS configured with {} explicit allowed origin(s)", origins.len());
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Create the API router with default size limits and no document store.
///
/// Public so the router can be nested inside a larger application.
///
/// ```no_run
/// use axum::Router;
/// use dealdoc::{ExtractionConfig, api::create_router};
///
/// let app: Router = Router::new().nest("/documents", create_router(ExtractionConfig::default()));
/// ```
pub fn create_router(config: ExtractionConfig) -> Router {
    create_router_with_limits(ApiState::new(Extractor::new(config)), ApiSizeLimits::default())
}

/// Create the API router around an explicit state and size limits.
///
/// ```no_run
/// use std::sync::Arc;
/// use dealdoc::{Extractor, api::{ApiSizeLimits, ApiState, create_router_with_limits}};
/// use dealdoc::store::MemoryDocumentStore;
///
/// let state = ApiState::new(Extractor::default()).with_store(Arc::new(MemoryDocumentStore::new()));
/// let router = create_router_with_limits(state, ApiSizeLimits::from_mb(20));
/// ```
pub fn create_router_with_limits(state: ApiState, limits: ApiSizeLimits) -> Router {
    Router::new()
        .route("/extract", post(extract_handler).fallback(method_not_allowed_handler))
        .route("/health", get(health_handler))
        .route("/info", get(info_handler))
        .layer(DefaultBodyLimit::max(limits.max_request_body_bytes))
        .layer(RequestBodyLimitLayer::new(limits.max_request_body_bytes))
        .layer(cors_layer_from_env())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the API server with config file discovery.
///
/// Looks for `dealdoc.toml` in the current and parent directories and falls
/// back to the default configuration.
///
/// # Environment Variables
///
/// ```bash
/// export DEALDOC_CORS_ORIGINS="https://app.example.com"
/// export DEALDOC_MAX_REQUEST_BODY_BYTES=52428800
/// ```
pub async fn serve(host: impl AsRef<str>, port: u16) -> Result<()> {
    let config = match ExtractionConfig::discover()? {
        Some(config) => {
            tracing::info!("Loaded extraction config from discovered file");
            config
        }
        None => {
            tracing::info!("No config file found, using default configuration");
            ExtractionConfig::default()
        }
    };

    serve_with_config(host, port, config).await
}

/// Start the API server with an explicit config and size limits from the environment.
pub async fn serve_with_config(host: impl AsRef<str>, port: u16, config: ExtractionConfig) -> Result<()> {
    let extractor = Extractor::builder().config(config).build()?;
    let result = serve_with_state(host, port, ApiState::new(extractor.clone()), parse_size_limits_from_env()).await;
    extractor.shutdown();
    result
}

/// Start the API server with a fully assembled state.
pub async fn serve_with_state(host: impl AsRef<str>, port: u16, state: ApiState, limits: ApiSizeLimits) -> Result<()> {
    let ip: IpAddr = host
        .as_ref()
        .parse()
        .map_err(|e| DealdocError::validation(format!("Invalid host address: {}", e)))?;

    let addr = SocketAddr::new(ip, port);
    let app = create_router_with_limits(state, limits);

    tracing::info!("Starting dealdoc API server on http://{}:{}", ip, port);

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(DealdocError::Io)?;

    axum::serve(listener, app)
        .await
        .map_err(|e| DealdocError::Other(e.to_string()))?;

    Ok(())
}
