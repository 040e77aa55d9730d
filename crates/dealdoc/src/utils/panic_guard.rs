//! Containment for third-party parsers that panic on malformed input.
//!
//! `pdf-extract`, `lopdf` and `docx-lite` occasionally panic (index out of
//! bounds, unwraps on broken font tables) instead of returning an error. One
//! bad upload must not take the worker down with it, so every library call is
//! routed through [`catch_library_panic`]. Calls made from async code also
//! leave the runtime's worker threads through [`run_blocking_guarded`].

use crate::{DealdocError, Result};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Run `job`, converting a panic into `DealdocError::Parsing`.
///
/// `library` names the crate being called and only appears in the error
/// message, which is logged and never shown to uploaders.
pub fn catch_library_panic<T, F>(library: &str, job: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    match panic::catch_unwind(AssertUnwindSafe(job)) {
        Ok(result) => result,
        Err(payload) => {
            let reason = panic_reason(&payload);
            tracing::warn!(library, reason = %reason, "Parsing library panicked");
            Err(DealdocError::parsing(format!("{} panicked: {}", library, reason)))
        }
    }
}

/// Run `job` over a copy of `content` on tokio's blocking pool, with panics
/// contained as in [`catch_library_panic`].
///
/// # Errors
///
/// The job's own error, or `DealdocError::Parsing` if it panicked or the
/// blocking task could not complete.
pub async fn run_blocking_guarded<T, F>(library: &'static str, content: &[u8], job: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&[u8]) -> Result<T> + Send + 'static,
{
    let content_owned = content.to_vec();
    tokio::task::spawn_blocking(move || catch_library_panic(library, || job(&content_owned)))
        .await
        .map_err(|e| DealdocError::parsing(format!("{} task failed: {}", library, e)))?
}

fn panic_reason(payload: &Box<dyn Any + Send + 'static>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
