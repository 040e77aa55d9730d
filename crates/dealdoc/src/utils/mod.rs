//! Small helpers shared by the extractors.

pub mod panic_guard;

pub use panic_guard::{catch_library_panic, run_blocking_guarded};
