//! Text cleanup shared by every format path.

pub mod normalize;

pub use normalize::{normalize_text, normalize_whitespace, repair_missing_spaces, strip_control_chars};
