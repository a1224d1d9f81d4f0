//! Data models for the KTravel backend.
//!
//! Field names serialize in camelCase to match the admin UI.

mod admin;
mod carousel;
mod content;
mod tour;

pub use admin::*;
pub use carousel::*;
pub use content::*;
pub use tour::*;

/// `None` for a missing or empty string.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
