//! Oxidock Common - Shared errors and the sandboxed HTTP client used across all Oxidock crates.

pub mod error;
pub mod sandbox;

// Re-export commonly used types
pub use error::{OxidockError, Result};
