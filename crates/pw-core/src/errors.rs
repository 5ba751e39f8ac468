//! Cross-cutting error types for Postwright.
//!
//! Domain-specific errors (`DatabaseError`, `GenerationError`, `AuthError`) are
//! defined in their respective crates. `pw-cli` is where they all converge.

use thiserror::Error;

/// Errors that can be raised by any Postwright crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
