//! Cross-cutting error types for formstash.
//!
//! Domain-specific errors (`DatabaseError`, `RetentionError`, `ExportError`)
//! live next to the code that raises them. A unified error only exists at
//! the binary edge, where everything converges into `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any formstash crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Data failed validation (bucket length, malformed values).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Validate a bucket identifier before it is written.
///
/// # Errors
///
/// Returns `CoreError::Validation` if the identifier is empty or longer than
/// [`crate::MAX_BUCKET_LEN`] characters.
pub fn validate_bucket(bucket: &str) -> Result<(), CoreError> {
    let len = bucket.chars().count();
    if len == 0 {
        return Err(CoreError::Validation("bucket must not be empty".into()));
    }
    if len > crate::MAX_BUCKET_LEN {
        return Err(CoreError::Validation(format!(
            "bucket must be at most {} characters, got {len}",
            crate::MAX_BUCKET_LEN
        )));
    }
    Ok(())
}
