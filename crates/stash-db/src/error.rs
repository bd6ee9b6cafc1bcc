//! Database error types for stash-db.

use stash_core::errors::CoreError;
use stash_core::export::ExportError;
use thiserror::Error;

use crate::resources::ResourceError;

/// Errors from storage operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (e.g., bad data in DB).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Domain validation failed before touching storage.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The resource store failed for a reason other than a missing file.
    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Export(#[from] ExportError),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
