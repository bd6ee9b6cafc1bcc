//! # stash-db
//!
//! libSQL storage for formstash entries.
//!
//! Holds every submitted entry in one `entries` table keyed by bucket,
//! cascades deletions to uploaded files through a [`resources::ResourceStore`],
//! and runs age-based retention over buckets via [`retention::RetentionEngine`].

pub mod error;
pub mod export;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod resources;
pub mod retention;
pub mod service;

use error::DatabaseError;
use libsql::Builder;

/// Prefix of entry ids.
pub const PREFIX_ENTRY: &str = "ent";
/// Prefix of imported resource ids.
pub const PREFIX_RESOURCE: &str = "res";

/// Database handle for the entry store.
pub struct StashDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl StashDb {
    /// Open a local database at the given path, or `":memory:"`.
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        let stash_db = Self { db, conn };
        stash_db.run_migrations().await?;
        Ok(stash_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"ent-a3f8b2c1d4e5f607"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(8)))"),
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    async fn test_db() -> StashDb {
        StashDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;
        let mut rows = db
            .conn()
            .query(
                "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                ["entries"],
            )
            .await
            .unwrap();
        assert!(rows.next().await.unwrap().is_some(), "entries table should exist");
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let db = test_db().await;
        let id = db.generate_id(PREFIX_ENTRY).await.unwrap();
        assert!(id.starts_with("ent-"), "ID should start with 'ent-': {id}");
        assert_eq!(id.len(), 20, "3 prefix + 1 dash + 16 hex: {id}");
        assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn generate_id_uniqueness() {
        let db = test_db().await;
        let mut ids = HashSet::new();
        for _ in 0..100 {
            let id = db.generate_id(PREFIX_RESOURCE).await.unwrap();
            assert!(ids.insert(id.clone()), "Duplicate ID generated: {id}");
        }
    }

    #[tokio::test]
    async fn bucket_length_is_checked_by_schema() {
        let db = test_db().await;
        let result = db
            .conn()
            .execute(
                "INSERT INTO entries (id, bucket, properties, created_at) VALUES ('ent-1', '', '{}', '2024-01-01T00:00:00.000000Z')",
                (),
            )
            .await;
        assert!(result.is_err(), "empty bucket should be rejected");
    }
}
