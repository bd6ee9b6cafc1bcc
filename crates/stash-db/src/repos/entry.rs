//! Entry repository: writes, reads, bucket listing and cascading deletes.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use stash_core::entities::{Entry, Properties};
use stash_core::errors::validate_bucket;
use stash_core::schema::SchemaResolver;
use stash_core::UNDEFINED_BUCKET;
use tracing::{debug, info, warn};

use crate::PREFIX_ENTRY;
use crate::error::DatabaseError;
use crate::export::FieldSettings;
use crate::helpers::{format_timestamp, parse_datetime, parse_properties};
use crate::resources::ResourceError;
use crate::service::StashService;

fn row_to_entry(row: &libsql::Row) -> Result<Entry, DatabaseError> {
    Ok(Entry {
        id: row.get::<String>(0)?,
        bucket: row.get::<String>(1)?,
        properties: parse_properties(row.get::<Option<String>>(2)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
    })
}

fn to_count(value: i64) -> Result<u64, DatabaseError> {
    u64::try_from(value).map_err(|_| DatabaseError::InvalidState(format!("negative count {value}")))
}

impl StashService {
    /// Insert an entry with an explicit creation time.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Core` for an invalid bucket name.
    pub async fn insert_entry(
        &self,
        bucket: &str,
        properties: Properties,
        created_at: DateTime<Utc>,
    ) -> Result<Entry, DatabaseError> {
        validate_bucket(bucket)?;
        let id = self.db().generate_id(PREFIX_ENTRY).await?;
        let json = serde_json::to_string(&properties).map_err(|e| DatabaseError::Other(e.into()))?;

        self.db()
            .conn()
            .execute(
                "INSERT INTO entries (id, bucket, properties, created_at) VALUES (?1, ?2, ?3, ?4)",
                libsql::params![id.as_str(), bucket, json, format_timestamp(created_at)],
            )
            .await?;

        Ok(Entry {
            id,
            bucket: bucket.to_string(),
            properties,
            created_at,
        })
    }

    /// Store one form submission with `created_at = now`.
    ///
    /// A missing or empty bucket is stored as `__undefined__`. For named
    /// buckets, values whose element type is ignored in the finisher are
    /// dropped before writing.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Core` for a bucket name longer than allowed.
    pub async fn store_submission(
        &self,
        bucket: Option<&str>,
        mut values: Properties,
        settings: &FieldSettings,
    ) -> Result<Entry, DatabaseError> {
        let bucket = match bucket {
            Some(bucket) if !bucket.is_empty() => {
                let resolver = settings.resolver(bucket);
                values.retain(|key, _| {
                    resolver
                        .resolve(key)
                        .is_none_or(|schema| !settings.ignored_in_finisher.contains(&schema.type_name))
                });
                bucket
            }
            _ => UNDEFINED_BUCKET,
        };
        let entry = self.insert_entry(bucket, values, Utc::now()).await?;
        info!(bucket = %entry.bucket, id = %entry.id, fields = entry.properties.len(), "stored submission");
        Ok(entry)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no entry has this id.
    pub async fn get_entry(&self, id: &str) -> Result<Entry, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, bucket, properties, created_at FROM entries WHERE id = ?1",
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_entry(&row)
    }

    /// All entries of `bucket`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or a row cannot be parsed.
    pub async fn list_entries(&self, bucket: &str) -> Result<Vec<Entry>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, bucket, properties, created_at FROM entries
                 WHERE bucket = ?1 ORDER BY created_at DESC, id",
                [bucket],
            )
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_entry(&row)?);
        }
        Ok(entries)
    }

    /// Distinct buckets in storage, ascending, minus `excluding`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_buckets(&self, excluding: &BTreeSet<String>) -> Result<Vec<String>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query("SELECT DISTINCT bucket FROM entries ORDER BY bucket", ())
            .await?;
        let mut buckets = Vec::new();
        while let Some(row) = rows.next().await? {
            let bucket = row.get::<String>(0)?;
            if !excluding.contains(&bucket) {
                buckets.push(bucket);
            }
        }
        Ok(buckets)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn count_entries(&self, bucket: &str) -> Result<u64, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query("SELECT COUNT(*) FROM entries WHERE bucket = ?1", [bucket])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        to_count(row.get::<i64>(0)?)
    }

    /// Delete one entry by id, optionally with the files it references.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no entry has this id.
    pub async fn delete_entry(&self, id: &str, remove_resources: bool) -> Result<(), DatabaseError> {
        let entry = self.get_entry(id).await?;
        self.remove_entry(&entry, remove_resources).await
    }

    /// Delete every entry of `bucket` created at or before `threshold`, or all
    /// of them when `threshold` is `None`. Returns the number deleted.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` on query failures or resource store failures
    /// other than a missing file.
    pub async fn delete_entries_older_than(
        &self,
        bucket: &str,
        threshold: Option<DateTime<Utc>>,
        remove_resources: bool,
    ) -> Result<u64, DatabaseError> {
        let mut rows = match threshold {
            Some(threshold) => {
                self.db()
                    .conn()
                    .query(
                        "SELECT id, bucket, properties, created_at FROM entries
                         WHERE bucket = ?1 AND created_at <= ?2",
                        libsql::params![bucket, format_timestamp(threshold)],
                    )
                    .await?
            }
            None => {
                self.db()
                    .conn()
                    .query(
                        "SELECT id, bucket, properties, created_at FROM entries WHERE bucket = ?1",
                        [bucket],
                    )
                    .await?
            }
        };
        let mut outdated = Vec::new();
        while let Some(row) = rows.next().await? {
            outdated.push(row_to_entry(&row)?);
        }

        let mut removed = 0;
        for entry in &outdated {
            self.remove_entry(entry, remove_resources).await?;
            removed += 1;
        }
        Ok(removed)
    }

    async fn remove_entry(&self, entry: &Entry, remove_resources: bool) -> Result<(), DatabaseError> {
        if remove_resources {
            for resource in entry.resources() {
                match self.resources().delete(resource).await {
                    Ok(()) => debug!(id = %entry.id, resource = %resource.identifier, "removed resource"),
                    Err(ResourceError::NotFound(identifier)) => warn!(
                        id = %entry.id,
                        resource = %identifier,
                        "resource already gone; deleting entry anyway"
                    ),
                    Err(other) => return Err(other.into()),
                }
            }
        }
        self.db()
            .conn()
            .execute("DELETE FROM entries WHERE id = ?1", [entry.id.as_str()])
            .await?;
        Ok(())
    }
}
