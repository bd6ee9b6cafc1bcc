//! Age-based cleanup of buckets.
//!
//! A bucket is cleaned with a calendar interval: the interval is turned into
//! a whole-day count relative to the engine's clock, and every entry at least
//! that many days old is deleted. Batch runs report one [`BucketReport`] per
//! bucket; a misconfigured or failing bucket never stops the others.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use stash_config::CleanupRule;
use stash_core::interval::{CalendarInterval, IntervalError};
use thiserror::Error;
use tracing::{info, warn};

use crate::error::DatabaseError;
use crate::service::StashService;

#[derive(Debug, Error)]
pub enum RetentionError {
    /// Missing or unparsable retention rule for a bucket.
    #[error("Configuration error for bucket '{bucket}': {reason}")]
    Configuration { bucket: String, reason: String },

    #[error(transparent)]
    Interval(#[from] IntervalError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// What happened to one bucket in a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CleanupOutcome {
    Removed { removed: u64, total: u64, days_to_keep: i64 },
    Empty,
    ConfigurationError,
    Failed,
}

/// Per-bucket line of a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketReport {
    pub bucket: String,
    pub message: String,
    #[serde(flatten)]
    pub outcome: CleanupOutcome,
}

impl BucketReport {
    fn new(bucket: &str, outcome: CleanupOutcome, message: impl Into<String>) -> Self {
        Self {
            bucket: bucket.to_string(),
            message: message.into(),
            outcome,
        }
    }
}

/// Cleanup driver over a [`StashService`] with a fixed reference time.
pub struct RetentionEngine<'a> {
    service: &'a StashService,
    now: DateTime<Utc>,
}

impl<'a> RetentionEngine<'a> {
    #[must_use]
    pub fn new(service: &'a StashService) -> Self {
        Self::at(service, Utc::now())
    }

    /// Engine whose "now" is `now`.
    #[must_use]
    pub const fn at(service: &'a StashService, now: DateTime<Utc>) -> Self {
        Self { service, now }
    }

    /// Distinct buckets in storage minus `excluding`.
    ///
    /// # Errors
    ///
    /// Returns `RetentionError::Database` if the query fails.
    pub async fn list_buckets(&self, excluding: &BTreeSet<String>) -> Result<Vec<String>, RetentionError> {
        Ok(self.service.list_buckets(excluding).await?)
    }

    /// # Errors
    ///
    /// Returns `RetentionError::Database` if the query fails.
    pub async fn count_entries(&self, bucket: &str) -> Result<u64, RetentionError> {
        Ok(self.service.count_entries(bucket).await?)
    }

    /// The configured interval of `bucket`.
    ///
    /// # Errors
    ///
    /// Returns `RetentionError::Configuration` if the bucket has no rule, the
    /// rule has no interval, or the interval does not parse.
    pub fn resolve_interval(
        bucket: &str,
        rules: &BTreeMap<String, CleanupRule>,
    ) -> Result<CalendarInterval, RetentionError> {
        let configuration = |reason: String| RetentionError::Configuration {
            bucket: bucket.to_string(),
            reason,
        };
        let rule = rules
            .get(bucket)
            .ok_or_else(|| configuration("no cleanup rule configured".into()))?;
        if rule.interval.trim().is_empty() {
            return Err(configuration("no cleanup interval configured".into()));
        }
        rule.interval
            .parse()
            .map_err(|e: IntervalError| configuration(e.to_string()))
    }

    /// Whole days `interval` spans from this engine's "now".
    ///
    /// # Errors
    ///
    /// Returns `RetentionError::Interval` if the interval overflows.
    pub fn days_to_keep(&self, interval: &CalendarInterval) -> Result<i64, RetentionError> {
        Ok(interval.days_to_keep_from(self.now)?)
    }

    /// Delete entries of `bucket` aged at least `days_to_keep(interval)` days,
    /// or every entry when `interval` is `None`. Returns the number deleted.
    ///
    /// # Errors
    ///
    /// Returns `RetentionError` on interval overflow or storage failure.
    pub async fn cleanup(
        &self,
        bucket: &str,
        interval: Option<&CalendarInterval>,
        remove_resources: bool,
    ) -> Result<u64, RetentionError> {
        let threshold = match interval {
            Some(interval) => Some(self.now - Duration::days(self.days_to_keep(interval)?)),
            None => None,
        };
        Ok(self
            .service
            .delete_entries_older_than(bucket, threshold, remove_resources)
            .await?)
    }

    /// Clean every configured bucket with its own rule.
    pub async fn run_configured_cleanup(&self, rules: &BTreeMap<String, CleanupRule>) -> Vec<BucketReport> {
        info!(buckets = rules.len(), "starting configured cleanup");
        let mut reports = Vec::with_capacity(rules.len());
        for (bucket, rule) in rules {
            let report = match Self::resolve_interval(bucket, rules) {
                Ok(interval) => self.clean_bucket(bucket, &interval, rule.remove_files).await,
                Err(error) => Self::failure_report(bucket, &error),
            };
            reports.push(report);
        }
        reports
    }

    /// Clean every bucket in storage with one interval.
    ///
    /// Unless `include_configured` is set, buckets that have their own rule
    /// are left alone.
    ///
    /// # Errors
    ///
    /// Returns `RetentionError::Database` if the buckets cannot be listed.
    pub async fn run_all_buckets_cleanup(
        &self,
        interval: &CalendarInterval,
        remove_resources: bool,
        include_configured: bool,
        rules: &BTreeMap<String, CleanupRule>,
    ) -> Result<Vec<BucketReport>, RetentionError> {
        let excluding: BTreeSet<String> = if include_configured {
            BTreeSet::new()
        } else {
            rules.keys().cloned().collect()
        };
        let buckets = self.list_buckets(&excluding).await?;
        info!(
            buckets = buckets.len(),
            excluded = excluding.len(),
            %interval,
            "starting cleanup of all buckets"
        );

        let mut reports = Vec::with_capacity(buckets.len());
        for bucket in &buckets {
            reports.push(self.clean_bucket(bucket, interval, remove_resources).await);
        }
        Ok(reports)
    }

    async fn clean_bucket(&self, bucket: &str, interval: &CalendarInterval, remove_resources: bool) -> BucketReport {
        match self.try_clean_bucket(bucket, interval, remove_resources).await {
            Ok(report) => report,
            Err(error) => Self::failure_report(bucket, &error),
        }
    }

    async fn try_clean_bucket(
        &self,
        bucket: &str,
        interval: &CalendarInterval,
        remove_resources: bool,
    ) -> Result<BucketReport, RetentionError> {
        let days_to_keep = self.days_to_keep(interval)?;
        let total = self.count_entries(bucket).await?;
        if total == 0 {
            info!(bucket, "no entries found");
            return Ok(BucketReport::new(bucket, CleanupOutcome::Empty, "No entries found"));
        }

        let removed = self.cleanup(bucket, Some(interval), remove_resources).await?;
        info!(bucket, removed, total, days_to_keep, remove_resources, "bucket cleaned");
        Ok(BucketReport::new(
            bucket,
            CleanupOutcome::Removed {
                removed,
                total,
                days_to_keep,
            },
            format!("Removed {removed} of {total} entries older than {days_to_keep} days"),
        ))
    }

    fn failure_report(bucket: &str, error: &RetentionError) -> BucketReport {
        warn!(bucket, %error, "bucket cleanup failed");
        let outcome = match error {
            RetentionError::Configuration { .. } | RetentionError::Interval(_) => CleanupOutcome::ConfigurationError,
            RetentionError::Database(_) => CleanupOutcome::Failed,
        };
        BucketReport::new(bucket, outcome, error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use stash_core::entities::{Properties, PropertyValue, ResourceRef};

    use super::*;
    use crate::StashDb;
    use crate::resources::{ResourceError, ResourceStore};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn rules(pairs: &[(&str, &str, bool)]) -> BTreeMap<String, CleanupRule> {
        pairs
            .iter()
            .map(|(bucket, interval, remove_files)| {
                (
                    (*bucket).to_string(),
                    CleanupRule {
                        interval: (*interval).to_string(),
                        remove_files: *remove_files,
                    },
                )
            })
            .collect()
    }

    async fn seed(svc: &StashService, bucket: &str, ages_in_days: &[i64]) {
        for age in ages_in_days {
            svc.insert_entry(bucket, Properties::new(), now() - Duration::days(*age))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn configured_cleanup_removes_entries_at_or_past_threshold() {
        let svc = StashService::in_memory().await.unwrap();
        seed(&svc, "newsletter", &[1, 10, 29, 30, 40]).await;
        let engine = RetentionEngine::at(&svc, now());

        let reports = engine
            .run_configured_cleanup(&rules(&[("newsletter", "P30D", false)]))
            .await;

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].bucket, "newsletter");
        assert_eq!(
            reports[0].outcome,
            CleanupOutcome::Removed {
                removed: 2,
                total: 5,
                days_to_keep: 30
            }
        );
        assert!(reports[0].message.starts_with("Removed 2 of 5"));
        assert_eq!(svc.count_entries("newsletter").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn one_second_younger_than_threshold_is_kept() {
        let svc = StashService::in_memory().await.unwrap();
        let threshold = now() - Duration::days(7);
        svc.insert_entry("b", Properties::new(), threshold).await.unwrap();
        svc.insert_entry("b", Properties::new(), threshold + Duration::seconds(1))
            .await
            .unwrap();
        svc.insert_entry("b", Properties::new(), threshold + Duration::days(1))
            .await
            .unwrap();

        let engine = RetentionEngine::at(&svc, now());
        let removed = engine
            .cleanup("b", Some(&CalendarInterval::days(7)), false)
            .await
            .unwrap();
        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn cleanup_without_interval_deletes_everything() {
        let svc = StashService::in_memory().await.unwrap();
        seed(&svc, "b", &[0, 1, 500]).await;
        let engine = RetentionEngine::at(&svc, now());
        assert_eq!(engine.cleanup("b", None, false).await.unwrap(), 3);
        assert_eq!(engine.count_entries("b").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_bucket_is_reported_not_failed() {
        let svc = StashService::in_memory().await.unwrap();
        let engine = RetentionEngine::at(&svc, now());
        let reports = engine
            .run_configured_cleanup(&rules(&[("quiet", "P1D", false)]))
            .await;
        assert_eq!(reports[0].outcome, CleanupOutcome::Empty);
        assert_eq!(reports[0].message, "No entries found");
    }

    #[tokio::test]
    async fn bad_rule_does_not_stop_other_buckets() {
        let svc = StashService::in_memory().await.unwrap();
        seed(&svc, "b", &[5]).await;
        let engine = RetentionEngine::at(&svc, now());

        let reports = engine
            .run_configured_cleanup(&rules(&[("a", "thirty days", false), ("b", "P1D", false), ("c", "", false)]))
            .await;

        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].outcome, CleanupOutcome::ConfigurationError);
        assert!(reports[0].message.contains("'a'"));
        assert!(matches!(reports[1].outcome, CleanupOutcome::Removed { removed: 1, .. }));
        assert_eq!(reports[2].outcome, CleanupOutcome::ConfigurationError);
    }

    #[tokio::test]
    async fn all_buckets_cleanup_skips_configured_buckets() {
        let svc = StashService::in_memory().await.unwrap();
        seed(&svc, "newsletter", &[100]).await;
        seed(&svc, "contact", &[100]).await;
        let engine = RetentionEngine::at(&svc, now());
        let configured = rules(&[("newsletter", "P1Y", false)]);

        let reports = engine
            .run_all_buckets_cleanup(&CalendarInterval::days(30), false, false, &configured)
            .await
            .unwrap();

        assert_eq!(reports.iter().map(|r| r.bucket.as_str()).collect::<Vec<_>>(), vec!["contact"]);
        assert_eq!(svc.count_entries("newsletter").await.unwrap(), 1);
        assert_eq!(svc.count_entries("contact").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn all_buckets_cleanup_can_include_configured_buckets() {
        let svc = StashService::in_memory().await.unwrap();
        seed(&svc, "newsletter", &[100]).await;
        let engine = RetentionEngine::at(&svc, now());

        let reports = engine
            .run_all_buckets_cleanup(
                &CalendarInterval::days(30),
                false,
                true,
                &rules(&[("newsletter", "P1Y", false)]),
            )
            .await
            .unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(svc.count_entries("newsletter").await.unwrap(), 0);
    }

    #[rstest]
    #[case::thirty_one_day_month(Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap(), 31)]
    #[case::thirty_day_month(Utc.with_ymd_and_hms(2025, 4, 30, 0, 0, 0).unwrap(), 30)]
    fn days_to_keep_depends_on_the_clock(#[case] at: DateTime<Utc>, #[case] expected: i64) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let svc = rt.block_on(StashService::in_memory()).unwrap();
        let engine = RetentionEngine::at(&svc, at);
        assert_eq!(engine.days_to_keep(&CalendarInterval::months(1)).unwrap(), expected);
    }

    #[test]
    fn resolve_interval_requires_a_rule() {
        let configured = rules(&[("a", "P2W", false)]);
        assert_eq!(
            RetentionEngine::resolve_interval("a", &configured).unwrap(),
            CalendarInterval::days(14)
        );
        assert!(matches!(
            RetentionEngine::resolve_interval("missing", &configured),
            Err(RetentionError::Configuration { bucket, .. }) if bucket == "missing"
        ));
    }

    struct GoneStore;

    #[async_trait]
    impl ResourceStore for GoneStore {
        async fn put(&self, _resource: &ResourceRef, _bytes: Vec<u8>) -> Result<(), ResourceError> {
            Ok(())
        }

        async fn delete(&self, resource: &ResourceRef) -> Result<(), ResourceError> {
            Err(ResourceError::NotFound(resource.identifier.clone()))
        }

        async fn public_uri(&self, resource: &ResourceRef) -> Result<String, ResourceError> {
            Err(ResourceError::NotFound(resource.identifier.clone()))
        }
    }

    #[tokio::test]
    async fn missing_resources_are_swallowed_during_cleanup() {
        let db = StashDb::open_local(":memory:").await.unwrap();
        let svc = StashService::new(db, Arc::new(GoneStore));
        let mut values = Properties::new();
        values.insert(
            "uploads",
            PropertyValue::List(vec![
                PropertyValue::Resource(ResourceRef::new("res-1")),
                PropertyValue::Resource(ResourceRef::new("res-2")),
            ]),
        );
        svc.insert_entry("jobs", values, now() - Duration::days(60))
            .await
            .unwrap();

        let engine = RetentionEngine::at(&svc, now());
        let reports = engine
            .run_configured_cleanup(&rules(&[("jobs", "P1M", true)]))
            .await;
        assert!(matches!(reports[0].outcome, CleanupOutcome::Removed { removed: 1, total: 1, .. }));
    }
}
