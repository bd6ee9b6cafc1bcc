use chrono::{DateTime, Utc};
use stash_core::interval::CalendarInterval;
use stash_db::retention::{BucketReport, RetentionEngine};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::CleanupAllArgs;
use crate::context::AppContext;
use crate::output::output_rows;

const INTERVAL_HINT: &str = "Use an ISO 8601 interval, e.g. --interval P30D, P6M or P1Y2M3D. \
See https://www.php.net/manual/en/dateinterval.construct.php";

/// Clean every bucket with a configured rule. Per-bucket problems are
/// reported in the table; the command itself succeeds.
pub async fn configured(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let engine = RetentionEngine::new(&ctx.service);
    let reports = engine.run_configured_cleanup(&ctx.config.cleanup).await;
    print_reports(&reports, flags)
}

/// Clean all buckets with one interval.
pub async fn all_buckets(args: &CleanupAllArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let interval = parse_interval_argument(&args.interval, Utc::now())?;
    let engine = RetentionEngine::new(&ctx.service);
    let reports = engine
        .run_all_buckets_cleanup(
            &interval,
            args.remove_files,
            args.include_configured_buckets,
            &ctx.config.cleanup,
        )
        .await?;
    print_reports(&reports, flags)
}

/// Parse `--interval`, rejecting values that cannot be applied at `now`.
pub fn parse_interval_argument(value: &str, now: DateTime<Utc>) -> anyhow::Result<CalendarInterval> {
    if value.trim().is_empty() {
        anyhow::bail!("missing --interval. {INTERVAL_HINT}");
    }
    let interval: CalendarInterval = value
        .parse()
        .map_err(|error| anyhow::anyhow!("{error}. {INTERVAL_HINT}"))?;
    interval
        .days_to_keep_from(now)
        .map_err(|error| anyhow::anyhow!("{error}. {INTERVAL_HINT}"))?;
    Ok(interval)
}

fn print_reports(reports: &[BucketReport], flags: &GlobalFlags) -> anyhow::Result<()> {
    let headers = vec!["bucket".to_string(), "message".to_string()];
    let rows = reports
        .iter()
        .map(|report| vec![report.bucket.clone(), report.message.clone()])
        .collect::<Vec<_>>();
    output_rows(&reports, &headers, &rows, flags.format)
}
