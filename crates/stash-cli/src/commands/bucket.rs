use std::collections::BTreeSet;

use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ShowArgs;
use crate::context::AppContext;
use crate::output::output_rows;

#[derive(Debug, Serialize)]
struct BucketSummary {
    bucket: String,
    entries: u64,
}

/// All buckets with their entry counts.
pub async fn list(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let buckets = ctx.service.list_buckets(&BTreeSet::new()).await?;
    let mut summaries = Vec::with_capacity(buckets.len());
    for bucket in buckets {
        let entries = ctx.service.count_entries(&bucket).await?;
        summaries.push(BucketSummary { bucket, entries });
    }

    let headers = vec!["bucket".to_string(), "entries".to_string()];
    let rows = summaries
        .iter()
        .map(|summary| vec![summary.bucket.clone(), summary.entries.to_string()])
        .collect::<Vec<_>>();
    output_rows(&summaries, &headers, &rows, flags.format)
}

/// Entries of one bucket, newest first.
pub async fn show(args: &ShowArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let listing = ctx.service.show_bucket(&args.bucket, &ctx.settings).await?;

    let mut headers = vec!["id".to_string(), "created".to_string()];
    headers.extend(listing.labels.iter().cloned());
    let rows = listing
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![row.id.clone(), row.created_at.clone()];
            cells.extend(row.values.iter().cloned());
            cells
        })
        .collect::<Vec<_>>();
    output_rows(&listing, &headers, &rows, flags.format)
}
