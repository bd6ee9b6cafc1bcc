use serde::Serialize;
use stash_db::retention::RetentionEngine;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{DeleteAllArgs, DeleteEntryArgs};
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct DeleteEntryResponse {
    id: String,
    deleted: bool,
    remove_files: bool,
}

#[derive(Debug, Serialize)]
struct DeleteAllResponse {
    bucket: String,
    removed: u64,
    remove_files: bool,
}

pub async fn entry(args: &DeleteEntryArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    ctx.service
        .delete_entry(&args.id, args.remove_files)
        .await
        .map_err(|error| anyhow::anyhow!("failed to delete entry '{}': {error}", args.id))?;
    output(
        &DeleteEntryResponse {
            id: args.id.clone(),
            deleted: true,
            remove_files: args.remove_files,
        },
        flags.format,
    )
}

/// Cleanup without an interval: every entry of the bucket goes.
pub async fn all(args: &DeleteAllArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let engine = RetentionEngine::new(&ctx.service);
    let removed = engine.cleanup(&args.bucket, None, args.remove_files).await?;
    output(
        &DeleteAllResponse {
            bucket: args.bucket.clone(),
            removed,
            remove_files: args.remove_files,
        },
        flags.format,
    )
}
