use std::path::PathBuf;

use anyhow::Context;
use serde::Serialize;
use stash_core::export::BuiltinSink;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ExportArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct ExportResponse {
    bucket: String,
    path: String,
    content_type: String,
    bytes: usize,
}

pub async fn run(args: &ExportArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let format_name = args
        .export_type
        .as_deref()
        .unwrap_or(&ctx.config.export.default_format);

    let document = ctx
        .service
        .export_bucket(
            &args.bucket,
            format_name,
            args.with_datetime,
            &ctx.settings,
            &ctx.registry,
            &BuiltinSink,
            &ctx.config.export.document_properties(),
        )
        .await?;

    let path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&document.filename));
    tokio::fs::write(&path, &document.bytes)
        .await
        .with_context(|| format!("failed to write export to {}", path.display()))?;

    output(
        &ExportResponse {
            bucket: args.bucket.clone(),
            path: path.display().to_string(),
            content_type: document.content_type,
            bytes: document.bytes.len(),
        },
        flags.format,
    )
}
