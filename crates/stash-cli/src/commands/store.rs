use std::path::Path;

use anyhow::Context;
use stash_core::entities::{Properties, PropertyValue};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::StoreArgs;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(args: &StoreArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut values = match &args.json {
        Some(json) => serde_json::from_str::<Properties>(json).context("--json must be a JSON object")?,
        None => Properties::new(),
    };
    for field in &args.fields {
        let (key, value) = split_pair(field, "--field")?;
        values.insert(key, PropertyValue::from(value));
    }
    for attachment in &args.attachments {
        let (key, path) = split_pair(attachment, "--attach")?;
        let path = Path::new(path);
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .with_context(|| format!("{} has no file name", path.display()))?;
        let resource = ctx.service.import_resource(filename, None, bytes).await?;
        values.insert(key, PropertyValue::Resource(resource));
    }

    let entry = ctx
        .service
        .store_submission(args.bucket.as_deref(), values, &ctx.settings)
        .await?;
    output(&entry, flags.format)
}

fn split_pair<'a>(pair: &'a str, flag: &str) -> anyhow::Result<(&'a str, &'a str)> {
    pair.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .with_context(|| format!("{flag} expects KEY=VALUE, got '{pair}'"))
}
