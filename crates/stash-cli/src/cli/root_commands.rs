use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Remove outdated entries of every bucket that has a cleanup rule.
    CleanupConfiguredBuckets,
    /// Remove outdated entries of all buckets using one interval.
    CleanupAllBuckets(CleanupAllArgs),
    /// List all buckets holding entries.
    ListBuckets,
    /// Show the entries of a bucket.
    Show(ShowArgs),
    /// Export the entries of a bucket to a file.
    Export(ExportArgs),
    /// Delete a single entry.
    DeleteEntry(DeleteEntryArgs),
    /// Delete every entry of a bucket.
    DeleteAll(DeleteAllArgs),
    /// Store a submission.
    Store(StoreArgs),
}

#[derive(Clone, Debug, Args)]
pub struct CleanupAllArgs {
    /// ISO 8601 interval to keep entries for, e.g. P30D or P1Y2M.
    #[arg(long, default_value = "")]
    pub interval: String,
    /// Also delete files referenced by removed entries.
    #[arg(long)]
    pub remove_files: bool,
    /// Also clean buckets that have their own cleanup rule.
    #[arg(long)]
    pub include_configured_buckets: bool,
}

#[derive(Clone, Debug, Args)]
pub struct ShowArgs {
    pub bucket: String,
}

#[derive(Clone, Debug, Args)]
pub struct ExportArgs {
    pub bucket: String,
    /// Export format name (defaults to `export.default_format`).
    #[arg(long = "type", value_name = "FORMAT")]
    pub export_type: Option<String>,
    /// Append a DateTime column with each entry's creation time.
    #[arg(long)]
    pub with_datetime: bool,
    /// Output path (defaults to the export filename in the current directory).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct DeleteEntryArgs {
    pub id: String,
    /// Also delete files referenced by the entry.
    #[arg(long)]
    pub remove_files: bool,
}

#[derive(Clone, Debug, Args)]
pub struct DeleteAllArgs {
    pub bucket: String,
    /// Also delete files referenced by the entries.
    #[arg(long)]
    pub remove_files: bool,
}

#[derive(Clone, Debug, Args)]
pub struct StoreArgs {
    /// Bucket to store into (`__undefined__` when omitted).
    #[arg(long)]
    pub bucket: Option<String>,
    /// Field values as a JSON object.
    #[arg(long)]
    pub json: Option<String>,
    /// Plain text field, `key=value`. Repeatable.
    #[arg(long = "field", value_name = "KEY=VALUE")]
    pub fields: Vec<String>,
    /// File field, `key=path`. The file is imported as a resource. Repeatable.
    #[arg(long = "attach", value_name = "KEY=PATH")]
    pub attachments: Vec<String>,
}
