use chrono::Utc;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Reject malformed arguments before any storage is opened.
pub fn preflight(command: &Commands) -> anyhow::Result<()> {
    if let Commands::CleanupAllBuckets(args) = command {
        commands::cleanup::parse_interval_argument(&args.interval, Utc::now())?;
    }
    Ok(())
}

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::CleanupConfiguredBuckets => commands::cleanup::configured(ctx, flags).await,
        Commands::CleanupAllBuckets(args) => commands::cleanup::all_buckets(&args, ctx, flags).await,
        Commands::ListBuckets => commands::bucket::list(ctx, flags).await,
        Commands::Show(args) => commands::bucket::show(&args, ctx, flags).await,
        Commands::Export(args) => commands::export::run(&args, ctx, flags).await,
        Commands::DeleteEntry(args) => commands::delete::entry(&args, ctx, flags).await,
        Commands::DeleteAll(args) => commands::delete::all(&args, ctx, flags).await,
        Commands::Store(args) => commands::store::run(&args, ctx, flags).await,
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn command(args: &[&str]) -> Commands {
        Cli::try_parse_from(std::iter::once("formstash").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    #[test]
    fn preflight_rejects_missing_interval() {
        assert!(preflight(&command(&["cleanup-all-buckets"])).is_err());
        assert!(preflight(&command(&["cleanup-all-buckets", "--interval", "P1000000000Y"])).is_err());
    }

    #[test]
    fn preflight_accepts_valid_commands() {
        assert!(preflight(&command(&["cleanup-all-buckets", "--interval", "P30D"])).is_ok());
        assert!(preflight(&command(&["list-buckets"])).is_ok());
    }
}
