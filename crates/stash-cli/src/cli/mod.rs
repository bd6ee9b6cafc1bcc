use std::path::PathBuf;

use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `formstash` binary.
#[derive(Debug, Parser)]
#[command(name = "formstash", version, about = "formstash - stored form submissions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Extra TOML config file layered above the discovered ones
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
            config: self.config.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cleanup_all_buckets_flags() {
        let cli = Cli::try_parse_from([
            "formstash",
            "cleanup-all-buckets",
            "--interval",
            "P30D",
            "--remove-files",
        ])
        .expect("cli should parse");

        let Commands::CleanupAllBuckets(args) = cli.command else {
            panic!("expected cleanup-all-buckets");
        };
        assert_eq!(args.interval, "P30D");
        assert!(args.remove_files);
        assert!(!args.include_configured_buckets);
    }

    #[test]
    fn cleanup_all_buckets_interval_defaults_to_empty() {
        let cli = Cli::try_parse_from(["formstash", "cleanup-all-buckets"]).expect("cli should parse");
        assert!(matches!(cli.command, Commands::CleanupAllBuckets(args) if args.interval.is_empty()));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["formstash", "list-buckets", "--format", "json", "--quiet"])
            .expect("cli should parse");
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::ListBuckets));
    }

    #[test]
    fn default_output_is_table() {
        let cli = Cli::try_parse_from(["formstash", "cleanup-configured-buckets"]).expect("cli should parse");
        assert_eq!(cli.format, OutputFormat::Table);
    }

    #[test]
    fn export_options() {
        let cli = Cli::try_parse_from([
            "formstash",
            "export",
            "newsletter",
            "--type",
            "Csv",
            "--with-datetime",
            "-o",
            "/tmp/out.csv",
        ])
        .expect("cli should parse");
        let Commands::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.bucket, "newsletter");
        assert_eq!(args.export_type.as_deref(), Some("Csv"));
        assert!(args.with_datetime);
        assert_eq!(args.output.as_deref(), Some(std::path::Path::new("/tmp/out.csv")));
    }

    #[test]
    fn store_collects_repeated_fields() {
        let cli = Cli::try_parse_from([
            "formstash",
            "store",
            "--bucket",
            "contact",
            "--field",
            "name=Ada",
            "--field",
            "email=ada@example.com",
        ])
        .expect("cli should parse");
        let Commands::Store(args) = cli.command else {
            panic!("expected store");
        };
        assert_eq!(args.fields.len(), 2);
        assert!(args.attachments.is_empty());
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        assert!(Cli::try_parse_from(["formstash", "--format", "xml", "list-buckets"]).is_err());
    }
}
