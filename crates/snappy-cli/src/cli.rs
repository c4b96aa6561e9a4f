//! CLI command definitions and argument parsing.

use crate::error::{CliError, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use snappy_config::DEFAULT_CONFIG_PATH;
use std::path::PathBuf;

/// snappy - tiered ZFS snapshot manager (daily/weekly/monthly/yearly)
///
/// Without a subcommand, `snappy [--create] [--dry] <dataset>` behaves like
/// `snappy run`.
#[derive(Debug, Parser)]
#[command(name = "snappy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to sanoid.conf (or a .toml file)
    #[arg(long, global = true, env = "SNAPPY_CONF", default_value = DEFAULT_CONFIG_PATH)]
    pub conf: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format
    #[arg(short, long, value_enum, global = true, default_value = "table")]
    pub format: CliFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// zfs binary to run
    #[arg(long, global = true, env = "SNAPPY_ZFS")]
    pub zfs: Option<PathBuf>,

    /// Evaluate the policy as of this instant (RFC 3339) instead of now
    #[arg(long, global = true, value_parser = parse_instant, hide = true)]
    pub now: Option<DateTime<Utc>>,

    /// Dataset to manage when no subcommand is given
    pub dataset: Option<String>,

    /// Create today's daily snapshot (state-aware) when no subcommand is given
    #[arg(long)]
    pub create: bool,

    /// Dry-run mode when no subcommand is given
    #[arg(long)]
    pub dry: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (one action per line)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create (optionally) and apply retention to a dataset
    Run(RunArgs),

    /// Show tier windows and the retention plan without applying it
    Plan(PlanArgs),

    /// List a dataset's managed snapshots
    List(ListArgs),

    /// Apply retention on a schedule until interrupted
    Watch(WatchArgs),

    /// Show the resolved retention policy of a dataset
    Config(ConfigArgs),
}

/// Arguments for the run command.
#[derive(Debug, Clone, Parser)]
pub struct RunArgs {
    /// ZFS dataset to manage (e.g. tank/data)
    pub dataset: String,

    /// Create today's daily snapshot (state-aware)
    #[arg(long)]
    pub create: bool,

    /// Dry-run mode (show what would happen, but do nothing)
    #[arg(long)]
    pub dry: bool,
}

/// Arguments for the plan command.
#[derive(Debug, Clone, Parser)]
pub struct PlanArgs {
    /// ZFS dataset to inspect
    pub dataset: String,
}

/// Arguments for the list command.
#[derive(Debug, Clone, Parser)]
pub struct ListArgs {
    /// ZFS dataset to inspect
    pub dataset: String,
}

/// Arguments for the watch command.
#[derive(Debug, Clone, Parser)]
pub struct WatchArgs {
    /// Datasets to manage (default: every dataset in the config)
    pub datasets: Vec<String>,

    /// Create the daily snapshot on each pass (state-aware)
    #[arg(long)]
    pub create: bool,

    /// Dry-run mode
    #[arg(long)]
    pub dry: bool,

    /// Minutes between passes
    #[arg(short, long, default_value = "1440")]
    pub interval_minutes: u64,
}

/// Arguments for the config command.
#[derive(Debug, Clone, Parser)]
pub struct ConfigArgs {
    /// Dataset whose policy to show
    pub dataset: String,
}

impl Cli {
    /// Resolve the command, mapping the bare `snappy <dataset>` form to `run`
    ///
    /// The bare form's dataset, `--create` and `--dry` cannot be combined
    /// with a subcommand.
    pub fn resolved_command(&self) -> Result<Command> {
        match (&self.command, &self.dataset) {
            (Some(_), Some(dataset)) => Err(CliError::InvalidInput(format!(
                "unexpected dataset '{}' before the subcommand",
                dataset
            ))),
            (Some(_), None) if self.create || self.dry => Err(CliError::InvalidInput(
                "--create and --dry go after the subcommand (e.g. `snappy run --dry <dataset>`)".to_string(),
            )),
            (Some(command), None) => Ok(command.clone()),
            (None, Some(dataset)) => Ok(Command::Run(RunArgs {
                dataset: dataset.clone(),
                create: self.create,
                dry: self.dry,
            })),
            (None, None) => Err(CliError::InvalidInput(
                "no dataset given (try `snappy --help`)".to_string(),
            )),
        }
    }
}

impl From<CliFormat> for crate::output::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::output::OutputFormat::Table,
            CliFormat::Json => crate::output::OutputFormat::Json,
            CliFormat::Quiet => crate::output::OutputFormat::Quiet,
        }
    }
}

fn parse_instant(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 timestamp '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_bare_dataset_means_run() {
        let cli = Cli::parse_from(["snappy", "--create", "--dry", "tank/data"]);
        match cli.resolved_command() {
            Ok(Command::Run(args)) => {
                assert_eq!(args.dataset, "tank/data");
                assert!(args.create);
                assert!(args.dry);
            }
            other => panic!("Expected Run command, got {:?}", other),
        }
    }

    #[test]
    fn test_run_command() {
        let cli = Cli::parse_from(["snappy", "run", "tank/data", "--create"]);
        match cli.resolved_command() {
            Ok(Command::Run(args)) => {
                assert!(args.create);
                assert!(!args.dry);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["snappy", "plan", "tank/data"]);
        assert_eq!(cli.conf, PathBuf::from("/etc/sanoid/sanoid.conf"));
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.format, CliFormat::Table);
        assert!(cli.zfs.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["snappy", "list", "tank/data", "-vv", "--format", "json", "--conf", "/tmp/s.conf"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.format, CliFormat::Json);
        assert_eq!(cli.conf, PathBuf::from("/tmp/s.conf"));
    }

    #[test]
    fn test_global_flags_before_subcommand() {
        let cli = Cli::parse_from(["snappy", "--conf", "/x", "--format", "json", "plan", "tank"]);
        assert_eq!(cli.conf, PathBuf::from("/x"));
        assert_eq!(cli.format, CliFormat::Json);
        match cli.resolved_command() {
            Ok(Command::Plan(args)) => assert_eq!(args.dataset, "tank"),
            other => panic!("Expected Plan command, got {:?}", other),
        }
    }

    #[test]
    fn test_bare_flags_rejected_with_subcommand() {
        let cli = Cli::parse_from(["snappy", "--dry", "plan", "tank"]);
        assert!(matches!(cli.resolved_command(), Err(CliError::InvalidInput(_))));

        let cli = Cli::parse_from(["snappy", "tank", "plan", "tank"]);
        assert!(matches!(cli.resolved_command(), Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_watch_defaults() {
        let cli = Cli::parse_from(["snappy", "watch"]);
        match cli.command {
            Some(Command::Watch(args)) => {
                assert!(args.datasets.is_empty());
                assert_eq!(args.interval_minutes, 1440);
            }
            _ => panic!("Expected Watch command"),
        }
    }

    #[test]
    fn test_now_override() {
        let cli = Cli::parse_from(["snappy", "plan", "tank", "--now", "2024-06-12T12:00:00Z"]);
        assert_eq!(cli.now, Some(Utc.with_ymd_and_hms(2024, 6, 12, 12, 0, 0).unwrap()));
        assert!(Cli::try_parse_from(["snappy", "plan", "tank", "--now", "yesterday"]).is_err());
    }

    #[test]
    fn test_no_command() {
        let cli = Cli::parse_from(["snappy"]);
        assert!(matches!(cli.resolved_command(), Err(CliError::InvalidInput(_))));
    }
}
