//! Run command implementation.

use crate::cli::RunArgs;
use crate::error::Result;
use crate::output::Formatter;
use chrono::{DateTime, Utc};
use snappy_config::ConfigFile;
use snappy_domain::SnapshotStore;
use snappy_janitor::{Janitor, JanitorConfig};
use snappy_store::StoreError;

/// Execute the run command.
pub fn execute_run<S>(
    args: RunArgs,
    config: &ConfigFile,
    store: &mut S,
    formatter: &Formatter,
    now: DateTime<Utc>,
) -> Result<String>
where
    S: SnapshotStore<Error = StoreError>,
{
    let policy = config.policy_for(&args.dataset)?;

    let mut janitor = Janitor::new(JanitorConfig {
        dry_run: args.dry,
        create: args.create,
        ..Default::default()
    });

    let report = janitor.run(store, &args.dataset, &policy, now)?;
    tracing::debug!("{}", janitor.metrics().summary());

    formatter.format_report(&report)
}
