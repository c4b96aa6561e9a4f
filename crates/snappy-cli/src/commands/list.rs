//! List command implementation.

use crate::cli::ListArgs;
use crate::error::Result;
use crate::output::Formatter;
use chrono::{DateTime, Utc};
use snappy_config::ConfigFile;
use snappy_domain::{inventory, SnapshotStore, TierWindows};
use snappy_store::StoreError;

/// Execute the list command.
pub fn execute_list<S>(
    args: ListArgs,
    config: &ConfigFile,
    store: &S,
    formatter: &Formatter,
    now: DateTime<Utc>,
) -> Result<String>
where
    S: SnapshotStore<Error = StoreError>,
{
    let policy = config.policy_for(&args.dataset)?;
    let raw = store.list_snapshots(&args.dataset)?;

    let mut records = inventory::build(&raw, &policy.prefix);
    records.sort_by_key(|r| r.timestamp());

    let windows = TierWindows::compute(now, &policy);
    formatter.format_inventory(&records, &windows)
}
