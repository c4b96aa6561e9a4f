//! Plan command implementation.

use crate::cli::PlanArgs;
use crate::error::Result;
use crate::output::Formatter;
use chrono::{DateTime, Utc};
use snappy_config::ConfigFile;
use snappy_domain::SnapshotStore;
use snappy_janitor::Janitor;
use snappy_store::StoreError;

/// Execute the plan command.
pub fn execute_plan<S>(
    args: PlanArgs,
    config: &ConfigFile,
    store: &S,
    formatter: &Formatter,
    now: DateTime<Utc>,
) -> Result<String>
where
    S: SnapshotStore<Error = StoreError>,
{
    let policy = config.policy_for(&args.dataset)?;
    let report = Janitor::default_config().preview(store, &args.dataset, &policy, now)?;

    formatter.format_plan(&report)
}
