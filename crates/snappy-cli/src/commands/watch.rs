//! Watch command implementation.

use crate::cli::WatchArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use snappy_config::ConfigFile;
use snappy_domain::SnapshotStore;
use snappy_janitor::{JanitorConfig, JanitorWorker, ManagedDataset};
use snappy_store::StoreError;

/// Datasets to watch with their policies
///
/// Falls back to every dataset section in the config when none are given.
pub fn managed_datasets(args: &WatchArgs, config: &ConfigFile) -> Result<Vec<ManagedDataset>> {
    let names: Vec<String> = if args.datasets.is_empty() {
        config.datasets().into_iter().map(String::from).collect()
    } else {
        args.datasets.clone()
    };

    if names.is_empty() {
        return Err(CliError::InvalidInput("no datasets configured".to_string()));
    }

    names
        .into_iter()
        .map(|name| -> Result<ManagedDataset> {
            let policy = config.policy_for(&name)?;
            Ok(ManagedDataset::new(name, policy))
        })
        .collect()
}

/// Execute the watch command.
pub async fn execute_watch<S>(
    args: WatchArgs,
    config: &ConfigFile,
    store: &mut S,
    formatter: &Formatter,
) -> Result<String>
where
    S: SnapshotStore<Error = StoreError>,
{
    let datasets = managed_datasets(&args, config)?;

    let mut worker = JanitorWorker::new(JanitorConfig {
        dry_run: args.dry,
        create: args.create,
        run_interval_minutes: args.interval_minutes,
    })?;

    tracing::info!(
        "Watching {} dataset(s): {}",
        datasets.len(),
        datasets.iter().map(|d| d.dataset.as_str()).collect::<Vec<_>>().join(", ")
    );
    worker.run(store, &datasets).await?;

    let metrics = worker.metrics();
    Ok(formatter.success(&format!(
        "Stopped after {} pass(es): {} created, {} promoted, {} deleted",
        metrics.run_count,
        metrics.created,
        metrics.total_promoted(),
        metrics.total_deleted()
    )))
}
