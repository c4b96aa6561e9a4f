//! Background worker for scheduled retention passes

use crate::{Janitor, JanitorConfig, JanitorError, JanitorMetrics};
use chrono::Utc;
use snappy_domain::{RetentionPolicy, SnapshotStore};
use std::fmt::Display;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::time::{interval, Duration};

/// A dataset and the policy it is kept under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedDataset {
    /// Dataset name (e.g. `tank/home`)
    pub dataset: String,
    /// Retention policy for the dataset
    pub policy: RetentionPolicy,
}

impl ManagedDataset {
    /// Pair a dataset with its policy
    pub fn new(dataset: impl Into<String>, policy: RetentionPolicy) -> Self {
        Self {
            dataset: dataset.into(),
            policy,
        }
    }
}

/// Background worker that runs a pass over every dataset on a schedule
///
/// # Examples
///
/// ```no_run
/// use snappy_domain::RetentionPolicy;
/// use snappy_janitor::{JanitorConfig, JanitorWorker, ManagedDataset};
/// use snappy_store::ZfsStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut store = ZfsStore::new();
///     let datasets = vec![ManagedDataset::new("tank/home", RetentionPolicy::default())];
///     let mut worker = JanitorWorker::new(JanitorConfig::default())?;
///
///     // Run until Ctrl+C
///     worker.run(&mut store, &datasets).await?;
///     Ok(())
/// }
/// ```
pub struct JanitorWorker {
    janitor: Janitor,
    interval: Duration,
}

impl JanitorWorker {
    /// Create a new background worker with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the run interval is zero.
    pub fn new(config: JanitorConfig) -> Result<Self, JanitorError> {
        let interval = config.run_interval();
        if interval.is_zero() {
            return Err(JanitorError::Worker("run interval must be at least one minute".to_string()));
        }
        Ok(Self {
            janitor: Janitor::new(config),
            interval,
        })
    }

    /// Interval between passes
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run the worker until a shutdown signal (Ctrl+C) is received
    ///
    /// A failing dataset is logged and retried on the next tick. Store calls
    /// block, so a signal arriving during a pass stops the worker once that
    /// pass finishes.
    pub async fn run<S>(&mut self, store: &mut S, datasets: &[ManagedDataset]) -> Result<(), JanitorError>
    where
        S: SnapshotStore,
        S::Error: Display,
    {
        if datasets.is_empty() {
            return Err(JanitorError::Worker("no datasets to manage".to_string()));
        }

        let mut ticker = interval(self.interval);
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        tracing::info!(
            "Janitor worker started for {} datasets (interval: {:?})",
            datasets.len(),
            self.interval
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    tracing::debug!("Starting retention cycle");
                    self.blocking_cycle(store, datasets);
                }
                _ = &mut shutdown => {
                    tracing::info!("Shutdown signal received, stopping janitor");
                    break;
                }
            }
        }

        tracing::info!("Janitor stopped. Final metrics:\n{}", self.janitor.metrics().summary());

        Ok(())
    }

    /// Run for a specific number of cycles
    pub async fn run_cycles<S>(
        &mut self,
        store: &mut S,
        datasets: &[ManagedDataset],
        cycles: usize,
    ) -> Result<(), JanitorError>
    where
        S: SnapshotStore,
        S::Error: Display,
    {
        let mut ticker = interval(self.interval);

        tracing::info!(
            "Janitor worker started for {} cycles (interval: {:?})",
            cycles,
            self.interval
        );

        for cycle in 0..cycles {
            ticker.tick().await;
            tracing::debug!("Starting retention cycle {}/{}", cycle + 1, cycles);
            self.blocking_cycle(store, datasets);
        }

        tracing::info!(
            "Janitor finished {} cycles. Final metrics:\n{}",
            cycles,
            self.janitor.metrics().summary()
        );

        Ok(())
    }

    /// Run a cycle, moving it off the async worker on a multi-threaded runtime
    fn blocking_cycle<S>(&mut self, store: &mut S, datasets: &[ManagedDataset])
    where
        S: SnapshotStore,
        S::Error: Display,
    {
        if Handle::current().runtime_flavor() == RuntimeFlavor::MultiThread {
            tokio::task::block_in_place(|| self.cycle(store, datasets));
        } else {
            self.cycle(store, datasets);
        }
    }

    fn cycle<S>(&mut self, store: &mut S, datasets: &[ManagedDataset])
    where
        S: SnapshotStore,
        S::Error: Display,
    {
        let now = Utc::now();

        for managed in datasets {
            match self.janitor.run(store, &managed.dataset, &managed.policy, now) {
                Ok(report) => {
                    tracing::info!(
                        "Pass over {} completed: {} renames, {} deletions, {} actions applied",
                        managed.dataset,
                        report.plan.renames.len(),
                        report.plan.deletions.len(),
                        report.applied
                    );
                }
                Err(e) => {
                    tracing::error!("Pass over {} failed: {}", managed.dataset, e);
                }
            }
        }
    }

    /// Get a reference to the janitor's current metrics
    pub fn metrics(&self) -> &JanitorMetrics {
        self.janitor.metrics()
    }
}
