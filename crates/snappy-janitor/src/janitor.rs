//! Core Janitor implementation: one retention pass over a dataset

use crate::{JanitorConfig, JanitorError, JanitorMetrics};
use chrono::{DateTime, Utc};
use snappy_domain::{
    inventory, plan, CreationDecision, RetentionPlan, RetentionPolicy, SnapshotName, SnapshotRecord, SnapshotStore,
    Tier, TierWindows,
};
use std::fmt::Display;
use std::time::Instant;

/// Everything one pass decided and did for a dataset
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Dataset the pass ran on
    pub dataset: String,
    /// Whether actions were only logged
    pub dry_run: bool,
    /// Creation check outcome, when creation was requested
    pub creation: Option<CreationDecision>,
    /// Address of the snapshot created (or that would have been, in a dry run)
    pub created: Option<String>,
    /// Managed snapshots the plan was computed from
    pub inventory: Vec<SnapshotRecord>,
    /// Tier windows at the pass instant
    pub windows: TierWindows,
    /// Planned renames and deletions
    pub plan: RetentionPlan,
    /// Store actions actually performed
    pub applied: usize,
}

/// Janitor service applying retention policies through a [`SnapshotStore`]
///
/// # Examples
///
/// ```no_run
/// use chrono::Utc;
/// use snappy_domain::RetentionPolicy;
/// use snappy_janitor::{Janitor, JanitorConfig};
/// use snappy_store::ZfsStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut store = ZfsStore::new();
/// let policy = RetentionPolicy { daily: 7, weekly: 4, monthly: 12, yearly: 5, ..Default::default() };
/// let mut janitor = Janitor::new(JanitorConfig { create: true, ..Default::default() });
///
/// let report = janitor.run(&mut store, "tank/home", &policy, Utc::now())?;
/// println!("{} actions applied", report.applied);
/// # Ok(())
/// # }
/// ```
pub struct Janitor {
    config: JanitorConfig,
    metrics: JanitorMetrics,
}

impl Janitor {
    /// Create a new Janitor with the given configuration
    pub fn new(config: JanitorConfig) -> Self {
        Self {
            config,
            metrics: JanitorMetrics::new(),
        }
    }

    /// Create a Janitor with default configuration
    pub fn default_config() -> Self {
        Self::new(JanitorConfig::default())
    }

    /// Get a reference to the current metrics
    pub fn metrics(&self) -> &JanitorMetrics {
        &self.metrics
    }

    /// Compute the plan for a dataset without touching it
    pub fn preview<S>(
        &self,
        store: &S,
        dataset: &str,
        policy: &RetentionPolicy,
        now: DateTime<Utc>,
    ) -> Result<RunReport, JanitorError>
    where
        S: SnapshotStore,
        S::Error: Display,
    {
        let inventory = load_inventory(store, dataset, &policy.prefix)?;
        let windows = TierWindows::compute(now, policy);
        let plan = plan(&inventory, &windows);

        Ok(RunReport {
            dataset: dataset.to_string(),
            dry_run: true,
            creation: None,
            created: None,
            inventory,
            windows,
            plan,
            applied: 0,
        })
    }

    /// Run one retention pass over a dataset
    ///
    /// 1. Creates today's daily snapshot if enabled and warranted
    /// 2. Computes tier windows and the retention plan
    /// 3. Applies renames, then deletions
    ///
    /// Stops at the first store failure; running again reconciles whatever
    /// was left half done.
    pub fn run<S>(
        &mut self,
        store: &mut S,
        dataset: &str,
        policy: &RetentionPolicy,
        now: DateTime<Utc>,
    ) -> Result<RunReport, JanitorError>
    where
        S: SnapshotStore,
        S::Error: Display,
    {
        let started = Instant::now();
        let result = self.run_inner(store, dataset, policy, now);

        self.metrics.total_runtime_ms += u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match &result {
            Ok(_) => self.metrics.record_run(),
            Err(_) => self.metrics.record_failure(),
        }

        result
    }

    fn run_inner<S>(
        &mut self,
        store: &mut S,
        dataset: &str,
        policy: &RetentionPolicy,
        now: DateTime<Utc>,
    ) -> Result<RunReport, JanitorError>
    where
        S: SnapshotStore,
        S::Error: Display,
    {
        tracing::info!(dataset, prefix = %policy.prefix, "Using prefix: {}", policy.prefix);
        tracing::info!(
            dataset,
            "Retention: daily={}, weekly={}, monthly={}, yearly={}",
            policy.daily,
            policy.weekly,
            policy.monthly,
            policy.yearly
        );

        let mut inventory = load_inventory(store, dataset, &policy.prefix)?;
        let mut applied = 0;
        let mut creation = None;
        let mut created = None;

        if self.config.create {
            tracing::info!(dataset, "Creating daily snapshot (if necessary)");
            let changed = store
                .changed_since_last_snapshot(dataset)
                .map_err(|e| JanitorError::Store(e.to_string()))?;
            let decision = CreationDecision::decide(now, &inventory, &policy.prefix, changed);

            match decision {
                CreationDecision::Create => {
                    let name = SnapshotName::new(policy.prefix.as_str(), now, Tier::Daily)
                        .map_err(JanitorError::InvalidName)?;
                    let address = format!("{}@{}", dataset, name);

                    if self.config.dry_run {
                        tracing::info!("DRY RUN: Would create {}", address);
                    } else {
                        store
                            .create_snapshot(&address)
                            .map_err(|e| JanitorError::Store(e.to_string()))?;
                        tracing::info!("Created {}", address);
                        self.metrics.record_creation();
                        applied += 1;
                        inventory = load_inventory(store, dataset, &policy.prefix)?;
                    }
                    created = Some(address);
                }
                CreationDecision::AlreadyExists => {
                    tracing::info!(dataset, "Skipped creation: daily snapshot for today already exists");
                }
                CreationDecision::Unchanged => {
                    tracing::info!(dataset, "Skipped creation: dataset unchanged since last snapshot");
                }
            }
            creation = Some(decision);
        }

        tracing::info!(dataset, "Applying retention policy");
        let windows = TierWindows::compute(now, policy);
        for window in windows.iter() {
            tracing::trace!(
                dataset,
                "{} window: {} .. {}{}",
                window.tier,
                window.start,
                window.end,
                if window.is_empty() { " (skipped)" } else { "" }
            );
        }

        let mut plan = plan(&inventory, &windows);
        plan.create = created.is_some();

        for selection in &plan.selections {
            tracing::debug!(
                dataset,
                "{} {}: {} snaps -> keeping {}",
                selection.tier,
                selection.label,
                selection.members,
                selection.representative.origin()
            );
        }

        applied += self.apply(store, &plan)?;
        tracing::info!(dataset, applied, "Retention processing finished");

        Ok(RunReport {
            dataset: dataset.to_string(),
            dry_run: self.config.dry_run,
            creation,
            created,
            inventory,
            windows,
            plan,
            applied,
        })
    }

    /// Apply renames before deletions
    fn apply<S>(&mut self, store: &mut S, plan: &RetentionPlan) -> Result<usize, JanitorError>
    where
        S: SnapshotStore,
        S::Error: Display,
    {
        if self.config.dry_run {
            for rename in &plan.renames {
                tracing::info!("DRY RUN: Would rename {} -> {}", rename.record.origin(), rename.target());
            }
            for record in &plan.deletions {
                tracing::info!("DRY RUN: Would destroy {}", record.origin());
            }
            return Ok(0);
        }

        let mut applied = 0;

        for rename in &plan.renames {
            let target = rename.target();
            store
                .rename_snapshot(rename.record.origin(), &target)
                .map_err(|e| JanitorError::Store(e.to_string()))?;
            tracing::info!("Promoted {} -> {}", rename.record.origin(), target);
            self.metrics.record_promotion(rename.to);
            applied += 1;
        }

        for record in &plan.deletions {
            store
                .destroy_snapshot(record.origin())
                .map_err(|e| JanitorError::Store(e.to_string()))?;
            tracing::info!("Destroyed {}", record.origin());
            self.metrics.record_deletion(record.tier());
            applied += 1;
        }

        Ok(applied)
    }
}

/// List a dataset and decode its managed snapshots
fn load_inventory<S>(store: &S, dataset: &str, prefix: &str) -> Result<Vec<SnapshotRecord>, JanitorError>
where
    S: SnapshotStore,
    S::Error: Display,
{
    let raw = store
        .list_snapshots(dataset)
        .map_err(|e| JanitorError::Store(e.to_string()))?;
    let records = inventory::build(&raw, prefix);

    if tracing::enabled!(tracing::Level::TRACE) {
        for name in raw.iter().filter(|name| !records.iter().any(|r| r.origin() == name.as_str())) {
            tracing::trace!("Ignoring foreign snapshot: {}", name);
        }
    }
    tracing::debug!(dataset, "Found {} managed snapshots", records.len());

    Ok(records)
}
