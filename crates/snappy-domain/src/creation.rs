//! Creation decider - whether a new daily snapshot is warranted

use crate::{SnapshotRecord, Tier};
use chrono::{DateTime, Utc};

/// Outcome of the creation check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationDecision {
    /// A new daily snapshot should be created
    Create,
    /// The dataset did not change since its most recent snapshot
    Unchanged,
    /// A daily snapshot already exists for the current UTC day
    AlreadyExists,
}

impl CreationDecision {
    /// Decide whether to create a daily snapshot at `now`
    ///
    /// Unchanged data never gets a new snapshot; otherwise at most one daily
    /// snapshot exists per UTC calendar day.
    pub fn decide(now: DateTime<Utc>, records: &[SnapshotRecord], prefix: &str, changed: bool) -> Self {
        if !changed {
            return CreationDecision::Unchanged;
        }

        let today = now.date_naive();
        let exists = records.iter().any(|record| {
            record.tier() == Tier::Daily
                && record.name().prefix() == prefix
                && record.timestamp().date_naive() == today
        });

        if exists {
            CreationDecision::AlreadyExists
        } else {
            CreationDecision::Create
        }
    }

    /// Whether the decision is to create
    pub fn should_create(&self) -> bool {
        matches!(self, CreationDecision::Create)
    }
}

/// Decide whether a new daily snapshot should be created at `now`
pub fn should_create(now: DateTime<Utc>, records: &[SnapshotRecord], prefix: &str, changed: bool) -> bool {
    CreationDecision::decide(now, records, prefix, changed).should_create()
}
