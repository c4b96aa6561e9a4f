//! Retention planner - promotion and pruning decisions
//!
//! For every record older than "now", the planner finds the tier whose window
//! contains it (its zone). Records labelled with their zone tier or a newer
//! one are candidates: they are grouped by `(zone tier, period index)` and
//! each group keeps exactly one representative, the earliest snapshot in the
//! period. The representative is relabelled to the zone tier when its label
//! differs; every other member of the group is deleted.
//!
//! Records labelled with a tier older than their zone are never demoted and
//! are left untouched, as are records at or after "now".

use crate::{SnapshotRecord, Tier, TierWindows};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Relabel an existing snapshot to an older tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    /// Snapshot being promoted
    pub record: SnapshotRecord,
    /// Tier it is promoted to
    pub to: Tier,
}

impl Rename {
    /// Tier the snapshot currently carries
    pub fn from(&self) -> Tier {
        self.record.tier()
    }

    /// Address of the snapshot after the rename
    pub fn target(&self) -> String {
        self.record.address_for(self.to)
    }
}

/// Outcome for one `(tier, period)` group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodSelection {
    /// Tier owning the period
    pub tier: Tier,
    /// Zero-based period index within the tier's window
    pub period_index: u64,
    /// Calendar label of the period (e.g. `2024-W24`)
    pub label: String,
    /// Snapshot kept for the period
    pub representative: SnapshotRecord,
    /// Number of candidates that fell into the period
    pub members: usize,
}

/// Planned actions for one dataset
///
/// A record appears in at most one of `renames` and `deletions`; anything in
/// neither is left alone. Renames never depend on each other and never
/// target an existing name, so they may be applied in any order. Deletions
/// should be applied after renames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionPlan {
    /// Whether a new daily snapshot is issued this run (decided separately)
    pub create: bool,
    /// Promotions, oldest snapshot first
    pub renames: Vec<Rename>,
    /// Snapshots to destroy, oldest first
    pub deletions: Vec<SnapshotRecord>,
    /// Per-period selections, newest tier first
    pub selections: Vec<PeriodSelection>,
}

impl RetentionPlan {
    /// No renames and no deletions
    pub fn is_empty(&self) -> bool {
        self.renames.is_empty() && self.deletions.is_empty()
    }

    /// Number of rename and delete actions
    pub fn action_count(&self) -> usize {
        self.renames.len() + self.deletions.len()
    }
}

/// Compute the promotion and pruning plan for a dataset's inventory
///
/// `records` must already be decoded and prefix-filtered. The returned plan
/// has `create` unset.
pub fn plan(records: &[SnapshotRecord], windows: &TierWindows) -> RetentionPlan {
    let mut groups: BTreeMap<(Tier, u64), Vec<&SnapshotRecord>> = BTreeMap::new();

    for record in records {
        let Some(zone) = windows.zone_of(record.timestamp()) else {
            continue;
        };
        // Promotion only moves to older tiers
        if zone < record.tier() {
            continue;
        }
        let index = windows.period_index(zone, record.timestamp());
        groups.entry((zone, index)).or_default().push(record);
    }

    let mut plan = RetentionPlan::default();

    for ((tier, period_index), mut members) in groups {
        members.sort_by(|a, b| representative_order(a, b, tier));
        let representative = members[0];

        if representative.tier() != tier {
            plan.renames.push(Rename {
                record: representative.clone(),
                to: tier,
            });
        }
        plan.deletions.extend(members[1..].iter().map(|r| (*r).clone()));

        plan.selections.push(PeriodSelection {
            tier,
            period_index,
            label: tier.period().label(representative.timestamp()),
            representative: representative.clone(),
            members: members.len(),
        });
    }

    plan.renames
        .sort_by(|a, b| chronological(&a.record, &b.record));
    plan.deletions.sort_by(chronological);

    plan
}

/// Ordering of candidates within a period; the first one is kept
///
/// Earliest timestamp wins. On equal timestamps a record already carrying
/// the target tier wins, so the kept snapshot never has to be renamed onto
/// a name that is about to be destroyed.
fn representative_order(a: &SnapshotRecord, b: &SnapshotRecord, target: Tier) -> Ordering {
    a.timestamp()
        .cmp(&b.timestamp())
        .then_with(|| (a.tier() != target).cmp(&(b.tier() != target)))
        .then_with(|| a.name().encode().cmp(&b.name().encode()))
        .then_with(|| a.origin().cmp(b.origin()))
}

fn chronological(a: &SnapshotRecord, b: &SnapshotRecord) -> Ordering {
    a.timestamp()
        .cmp(&b.timestamp())
        .then_with(|| a.origin().cmp(b.origin()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{inventory, RetentionPolicy};
    use chrono::{DateTime, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        // Wednesday
        Utc.with_ymd_and_hms(2024, 6, 12, 12, 0, 0).unwrap()
    }

    fn policy(daily: u32, weekly: u32, monthly: u32, yearly: u32) -> RetentionPolicy {
        RetentionPolicy {
            daily,
            weekly,
            monthly,
            yearly,
            ..Default::default()
        }
    }

    fn run(raw: &[&str], policy: &RetentionPolicy) -> RetentionPlan {
        let records = inventory::build(raw, &policy.prefix);
        plan(&records, &TierWindows::compute(now(), policy))
    }

    fn origins(records: &[SnapshotRecord]) -> Vec<&str> {
        records.iter().map(|r| r.origin()).collect()
    }

    #[test]
    fn test_empty_inventory_yields_empty_plan() {
        let plan = run(&[], &policy(7, 4, 12, 5));
        assert!(plan.is_empty());
        assert!(plan.selections.is_empty());
        assert!(!plan.create);
    }

    #[test]
    fn test_correctly_classified_snapshots_are_untouched() {
        let plan = run(
            &[
                "snappy-2024-06-12_08:00:00_daily",
                "snappy-2024-06-11_08:00:00_daily",
            ],
            &policy(2, 0, 0, 0),
        );
        assert!(plan.is_empty());
        assert_eq!(plan.selections.len(), 2);
    }

    #[test]
    fn test_aged_daily_is_promoted() {
        let plan = run(&["snappy-2024-06-09_08:00:00_daily"], &policy(2, 1, 0, 0));
        assert_eq!(plan.renames.len(), 1);
        assert_eq!(plan.renames[0].from(), Tier::Daily);
        assert_eq!(plan.renames[0].to, Tier::Weekly);
        assert_eq!(plan.renames[0].target(), "snappy-2024-06-09_08:00:00_weekly");
        assert!(plan.deletions.is_empty());
    }

    #[test]
    fn test_earliest_in_period_is_kept() {
        let plan = run(
            &[
                "snappy-2024-06-12_09:00:00_daily",
                "snappy-2024-06-12_07:00:00_daily",
                "snappy-2024-06-12_08:00:00_daily",
            ],
            &policy(2, 0, 0, 0),
        );
        assert!(plan.renames.is_empty());
        assert_eq!(
            origins(&plan.deletions),
            vec!["snappy-2024-06-12_08:00:00_daily", "snappy-2024-06-12_09:00:00_daily"]
        );
        assert_eq!(plan.selections[0].members, 3);
        assert_eq!(plan.selections[0].representative.origin(), "snappy-2024-06-12_07:00:00_daily");
    }

    #[test]
    fn test_equal_timestamps_prefer_existing_target_tier() {
        // Both in the weekly zone; keeping the weekly one avoids renaming
        // the daily one onto a name that already exists
        let plan = run(
            &[
                "snappy-2024-06-09_08:00:00_daily",
                "snappy-2024-06-09_08:00:00_weekly",
            ],
            &policy(2, 1, 0, 0),
        );
        assert!(plan.renames.is_empty());
        assert_eq!(origins(&plan.deletions), vec!["snappy-2024-06-09_08:00:00_daily"]);
    }

    #[test]
    fn test_never_demotes() {
        // A yearly-labelled snapshot inside the daily window stays as is
        let plan = run(&["snappy-2024-06-12_08:00:00_yearly"], &policy(2, 0, 0, 0));
        assert!(plan.is_empty());
        assert!(plan.selections.is_empty());
    }

    #[test]
    fn test_future_snapshots_are_untouched() {
        let plan = run(
            &[
                "snappy-2024-06-12_12:00:00_daily",
                "snappy-2024-06-13_00:00:00_daily",
            ],
            &policy(2, 0, 0, 0),
        );
        assert!(plan.is_empty());
        assert!(plan.selections.is_empty());
    }

    #[test]
    fn test_yearly_never_deletes_for_age() {
        let plan = run(
            &[
                "snappy-1999-03-01_00:00:00_yearly",
                "snappy-2005-03-01_00:00:00_yearly",
                "snappy-2010-07-01_00:00:00_monthly",
            ],
            &policy(1, 1, 1, 1),
        );
        assert!(plan.deletions.is_empty());
        assert_eq!(plan.renames.len(), 1);
        assert_eq!(plan.renames[0].to, Tier::Yearly);
    }

    #[test]
    fn test_renames_and_deletions_are_disjoint() {
        let plan = run(
            &[
                "snappy-2024-05-02_08:00:00_daily",
                "snappy-2024-05-03_08:00:00_daily",
                "snappy-2024-05-20_08:00:00_weekly",
                "snappy-2024-05-21_08:00:00_daily",
            ],
            &policy(2, 2, 2, 0),
        );
        for rename in &plan.renames {
            assert!(!plan.deletions.contains(&rename.record));
        }
        assert_eq!(plan.action_count(), plan.renames.len() + plan.deletions.len());
    }
}
