//! Inventory builder - decoded view of a dataset's managed snapshots

use crate::name::{self, SnapshotName};
use crate::Tier;
use chrono::{DateTime, Utc};

/// A decoded snapshot plus the raw string it was decoded from
///
/// The origin is whatever the inventory source reported, either a bare
/// snapshot name or a dataset-qualified `dataset@snapshot` address. It is only
/// used to address the snapshot in rename and destroy actions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotRecord {
    origin: String,
    name: SnapshotName,
}

impl SnapshotRecord {
    /// Decode a raw inventory entry
    ///
    /// Returns `None` when the snapshot part does not follow the naming contract.
    pub fn decode(origin: &str) -> Option<Self> {
        let snapshot = match origin.split_once('@') {
            Some((_, snapshot)) => snapshot,
            None => origin,
        };

        name::decode(snapshot).map(|name| Self {
            origin: origin.to_string(),
            name,
        })
    }

    /// Raw inventory string used to address this snapshot
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Decoded name
    pub fn name(&self) -> &SnapshotName {
        &self.name
    }

    /// Creation instant
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.name.timestamp()
    }

    /// Current tier label
    pub fn tier(&self) -> Tier {
        self.name.tier()
    }

    /// Address of this snapshot once relabelled to `tier`
    ///
    /// Keeps any `dataset@` qualifier from the origin.
    pub fn address_for(&self, tier: Tier) -> String {
        let renamed = self.name.with_tier(tier).encode();
        match self.origin.split_once('@') {
            Some((dataset, _)) => format!("{}@{}", dataset, renamed),
            None => renamed,
        }
    }
}

/// Build the inventory for one dataset
///
/// Names that do not decode, or whose prefix is not exactly `prefix`, are
/// skipped. The result keeps input order; callers needing chronological
/// order must sort by timestamp.
pub fn build<I, S>(raw_names: I, prefix: &str) -> Vec<SnapshotRecord>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw_names
        .into_iter()
        .filter_map(|raw| SnapshotRecord::decode(raw.as_ref()))
        .filter(|record| record.name().prefix() == prefix)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filters_foreign_names() {
        let raw = [
            "tank/data@snappy-2024-06-12_08:30:05_daily",
            "tank/data@autosnap_2024-06-12_00:00:01_daily",
            "tank/data@other-2024-06-12_08:30:05_daily",
            "tank/data@snappy-2024-06-12_08:30:05_hourly",
            "manual-backup",
            "snappy-2024-06-11_08:30:05_weekly",
        ];

        let records = build(raw, "snappy");
        let origins: Vec<&str> = records.iter().map(|r| r.origin()).collect();
        assert_eq!(
            origins,
            vec![
                "tank/data@snappy-2024-06-12_08:30:05_daily",
                "snappy-2024-06-11_08:30:05_weekly",
            ]
        );
    }

    #[test]
    fn test_prefix_must_match_exactly() {
        let raw = ["snappy-x-2024-06-12_08:30:05_daily", "snapp-2024-06-12_08:30:05_daily"];
        assert!(build(raw, "snappy").is_empty());
        assert_eq!(build(raw, "snappy-x").len(), 1);
    }

    #[test]
    fn test_empty_inventory() {
        assert!(build(Vec::<String>::new(), "snappy").is_empty());
    }

    #[test]
    fn test_address_for_keeps_dataset() {
        let record = SnapshotRecord::decode("pool/a/b@snappy-2024-06-12_08:30:05_daily").unwrap();
        assert_eq!(
            record.address_for(Tier::Weekly),
            "pool/a/b@snappy-2024-06-12_08:30:05_weekly"
        );

        let bare = SnapshotRecord::decode("snappy-2024-06-12_08:30:05_daily").unwrap();
        assert_eq!(bare.address_for(Tier::Yearly), "snappy-2024-06-12_08:30:05_yearly");
    }
}
