//! Snapshot name codec
//!
//! The naming contract is `<prefix>-YYYY-MM-DD_HH:MM:SS_<tier>`, with a
//! four-digit year, zero-padded two-digit month/day/hour/minute/second and a
//! literal tier name. Timestamps are UTC.

use crate::Tier;
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use std::fmt;

/// Width of the `YYYY-MM-DD_HH:MM:SS` timestamp component
const TIMESTAMP_WIDTH: usize = 19;

/// Immutable, decoded snapshot name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotName {
    prefix: String,
    timestamp: DateTime<Utc>,
    tier: Tier,
}

impl SnapshotName {
    /// Create a new snapshot name
    ///
    /// Sub-second precision is dropped.
    ///
    /// # Errors
    /// Returns error if the prefix is not a valid snapshot prefix or the
    /// timestamp cannot be written with a four-digit year.
    pub fn new(prefix: impl Into<String>, timestamp: DateTime<Utc>, tier: Tier) -> Result<Self, String> {
        let prefix = prefix.into();
        if !is_valid_prefix(&prefix) {
            return Err(format!("Invalid snapshot prefix: '{}'", prefix));
        }

        let year = timestamp.year();
        if !(0..=9999).contains(&year) {
            return Err(format!("Timestamp year {} cannot be encoded", year));
        }

        let timestamp = timestamp
            .with_nanosecond(0)
            .ok_or_else(|| format!("Invalid timestamp: {}", timestamp))?;

        Ok(Self { prefix, timestamp, tier })
    }

    /// Prefix identifying snapshots managed under one policy
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Creation instant encoded in the name
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Current tier label
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Same name with only the tier changed
    pub fn with_tier(&self, tier: Tier) -> Self {
        Self {
            prefix: self.prefix.clone(),
            timestamp: self.timestamp,
            tier,
        }
    }

    /// Encode to the canonical string form
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SnapshotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:04}-{:02}-{:02}_{:02}:{:02}:{:02}_{}",
            self.prefix,
            self.timestamp.year(),
            self.timestamp.month(),
            self.timestamp.day(),
            self.timestamp.hour(),
            self.timestamp.minute(),
            self.timestamp.second(),
            self.tier
        )
    }
}

/// Encode a snapshot name
pub fn encode(name: &SnapshotName) -> String {
    name.encode()
}

/// Decode a raw snapshot name
///
/// Returns `None` for anything that does not match the naming contract;
/// that is how foreign snapshots are ignored.
pub fn decode(raw: &str) -> Option<SnapshotName> {
    let (rest, tier) = raw.rsplit_once('_')?;
    let tier = Tier::parse(tier)?;

    // `<prefix>-<timestamp>` with a non-empty prefix
    if rest.len() < TIMESTAMP_WIDTH + 2 {
        return None;
    }
    let split = rest.len() - TIMESTAMP_WIDTH;
    if !rest.is_char_boundary(split) {
        return None;
    }
    let (head, timestamp) = rest.split_at(split);
    let prefix = head.strip_suffix('-')?;

    if !is_valid_prefix(prefix) {
        return None;
    }

    let timestamp = parse_timestamp(timestamp)?;

    Some(SnapshotName {
        prefix: prefix.to_string(),
        timestamp,
        tier,
    })
}

/// Check whether a prefix may appear in a snapshot name
///
/// Allowed characters are ASCII alphanumerics and `_ . : -`.
pub fn is_valid_prefix(prefix: &str) -> bool {
    !prefix.is_empty()
        && prefix
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b':' | b'-'))
}

/// Earliest instant a snapshot name can encode (`0000-01-01T00:00:00Z`)
pub fn earliest_instant() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(0, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Parse a fixed-width `YYYY-MM-DD_HH:MM:SS` timestamp
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let b = s.as_bytes();
    if b.len() != TIMESTAMP_WIDTH {
        return None;
    }

    let separators = [(4, b'-'), (7, b'-'), (10, b'_'), (13, b':'), (16, b':')];
    if separators.iter().any(|&(i, c)| b[i] != c) {
        return None;
    }

    let year = digits(&b[0..4])?;
    let month = digits(&b[5..7])?;
    let day = digits(&b[8..10])?;
    let hour = digits(&b[11..13])?;
    let minute = digits(&b[14..16])?;
    let second = digits(&b[17..19])?;

    let date = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)?;
    Some(Utc.from_utc_datetime(&date.and_time(time)))
}

/// Parse a run of ASCII digits
fn digits(b: &[u8]) -> Option<u32> {
    b.iter().try_fold(0u32, |acc, &c| {
        c.is_ascii_digit().then(|| acc * 10 + u32::from(c - b'0'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_decode_canonical_name() {
        let name = decode("snappy-2024-06-12_08:30:05_weekly").unwrap();
        assert_eq!(name.prefix(), "snappy");
        assert_eq!(name.timestamp(), ts(2024, 6, 12, 8, 30, 5));
        assert_eq!(name.tier(), Tier::Weekly);
    }

    #[test]
    fn test_encode_zero_pads() {
        let name = SnapshotName::new("snappy", ts(7, 1, 2, 3, 4, 5), Tier::Daily).unwrap();
        assert_eq!(name.encode(), "snappy-0007-01-02_03:04:05_daily");
    }

    #[test]
    fn test_prefix_may_contain_dashes_and_digits() {
        let name = decode("auto-2023-2024-01-01_00:00:00_yearly").unwrap();
        assert_eq!(name.prefix(), "auto-2023");
        assert_eq!(name.tier(), Tier::Yearly);
    }

    #[test]
    fn test_rejects_non_conforming_names() {
        let bad = [
            "",
            "snappy",
            "-2024-06-12_08:30:05_daily",
            "snappy-2024-06-12_08:30:05_hourly",
            "snappy-2024-06-12_08:30:05_Daily",
            "snappy-2024-6-12_08:30:05_daily",
            "snappy-2024-06-12 08:30:05_daily",
            "snappy-2024-06-12_08:30:5_daily",
            "snappy-2024-02-30_08:30:05_daily",
            "snappy-2024-06-12_24:00:00_daily",
            "snappy-2024-06-12_23:59:60_daily",
            "snappy-2024-06-12_08:30:05_daily_extra",
            "snappy_2024-06-12_08:30:05_daily",
            "snap py-2024-06-12_08:30:05_daily",
            "zfs-auto-snap_daily-2024-06-12-0830",
            "snappy-+024-06-12_08:30:05_daily",
            "snappé-2024-06-12_08:30:05_daily",
        ];
        for raw in bad {
            assert!(decode(raw).is_none(), "should not match: {raw}");
        }
    }

    #[test]
    fn test_with_tier_changes_only_tier_substring() {
        let name = decode("snappy-2024-06-12_08:30:05_daily").unwrap();
        let promoted = name.with_tier(Tier::Monthly);
        assert_eq!(promoted.encode(), "snappy-2024-06-12_08:30:05_monthly");
        assert_eq!(promoted.timestamp(), name.timestamp());
        assert_eq!(promoted.prefix(), name.prefix());
    }

    #[test]
    fn test_new_validates_inputs() {
        assert!(SnapshotName::new("", ts(2024, 1, 1, 0, 0, 0), Tier::Daily).is_err());
        assert!(SnapshotName::new("a@b", ts(2024, 1, 1, 0, 0, 0), Tier::Daily).is_err());
        assert!(SnapshotName::new("ok", ts(10000, 1, 1, 0, 0, 0), Tier::Daily).is_err());
    }

    #[test]
    fn test_new_drops_subseconds() {
        let precise = ts(2024, 1, 1, 0, 0, 0) + chrono::Duration::milliseconds(750);
        let name = SnapshotName::new("snappy", precise, Tier::Daily).unwrap();
        assert_eq!(name.timestamp(), ts(2024, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_earliest_instant() {
        assert_eq!(earliest_instant(), ts(0, 1, 1, 0, 0, 0));
    }
}
