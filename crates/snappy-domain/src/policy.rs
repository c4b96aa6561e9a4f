//! Retention policy

use crate::Tier;

/// Default snapshot prefix
pub const DEFAULT_PREFIX: &str = "snappy";

/// Resolved retention policy for one dataset
///
/// Counts are numbers of calendar periods per tier. A count of 0 skips the
/// tier entirely. The yearly tier always catches everything older than the
/// finite tiers, so its count never causes deletions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Days kept at one snapshot per day
    pub daily: u32,
    /// Weeks kept at one snapshot per week
    pub weekly: u32,
    /// Months kept at one snapshot per month
    pub monthly: u32,
    /// Years of history intended at one snapshot per year
    pub yearly: u32,
    /// Prefix identifying managed snapshots
    pub prefix: String,
}

impl RetentionPolicy {
    /// Configured count for a tier
    pub fn count(&self, tier: Tier) -> u32 {
        match tier {
            Tier::Daily => self.daily,
            Tier::Weekly => self.weekly,
            Tier::Monthly => self.monthly,
            Tier::Yearly => self.yearly,
        }
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            daily: 0,
            weekly: 0,
            monthly: 0,
            yearly: 0,
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}
