//! Tier module - retention classes for snapshots

use std::fmt;

/// Retention tier of a snapshot
///
/// Snapshots only ever move from a newer tier to an older one:
/// - Daily: one per calendar day
/// - Weekly: one per ISO week
/// - Monthly: one per calendar month
/// - Yearly: one per calendar year, never expires
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    /// One snapshot per day
    Daily,

    /// One snapshot per week
    Weekly,

    /// One snapshot per month
    Monthly,

    /// One snapshot per year (catch-all for everything older)
    Yearly,
}

/// Calendar period owned by a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    /// Calendar day (UTC)
    Day,
    /// ISO week, Monday through Sunday (UTC)
    Week,
    /// Calendar month (UTC)
    Month,
    /// Calendar year (UTC)
    Year,
}

impl Tier {
    /// All tiers, newest first
    pub const ALL: [Tier; 4] = [Tier::Daily, Tier::Weekly, Tier::Monthly, Tier::Yearly];

    /// Get the tier name as it appears in snapshot names
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Daily => "daily",
            Tier::Weekly => "weekly",
            Tier::Monthly => "monthly",
            Tier::Yearly => "yearly",
        }
    }

    /// Parse a tier literal
    ///
    /// Only the exact lowercase literals are accepted; this is part of the
    /// snapshot naming contract.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(Tier::Daily),
            "weekly" => Some(Tier::Weekly),
            "monthly" => Some(Tier::Monthly),
            "yearly" => Some(Tier::Yearly),
            _ => None,
        }
    }

    /// Calendar period a single representative of this tier stands for
    pub fn period(&self) -> Period {
        match self {
            Tier::Daily => Period::Day,
            Tier::Weekly => Period::Week,
            Tier::Monthly => Period::Month,
            Tier::Yearly => Period::Year,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid tier: {}", s))
    }
}
