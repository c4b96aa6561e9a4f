//! Tier window calculator
//!
//! Each tier owns a half-open window `[start, end)` of time relative to "now".
//! Windows are chained newest to oldest (daily ends at now, weekly ends where
//! daily starts, and so on) so they never overlap and leave no gaps.
//!
//! Windows are calendar aligned: a tier with count `c` reaches back at least
//! `c` whole periods of its granularity before its end, and its start is
//! rounded down to the boundary of the period it lands in. The newest period
//! of a window may be partial. Weeks are ISO weeks starting on Monday. All
//! boundaries are UTC.
//!
//! The yearly tier is the catch-all for everything older than the finite
//! tiers and starts at the earliest encodable instant.

use crate::name::earliest_instant;
use crate::tier::Period;
use crate::{RetentionPolicy, Tier};
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, TimeZone, Utc};

/// Time window owned by one tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierWindow {
    /// Tier owning this window
    pub tier: Tier,
    /// Inclusive start
    pub start: DateTime<Utc>,
    /// Exclusive end
    pub end: DateTime<Utc>,
    /// Length of one period in this window
    pub period: Period,
}

impl TierWindow {
    /// Check whether the window contains an instant
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts < self.end
    }

    /// Check whether the window is empty (tier skipped)
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Zero-based index of the calendar period containing `ts`, counted from
    /// the period containing the window start
    ///
    /// Instants before the start map to index 0.
    pub fn period_index(&self, ts: DateTime<Utc>) -> u64 {
        let from = self.start.date_naive();
        let to = ts.date_naive();

        let diff = match self.period {
            Period::Day => i64::from(to.num_days_from_ce()) - i64::from(from.num_days_from_ce()),
            Period::Week => (week_ordinal(to) - week_ordinal(from)).div_euclid(7),
            Period::Month => month_ordinal(to) - month_ordinal(from),
            Period::Year => i64::from(to.year()) - i64::from(from.year()),
        };

        u64::try_from(diff).unwrap_or(0)
    }
}

impl Period {
    /// Human-readable label of the period containing `ts`
    ///
    /// `2024-06-12`, `2024-W24`, `2024-06` or `2024`.
    pub fn label(&self, ts: DateTime<Utc>) -> String {
        match self {
            Period::Day => ts.format("%Y-%m-%d").to_string(),
            Period::Week => {
                let week = ts.iso_week();
                format!("{:04}-W{:02}", week.year(), week.week())
            }
            Period::Month => ts.format("%Y-%m").to_string(),
            Period::Year => format!("{:04}", ts.year()),
        }
    }
}

/// Windows for all four tiers at a given instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierWindows {
    windows: [TierWindow; 4],
}

impl TierWindows {
    /// Compute the windows owned by each tier at `now`
    pub fn compute(now: DateTime<Utc>, policy: &RetentionPolicy) -> Self {
        let floor = earliest_instant();
        let mut end = now;

        let finite = [Tier::Daily, Tier::Weekly, Tier::Monthly].map(|tier| {
            let start = window_start(tier.period(), end, policy.count(tier), floor);
            let window = TierWindow {
                tier,
                start,
                end,
                period: tier.period(),
            };
            end = start;
            window
        });

        let yearly = TierWindow {
            tier: Tier::Yearly,
            start: floor.min(end),
            end,
            period: Period::Year,
        };

        Self {
            windows: [finite[0], finite[1], finite[2], yearly],
        }
    }

    /// Window owned by a tier
    pub fn get(&self, tier: Tier) -> &TierWindow {
        &self.windows[tier as usize]
    }

    /// All windows, newest first
    pub fn iter(&self) -> impl Iterator<Item = &TierWindow> {
        self.windows.iter()
    }

    /// Tier whose window contains `ts`
    ///
    /// Returns `None` for instants at or after now.
    pub fn zone_of(&self, ts: DateTime<Utc>) -> Option<Tier> {
        self.windows.iter().find(|w| w.contains(ts)).map(|w| w.tier)
    }

    /// Zero-based period index of `ts` within `tier`'s window
    pub fn period_index(&self, tier: Tier, ts: DateTime<Utc>) -> u64 {
        self.get(tier).period_index(ts)
    }
}

/// Start of a window reaching `count` periods back from `end`
fn window_start(period: Period, end: DateTime<Utc>, count: u32, floor: DateTime<Utc>) -> DateTime<Utc> {
    if count == 0 || end <= floor {
        return end;
    }

    let start = shift_back(period, end.date_naive(), count).and_then(|date| period_floor(period, date));

    match start {
        Some(date) => Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)).max(floor),
        None => floor,
    }
}

/// First day of the period containing `date`
fn period_floor(period: Period, date: NaiveDate) -> Option<NaiveDate> {
    match period {
        Period::Day => Some(date),
        Period::Week => date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday()))),
        Period::Month => date.with_day(1),
        Period::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1),
    }
}

/// The date `n` periods before `date`
fn shift_back(period: Period, date: NaiveDate, n: u32) -> Option<NaiveDate> {
    match period {
        Period::Day => date.checked_sub_days(Days::new(u64::from(n))),
        Period::Week => date.checked_sub_days(Days::new(u64::from(n) * 7)),
        Period::Month => date.checked_sub_months(Months::new(n)),
        Period::Year => date.checked_sub_months(Months::new(n.checked_mul(12)?)),
    }
}

/// Day ordinal of the Monday starting `date`'s ISO week
fn week_ordinal(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce()) - i64::from(date.weekday().num_days_from_monday())
}

/// Month ordinal (years * 12 + zero-based month)
fn month_ordinal(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}
