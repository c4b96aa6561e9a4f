//! Configuration for Janitor operations

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Janitor service
///
/// # Examples
///
/// ```
/// use snappy_janitor::JanitorConfig;
///
/// let config = JanitorConfig::default();
/// assert!(!config.dry_run);
/// assert!(!config.create);
/// assert_eq!(config.run_interval_minutes, 1440);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JanitorConfig {
    /// Dry-run mode: log what would be created, renamed or destroyed without touching anything
    /// Default: false
    #[serde(default)]
    pub dry_run: bool,

    /// Create the daily snapshot (when data changed) before applying retention
    /// Default: false
    #[serde(default)]
    pub create: bool,

    /// How often the worker runs a pass (in minutes)
    /// Default: once a day
    #[serde(default = "default_run_interval_minutes")]
    pub run_interval_minutes: u64,
}

fn default_run_interval_minutes() -> u64 {
    1440
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            create: false,
            run_interval_minutes: default_run_interval_minutes(),
        }
    }
}

impl JanitorConfig {
    /// Get run interval as Duration
    pub fn run_interval(&self) -> Duration {
        Duration::from_secs(self.run_interval_minutes.saturating_mul(60))
    }
}
