//! Metrics collection for Janitor operations

use snappy_domain::Tier;
use std::collections::HashMap;

/// Metrics collected during Janitor operations
///
/// Dry runs only count passes; no actions are recorded for them.
#[derive(Debug, Clone, Default)]
pub struct JanitorMetrics {
    /// Snapshots created
    pub created: usize,

    /// Snapshots promoted, keyed by the tier they were promoted to
    pub promoted: HashMap<Tier, usize>,

    /// Snapshots destroyed, keyed by the tier label they carried
    pub deleted: HashMap<Tier, usize>,

    /// Dataset passes completed
    pub run_count: usize,

    /// Dataset passes that failed
    pub failures: usize,

    /// Total runtime in milliseconds
    pub total_runtime_ms: u64,
}

impl JanitorMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a snapshot creation
    pub fn record_creation(&mut self) {
        self.created += 1;
    }

    /// Record a promotion to `to_tier`
    pub fn record_promotion(&mut self, to_tier: Tier) {
        *self.promoted.entry(to_tier).or_insert(0) += 1;
    }

    /// Record a snapshot destruction
    pub fn record_deletion(&mut self, tier: Tier) {
        *self.deleted.entry(tier).or_insert(0) += 1;
    }

    /// Record a completed pass
    pub fn record_run(&mut self) {
        self.run_count += 1;
    }

    /// Record a failed pass
    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    /// Get total snapshots destroyed across all tiers
    pub fn total_deleted(&self) -> usize {
        self.deleted.values().sum()
    }

    /// Get total promotions across all tiers
    pub fn total_promoted(&self) -> usize {
        self.promoted.values().sum()
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Janitor Metrics Summary".to_string(),
            "======================".to_string(),
            format!("Passes: {}", self.run_count),
            format!("Failed passes: {}", self.failures),
            format!("Total runtime: {}ms", self.total_runtime_ms),
            format!("Created: {}", self.created),
            String::new(),
        ];

        if !self.promoted.is_empty() {
            lines.push("Promotions to tier:".to_string());
            for tier in Tier::ALL {
                if let Some(count) = self.promoted.get(&tier) {
                    lines.push(format!("  {}: {}", tier, count));
                }
            }
            lines.push(format!("  Total: {}", self.total_promoted()));
            lines.push(String::new());
        }

        if !self.deleted.is_empty() {
            lines.push("Deletions by tier:".to_string());
            for tier in Tier::ALL {
                if let Some(count) = self.deleted.get(&tier) {
                    lines.push(format!("  {}: {}", tier, count));
                }
            }
            lines.push(format!("  Total: {}", self.total_deleted()));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = JanitorMetrics::new();
        assert_eq!(metrics.total_deleted(), 0);
        assert_eq!(metrics.total_promoted(), 0);
        assert_eq!(metrics.created, 0);
        assert_eq!(metrics.run_count, 0);
    }

    #[test]
    fn test_record_deletion() {
        let mut metrics = JanitorMetrics::new();
        metrics.record_deletion(Tier::Daily);
        metrics.record_deletion(Tier::Weekly);
        metrics.record_deletion(Tier::Daily);

        assert_eq!(metrics.deleted[&Tier::Daily], 2);
        assert_eq!(metrics.deleted[&Tier::Weekly], 1);
        assert_eq!(metrics.total_deleted(), 3);
    }

    #[test]
    fn test_record_promotion() {
        let mut metrics = JanitorMetrics::new();
        metrics.record_promotion(Tier::Weekly);
        metrics.record_promotion(Tier::Yearly);
        metrics.record_promotion(Tier::Weekly);

        assert_eq!(metrics.promoted[&Tier::Weekly], 2);
        assert_eq!(metrics.total_promoted(), 3);
    }

    #[test]
    fn test_summary() {
        let mut metrics = JanitorMetrics::new();
        metrics.record_creation();
        metrics.record_promotion(Tier::Monthly);
        metrics.record_deletion(Tier::Daily);
        metrics.record_run();
        metrics.total_runtime_ms = 120;

        let summary = metrics.summary();
        assert!(summary.contains("Passes: 1"));
        assert!(summary.contains("Total runtime: 120ms"));
        assert!(summary.contains("Created: 1"));
        assert!(summary.contains("monthly: 1"));
        assert!(summary.contains("daily: 1"));
    }
}
