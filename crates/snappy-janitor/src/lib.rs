//! Snappy Janitor
//!
//! Executor for tiered snapshot retention.
//!
//! # Overview
//!
//! The Janitor is responsible for:
//! - **Creation**: taking today's daily snapshot when the data changed
//! - **Promotion**: relabelling snapshots to an older tier as they age
//! - **Pruning**: destroying snapshots that are redundant within their period
//! - **Metrics collection**: counting actions across passes
//!
//! Decisions come from `snappy-domain`; this crate only sequences them
//! against a [`SnapshotStore`](snappy_domain::SnapshotStore). Renames are
//! applied before deletions and a pass stops at the first failed action.
//!
//! # Usage
//!
//! ## One-time Pass
//!
//! ```no_run
//! use chrono::Utc;
//! use snappy_domain::RetentionPolicy;
//! use snappy_janitor::Janitor;
//! use snappy_store::ZfsStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = ZfsStore::new();
//! let mut janitor = Janitor::default_config();
//! let policy = RetentionPolicy { daily: 7, weekly: 4, ..Default::default() };
//!
//! let report = janitor.run(&mut store, "tank/home", &policy, Utc::now())?;
//! println!("{}", janitor.metrics().summary());
//! # Ok(())
//! # }
//! ```
//!
//! ## Background Worker
//!
//! See [`JanitorWorker`].
//!
//! # Configuration
//!
//! ```toml
//! [janitor]
//! dry_run = false
//! create = true
//! run_interval_minutes = 1440
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod janitor;
mod metrics;
mod worker;

pub use config::JanitorConfig;
pub use error::JanitorError;
pub use janitor::{Janitor, RunReport};
pub use metrics::JanitorMetrics;
pub use worker::{JanitorWorker, ManagedDataset};
