//! Snappy Domain Layer
//!
//! Pure decision logic for tiered snapshot retention. Given a dataset's
//! snapshot names, a retention policy and the current instant, this crate
//! decides which snapshots to create, promote to an older tier, or delete.
//! It performs no I/O and does not log; every decision is returned as an
//! inspectable value.
//!
//! ## Key Concepts
//!
//! - **Tier**: retention granularity (daily → weekly → monthly → yearly)
//! - **Snapshot name**: `<prefix>-YYYY-MM-DD_HH:MM:SS_<tier>`, timestamp in UTC
//! - **Tier window**: half-open time range owned by one tier, chained from "now"
//! - **Zone**: the tier whose window contains a snapshot's timestamp
//! - **Promotion**: relabelling a snapshot to an older tier
//!
//! ## Architecture
//!
//! - Calendar arithmetic via `chrono` is the only dependency
//! - Filesystem access goes through [`SnapshotStore`], implemented elsewhere

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod creation;
pub mod inventory;
pub mod name;
pub mod plan;
pub mod policy;
pub mod tier;
pub mod traits;
pub mod window;

// Re-exports for convenience
pub use creation::{should_create, CreationDecision};
pub use inventory::SnapshotRecord;
pub use name::SnapshotName;
pub use plan::{plan, PeriodSelection, RetentionPlan, Rename};
pub use policy::{RetentionPolicy, DEFAULT_PREFIX};
pub use tier::{Period, Tier};
pub use traits::SnapshotStore;
pub use window::{TierWindow, TierWindows};
