//! Trait definitions for external interactions
//!
//! The domain crate never touches a filesystem. Snapshot inventories and the
//! actions of a plan cross this boundary through [`SnapshotStore`], implemented
//! in `snappy-store`.

/// Access to a copy-on-write filesystem's snapshots
///
/// Snapshot arguments are full addresses (`dataset@name`).
pub trait SnapshotStore {
    /// Error type for store operations
    type Error;

    /// Names of the dataset's snapshots as `dataset@name`, oldest first
    fn list_snapshots(&self, dataset: &str) -> Result<Vec<String>, Self::Error>;

    /// Whether the dataset has changed since its most recent snapshot
    fn changed_since_last_snapshot(&self, dataset: &str) -> Result<bool, Self::Error>;

    /// Create a snapshot
    fn create_snapshot(&mut self, snapshot: &str) -> Result<(), Self::Error>;

    /// Rename a snapshot within its dataset
    fn rename_snapshot(&mut self, from: &str, to: &str) -> Result<(), Self::Error>;

    /// Destroy a snapshot
    fn destroy_snapshot(&mut self, snapshot: &str) -> Result<(), Self::Error>;
}
