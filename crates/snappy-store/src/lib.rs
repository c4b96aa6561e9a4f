//! Snappy Storage Layer
//!
//! Implements the [`SnapshotStore`] trait for ZFS and for an in-memory pool.
//!
//! # Examples
//!
//! ```no_run
//! use snappy_domain::SnapshotStore;
//! use snappy_store::ZfsStore;
//!
//! let store = ZfsStore::new();
//! let names = store.list_snapshots("tank/home").unwrap();
//! ```

#![warn(missing_docs)]

pub mod memory;
pub mod zfs;

pub use memory::MemoryStore;
pub use snappy_domain::SnapshotStore;
pub use zfs::ZfsStore;

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// The filesystem tool exited with a failure
    #[error("Command failed: {command}: {stderr}")]
    Command {
        /// Command line that was run
        command: String,
        /// Captured standard error
        stderr: String,
    },

    /// The filesystem tool could not be started
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Output could not be understood
    #[error("Unexpected output: {0}")]
    Parse(String),

    /// Dataset does not exist
    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    /// Snapshot does not exist
    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),

    /// Snapshot name is already taken
    #[error("Snapshot already exists: {0}")]
    SnapshotExists(String),

    /// Snapshot address is not `dataset@name`
    #[error("Invalid snapshot address: {0}")]
    InvalidAddress(String),
}

/// Split a `dataset@name` address
pub(crate) fn split_address(snapshot: &str) -> Result<(&str, &str), StoreError> {
    match snapshot.split_once('@') {
        Some((dataset, name)) if !dataset.is_empty() && !name.is_empty() => Ok((dataset, name)),
        _ => Err(StoreError::InvalidAddress(snapshot.to_string())),
    }
}
