//! In-memory store for tests and simulations
//!
//! Behaves like a pool where snapshot names are unique per dataset and the
//! creation order is preserved.

use crate::{split_address, StoreError};
use snappy_domain::SnapshotStore;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
struct Dataset {
    snapshots: Vec<String>,
    changed: bool,
}

/// [`SnapshotStore`] keeping datasets in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    datasets: HashMap<String, Dataset>,
    fail_on: Option<String>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dataset with existing snapshot names (without the `dataset@` part)
    ///
    /// A new dataset starts out changed.
    pub fn add_dataset<I, S>(&mut self, dataset: &str, snapshots: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.datasets.entry(dataset.to_string()).or_insert_with(|| Dataset {
            snapshots: Vec::new(),
            changed: true,
        });
        entry.snapshots.extend(snapshots.into_iter().map(Into::into));
    }

    /// Mark a dataset as changed or unchanged since its last snapshot
    pub fn set_changed(&mut self, dataset: &str, changed: bool) {
        if let Some(entry) = self.datasets.get_mut(dataset) {
            entry.changed = changed;
        }
    }

    /// Make every operation touching `snapshot` fail
    pub fn fail_on(&mut self, snapshot: impl Into<String>) {
        self.fail_on = Some(snapshot.into());
    }

    /// Snapshot names of a dataset (without the `dataset@` part)
    pub fn snapshot_names(&self, dataset: &str) -> Vec<String> {
        self.datasets
            .get(dataset)
            .map(|d| d.snapshots.clone())
            .unwrap_or_default()
    }

    fn check_failure(&self, snapshot: &str) -> Result<(), StoreError> {
        match &self.fail_on {
            Some(target) if target == snapshot => Err(StoreError::Command {
                command: format!("memory {}", snapshot),
                stderr: "injected failure".to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn dataset(&self, name: &str) -> Result<&Dataset, StoreError> {
        self.datasets
            .get(name)
            .ok_or_else(|| StoreError::DatasetNotFound(name.to_string()))
    }

    fn dataset_mut(&mut self, name: &str) -> Result<&mut Dataset, StoreError> {
        self.datasets
            .get_mut(name)
            .ok_or_else(|| StoreError::DatasetNotFound(name.to_string()))
    }
}

impl SnapshotStore for MemoryStore {
    type Error = StoreError;

    fn list_snapshots(&self, dataset: &str) -> Result<Vec<String>, Self::Error> {
        let entry = self.dataset(dataset)?;
        Ok(entry
            .snapshots
            .iter()
            .map(|name| format!("{}@{}", dataset, name))
            .collect())
    }

    fn changed_since_last_snapshot(&self, dataset: &str) -> Result<bool, Self::Error> {
        Ok(self.dataset(dataset)?.changed)
    }

    fn create_snapshot(&mut self, snapshot: &str) -> Result<(), Self::Error> {
        self.check_failure(snapshot)?;
        let (dataset, name) = split_address(snapshot)?;
        let entry = self.dataset_mut(dataset)?;

        if entry.snapshots.iter().any(|s| s == name) {
            return Err(StoreError::SnapshotExists(snapshot.to_string()));
        }
        entry.snapshots.push(name.to_string());
        entry.changed = false;
        Ok(())
    }

    fn rename_snapshot(&mut self, from: &str, to: &str) -> Result<(), Self::Error> {
        self.check_failure(from)?;
        let (dataset, old) = split_address(from)?;
        let (target_dataset, new) = split_address(to)?;
        if dataset != target_dataset {
            return Err(StoreError::InvalidAddress(format!("{} -> {}", from, to)));
        }

        let entry = self.dataset_mut(dataset)?;
        if entry.snapshots.iter().any(|s| s == new) {
            return Err(StoreError::SnapshotExists(to.to_string()));
        }
        let slot = entry
            .snapshots
            .iter_mut()
            .find(|s| s.as_str() == old)
            .ok_or_else(|| StoreError::SnapshotNotFound(from.to_string()))?;
        *slot = new.to_string();
        Ok(())
    }

    fn destroy_snapshot(&mut self, snapshot: &str) -> Result<(), Self::Error> {
        self.check_failure(snapshot)?;
        let (dataset, name) = split_address(snapshot)?;
        let entry = self.dataset_mut(dataset)?;

        let position = entry
            .snapshots
            .iter()
            .position(|s| s == name)
            .ok_or_else(|| StoreError::SnapshotNotFound(snapshot.to_string()))?;
        entry.snapshots.remove(position);
        Ok(())
    }
}
