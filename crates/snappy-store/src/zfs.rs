//! ZFS store backed by the `zfs` command line tool

use crate::{split_address, StoreError};
use snappy_domain::SnapshotStore;
use std::path::PathBuf;
use std::process::Command;

/// Default name of the zfs binary, resolved through `PATH`
pub const DEFAULT_ZFS: &str = "zfs";

/// [`SnapshotStore`] that runs `zfs` for every operation
#[derive(Debug, Clone)]
pub struct ZfsStore {
    binary: PathBuf,
}

impl ZfsStore {
    /// Store using `zfs` from `PATH`
    pub fn new() -> Self {
        Self::with_binary(DEFAULT_ZFS)
    }

    /// Store using a specific zfs binary
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self { binary: binary.into() }
    }

    fn run(&self, args: &[&str]) -> Result<String, StoreError> {
        let command = format!("{} {}", self.binary.display(), args.join(" "));
        tracing::trace!(%command, "Running zfs");

        let output = Command::new(&self.binary).args(args).output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::trace!(%command, status = ?output.status, %stderr, "zfs failed");
            return Err(StoreError::Command { command, stderr });
        }

        String::from_utf8(output.stdout).map_err(|e| StoreError::Parse(format!("non UTF-8 output from {}: {}", command, e)))
    }
}

impl Default for ZfsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore for ZfsStore {
    type Error = StoreError;

    fn list_snapshots(&self, dataset: &str) -> Result<Vec<String>, Self::Error> {
        let stdout = self.run(&["list", "-H", "-p", "-t", "snapshot", "-o", "name", "-s", "creation", "-d", "1", dataset])?;
        parse_snapshot_list(&stdout, dataset)
    }

    fn changed_since_last_snapshot(&self, dataset: &str) -> Result<bool, Self::Error> {
        let stdout = self.run(&["get", "-H", "-p", "-o", "value", "written", dataset])?;
        parse_written(&stdout).map(|written| written > 0)
    }

    fn create_snapshot(&mut self, snapshot: &str) -> Result<(), Self::Error> {
        split_address(snapshot)?;
        self.run(&["snapshot", snapshot]).map(|_| ())
    }

    fn rename_snapshot(&mut self, from: &str, to: &str) -> Result<(), Self::Error> {
        split_address(from)?;
        split_address(to)?;
        self.run(&["rename", from, to]).map(|_| ())
    }

    fn destroy_snapshot(&mut self, snapshot: &str) -> Result<(), Self::Error> {
        // A bare dataset name would destroy the dataset itself
        split_address(snapshot)?;
        self.run(&["destroy", snapshot]).map(|_| ())
    }
}

/// Parse `zfs list -H -o name` output for one dataset
///
/// Snapshots of other datasets are ignored.
fn parse_snapshot_list(stdout: &str, dataset: &str) -> Result<Vec<String>, StoreError> {
    let mut names = Vec::new();
    for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let (owner, _) = split_address(line).map_err(|_| StoreError::Parse(format!("not a snapshot: {}", line)))?;
        if owner == dataset {
            names.push(line.to_string());
        }
    }
    Ok(names)
}

/// Parse the `written` property (bytes, `-p` form)
fn parse_written(stdout: &str) -> Result<u64, StoreError> {
    let value = stdout.trim();
    // Not yet snapshotted datasets may report "-"
    if value == "-" {
        return Ok(u64::MAX);
    }
    value
        .parse()
        .map_err(|_| StoreError::Parse(format!("written property: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snapshot_list() {
        let stdout = "tank/home@snappy-2024-06-11_08:00:00_daily\n\
                      tank/home/child@snappy-2024-06-11_08:00:00_daily\n\
                      tank/home@manual\n\n";
        let names = parse_snapshot_list(stdout, "tank/home").unwrap();
        assert_eq!(names, vec!["tank/home@snappy-2024-06-11_08:00:00_daily", "tank/home@manual"]);
    }

    #[test]
    fn test_parse_snapshot_list_rejects_garbage() {
        assert!(matches!(parse_snapshot_list("tank/home\n", "tank/home"), Err(StoreError::Parse(_))));
    }

    #[test]
    fn test_parse_written() {
        assert_eq!(parse_written("0\n").unwrap(), 0);
        assert_eq!(parse_written("1048576\n").unwrap(), 1_048_576);
        assert!(parse_written("-").unwrap() > 0);
        assert!(parse_written("12K").is_err());
    }

    #[test]
    fn test_destroy_requires_snapshot_address() {
        let mut store = ZfsStore::with_binary("/nonexistent/zfs");
        assert!(matches!(store.destroy_snapshot("tank/home"), Err(StoreError::InvalidAddress(_))));
    }

    #[test]
    fn test_missing_binary_is_io_error() {
        let store = ZfsStore::with_binary("/nonexistent/zfs");
        assert!(matches!(store.list_snapshots("tank/home"), Err(StoreError::Io(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_command_reports_stderr() {
        // `false` ignores its arguments and exits 1
        let store = ZfsStore::with_binary("false");
        match store.changed_since_last_snapshot("tank/home") {
            Err(StoreError::Command { command, .. }) => assert!(command.starts_with("false get")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
