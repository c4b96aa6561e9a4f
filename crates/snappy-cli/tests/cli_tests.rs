//! End-to-end tests driving the `snappy` binary against a fake zfs

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const CONF: &str = "\
[tank/home]
    use_template = base

[template_base]
    daily = 2
    weekly = 1
    monthly = 0
    yearly = 1
";

/// Fake zfs: lists fixed snapshots, reports changes, and logs mutating calls
fn fake_zfs(dir: &Path) -> PathBuf {
    let log = dir.join("calls.log");
    let script = format!(
        "#!/bin/sh\n\
         case \"$1\" in\n\
         list)\n\
         printf 'tank/home@snappy-2024-06-02_08:00:00_daily\\n'\n\
         printf 'tank/home@snappy-2024-06-11_08:00:00_daily\\n'\n\
         printf 'tank/home@snappy-2024-06-11_09:00:00_daily\\n'\n\
         printf 'tank/home@manual\\n'\n\
         ;;\n\
         get)\n\
         printf '4096\\n'\n\
         ;;\n\
         *)\n\
         echo \"$@\" >> {}\n\
         ;;\n\
         esac\n",
        log.display()
    );

    let path = dir.join("zfs");
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

struct Env {
    dir: TempDir,
    zfs: PathBuf,
    conf: PathBuf,
}

impl Env {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let zfs = fake_zfs(dir.path());
        let conf = dir.path().join("sanoid.conf");
        fs::write(&conf, CONF).unwrap();
        Self { dir, zfs, conf }
    }

    fn snappy(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_snappy"))
            .arg("--conf")
            .arg(&self.conf)
            .arg("--zfs")
            .arg(&self.zfs)
            .args(["--now", "2024-06-12T12:00:00Z", "--format", "quiet"])
            .args(args)
            .env_remove("RUST_LOG")
            .output()
            .unwrap()
    }

    fn calls(&self) -> String {
        fs::read_to_string(self.dir.path().join("calls.log")).unwrap_or_default()
    }
}

#[test]
fn test_plan_prints_actions_without_running_them() {
    let env = Env::new();
    let output = env.snappy(&["plan", "tank/home"]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "[DRY] RENAME tank/home@snappy-2024-06-02_08:00:00_daily → tank/home@snappy-2024-06-02_08:00:00_yearly\n\
         [DRY] DELETE tank/home@snappy-2024-06-11_09:00:00_daily\n"
    );
    assert!(env.calls().is_empty());
}

#[test]
fn test_run_calls_zfs_in_order() {
    let env = Env::new();
    let output = env.snappy(&["--create", "tank/home"]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        env.calls(),
        "snapshot tank/home@snappy-2024-06-12_12:00:00_daily\n\
         rename tank/home@snappy-2024-06-02_08:00:00_daily tank/home@snappy-2024-06-02_08:00:00_yearly\n\
         destroy tank/home@snappy-2024-06-11_09:00:00_daily\n"
    );
}

#[test]
fn test_dry_run_changes_nothing() {
    let env = Env::new();
    let output = env.snappy(&["run", "tank/home", "--create", "--dry"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("[DRY] CREATE tank/home@snappy-2024-06-12_12:00:00_daily\n"));
    assert!(env.calls().is_empty());
}

#[test]
fn test_config_command() {
    let env = Env::new();
    let output = env.snappy(&["config", "tank/home"]);

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "daily=2 weekly=1 monthly=0 yearly=1 prefix=snappy\n"
    );
}

#[test]
fn test_unknown_dataset_exits_with_error() {
    let env = Env::new();
    let output = env.snappy(&["run", "tank/none"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: Configuration error: Dataset 'tank/none' not found"));
}

#[test]
fn test_missing_config_file() {
    let output = Command::new(env!("CARGO_BIN_EXE_snappy"))
        .args(["--conf", "/nonexistent/sanoid.conf", "config", "tank/home"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("/nonexistent/sanoid.conf"));
}
