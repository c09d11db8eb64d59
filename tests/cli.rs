//! End-to-end tests for the finreport binary
//!
//! Each test points FINREPORT_DATA_DIR at a fresh temp directory so runs
//! never touch real user data.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn finreport(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("finreport").unwrap();
    cmd.env("FINREPORT_DATA_DIR", data_dir.path());
    cmd
}

fn write_bundle(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("bundle.json");
    std::fs::write(
        &path,
        r#"{
            "accounts": [
                {"id": "a1", "name": "Checking", "type": "checking", "balance": 100000}
            ],
            "transactions": [
                {"id": "t1", "date": "2024-01-15", "description": "Groceries",
                 "category": "Food", "amount": -4250, "account_id": "a1"}
            ]
        }"#,
    )
    .unwrap();
    path
}

#[test]
fn test_export_qif() {
    let dir = TempDir::new().unwrap();
    let bundle = write_bundle(&dir);
    let out = dir.path().join("out.qif");

    finreport(&dir)
        .args(["export", bundle.to_str().unwrap(), "-f", "qif", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported"));

    let qif = std::fs::read_to_string(&out).unwrap();
    assert!(qif.starts_with("!Account\nNChecking\nTBank\n$1000.00\n^\n"));
    assert!(qif.contains("PGroceries"));
}

#[test]
fn test_export_csv_grouped() {
    let dir = TempDir::new().unwrap();
    let bundle = write_bundle(&dir);
    let out = dir.path().join("out.csv");

    finreport(&dir)
        .args([
            "export",
            bundle.to_str().unwrap(),
            "--transactions-only",
            "--group-by",
            "category",
            "-o",
        ])
        .arg(&out)
        .assert()
        .success();

    let csv = std::fs::read_to_string(&out).unwrap();
    assert!(csv.contains("Food,1,"));
}

#[test]
fn test_template_defaults_seeded() {
    let dir = TempDir::new().unwrap();

    finreport(&dir)
        .args(["template", "list"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Monthly Summary")
                .and(predicate::str::contains("Transaction Report"))
                .and(predicate::str::contains("Investment Portfolio")),
        );
}

#[test]
fn test_schedule_add_and_list() {
    let dir = TempDir::new().unwrap();

    finreport(&dir)
        .args(["schedule", "add", "Weekly Summary", "-q", "weekly", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created schedule Weekly Summary"));

    finreport(&dir)
        .args(["schedule", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Weekly Summary").and(predicate::str::contains("next:")));
}

#[test]
fn test_schedule_rm_unknown_fails() {
    let dir = TempDir::new().unwrap();

    finreport(&dir)
        .args(["schedule", "rm", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Schedule not found"));
}

#[test]
fn test_backup_run_and_history() {
    let dir = TempDir::new().unwrap();

    finreport(&dir)
        .args(["backup", "run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup complete: 1 record(s)."));

    finreport(&dir)
        .args(["backup", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("finreport-backup-"));

    finreport(&dir)
        .args(["history", "--backups"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"));
}

#[test]
fn test_backup_config_roundtrip() {
    let dir = TempDir::new().unwrap();

    finreport(&dir)
        .args([
            "backup",
            "set-config",
            "--enabled",
            "true",
            "--frequency",
            "daily",
            "--time",
            "03:30",
        ])
        .assert()
        .success();

    finreport(&dir)
        .args(["backup", "show-config"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Enabled:        true")
                .and(predicate::str::contains("Frequency:      daily"))
                .and(predicate::str::contains("Time:           03:30")),
        );
}
