//! End-to-end tests for the azprov binary, run against the in-memory
//! provider with `--simulate`.

mod common;

use assert_cmd::Command;
use common::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// The binary in an isolated working directory with no ambient settings.
fn azprov(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("azprov").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("AZPROV_CONFIG")
        .env_remove("AZPROV_LOCATION")
        .env_remove("AZPROV_RDP_CLIENT")
        .env_remove("AZPROV_ADMIN_PASSWORD")
        .env_remove("AZURE_SUBSCRIPTION_ID")
        .env_remove("AZURE_ACCESS_TOKEN")
        .env_remove("RUST_LOG")
        .arg("--no-color");
    cmd
}

#[test]
fn test_help() {
    let dir = TempDir::new().unwrap();
    azprov(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("resource-group"))
        .stdout(predicate::str::contains("apply"));
}

#[test]
fn test_locations() {
    let dir = TempDir::new().unwrap();
    azprov(&dir)
        .args(["--simulate", "locations"])
        .assert()
        .success()
        .stdout(predicate::str::contains("uksouth"))
        .stdout(predicate::str::contains("UK South"));
}

#[test]
fn test_locations_as_json() {
    let dir = TempDir::new().unwrap();
    let output = azprov(&dir)
        .args(["--simulate", "--output", "json", "locations"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let regions: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = regions
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["eastus", "uksouth", "westeurope"]);
}

#[test]
fn test_sizes_are_regional() {
    let dir = TempDir::new().unwrap();
    azprov(&dir)
        .args(["--simulate", "sizes", "uksouth"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Standard_A1"));

    azprov(&dir)
        .args(["--simulate", "sizes", "westeurope"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Standard_B2s"))
        .stdout(predicate::str::contains("Standard_A1").not());
}

#[test]
fn test_sizes_for_an_unknown_region() {
    let dir = TempDir::new().unwrap();
    azprov(&dir)
        .args(["--simulate", "sizes", "atlantis"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("atlantis"));
}

#[test]
fn test_sizes_without_a_location() {
    let dir = TempDir::new().unwrap();
    azprov(&dir)
        .args(["--simulate", "sizes"])
        .assert()
        .code(2);
}

#[test]
fn test_location_from_environment() {
    let dir = TempDir::new().unwrap();
    azprov(&dir)
        .env("AZPROV_LOCATION", "uksouth")
        .args(["--simulate", "sizes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Standard_A1"));
}

#[test]
fn test_publishers_filter() {
    let dir = TempDir::new().unwrap();
    azprov(&dir)
        .args(["--simulate", "publishers", "eastus", "--filter", "*windows*"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MicrosoftWindowsDesktop"))
        .stdout(predicate::str::contains("Canonical").not());
}

#[test]
fn test_storage() {
    let dir = TempDir::new().unwrap();
    azprov(&dir)
        .args([
            "--simulate",
            "storage",
            "Test",
            "storageacc1",
            "uksouth",
            "--sku",
            "standard_grs",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("storageacc1"));
}

#[test]
fn test_storage_rejects_unknown_sku() {
    let dir = TempDir::new().unwrap();
    azprov(&dir)
        .args([
            "--simulate",
            "storage",
            "Test",
            "storageacc1",
            "uksouth",
            "--sku",
            "gold",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("gold"));
}

#[test]
fn test_vm_with_unknown_size_fails_validation() {
    let dir = TempDir::new().unwrap();
    azprov(&dir)
        .args([
            "--simulate",
            "vm",
            "Test",
            "vm1",
            "westeurope",
            "--size",
            "Standard_A1",
            "--nic",
            "vm1-nic",
            "--storage-account",
            "storageacc1",
            "--publisher",
            "MicrosoftWindowsServer",
            "--admin-username",
            "azureadmin",
            "--admin-password",
            "P@ssw0rd1234",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Standard_A1"));
}

#[test]
fn test_apply_deployment() {
    let dir = TempDir::new().unwrap();
    let file = temp_file(FULL_DEPLOYMENT, "yml");
    azprov(&dir)
        .args(["--simulate", "apply"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Windows VM"))
        .stdout(predicate::str::contains("RECAP"));
}

#[test]
fn test_apply_json_report() {
    let dir = TempDir::new().unwrap();
    let file = temp_file(FULL_DEPLOYMENT, "yml");
    let output = azprov(&dir)
        .args(["--simulate", "--output", "json", "apply"])
        .arg(file.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["check_mode"], serde_json::json!(false));
    assert_eq!(report["tasks"].as_array().unwrap().len(), 4);
}

#[test]
fn test_apply_in_check_mode() {
    let dir = TempDir::new().unwrap();
    let file = temp_file(FULL_DEPLOYMENT, "yml");
    azprov(&dir)
        .args(["--simulate", "--check", "apply"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Would create"));
}

#[test]
fn test_apply_syntax_check() {
    let dir = TempDir::new().unwrap();
    let file = temp_file(FULL_DEPLOYMENT, "yml");
    azprov(&dir)
        .args(["apply", "--syntax-check"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("4 task(s), syntax OK"));
}

#[test]
fn test_apply_unknown_module() {
    let dir = TempDir::new().unwrap();
    let file = temp_file("- azure_load_balancer:\n    name: lb1\n", "yml");
    azprov(&dir)
        .args(["--simulate", "apply"])
        .arg(file.path())
        .assert()
        .code(4)
        .stderr(predicate::str::contains("azure_load_balancer"));
}

#[test]
fn test_invalid_config_file() {
    let dir = TempDir::new().unwrap();
    let config = temp_file("[defaults\nlocation = ", "toml");
    azprov(&dir)
        .arg("--config")
        .arg(config.path())
        .args(["--simulate", "locations"])
        .assert()
        .code(4);
}

#[test]
fn test_completions() {
    let dir = TempDir::new().unwrap();
    azprov(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("azprov"));
}
