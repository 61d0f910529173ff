//! CLI smoke tests against the built binary.

use std::io::Write;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

fn keeper() -> Command {
    let mut cmd = cargo_bin_cmd!("twap-keeper");
    cmd.env_remove("KEEPER_PRIVATE_KEY").env_remove("RUST_LOG");
    cmd
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

fn valid_config() -> NamedTempFile {
    config_file(
        r#"
[chain]
rpc_url = "http://127.0.0.1:8545"
contract_address = "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512"
"#,
    )
}

#[test]
fn help_lists_subcommands() {
    keeper()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("twap-keeper"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("order"))
        .stdout(predicate::str::contains("scan"));
}

#[test]
fn version_prints_name() {
    keeper()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("twap-keeper"));
}

#[test]
fn check_config_accepts_valid_file() {
    let file = valid_config();
    keeper()
        .args(["check", "config", "--config"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file is valid"))
        .stdout(predicate::str::contains("Signing key not configured"));
}

#[test]
fn check_config_reports_signer_address() {
    let file = valid_config();
    keeper()
        .env("KEEPER_PRIVATE_KEY", ANVIL_KEY)
        .args(["--json", "check", "config", "--config"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
        ))
        .stdout(predicate::str::contains("\"valid\":true"));
}

#[test]
fn invalid_config_exits_nonzero() {
    let file = config_file("[chain]\ncontract_address = \"not-an-address\"\n");
    keeper()
        .args(["check", "config", "--config"])
        .arg(file.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("contract_address"));
}

#[test]
fn missing_config_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    keeper()
        .args(["run", "--config"])
        .arg(dir.path().join("missing.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn run_without_key_fails_before_connecting() {
    let file = valid_config();
    keeper()
        .args(["--quiet", "run", "--config"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("KEEPER_PRIVATE_KEY"));
}

#[test]
fn order_requires_an_id() {
    keeper().arg("order").assert().failure();
}
