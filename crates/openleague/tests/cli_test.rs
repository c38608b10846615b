//! Integration tests for the `openleague` CLI binary.
//!
//! Each test gets its own temp directory for the store and config, so
//! nothing touches the user's real data.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn data_file(&self) -> PathBuf {
        self.dir.path().join("store.json")
    }

    fn config_file(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    /// A command with env isolation and the sandbox's store and config.
    fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = bare_cmd(self.dir.path());
        cmd.arg("--data-file")
            .arg(self.data_file())
            .arg("--config")
            .arg(self.config_file());
        cmd
    }

    fn admin(&self) -> assert_cmd::Command {
        let mut cmd = self.cmd();
        cmd.args(["--as", "admin-1", "--role", "admin"]);
        cmd
    }

    fn player(&self) -> assert_cmd::Command {
        let mut cmd = self.cmd();
        cmd.args(["--as", "player-1"]);
        cmd
    }

    fn create(&self, args: &[&str]) {
        self.admin()
            .args(["coupons", "create"])
            .args(args)
            .assert()
            .success();
    }

    fn stored(&self) -> serde_json::Value {
        let raw = std::fs::read_to_string(self.data_file()).unwrap();
        serde_json::from_str(&raw).unwrap()
    }
}

/// Clears all `OPENLEAGUE_*` env vars and points platform dirs at `home`.
fn bare_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("openleague");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env("XDG_DATA_HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("OPENLEAGUE_CONFIG")
        .env_remove("OPENLEAGUE_DATA_FILE")
        .env_remove("OPENLEAGUE_AS")
        .env_remove("OPENLEAGUE_ROLE")
        .env_remove("OPENLEAGUE_SUPER_ADMIN")
        .env_remove("OPENLEAGUE_OUTPUT");
    cmd
}

fn json_stdout(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let sandbox = Sandbox::new();
    let output = bare_cmd(sandbox.dir.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}

#[test]
fn test_help_flag() {
    let sandbox = Sandbox::new();
    bare_cmd(sandbox.dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("coupons")
                .and(predicate::str::contains("access"))
                .and(predicate::str::contains("config")),
        );
}

#[test]
fn test_version_flag() {
    let sandbox = Sandbox::new();
    bare_cmd(sandbox.dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("openleague"));
}

#[test]
fn test_completions_zsh() {
    let sandbox = Sandbox::new();
    bare_cmd(sandbox.dir.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Coupon lifecycle ────────────────────────────────────────────────

#[test]
fn test_redeem_until_exhausted() {
    let sandbox = Sandbox::new();
    sandbox.create(&["--code", "gas-1", "--type", "gas-sponsorship", "--max-uses", "2"]);

    for _ in 0..2 {
        sandbox
            .player()
            .args(["coupons", "redeem", "GAS-1", "--tx-hash", "0xabc"])
            .assert()
            .success();
    }

    sandbox
        .player()
        .args(["coupons", "redeem", "GAS-1"])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("exhausted"));

    let stored = sandbox.stored();
    assert_eq!(stored["coupons"][0]["code"], "GAS-1");
    assert_eq!(stored["coupons"][0]["uses_count"], 2);
    assert_eq!(stored["usage"].as_array().unwrap().len(), 2);
}

#[test]
fn test_validate_reports_remaining_uses() {
    let sandbox = Sandbox::new();
    sandbox.create(&["--code", "DSC-9", "--type", "discount", "--max-uses", "3"]);
    sandbox
        .player()
        .args(["coupons", "redeem", "DSC-9"])
        .assert()
        .success();

    let output = sandbox
        .cmd()
        .args(["-o", "json", "coupons", "validate", "dsc-9"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let body = json_stdout(&output);
    assert_eq!(body["remaining_uses"], 2);
    assert_eq!(body["type"], "DISCOUNT");
}

#[test]
fn test_generated_code_uses_type_prefix() {
    let sandbox = Sandbox::new();
    let output = sandbox
        .admin()
        .args(["-o", "plain", "coupons", "create", "--type", "feature-unlock"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let code = String::from_utf8_lossy(&output.stdout).trim().to_owned();
    assert!(code.starts_with("FTR-"), "{code}");
    assert_eq!(code.len(), "FTR-".len() + 8);
}

#[test]
fn test_amount_cap_enforced() {
    let sandbox = Sandbox::new();
    sandbox.create(&[
        "--code",
        "GAS-CAP",
        "--type",
        "gas-sponsorship",
        "--max-uses",
        "5",
        "--max-amount",
        "100",
    ]);

    sandbox
        .player()
        .args(["coupons", "redeem", "GAS-CAP", "--amount", "150"])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("cap"));

    sandbox
        .player()
        .args(["coupons", "redeem", "GAS-CAP", "--amount", "50"])
        .assert()
        .success();

    assert_eq!(sandbox.stored()["coupons"][0]["uses_count"], 1);
}

#[test]
fn test_expired_coupon_is_rejected() {
    let sandbox = Sandbox::new();
    sandbox.create(&["--code", "OLD-1", "--type", "discount", "--max-uses", "10"]);

    sandbox
        .admin()
        .args(["-y", "coupons", "expire", "OLD-1"])
        .assert()
        .success();

    sandbox
        .cmd()
        .args(["coupons", "validate", "OLD-1"])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("expired"));
    sandbox
        .player()
        .args(["coupons", "redeem", "OLD-1"])
        .assert()
        .code(7);
}

#[test]
fn test_expire_needs_confirmation_without_tty() {
    let sandbox = Sandbox::new();
    sandbox.create(&["--code", "KEEP", "--type", "discount"]);
    sandbox
        .admin()
        .args(["coupons", "expire", "KEEP"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));
}

#[test]
fn test_past_expiry_is_invalid() {
    let sandbox = Sandbox::new();
    sandbox
        .admin()
        .args([
            "coupons",
            "create",
            "--type",
            "discount",
            "--expires-at",
            "2020-01-01",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("expires_at"));
}

#[test]
fn test_duplicate_code_conflicts() {
    let sandbox = Sandbox::new();
    sandbox.create(&["--code", "TWICE", "--type", "discount"]);
    sandbox
        .admin()
        .args(["coupons", "create", "--code", "twice", "--type", "discount"])
        .assert()
        .code(6);
}

#[test]
fn test_unknown_code_not_found() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["coupons", "get", "NOPE"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("not found"));
}

// ── Access ──────────────────────────────────────────────────────────

#[test]
fn test_user_cannot_create() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["--as", "u1", "coupons", "create", "--type", "discount"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Forbidden"));
    assert!(!sandbox.data_file().exists());
}

#[test]
fn test_redeem_without_principal() {
    let sandbox = Sandbox::new();
    sandbox.create(&["--code", "P-1", "--type", "discount", "--max-uses", "2"]);
    sandbox
        .cmd()
        .args(["coupons", "redeem", "P-1"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("--as"));

    assert_eq!(sandbox.stored()["coupons"][0]["uses_count"], 0);
    assert!(sandbox.stored()["usage"].as_array().unwrap().is_empty());
}

#[test]
fn test_create_without_principal() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["coupons", "create", "--type", "discount"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("--as"));
}

#[test]
fn test_usage_restricted_to_owner_or_admin() {
    let sandbox = Sandbox::new();
    sandbox.create(&["--code", "LOG-1", "--type", "discount", "--max-uses", "2"]);
    sandbox
        .player()
        .args(["coupons", "redeem", "LOG-1", "--metadata", r#"{"match":"m-7"}"#])
        .assert()
        .success();

    sandbox
        .cmd()
        .args(["--as", "u2", "coupons", "usage", "LOG-1"])
        .assert()
        .code(5);

    let output = sandbox
        .admin()
        .args(["-o", "json", "coupons", "usage", "LOG-1"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let records = json_stdout(&output);
    assert_eq!(records.as_array().unwrap().len(), 1);
    assert_eq!(records[0]["metadata"]["match"], "m-7");
}

#[test]
fn test_access_check_owner_allowed() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["-o", "plain", "--as", "u1", "access", "check", "--owner", "u1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("allow"));
}

#[test]
fn test_access_check_other_user_denied() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args([
            "-o", "plain", "--as", "u2", "access", "check", "--owner", "u1", "--require", "admin",
        ])
        .assert()
        .code(5)
        .stdout(predicate::str::contains("deny"));
}

#[test]
fn test_access_check_super_admin_json() {
    let sandbox = Sandbox::new();
    let output = sandbox
        .cmd()
        .args([
            "-o",
            "json",
            "--as",
            "root",
            "--super-admin",
            "access",
            "check",
            "--owner",
            "u1",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let body = json_stdout(&output);
    assert_eq!(body["decision"], "allow");
    assert_eq!(body["reason"], "super_admin");
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_init_then_refuses_overwrite() {
    let sandbox = Sandbox::new();
    sandbox.cmd().args(["config", "init"]).assert().success();
    assert!(sandbox.config_file().exists());

    sandbox
        .cmd()
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    sandbox
        .cmd()
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_file_sets_output_format() {
    let sandbox = Sandbox::new();
    std::fs::write(sandbox.config_file(), "[defaults]\noutput = \"json\"\n").unwrap();
    sandbox.create(&["--code", "CFG-1", "--type", "discount"]);

    let output = sandbox
        .cmd()
        .args(["coupons", "list"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let list = json_stdout(&output);
    assert_eq!(list[0]["code"], "CFG-1");
}

#[test]
fn test_config_path_honours_flag() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}
