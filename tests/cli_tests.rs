//! Integration tests for the vault-config CLI
//!
//! These tests run the built binary end-to-end. None of them reach a real
//! Vault server.

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Get the path to the vault-config binary
fn binary() -> std::path::PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test executable name
    path.pop(); // Remove deps directory

    path.push("vault-config");

    if cfg!(windows) {
        path.set_extension("exe");
    }

    path
}

/// Run vault-config in `dir` with a clean Vault environment
fn run(dir: &Path, args: &[&str], env: &[(&str, &str)]) -> std::process::Output {
    let mut command = Command::new(binary());
    command
        .args(args)
        .current_dir(dir)
        .env_remove("VAULT_ADDR")
        .env_remove("VAULT_TOKEN")
        .env_remove("VAULT_CONFIG_VARS")
        .env("HOME", dir);

    for (key, value) in env {
        command.env(key, value);
    }

    command.output().expect("Failed to execute vault-config")
}

fn write(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn test_version() {
    let temp = TempDir::new().unwrap();
    let output = run(temp.path(), &["--version"], &[]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("vault-config"));
}

#[test]
fn test_generate_help() {
    let temp = TempDir::new().unwrap();
    let output = run(temp.path(), &["generate", "--help"], &[]);

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--template"));
    assert!(stdout.contains("--vars"));
    assert!(stdout.contains("--set"));
}

#[test]
fn test_generate_to_stdout() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "vars.hcl",
        "storage_path = \"/vault/data\"\nNODE = \"from-file\"\n",
    );
    write(
        temp.path(),
        "vault.hcl.tpl",
        "storage \"raft\" {\n  path    = \"[[storage_path]]\"\n  node_id = \"[[Lookup \"NODE\"]]\"\n}\n",
    );

    let output = run(
        temp.path(),
        &["generate", "--template", "vault.hcl.tpl"],
        &[("NODE", "from-env")],
    );

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "storage \"raft\" {\n  path    = \"/vault/data\"\n  node_id = \"from-env\"\n}\n"
    );
}

#[test]
fn test_generate_to_file_with_set() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "vars.yaml", "log_level: info\n");
    write(temp.path(), "tpl", "log_level = \"[[log_level]]\"\n");

    let output = run(
        temp.path(),
        &[
            "generate",
            "-t",
            "tpl",
            "-v",
            "vars.yaml",
            "-s",
            "log_level=trace",
            "-o",
            "out/vault.hcl",
        ],
        &[],
    );

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty());
    assert_eq!(
        std::fs::read_to_string(temp.path().join("out/vault.hcl")).unwrap(),
        "log_level = \"trace\"\n"
    );
}

#[test]
fn test_missing_vars_file_is_fine() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "tpl", "plain {{ untouched }} text\n");

    let output = run(temp.path(), &["generate", "-t", "tpl"], &[]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "plain {{ untouched }} text\n"
    );
}

#[test]
fn test_undefined_variable_fails() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "tpl", "a = \"[[Lookup \"VAULT_CONFIG_TEST_UNSET\"]]\"\n");

    let output = run(temp.path(), &["generate", "-t", "tpl", "-o", "out.hcl"], &[]);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(!temp.path().join("out.hcl").exists());
    assert!(String::from_utf8_lossy(&output.stderr).contains("VAULT_CONFIG_TEST_UNSET"));
}

#[test]
fn test_malformed_vars_file_fails() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "vars.hcl", "this = = broken {");
    write(temp.path(), "tpl", "x\n");

    let output = run(temp.path(), &["generate", "-t", "tpl"], &[]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("vars.hcl"));
}

#[test]
fn test_unreachable_vault_fails() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "tpl", "[[LookupSecret \"secret/db\"]]\n");

    let output = run(
        temp.path(),
        &["generate", "-t", "tpl", "--vault-timeout", "5"],
        &[("VAULT_ADDR", "http://127.0.0.1:1"), ("VAULT_TOKEN", "s.test")],
    );

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("secret/db"));
}

#[test]
fn test_custom_delimiters() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "tpl", "port = <%Lookup \"PORT\"%> [[not an action]]\n");

    let output = run(
        temp.path(),
        &[
            "generate",
            "-t",
            "tpl",
            "--left-delim",
            "<%",
            "--right-delim",
            "%>",
        ],
        &[("PORT", "8200")],
    );

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "port = 8200 [[not an action]]\n"
    );
}
