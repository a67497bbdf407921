//! Runs the built `hub` binary end to end

use std::process::Command;

use tempfile::TempDir;

fn hub(project_dir: &TempDir) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_hub"));
    command.env("HUB_PROJECT_CONFIG_DIR", project_dir.path());
    command
}

#[test]
fn help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    let output = hub(&dir).arg("--help").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("serve"));
    assert!(stdout.contains("resolve"));
    assert!(stdout.contains("config"));
}

#[test]
fn resolve_prints_entitlements_as_json() {
    let dir = TempDir::new().unwrap();
    let output = hub(&dir)
        .args(["resolve", "--user", "alice", "--groups", "DOL_Managers,Compliance"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let entitlements: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(entitlements["user_id"], "alice");
    assert_eq!(entitlements["agencies"], serde_json::json!(["DOL"]));
    assert_eq!(entitlements["max_classification"], "RESTRICTED");
    assert_eq!(entitlements["is_reviewer"], true);
    assert_eq!(entitlements["is_admin"], false);
}

#[test]
fn config_show_applies_project_config() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[server]\nport = 9321\n\n[review]\nflagged_topics = [\"immigration status\"]\n",
    )
    .unwrap();

    let output = hub(&dir).args(["config", "show"]).output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("port = 9321"));
    assert!(stdout.contains("immigration status"));
}

#[test]
fn serve_rejects_missing_documents_file() {
    let dir = TempDir::new().unwrap();
    let output = hub(&dir)
        .args(["serve", "--port", "0", "--documents"])
        .arg(dir.path().join("missing.json"))
        .output()
        .unwrap();

    assert!(!output.status.success());
}

#[test]
fn config_show_rejects_invalid_hub_settings() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.toml"), "[cache]\nttl_seconds = 0\n").unwrap();

    let output = hub(&dir).args(["config", "show"]).output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cache.ttl_seconds"));
}

#[test]
fn config_check_accepts_defaults() {
    let dir = TempDir::new().unwrap();
    let output = hub(&dir).args(["config", "check"]).output().unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("configuration ok"));
}
