//! Persona lifecycle integration tests
//!
//! Drives the binary end to end against a sandboxed registry

mod common;

use std::fs;

use predicates::prelude::*;
use serde_json::Value;

use common::Sandbox;

fn list_json(sandbox: &Sandbox) -> Value {
    let output = sandbox.cmd().args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

fn status_json(sandbox: &Sandbox, name: &str) -> Value {
    let output = sandbox
        .cmd()
        .args(["status", "--name", name, "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

fn register_demo(sandbox: &Sandbox) {
    let path = sandbox.root().join("demo");
    fs::create_dir_all(&path).unwrap();
    sandbox
        .cmd()
        .args(["register", "--name", "demo", "--repo", "org/demo", "--path"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Registered persona 'demo'"));
}

// ─────────────────────────────────────────────────────────────────
// Registration
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_register_then_list() {
    let sandbox = Sandbox::new();
    register_demo(&sandbox);

    let list = list_json(&sandbox);
    let entries = list.as_array().unwrap();
    assert_eq!(entries.len(), 1);

    let demo = &entries[0];
    assert_eq!(demo["name"], "demo");
    assert_eq!(demo["status"], "needs-setup");
    assert_eq!(demo["repo"], "org/demo");
    assert_eq!(demo["keysConfigured"], serde_json::json!([]));
    assert_eq!(demo["missingKeys"], serde_json::json!(["openai", "anthropic"]));
    assert_eq!(demo["isReady"], false);

    let doc = sandbox.registry_json();
    assert!(doc["lastUpdated"].is_string());
    assert!(doc["personas"]["demo"]["createdAt"].is_string());
}

#[test]
fn test_register_missing_path() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["register", "--name", "ghost", "--path"])
        .arg(sandbox.root().join("nowhere"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Path does not exist"));

    assert!(!sandbox.registry_path().exists());
}

#[test]
fn test_register_relative_path_is_stored_absolute() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["register", "--name", "here", "--path", "."])
        .assert()
        .success();

    let expected = sandbox.root().canonicalize().unwrap();
    assert_eq!(
        status_json(&sandbox, "here")["path"],
        expected.display().to_string()
    );
}

#[test]
fn test_list_table_sorted_by_name() {
    let sandbox = Sandbox::new();
    for name in ["zeta", "alpha"] {
        sandbox
            .cmd()
            .args(["register", "--name", name, "--path"])
            .arg(sandbox.root())
            .assert()
            .success();
    }

    let output = sandbox.cmd().arg("list").output().unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    let alpha = stdout.find("alpha").unwrap();
    let zeta = stdout.find("zeta").unwrap();
    assert!(stdout.starts_with("NAME"));
    assert!(alpha < zeta);
}

// ─────────────────────────────────────────────────────────────────
// create-persona
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_create_persona_without_repo() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args([
            "create-persona",
            "--name",
            "scout",
            "--org",
            "acme",
            "--description",
            "Tracks upstream releases",
            "--model",
            "gpt-4o",
            "--no-repo",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created persona 'scout'"))
        .stdout(predicate::str::contains("acme/scout (not bootstrapped)"))
        .stdout(predicate::str::contains("setup --name scout"));

    let root = sandbox.personas_dir().join("scout");
    assert!(root.join("README.md").is_file());
    assert!(root.join("PERSONA.md").is_file());
    assert!(root.join("memory").join(".gitkeep").is_file());
    assert!(root.join("skills").join(".gitkeep").is_file());
    let config = fs::read_to_string(root.join("persona.toml")).unwrap();
    assert!(config.contains("model = \"gpt-4o\""));
    assert!(fs::read_to_string(root.join("README.md"))
        .unwrap()
        .contains("Tracks upstream releases"));

    let scout = status_json(&sandbox, "scout");
    assert_eq!(scout["repo"], "acme/scout");
    assert_eq!(scout["status"], "needs-setup");
    assert_eq!(scout["path"], root.display().to_string());
}

#[test]
fn test_create_persona_existing_directory_needs_force() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["create-persona", "--name", "scout"])
        .assert()
        .success();
    let created_at = status_json(&sandbox, "scout")["createdAt"].clone();

    sandbox
        .cmd()
        .args(["create-persona", "--name", "scout"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("already exists"))
        .stderr(predicate::str::contains("--force"));

    sandbox
        .cmd()
        .args(["create-persona", "--name", "scout", "--force"])
        .assert()
        .success();
    assert_eq!(status_json(&sandbox, "scout")["createdAt"], created_at);
}

#[test]
fn test_create_persona_rejects_path_names() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["create-persona", "--name", "../escape"])
        .assert()
        .code(2);
    assert!(!sandbox.root().join("escape").exists());
}

#[test]
fn test_bootstrap_failure_still_registers() {
    let sandbox = Sandbox::new();
    let config = sandbox.root().join("forge.toml");
    fs::write(
        &config,
        "[repo]\nenabled = true\norg = \"acme\"\ngit_bin = \"persona-forge-missing-git\"\n",
    )
    .unwrap();

    sandbox
        .cmd()
        .env("PERSONA_FORGE_REPO_ENABLED", "true")
        .args(["create-persona", "--name", "scout", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("acme/scout (local only)"))
        .stderr(predicate::str::contains("Repository bootstrap failed"));

    assert_eq!(status_json(&sandbox, "scout")["repo"], "acme/scout");
}

// ─────────────────────────────────────────────────────────────────
// Credentials and status
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_add_keys_until_ready() {
    let sandbox = Sandbox::new();
    register_demo(&sandbox);

    sandbox
        .cmd()
        .args(["add-key", "--name", "demo", "--key", "openai"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Still missing: anthropic"));

    let demo = status_json(&sandbox, "demo");
    assert_eq!(demo["missingKeys"], serde_json::json!(["anthropic"]));
    assert_eq!(demo["isReady"], true);
    assert_eq!(demo["status"], "needs-setup");
    assert_eq!(demo["keys"]["openai"]["configured"], true);

    sandbox
        .cmd()
        .args(["add-key", "--name", "demo", "--key", "anthropic"])
        .assert()
        .success()
        .stdout(predicate::str::contains("now ready"));

    let demo = status_json(&sandbox, "demo");
    assert_eq!(demo["status"], "ready");
    assert_eq!(demo["missingKeys"], serde_json::json!([]));
}

#[test]
fn test_setup_reports_missing_with_hints() {
    let sandbox = Sandbox::new();
    register_demo(&sandbox);

    sandbox
        .cmd()
        .args(["setup", "--name", "demo", "--key", "openai"])
        .assert()
        .success()
        .stdout(predicate::str::contains("missing 1 credential kind"))
        .stdout(predicate::str::contains("ANTHROPIC_API_KEY"));

    sandbox
        .cmd()
        .args(["setup", "--name", "demo", "--key", "anthropic"])
        .assert()
        .success()
        .stdout(predicate::str::contains("every common credential configured (ready)"));
}

#[test]
fn test_remove_key() {
    let sandbox = Sandbox::new();
    register_demo(&sandbox);
    sandbox
        .cmd()
        .args(["add-key", "--name", "demo", "--key", "openai"])
        .assert()
        .success();

    sandbox
        .cmd()
        .args(["remove-key", "--name", "demo", "--key", "openai"])
        .assert()
        .success();
    assert_eq!(status_json(&sandbox, "demo")["isReady"], false);

    let before = sandbox.registry_text();
    sandbox
        .cmd()
        .args(["remove-key", "--name", "demo", "--key", "openai"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not configured"));
    assert_eq!(sandbox.registry_text(), before);
}

#[test]
fn test_update_status_accepts_custom_label() {
    let sandbox = Sandbox::new();
    register_demo(&sandbox);

    sandbox
        .cmd()
        .args(["update-status", "--name", "demo", "--status", "archived"])
        .assert()
        .success()
        .stdout(predicate::str::contains("archived"));
    assert_eq!(status_json(&sandbox, "demo")["status"], "archived");

    sandbox
        .cmd()
        .args(["add-key", "--name", "demo", "--key", "openai"])
        .assert()
        .success();
    sandbox
        .cmd()
        .args(["update-status", "--name", "demo", "--status", "error"])
        .assert()
        .success();
    assert_eq!(status_json(&sandbox, "demo")["isReady"], false);
}

#[test]
fn test_unregister_keeps_files() {
    let sandbox = Sandbox::new();
    register_demo(&sandbox);

    sandbox
        .cmd()
        .args(["unregister", "--name", "demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("files kept"));

    sandbox
        .cmd()
        .args(["status", "--name", "demo"])
        .assert()
        .code(1);
    assert!(sandbox.root().join("demo").is_dir());
}

// ─────────────────────────────────────────────────────────────────
// Failure modes
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_unknown_persona_exits_one_without_writing() {
    let sandbox = Sandbox::new();
    register_demo(&sandbox);
    let before = sandbox.registry_text();

    let commands: [&[&str]; 5] = [
        &["update-status", "--name", "ghost", "--status", "ready"],
        &["add-key", "--name", "ghost", "--key", "openai"],
        &["remove-key", "--name", "ghost", "--key", "openai"],
        &["unregister", "--name", "ghost"],
        &["setup", "--name", "ghost"],
    ];
    for args in commands {
        sandbox.cmd().args(args).assert().code(1);
    }

    assert_eq!(sandbox.registry_text(), before);
}

#[test]
fn test_corrupt_registry_is_not_overwritten() {
    let sandbox = Sandbox::new();
    sandbox.write_registry("{ not json");

    sandbox
        .cmd()
        .arg("list")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("corrupt"));

    sandbox
        .cmd()
        .args(["register", "--name", "demo", "--path"])
        .arg(sandbox.root())
        .assert()
        .code(3);

    assert_eq!(sandbox.registry_text(), "{ not json");
}

#[test]
fn test_unknown_fields_survive_cli_mutations() {
    let sandbox = Sandbox::new();
    sandbox.write_registry(
        r#"{
  "personas": {
    "demo": {
      "status": "needs-setup",
      "repo": "org/demo",
      "path": "/tmp/demo",
      "keys": {},
      "createdAt": "2024-01-01T00:00:00Z",
      "lastUpdated": "2024-01-01T00:00:00Z",
      "owner": "research"
    }
  },
  "lastUpdated": "2024-01-01T00:00:00Z",
  "schema": 2
}"#,
    );

    sandbox
        .cmd()
        .args(["add-key", "--name", "demo", "--key", "openai"])
        .assert()
        .success();

    let doc = sandbox.registry_json();
    assert_eq!(doc["schema"], 2);
    assert_eq!(doc["personas"]["demo"]["owner"], "research");
    assert_eq!(doc["personas"]["demo"]["createdAt"], "2024-01-01T00:00:00Z");
    assert_ne!(doc["lastUpdated"], "2024-01-01T00:00:00Z");
}
