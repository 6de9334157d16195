//! Common test utilities and fixtures
//!
//! Every command runs inside a temporary sandbox: HOME, the working
//! directory, the registry and the persona directory all point into it, and
//! repository bootstrap is disabled so nothing reaches the network.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Environment variables that would leak the developer's own setup.
const ISOLATED_VARS: [&str; 11] = [
    "RUST_LOG",
    "PERSONA_FORGE_CONFIG",
    "PERSONA_FORGE_REGISTRY",
    "PERSONA_FORGE_PERSONAS_DIR",
    "PERSONA_FORGE_DEFAULT_MODEL",
    "PERSONA_FORGE_COMMON_KEYS",
    "PERSONA_FORGE_REPO_ENABLED",
    "PERSONA_FORGE_REPO_ORG",
    "PERSONA_FORGE_LOG_LEVEL",
    "PERSONA_FORGE_LOG_FILE",
    "PERSONA_FORGE_LOG_JSON",
];

pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn registry_path(&self) -> PathBuf {
        self.root().join("state").join("registry.json")
    }

    pub fn personas_dir(&self) -> PathBuf {
        self.root().join("personas")
    }

    /// Raw registry document text.
    pub fn registry_text(&self) -> String {
        fs::read_to_string(self.registry_path()).unwrap()
    }

    pub fn registry_json(&self) -> serde_json::Value {
        serde_json::from_str(&self.registry_text()).unwrap()
    }

    pub fn write_registry(&self, content: &str) {
        let path = self.registry_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// Command with no configuration beyond the sandboxed HOME.
    pub fn bare_cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("persona-forge").unwrap();
        for var in ISOLATED_VARS {
            cmd.env_remove(var);
        }
        cmd.env("HOME", self.root())
            .env("XDG_CONFIG_HOME", self.root().join(".config"))
            .current_dir(self.root());
        cmd
    }

    /// Command wired to the sandbox registry and persona directory.
    pub fn cmd(&self) -> Command {
        let mut cmd = self.bare_cmd();
        cmd.env("PERSONA_FORGE_REGISTRY", self.registry_path())
            .env("PERSONA_FORGE_PERSONAS_DIR", self.personas_dir())
            .env("PERSONA_FORGE_COMMON_KEYS", "openai,anthropic")
            .env("PERSONA_FORGE_REPO_ENABLED", "false");
        cmd
    }
}
