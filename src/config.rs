//! Configuration system for persona-forge
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (PERSONA_FORGE_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    /// Registry document location
    pub registry: RegistrySettings,

    /// Persona scaffold defaults
    pub personas: PersonaSettings,

    /// Remote repository bootstrap
    pub repo: RepoSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Registry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    /// Path of the JSON registry document
    pub path: String,
}

/// Persona scaffold settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaSettings {
    /// Directory under which new persona scaffolds are created
    pub base_dir: String,

    /// Model identifier written to new persona configs
    pub default_model: String,

    /// Credential kinds every persona is expected to have
    pub common_keys: Vec<String>,
}

/// Remote repository settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoSettings {
    /// Bootstrap a remote repository on create-persona
    pub enabled: bool,

    /// Default organization for new repositories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,

    /// Create repositories as private
    pub private: bool,

    /// Version-control executable
    pub git_bin: String,

    /// Repository-hosting CLI executable
    pub gh_bin: String,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (unset = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            path: "~/.persona-forge/registry.json".to_string(),
        }
    }
}

impl Default for PersonaSettings {
    fn default() -> Self {
        Self {
            base_dir: "~/.persona-forge/personas".to_string(),
            default_model: "claude-sonnet-4".to_string(),
            common_keys: vec![
                "anthropic".to_string(),
                "openai".to_string(),
                "github".to_string(),
            ],
        }
    }
}

impl Default for RepoSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            org: None,
            private: true,
            git_bin: "git".to_string(),
            gh_bin: "gh".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
            max_files: 5,
            json_format: false,
        }
    }
}

impl ForgeConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = Self::find_config_file(config_path)? {
            debug!(path = %path.display(), "Loading configuration file");
            let content = fs::read_to_string(&path).map_err(|source| Error::IoRead {
                path: path.clone(),
                source,
            })?;
            config = toml::from_str(&content).map_err(|source| Error::ConfigParse {
                path: path.clone(),
                source,
            })?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        config.apply_env_overrides();
        config.expand_paths();
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            if path.exists() {
                return Ok(Some(path));
            }
            return Err(Error::ConfigNotFound { path });
        }

        let mut search_paths = vec![PathBuf::from("persona-forge.toml")];
        if let Some(dir) = dirs::config_dir() {
            search_paths.push(dir.join("persona-forge").join("config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            search_paths.push(home.join(".persona-forge").join("config.toml"));
        }

        for path in search_paths {
            if path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("PERSONA_FORGE_REGISTRY") {
            self.registry.path = val;
        }

        if let Ok(val) = std::env::var("PERSONA_FORGE_PERSONAS_DIR") {
            self.personas.base_dir = val;
        }
        if let Ok(val) = std::env::var("PERSONA_FORGE_DEFAULT_MODEL") {
            self.personas.default_model = val;
        }
        if let Ok(val) = std::env::var("PERSONA_FORGE_COMMON_KEYS") {
            self.personas.common_keys = val
                .split(',')
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect();
        }

        if let Ok(val) = std::env::var("PERSONA_FORGE_REPO_ENABLED") {
            self.repo.enabled = parse_bool(&val);
        }
        if let Ok(val) = std::env::var("PERSONA_FORGE_REPO_ORG") {
            self.repo.org = Some(val);
        }

        if let Ok(val) = std::env::var("PERSONA_FORGE_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("PERSONA_FORGE_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("PERSONA_FORGE_LOG_JSON") {
            self.logging.json_format = parse_bool(&val);
        }
    }

    /// Expand ~ and environment variables in paths
    fn expand_paths(&mut self) {
        self.registry.path = expand_path(&self.registry.path);
        self.personas.base_dir = expand_path(&self.personas.base_dir);

        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.registry.path.trim().is_empty() {
            return Err(Error::config_validation("registry.path cannot be empty"));
        }
        if self.personas.base_dir.trim().is_empty() {
            return Err(Error::config_validation("personas.base_dir cannot be empty"));
        }

        if self.personas.common_keys.is_empty() {
            return Err(Error::config_validation(
                "personas.common_keys must list at least one credential kind",
            ));
        }
        let mut seen = HashSet::new();
        for key in &self.personas.common_keys {
            if key.trim().is_empty() {
                return Err(Error::config_validation(
                    "personas.common_keys cannot contain blank entries",
                ));
            }
            if !seen.insert(key.as_str()) {
                return Err(Error::config_validation(format!(
                    "personas.common_keys lists '{}' more than once",
                    key
                )));
            }
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_validation(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_levels.join(", ")
            )));
        }

        Ok(())
    }

    /// Registry document path
    pub fn registry_path(&self) -> PathBuf {
        PathBuf::from(&self.registry.path)
    }

    /// Base directory for persona scaffolds
    pub fn personas_dir(&self) -> PathBuf {
        PathBuf::from(&self.personas.base_dir)
    }
}

fn parse_bool(val: &str) -> bool {
    val.eq_ignore_ascii_case("true") || val == "1"
}

/// Expand ~ and environment variables in paths
pub fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or(std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file, returning where it was written
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(default_config_path);

    if config_path.exists() && !force {
        return Err(Error::invalid_argument(
            "path",
            format!(
                "configuration file already exists: {}. Use --force to overwrite.",
                config_path.display()
            ),
        ));
    }

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir(parent)?;
    }

    fs::write(&config_path, generate_default_config()).map_err(|source| Error::IoWrite {
        path: config_path.clone(),
        source,
    })?;

    info!(path = %config_path.display(), "Configuration file created");
    Ok(config_path)
}

fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".persona-forge")
        .join("config.toml")
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| Error::IoWrite {
        path: dir.to_path_buf(),
        source,
    })
}

/// Generate default configuration content with comments
fn generate_default_config() -> String {
    r#"# persona-forge configuration

[registry]
# JSON document tracking every registered persona
path = "~/.persona-forge/registry.json"

[personas]
# Where create-persona scaffolds new personas
base_dir = "~/.persona-forge/personas"

# Model identifier written into new persona configs
default_model = "claude-sonnet-4"

# Credential kinds reported as missing until marked configured
common_keys = ["anthropic", "openai", "github"]

[repo]
# Create and push a remote repository on create-persona
enabled = true

# Default organization for new repositories
# org = "my-org"

# Create repositories as private
private = true

# Executables used for the bootstrap
git_bin = "git"
gh_bin = "gh"

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log file path (comment out to disable file logging)
# file = "~/.persona-forge/logs/persona-forge.log"

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#
    .to_string()
}
