//! Persona lifecycle
//!
//! Sequences the multi-step commands on top of the registry. Also owns the
//! automatic `ready` transition when the last missing credential kind of a
//! persona is configured.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::bootstrap::{BootstrapOutcome, BootstrapRequest, RepoBootstrap};
use crate::error::{Error, Result};
use crate::scaffold::{self, ScaffoldGenerator};

use super::registry::PersonaRegistry;
use super::store::RegistryBackend;
use super::types::{PersonaStatus, PersonaView};

/// Input for `create_persona`.
#[derive(Debug, Clone)]
pub struct CreatePersona {
    pub name: String,
    pub description: String,
    pub model: String,
    pub org: Option<String>,
    /// Write into an existing scaffold directory.
    pub force: bool,
}

/// What `create_persona` did.
#[derive(Debug, Clone)]
pub struct CreateReport {
    pub persona: PersonaView,
    pub scaffold_path: PathBuf,
    pub config_path: PathBuf,
    pub bootstrap: BootstrapOutcome,
}

/// What `add_key` did.
#[derive(Debug, Clone)]
pub struct KeyReport {
    pub persona: PersonaView,
    /// Status was flipped to `ready` by this call.
    pub became_ready: bool,
}

/// Orchestrates multi-step persona commands over a registry.
pub struct Lifecycle<'a, B, R> {
    registry: &'a PersonaRegistry<B>,
    scaffold: ScaffoldGenerator,
    bootstrap: R,
}

impl<'a, B, R> Lifecycle<'a, B, R>
where
    B: RegistryBackend,
    R: RepoBootstrap,
{
    pub fn new(registry: &'a PersonaRegistry<B>, scaffold: ScaffoldGenerator, bootstrap: R) -> Self {
        Self {
            registry,
            scaffold,
            bootstrap,
        }
    }

    /// Scaffold, configure, bootstrap and register a new persona.
    ///
    /// Filesystem failures abort before registration. A failed bootstrap is
    /// reported in the returned `CreateReport` and the persona is registered
    /// locally under the repository identifier it would have had.
    pub fn create_persona(&self, request: &CreatePersona) -> Result<CreateReport> {
        validate_persona_name(&request.name)?;

        let scaffold_path =
            self.scaffold
                .generate(&request.name, &request.description, request.force)?;
        let config_path = scaffold::write_config(&scaffold_path, &request.name, &request.model)?;

        let bootstrap_request = BootstrapRequest {
            local_path: scaffold_path.clone(),
            repo_name: request.name.clone(),
            org: request.org.clone(),
            description: request.description.clone(),
        };
        let outcome = self.bootstrap.bootstrap(&bootstrap_request);
        let repo = match &outcome {
            BootstrapOutcome::Created { repo } | BootstrapOutcome::Skipped { repo } => repo.clone(),
            BootstrapOutcome::Failed { message } => {
                warn!(
                    persona = %request.name,
                    error = %message,
                    "Continuing with local registration after bootstrap failure"
                );
                bootstrap_request.repo_id()
            }
        };

        let persona = self.registry.register(
            &request.name,
            &repo,
            &scaffold_path.display().to_string(),
        )?;

        info!(
            persona = %request.name,
            repo = %repo,
            bootstrapped = outcome.is_success(),
            "Persona created"
        );

        Ok(CreateReport {
            persona,
            scaffold_path,
            config_path,
            bootstrap: outcome,
        })
    }

    /// Register an existing directory as a persona.
    ///
    /// The path is stored in canonical form so it resolves the same way from
    /// any working directory.
    pub fn register_existing(&self, name: &str, repo: &str, path: &Path) -> Result<PersonaView> {
        if !path.exists() {
            return Err(Error::PathMissing {
                path: path.to_path_buf(),
            });
        }
        let canonical = path.canonicalize().map_err(|source| Error::IoRead {
            path: path.to_path_buf(),
            source,
        })?;
        self.registry
            .register(name, repo, &canonical.display().to_string())
    }

    /// Mark a credential kind configured, flipping status to `ready` when no
    /// common kinds remain missing.
    pub fn add_key(&self, name: &str, kind: &str) -> Result<KeyReport> {
        let view = self.registry.add_key(name, kind)?;

        if !view.missing_keys.is_empty() || view.record.status == PersonaStatus::Ready {
            return Ok(KeyReport {
                persona: view,
                became_ready: false,
            });
        }

        self.registry.update_status(name, PersonaStatus::Ready)?;
        info!(persona = %name, "All common credentials configured, persona is ready");

        let persona = self
            .registry
            .get(name)?
            .ok_or_else(|| Error::persona_not_found(name))?;
        Ok(KeyReport {
            persona,
            became_ready: true,
        })
    }

    /// Configure several kinds in order and return the final state.
    pub fn setup(&self, name: &str, kinds: &[String]) -> Result<PersonaView> {
        let mut current = self
            .registry
            .get(name)?
            .ok_or_else(|| Error::persona_not_found(name))?;

        for kind in kinds {
            current = self.add_key(name, kind)?.persona;
        }
        Ok(current)
    }
}

/// Persona names become directory names, so keep them to one path segment.
fn validate_persona_name(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        Some("persona name cannot be empty")
    } else if name == "." || name == ".." {
        Some("persona name cannot be '.' or '..'")
    } else if name.contains('/') || name.contains('\\') {
        Some("persona name cannot contain path separators")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::invalid_argument("name", reason)),
        None => Ok(()),
    }
}
