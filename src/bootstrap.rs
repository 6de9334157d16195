//! Remote repository bootstrap.
//!
//! Turns a freshly scaffolded persona directory into a git repository and
//! publishes it. The outcome is a value rather than an error: callers decide
//! whether a failed bootstrap matters.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, warn};

use crate::config::RepoSettings;

/// What to bootstrap.
#[derive(Debug, Clone)]
pub struct BootstrapRequest {
    /// Scaffold root to initialize.
    pub local_path: PathBuf,
    /// Repository name (usually the persona name).
    pub repo_name: String,
    /// Owning organization; the authenticated user when `None`.
    pub org: Option<String>,
    /// One-line repository description.
    pub description: String,
}

impl BootstrapRequest {
    /// "org/name", or just "name" without an organization.
    pub fn repo_id(&self) -> String {
        match self.org.as_deref().filter(|o| !o.is_empty()) {
            Some(org) => format!("{}/{}", org, self.repo_name),
            None => self.repo_name.clone(),
        }
    }
}

/// Result of a bootstrap attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Created { repo: String },
    /// Nothing was attempted; `repo` is the identifier that would have been used.
    Skipped { repo: String },
    Failed { message: String },
}

impl BootstrapOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, BootstrapOutcome::Failed { .. })
    }
}

/// Capability to create a remote repository for a local directory.
pub trait RepoBootstrap {
    fn bootstrap(&self, request: &BootstrapRequest) -> BootstrapOutcome;
}

// ─────────────────────────────────────────────────────────────────
// git + gh
// ─────────────────────────────────────────────────────────────────

/// Bootstrap with the `git` and `gh` command-line tools.
#[derive(Debug, Clone)]
pub struct GitHubBootstrap {
    git_bin: String,
    gh_bin: String,
    private: bool,
}

impl GitHubBootstrap {
    pub fn from_settings(settings: &RepoSettings) -> Self {
        Self {
            git_bin: settings.git_bin.clone(),
            gh_bin: settings.gh_bin.clone(),
            private: settings.private,
        }
    }

    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<String, String> {
        debug!(program = %program, args = ?args, cwd = %cwd.display(), "Running bootstrap step");

        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .output()
            .map_err(|e| format!("failed to run {}: {}", program, e))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(format!(
                "{} {} exited with {}: {}",
                program,
                args.first().copied().unwrap_or_default(),
                output.status,
                stderr
            ))
        }
    }

    fn try_bootstrap(&self, request: &BootstrapRequest) -> Result<String, String> {
        let cwd = request.local_path.as_path();
        let repo_id = request.repo_id();

        self.run(&self.git_bin, &["init"], cwd)?;
        self.run(&self.git_bin, &["add", "-A"], cwd)?;
        self.run(
            &self.git_bin,
            &["commit", "-m", "Initial persona scaffold"],
            cwd,
        )?;

        let visibility = if self.private { "--private" } else { "--public" };
        self.run(
            &self.gh_bin,
            &[
                "repo",
                "create",
                repo_id.as_str(),
                visibility,
                "--description",
                request.description.as_str(),
                "--source",
                ".",
                "--push",
            ],
            cwd,
        )?;

        Ok(repo_id)
    }
}

impl RepoBootstrap for GitHubBootstrap {
    fn bootstrap(&self, request: &BootstrapRequest) -> BootstrapOutcome {
        match self.try_bootstrap(request) {
            Ok(repo) => {
                info!(repo = %repo, "Remote repository created");
                BootstrapOutcome::Created { repo }
            }
            Err(message) => {
                warn!(repo = %request.repo_id(), error = %message, "Repository bootstrap failed");
                BootstrapOutcome::Failed { message }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// No-op
// ─────────────────────────────────────────────────────────────────

/// Used when repository bootstrap is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBootstrap;

impl RepoBootstrap for NoopBootstrap {
    fn bootstrap(&self, request: &BootstrapRequest) -> BootstrapOutcome {
        debug!(repo = %request.repo_id(), "Repository bootstrap disabled");
        BootstrapOutcome::Skipped {
            repo: request.repo_id(),
        }
    }
}
