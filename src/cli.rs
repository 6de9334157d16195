//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for persona-forge.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// persona-forge - Persona scaffolding and provisioning registry
///
/// Scaffolds persona directories, bootstraps their repositories and tracks
/// which credential kinds each persona has configured.
#[derive(Parser, Debug)]
#[command(name = "persona-forge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, env = "PERSONA_FORGE_CONFIG", global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scaffold a persona, bootstrap its repository and register it
    CreatePersona {
        /// Persona name (also the directory and repository name)
        #[arg(long)]
        name: String,

        /// One-line description used in the scaffold documents
        #[arg(long)]
        description: Option<String>,

        /// Model identifier written to persona.toml
        #[arg(long)]
        model: Option<String>,

        /// Organization that owns the repository
        #[arg(long)]
        org: Option<String>,

        /// Skip repository bootstrap
        #[arg(long)]
        no_repo: bool,

        /// Write into an existing persona directory
        #[arg(long)]
        force: bool,
    },

    /// Mark credential kinds configured and show what is still missing
    Setup {
        #[arg(long)]
        name: String,

        /// Credential kind to mark configured (repeatable)
        #[arg(long = "key")]
        keys: Vec<String>,
    },

    /// List registered personas
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one persona in detail
    Status {
        #[arg(long)]
        name: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Register an existing persona directory
    Register {
        #[arg(long)]
        name: String,

        /// Repository identifier (org/name)
        #[arg(long, default_value = "")]
        repo: String,

        /// Existing persona directory
        #[arg(long)]
        path: PathBuf,
    },

    /// Mark a credential kind configured
    AddKey {
        #[arg(long)]
        name: String,

        /// Credential kind, e.g. anthropic
        #[arg(long)]
        key: String,
    },

    /// Remove a credential marker
    RemoveKey {
        #[arg(long)]
        name: String,

        #[arg(long)]
        key: String,
    },

    /// Overwrite a persona's status
    UpdateStatus {
        #[arg(long)]
        name: String,

        /// needs-setup, ready, error, or any other label
        #[arg(long)]
        status: String,
    },

    /// Remove a persona from the registry (files are kept)
    Unregister {
        #[arg(long)]
        name: String,
    },

    /// Display version and build information
    Version,

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the effective configuration
    Show,

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate the configuration
    Validate,
}
