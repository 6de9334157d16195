//! persona-forge - Persona scaffolding and provisioning registry
//!
//! This is the main entry point for the persona-forge binary.
//! Each invocation runs one command to completion: scaffold, bootstrap,
//! register or inspect personas tracked in the local registry.

mod bootstrap;
mod cli;
mod config;
mod error;
mod logging;
mod persona;
mod scaffold;
mod version;

use clap::Parser;
use tracing::{debug, info};

use crate::bootstrap::{BootstrapOutcome, GitHubBootstrap, NoopBootstrap};
use crate::cli::{Cli, Commands, ConfigSubcommand};
use crate::config::ForgeConfig;
use crate::error::{Error, Result};
use crate::persona::{
    CreatePersona, CreateReport, JsonFileBackend, Lifecycle, PersonaRegistry, PersonaStatus,
    PersonaView,
};
use crate::scaffold::{templates, ScaffoldGenerator};
use crate::version::BuildInfo;

type Registry = PersonaRegistry<JsonFileBackend>;

fn main() {
    // Parse CLI arguments first (before logging, so we know verbosity)
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    // Commands that don't touch the registry use minimal setup
    match cli.command {
        Commands::Version => {
            version::print_version();
            return Ok(());
        }
        Commands::Config { ref subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            return handle_config_command(subcommand.clone(), cli.config.as_deref());
        }
        _ => {}
    }

    let config = ForgeConfig::load(cli.config.as_deref())?;

    // The guards must outlive every command so buffered file logs are flushed
    let _log_guards = logging::init_logging(&config.logging, cli.verbose, cli.quiet)?;

    let build = BuildInfo::current();
    debug!(
        version = %build.full_version(),
        target = %build.target,
        profile = %build.profile,
        "Starting persona-forge"
    );

    let registry = PersonaRegistry::new(
        JsonFileBackend::new(config.registry_path()),
        config.personas.common_keys.clone(),
    );
    info!(registry = %registry.location(), "Registry opened");

    match cli.command {
        Commands::CreatePersona {
            name,
            description,
            model,
            org,
            no_repo,
            force,
        } => {
            let request = CreatePersona {
                description: description.unwrap_or_else(|| templates::default_description(&name)),
                model: model.unwrap_or_else(|| config.personas.default_model.clone()),
                org: org.or_else(|| config.repo.org.clone()),
                name,
                force,
            };
            create_persona(&registry, &config, &request, no_repo)
        }
        Commands::Setup { name, keys } => setup(&registry, &config, &name, &keys),
        Commands::List { json } => list(&registry, json),
        Commands::Status { name, json } => status(&registry, &name, json),
        Commands::Register { name, repo, path } => {
            let view = lifecycle(&registry, &config).register_existing(&name, &repo, &path)?;
            println!("Registered persona '{}'", view.name);
            print_view(&view);
            Ok(())
        }
        Commands::AddKey { name, key } => {
            let report = lifecycle(&registry, &config).add_key(&name, &key)?;
            println!("Marked '{}' configured for '{}'", key, name);
            if report.became_ready {
                println!("All common credentials configured; '{}' is now ready.", name);
            } else if !report.persona.missing_keys.is_empty() {
                println!("Still missing: {}", report.persona.missing_keys.join(", "));
            }
            Ok(())
        }
        Commands::RemoveKey { name, key } => {
            if !registry.remove_key(&name, &key)? {
                return Err(Error::invalid_argument(
                    "key",
                    format!("credential kind '{}' is not configured for '{}'", key, name),
                ));
            }
            println!("Removed credential marker '{}' from '{}'", key, name);
            Ok(())
        }
        Commands::UpdateStatus { name, status } => {
            let status = PersonaStatus::from(status);
            registry.update_status(&name, status.clone())?;
            println!("Status of '{}' set to {}", name, status);
            Ok(())
        }
        Commands::Unregister { name } => {
            let removed = registry.unregister(&name)?;
            println!("Unregistered '{}' (files kept at {})", name, removed.path);
            Ok(())
        }
        Commands::Version | Commands::Config { .. } => {
            // Already handled above
            unreachable!();
        }
    }
}

/// Lifecycle for commands that never create a scaffold or repository
fn lifecycle<'a>(
    registry: &'a Registry,
    config: &ForgeConfig,
) -> Lifecycle<'a, JsonFileBackend, NoopBootstrap> {
    Lifecycle::new(registry, ScaffoldGenerator::new(config.personas_dir()), NoopBootstrap)
}

fn create_persona(
    registry: &Registry,
    config: &ForgeConfig,
    request: &CreatePersona,
    no_repo: bool,
) -> Result<()> {
    let scaffold = ScaffoldGenerator::new(config.personas_dir());

    let report = if no_repo || !config.repo.enabled {
        Lifecycle::new(registry, scaffold, NoopBootstrap).create_persona(request)?
    } else {
        let bootstrap = GitHubBootstrap::from_settings(&config.repo);
        Lifecycle::new(registry, scaffold, bootstrap).create_persona(request)?
    };

    print_create_report(&report);
    Ok(())
}

fn setup(registry: &Registry, config: &ForgeConfig, name: &str, keys: &[String]) -> Result<()> {
    let view = lifecycle(registry, config).setup(name, keys)?;

    for key in keys {
        println!("Marked '{}' configured", key);
    }
    let configured = registry.get_keys(name)?;
    println!("Configured: {}", join_or_dash(&configured));

    if view.missing_keys.is_empty() {
        println!("'{}' has every common credential configured ({}).", name, view.record.status);
        return Ok(());
    }

    println!("'{}' is missing {} credential kind(s):", name, view.missing_keys.len());
    for kind in &view.missing_keys {
        println!("  {:<12} {}", kind, key_hint(kind));
    }
    println!();
    println!("Once available, run: persona-forge add-key --name {} --key <kind>", name);
    Ok(())
}

fn list(registry: &Registry, json: bool) -> Result<()> {
    let mut views = registry.list()?;
    views.sort_by(|a, b| a.name.cmp(&b.name));

    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    if views.is_empty() {
        println!("No personas registered.");
        return Ok(());
    }

    println!(
        "{:<20} {:<12} {:<6} {:<24} {:<24} {}",
        "NAME", "STATUS", "READY", "KEYS", "MISSING", "REPO"
    );
    for view in &views {
        println!(
            "{:<20} {:<12} {:<6} {:<24} {:<24} {}",
            view.name,
            view.record.status.as_str(),
            if view.is_ready { "yes" } else { "no" },
            join_or_dash(&view.keys_configured),
            join_or_dash(&view.missing_keys),
            if view.record.repo.is_empty() { "-" } else { view.record.repo.as_str() },
        );
    }
    Ok(())
}

fn status(registry: &Registry, name: &str, json: bool) -> Result<()> {
    let view = registry
        .get(name)?
        .ok_or_else(|| Error::persona_not_found(name))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!("Persona: {}", view.name);
        print_view(&view);
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────
// Report formatting
// ─────────────────────────────────────────────────────────────────

fn print_create_report(report: &CreateReport) {
    let view = &report.persona;
    println!("Created persona '{}'", view.name);
    println!("  Scaffold:  {}", report.scaffold_path.display());
    println!("  Config:    {}", report.config_path.display());

    match &report.bootstrap {
        BootstrapOutcome::Created { repo } => println!("  Repo:      {} (created)", repo),
        BootstrapOutcome::Skipped { repo } => {
            println!("  Repo:      {} (not bootstrapped)", repo)
        }
        BootstrapOutcome::Failed { message } => {
            println!("  Repo:      {} (local only)", view.record.repo);
            let failure = Error::BootstrapFailed {
                message: message.clone(),
            };
            eprintln!("Warning: {}", failure.format_for_log());
            if let Some(hint) = failure.suggestion() {
                eprintln!("Hint: {}", hint);
            }
        }
    }

    println!("  Status:    {}", view.record.status);
    println!("  Missing:   {}", join_or_dash(&view.missing_keys));
    println!();
    println!(
        "Next: persona-forge setup --name {} --key <kind>",
        view.name
    );
}

fn print_view(view: &PersonaView) {
    let record = &view.record;
    println!("  Status:    {}", record.status);
    println!("  Ready:     {}", if view.is_ready { "yes" } else { "no" });
    println!(
        "  Repo:      {}",
        if record.repo.is_empty() { "-" } else { record.repo.as_str() }
    );
    println!("  Path:      {}", record.path);
    println!("  Created:   {}", record.created_at.to_rfc3339());
    println!("  Updated:   {}", record.last_updated.to_rfc3339());

    if record.keys.is_empty() {
        println!("  Keys:      -");
    } else {
        println!("  Keys:");
        for (kind, marker) in &record.keys {
            println!("    {:<12} configured {}", kind, marker.configured_at.to_rfc3339());
        }
    }
    println!("  Missing:   {}", join_or_dash(&view.missing_keys));
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(",")
    }
}

/// Where an operator usually obtains a credential of this kind.
fn key_hint(kind: &str) -> &'static str {
    match kind {
        "anthropic" => "export ANTHROPIC_API_KEY (console.anthropic.com)",
        "openai" => "export OPENAI_API_KEY (platform.openai.com)",
        "github" => "run 'gh auth login' or export GITHUB_TOKEN",
        _ => "provide it to the persona runtime",
    }
}

// ─────────────────────────────────────────────────────────────────
// Config commands
// ─────────────────────────────────────────────────────────────────

/// Handle configuration subcommands
fn handle_config_command(subcommand: ConfigSubcommand, config_path: Option<&str>) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show => {
            let cfg = ForgeConfig::load(config_path)?;
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigSubcommand::Init { path, force } => {
            let written = config::init_config(path.as_deref(), force)?;
            println!("Configuration written to {}", written.display());
        }
        ConfigSubcommand::Validate => {
            ForgeConfig::load(config_path)?;
            println!("Configuration is valid.");
        }
    }

    Ok(())
}
