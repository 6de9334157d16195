//! Persona registry: read-modify-write operations over the registry document.
//!
//! Every call loads the document fresh from the backend and every mutation
//! saves the whole document before returning. Nothing is cached between
//! calls, so two `PersonaRegistry` values over the same backend location
//! always agree.

use chrono::{DateTime, Utc};
use serde_json::Map;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

use super::derived::enrich;
use super::store::RegistryBackend;
use super::types::{CredentialMarker, PersonaRecord, PersonaStatus, PersonaView, RegistryDocument};

/// Registry of provisioned personas.
pub struct PersonaRegistry<B> {
    backend: B,

    /// Credential kinds reported as missing until configured.
    common_keys: Vec<String>,
}

impl<B: RegistryBackend> PersonaRegistry<B> {
    pub fn new(backend: B, common_keys: Vec<String>) -> Self {
        Self {
            backend,
            common_keys,
        }
    }

    pub fn location(&self) -> String {
        self.backend.location()
    }

    // ─────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────

    /// Look up one persona with its derived fields.
    pub fn get(&self, name: &str) -> Result<Option<PersonaView>> {
        let doc = self.backend.load()?;
        Ok(doc
            .personas
            .get(name)
            .map(|record| enrich(name, record.clone(), &self.common_keys)))
    }

    /// Every persona with its derived fields, in document order.
    pub fn list(&self) -> Result<Vec<PersonaView>> {
        let doc = self.backend.load()?;
        Ok(doc
            .personas
            .into_iter()
            .map(|(name, record)| enrich(&name, record, &self.common_keys))
            .collect())
    }

    /// Configured credential kinds for a persona.
    pub fn get_keys(&self, name: &str) -> Result<Vec<String>> {
        self.get(name)?
            .map(|view| view.keys_configured)
            .ok_or_else(|| Error::persona_not_found(name))
    }

    // ─────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────

    /// Insert or replace a persona.
    ///
    /// Re-registration keeps `createdAt` (and any fields this tool does not
    /// know about) but resets status to `needs-setup` and clears keys.
    pub fn register(&self, name: &str, repo: &str, path: &str) -> Result<PersonaView> {
        validate_name(name)?;

        let mut doc = self.backend.load()?;
        let now = Utc::now();

        let (created_at, extra) = match doc.personas.remove(name) {
            Some(existing) => {
                debug!(persona = %name, status = %existing.status, "Re-registering persona");
                (existing.created_at, existing.extra)
            }
            None => (now, Map::new()),
        };

        let record = PersonaRecord {
            status: PersonaStatus::NeedsSetup,
            repo: repo.to_string(),
            path: path.to_string(),
            keys: Default::default(),
            created_at,
            last_updated: now,
            extra,
        };
        doc.personas.insert(name.to_string(), record.clone());
        self.persist(&mut doc, now)?;

        info!(persona = %name, repo = %repo, path = %path, "Persona registered");
        Ok(enrich(name, record, &self.common_keys))
    }

    /// Overwrite a persona's status. Any string is accepted.
    pub fn update_status(&self, name: &str, status: PersonaStatus) -> Result<()> {
        self.modify(name, |record, _| {
            record.status = status.clone();
        })?;
        info!(persona = %name, status = %status, "Persona status updated");
        Ok(())
    }

    /// Mark a credential kind as configured.
    pub fn add_key(&self, name: &str, kind: &str) -> Result<PersonaView> {
        validate_key_kind(kind)?;
        let view = self.modify(name, |record, now| {
            record
                .keys
                .insert(kind.to_string(), CredentialMarker::configured_at(now));
        })?;
        info!(persona = %name, key = %kind, "Credential marked configured");
        Ok(view)
    }

    /// Remove a credential marker. Returns `false`, without writing, when
    /// the kind was never configured.
    pub fn remove_key(&self, name: &str, kind: &str) -> Result<bool> {
        let mut doc = self.backend.load()?;
        let record = doc
            .personas
            .get_mut(name)
            .ok_or_else(|| Error::persona_not_found(name))?;

        if record.keys.remove(kind).is_none() {
            debug!(persona = %name, key = %kind, "Credential not configured, nothing to remove");
            return Ok(false);
        }

        let now = Utc::now();
        record.last_updated = now;
        self.persist(&mut doc, now)?;
        info!(persona = %name, key = %kind, "Credential marker removed");
        Ok(true)
    }

    /// Delete a persona record. The scaffold on disk is left alone.
    pub fn unregister(&self, name: &str) -> Result<PersonaRecord> {
        let mut doc = self.backend.load()?;
        let removed = doc.personas.remove(name).ok_or_else(|| {
            warn!(persona = %name, "Cannot unregister unknown persona");
            Error::persona_not_found(name)
        })?;

        self.persist(&mut doc, Utc::now())?;
        info!(persona = %name, "Persona unregistered");
        Ok(removed)
    }

    // ─────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────

    /// Apply `f` to an existing record, stamp it and save.
    fn modify<F>(&self, name: &str, f: F) -> Result<PersonaView>
    where
        F: FnOnce(&mut PersonaRecord, DateTime<Utc>),
    {
        let mut doc = self.backend.load()?;
        let now = Utc::now();

        let record = match doc.personas.get_mut(name) {
            Some(record) => record,
            None => {
                warn!(persona = %name, "Persona not registered");
                return Err(Error::persona_not_found(name));
            }
        };
        f(record, now);
        record.last_updated = now;
        let updated = record.clone();

        self.persist(&mut doc, now)?;
        Ok(enrich(name, updated, &self.common_keys))
    }

    fn persist(&self, doc: &mut RegistryDocument, now: DateTime<Utc>) -> Result<()> {
        doc.last_updated = Some(now);
        self.backend.save(doc)
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::invalid_argument("name", "persona name cannot be empty"));
    }
    Ok(())
}

fn validate_key_kind(kind: &str) -> Result<()> {
    if kind.trim().is_empty() {
        return Err(Error::invalid_argument("key", "credential kind cannot be empty"));
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
