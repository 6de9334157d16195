//! Core types for the persona registry.
//!
//! Field names follow the on-disk JSON document (camelCase). Every struct
//! carries an `extra` map so fields written by other tools survive a
//! read-modify-write cycle untouched.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

// ─────────────────────────────────────────────────────────────────
// Persona Status
// ─────────────────────────────────────────────────────────────────

/// Provisioning status of a persona.
///
/// Stored as a free-form string. The three named variants are the only
/// values this tool produces on its own; anything else round-trips through
/// `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PersonaStatus {
    NeedsSetup,
    Ready,
    Error,
    Other(String),
}

impl PersonaStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PersonaStatus::NeedsSetup => "needs-setup",
            PersonaStatus::Ready => "ready",
            PersonaStatus::Error => "error",
            PersonaStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for PersonaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for PersonaStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "needs-setup" => PersonaStatus::NeedsSetup,
            "ready" => PersonaStatus::Ready,
            "error" => PersonaStatus::Error,
            _ => PersonaStatus::Other(s),
        }
    }
}

impl From<PersonaStatus> for String {
    fn from(status: PersonaStatus) -> Self {
        match status {
            PersonaStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for PersonaStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(PersonaStatus::from(s.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────────────────────────

/// Marks a credential kind as configured. The credential value itself is
/// never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialMarker {
    #[serde(default = "default_configured")]
    pub configured: bool,

    pub configured_at: DateTime<Utc>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_configured() -> bool {
    true
}

impl CredentialMarker {
    pub fn configured_at(at: DateTime<Utc>) -> Self {
        Self {
            configured: true,
            configured_at: at,
            extra: Map::new(),
        }
    }
}

/// One registered persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaRecord {
    pub status: PersonaStatus,

    /// Remote repository identifier ("org/name"), empty when none.
    #[serde(default)]
    pub repo: String,

    /// Filesystem location of the persona scaffold.
    #[serde(default)]
    pub path: String,

    /// Configured credential kinds. Presence is the only signal.
    #[serde(default)]
    pub keys: BTreeMap<String, CredentialMarker>,

    /// Set once at first registration.
    pub created_at: DateTime<Utc>,

    /// Set on every mutation of this record.
    pub last_updated: DateTime<Utc>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The whole persisted registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryDocument {
    #[serde(default)]
    pub personas: BTreeMap<String, PersonaRecord>,

    /// Timestamp of the most recent write to the document.
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ─────────────────────────────────────────────────────────────────
// Enriched View
// ─────────────────────────────────────────────────────────────────

/// A record as returned by `get`/`list`: the stored fields plus the state
/// derived from them on every read.
///
/// Serializes as one flat object. `name` and the derived fields are written
/// last and replace any preserved unknown field of the same name.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonaView {
    pub name: String,
    pub record: PersonaRecord,
    pub keys_configured: Vec<String>,
    pub missing_keys: Vec<String>,
    pub is_ready: bool,
}

impl Serialize for PersonaView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut fields = match serde_json::to_value(&self.record).map_err(S::Error::custom)? {
            Value::Object(map) => map,
            other => {
                return Err(S::Error::custom(format!(
                    "persona record serialized to {} instead of an object",
                    other
                )))
            }
        };

        fields.insert("name".to_string(), Value::from(self.name.as_str()));
        fields.insert(
            "keysConfigured".to_string(),
            Value::from(self.keys_configured.clone()),
        );
        fields.insert("missingKeys".to_string(), Value::from(self.missing_keys.clone()));
        fields.insert("isReady".to_string(), Value::from(self.is_ready));

        fields.serialize(serializer)
    }
}
