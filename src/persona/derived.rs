//! Derived persona state, recomputed on every read and never stored.

use super::types::{PersonaRecord, PersonaStatus, PersonaView};

/// Fields computed from a record's credential markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedState {
    /// Configured credential kinds, in mapping order.
    pub keys_configured: Vec<String>,
    /// Common kinds not yet configured, in common-list order.
    pub missing_keys: Vec<String>,
    /// At least one configured kind and status is not `error`.
    pub is_ready: bool,
}

impl DerivedState {
    pub fn compute(record: &PersonaRecord, common_keys: &[String]) -> Self {
        let keys_configured: Vec<String> = record.keys.keys().cloned().collect();
        let missing_keys = common_keys
            .iter()
            .filter(|kind| !record.keys.contains_key(kind.as_str()))
            .cloned()
            .collect();
        // Any configured kind counts, common or not.
        let is_ready = !keys_configured.is_empty() && record.status != PersonaStatus::Error;

        Self {
            keys_configured,
            missing_keys,
            is_ready,
        }
    }
}

/// Attach derived fields to a stored record.
pub fn enrich(name: &str, record: PersonaRecord, common_keys: &[String]) -> PersonaView {
    let derived = DerivedState::compute(&record, common_keys);
    PersonaView {
        name: name.to_string(),
        record,
        keys_configured: derived.keys_configured,
        missing_keys: derived.missing_keys,
        is_ready: derived.is_ready,
    }
}
