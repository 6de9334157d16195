//! Persona registry and lifecycle.
//!
//! `types` holds the persisted shapes, `derived` computes readiness from a
//! record, `store` loads and saves the registry document, `registry` does the
//! read-modify-write operations and `lifecycle` sequences multi-step
//! commands on top of it.

pub mod derived;
pub mod lifecycle;
pub mod registry;
pub mod store;
pub mod types;

pub use lifecycle::{CreatePersona, CreateReport, Lifecycle};
pub use registry::PersonaRegistry;
pub use store::JsonFileBackend;
pub use types::{PersonaStatus, PersonaView};
