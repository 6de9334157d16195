//! Persona scaffolding: template rendering and the writers that put the
//! rendered documents on disk.

pub mod generator;
pub mod templates;

pub use generator::{write_config, ScaffoldGenerator};
