//! Error types for persona-forge
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - User-facing hints
//! - Exit codes for the CLI

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for persona-forge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes.
pub mod exit {
    pub const NOT_FOUND: i32 = 1;
    pub const INVALID_ARGUMENTS: i32 = 2;
    pub const PERSISTENCE: i32 = 3;
    pub const FAILURE: i32 = 4;
}

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,
    ScaffoldExists = 210,

    // Persona errors (3xx)
    PersonaNotFound = 300,
    PathMissing = 301,
    InvalidArgument = 302,

    // Registry persistence errors (4xx)
    RegistryRead = 400,
    RegistryCorrupt = 401,
    RegistryWrite = 402,

    // Bootstrap errors (5xx)
    BootstrapFailed = 500,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E300")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Map the code onto the CLI exit code contract
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorCode::PersonaNotFound => exit::NOT_FOUND,
            ErrorCode::PathMissing
            | ErrorCode::InvalidArgument
            | ErrorCode::ConfigNotFound
            | ErrorCode::ConfigParseError
            | ErrorCode::ConfigValidation => exit::INVALID_ARGUMENTS,
            ErrorCode::RegistryRead | ErrorCode::RegistryCorrupt | ErrorCode::RegistryWrite => {
                exit::PERSISTENCE
            }
            _ => exit::FAILURE,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parse error
    #[error("Failed to parse configuration {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ConfigValidation(String),

    // ─────────────────────────────────────────────────────────────
    // IO Errors
    // ─────────────────────────────────────────────────────────────

    /// File read error
    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File write error
    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Scaffold directory already present
    #[error("Persona directory already exists: {path}")]
    ScaffoldExists { path: PathBuf },

    // ─────────────────────────────────────────────────────────────
    // Persona Errors
    // ─────────────────────────────────────────────────────────────

    /// Operation on an unregistered persona
    #[error("Persona not found: {name}")]
    PersonaNotFound { name: String },

    /// Manual registration pointing at a nonexistent location
    #[error("Path does not exist: {path}")]
    PathMissing { path: PathBuf },

    /// Argument rejected before any side effect
    #[error("Invalid argument '{argument}': {reason}")]
    InvalidArgument { argument: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // Registry Persistence Errors
    // ─────────────────────────────────────────────────────────────

    /// Registry document exists but could not be read
    #[error("Failed to read registry {path}")]
    RegistryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Registry document exists but is not valid
    #[error("Registry document {path} is corrupt: {source}")]
    RegistryCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Registry document could not be written
    #[error("Failed to write registry {path}")]
    RegistryWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // Bootstrap / Internal
    // ─────────────────────────────────────────────────────────────

    /// Remote repository bootstrap failed
    #[error("Repository bootstrap failed: {message}")]
    BootstrapFailed { message: String },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation(_) => ErrorCode::ConfigValidation,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Toml(_) => ErrorCode::ConfigParseError,
            Error::Json(_) => ErrorCode::InternalError,
            Error::ScaffoldExists { .. } => ErrorCode::ScaffoldExists,

            Error::PersonaNotFound { .. } => ErrorCode::PersonaNotFound,
            Error::PathMissing { .. } => ErrorCode::PathMissing,
            Error::InvalidArgument { .. } => ErrorCode::InvalidArgument,

            Error::RegistryRead { .. } => ErrorCode::RegistryRead,
            Error::RegistryCorrupt { .. } => ErrorCode::RegistryCorrupt,
            Error::RegistryWrite { .. } => ErrorCode::RegistryWrite,

            Error::BootstrapFailed { .. } => ErrorCode::BootstrapFailed,
            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    /// Get a user-facing suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => {
                Some("Run 'persona-forge config init' to create a default configuration file.")
            }
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'persona-forge config validate' to see details.",
            ),
            Error::PersonaNotFound { .. } => {
                Some("Run 'persona-forge list' to see registered personas.")
            }
            Error::PathMissing { .. } => Some(
                "Register an existing directory, or use 'persona-forge create-persona' to scaffold one.",
            ),
            Error::ScaffoldExists { .. } => {
                Some("Pass --force to write into the existing directory.")
            }
            Error::RegistryCorrupt { .. } => Some(
                "The registry was left untouched. Fix or move the file aside; nothing is overwritten automatically.",
            ),
            Error::BootstrapFailed { .. } => Some(
                "Check that git and gh are installed and 'gh auth status' succeeds.",
            ),
            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let mut output = format!("\x1b[31mError [{}]\x1b[0m: {}\n", self.code().as_str(), self);

        if let Some(hint) = self.suggestion() {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        format!("[{}] {}", self.code().as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn persona_not_found(name: impl Into<String>) -> Self {
        Error::PersonaNotFound { name: name.into() }
    }

    pub fn invalid_argument(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    pub fn config_validation(message: impl Into<String>) -> Self {
        Error::ConfigValidation(message.into())
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
