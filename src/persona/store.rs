//! Storage backends for the registry document.
//!
//! The registry never caches: every operation loads the whole document and,
//! when it mutates, saves the whole document back.
//!
//! Concurrent processes are not coordinated. Two invocations that
//! read-modify-write at the same time race and the last save wins, but each
//! save replaces the file with one rename so the document is never torn.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

use super::types::RegistryDocument;

/// Where the registry document lives.
pub trait RegistryBackend {
    /// Load the document. An absent document is an empty registry; an
    /// unreadable or unparseable one is an error.
    fn load(&self) -> Result<RegistryDocument>;

    /// Replace the stored document.
    fn save(&self, doc: &RegistryDocument) -> Result<()>;

    /// Human-readable location for reports.
    fn location(&self) -> String;
}

// ─────────────────────────────────────────────────────────────────
// JSON File Backend
// ─────────────────────────────────────────────────────────────────

/// Registry stored as one pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RegistryBackend for JsonFileBackend {
    fn load(&self) -> Result<RegistryDocument> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Registry not found, starting empty");
                return Ok(RegistryDocument::default());
            }
            Err(source) => {
                return Err(Error::RegistryRead {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        parse_document(&content).map_err(|source| Error::RegistryCorrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, doc: &RegistryDocument) -> Result<()> {
        let write_err = |source: std::io::Error| Error::RegistryWrite {
            path: self.path.clone(),
            source,
        };

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        fs::create_dir_all(dir).map_err(write_err)?;

        let mut json = serde_json::to_string_pretty(doc)?;
        json.push('\n');

        // Uniquely named sibling, renamed over the target. Dropped (and
        // removed) if any step fails.
        let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        temp.write_all(json.as_bytes()).map_err(write_err)?;
        temp.as_file().sync_all().map_err(write_err)?;
        temp.persist(&self.path).map_err(|err| write_err(err.error))?;

        debug!(path = %self.path.display(), personas = doc.personas.len(), "Registry saved");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

// ─────────────────────────────────────────────────────────────────
// In-Memory Backend
// ─────────────────────────────────────────────────────────────────

/// Registry held as serialized JSON in memory.
///
/// Keeps the text rather than the struct so loads go through the same
/// parsing path as the file backend.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryBackend {
    contents: std::cell::RefCell<Option<String>>,
}

#[cfg(test)]
impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from raw document text (which may be invalid).
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: std::cell::RefCell::new(Some(contents.into())),
        }
    }

    /// Current raw document text, if anything has been stored.
    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }
}

#[cfg(test)]
impl RegistryBackend for MemoryBackend {
    fn load(&self) -> Result<RegistryDocument> {
        match self.contents.borrow().as_deref() {
            None => Ok(RegistryDocument::default()),
            Some(text) => parse_document(text).map_err(|source| Error::RegistryCorrupt {
                path: PathBuf::from(self.location()),
                source,
            }),
        }
    }

    fn save(&self, doc: &RegistryDocument) -> Result<()> {
        let json = serde_json::to_string_pretty(doc)?;
        *self.contents.borrow_mut() = Some(json);
        Ok(())
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}

/// Parse document text. Whitespace-only text is an empty registry.
fn parse_document(text: &str) -> std::result::Result<RegistryDocument, serde_json::Error> {
    if text.trim().is_empty() {
        return Ok(RegistryDocument::default());
    }
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty_registry() {
        let tmp = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(tmp.path().join("registry.json"));
        let doc = backend.load().unwrap();
        assert!(doc.personas.is_empty());
        assert!(doc.last_updated.is_none());
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("deep").join("nested").join("registry.json");
        let backend = JsonFileBackend::new(&path);

        backend.save(&RegistryDocument::default()).unwrap();

        assert!(path.exists());
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"personas\""));
    }

    #[test]
    fn test_repeated_saves_leave_no_temp_files() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("registry.json");
        let backend = JsonFileBackend::new(&path);

        for _ in 0..3 {
            backend.save(&RegistryDocument::default()).unwrap();
        }

        let entries: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("registry.json")]);
    }

    #[test]
    fn test_failed_rename_cleans_up_temp_file() {
        let tmp = TempDir::new().unwrap();
        // A non-empty directory where the document should go makes the rename fail.
        let path = tmp.path().join("registry.json");
        fs::create_dir_all(path.join("occupied")).unwrap();

        let backend = JsonFileBackend::new(&path);
        let err = backend.save(&RegistryDocument::default()).unwrap_err();
        assert!(matches!(err, Error::RegistryWrite { .. }));

        let entries: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("registry.json")]);
    }

    #[test]
    fn test_corrupt_file_is_an_error_and_untouched() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("registry.json");
        fs::write(&path, "{ \"personas\": [oops").unwrap();

        let backend = JsonFileBackend::new(&path);
        let err = backend.load().unwrap_err();
        assert!(matches!(err, Error::RegistryCorrupt { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ \"personas\": [oops");
    }

    #[test]
    fn test_unknown_top_level_fields_survive() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("registry.json");
        fs::write(
            &path,
            r#"{"personas": {}, "lastUpdated": null, "schemaVersion": 2, "meta": {"host": "box"}}"#,
        )
        .unwrap();

        let backend = JsonFileBackend::new(&path);
        let doc = backend.load().unwrap();
        backend.save(&doc).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["schemaVersion"], 2);
        assert_eq!(value["meta"]["host"], "box");
    }

    #[test]
    fn test_memory_backend() {
        let backend = MemoryBackend::new();
        assert!(backend.contents().is_none());
        assert!(backend.load().unwrap().personas.is_empty());

        backend.save(&RegistryDocument::default()).unwrap();
        assert!(backend.contents().unwrap().contains("personas"));

        let corrupt = MemoryBackend::with_contents("not json");
        assert!(matches!(corrupt.load(), Err(Error::RegistryCorrupt { .. })));
    }
}
