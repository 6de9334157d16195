//! Writes persona scaffolds and config documents to disk.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};

use super::templates::{self, TemplateFields};

const README_FILE: &str = "README.md";
const PERSONA_FILE: &str = "PERSONA.md";
const CONFIG_FILE: &str = "persona.toml";
const PLACEHOLDER: &str = ".gitkeep";
const SUBDIRS: [&str; 2] = ["memory", "skills"];

/// Creates the directory tree for a new persona.
#[derive(Debug, Clone)]
pub struct ScaffoldGenerator {
    /// Parent directory for persona scaffolds.
    base_dir: PathBuf,
}

impl ScaffoldGenerator {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Where `name` would be scaffolded.
    pub fn persona_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// Write the scaffold for `name` and return its root.
    ///
    /// An existing root is refused unless `force` is set, in which case the
    /// scaffold files are overwritten and anything else is left alone.
    pub fn generate(&self, name: &str, description: &str, force: bool) -> Result<PathBuf> {
        let root = self.persona_path(name);
        if root.exists() && !force {
            return Err(Error::ScaffoldExists { path: root });
        }

        create_dir(&root)?;

        let fields = TemplateFields { name, description };
        write_file(&root.join(README_FILE), &templates::render_readme(&fields))?;
        write_file(&root.join(PERSONA_FILE), &templates::render_persona_doc(&fields))?;

        for sub in SUBDIRS {
            let dir = root.join(sub);
            create_dir(&dir)?;
            write_file(&dir.join(PLACEHOLDER), "")?;
        }

        info!(persona = %name, path = %root.display(), "Scaffold created");
        Ok(root)
    }
}

/// Write `persona.toml` into `root` and return its path.
pub fn write_config(root: &Path, name: &str, model: &str) -> Result<PathBuf> {
    let path = root.join(CONFIG_FILE);
    write_file(&path, &templates::render_config(name, model)?)?;
    info!(persona = %name, model = %model, path = %path.display(), "Persona config written");
    Ok(path)
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| Error::IoWrite {
        path: dir.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|source| Error::IoWrite {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = content.len(), "Wrote file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generate_layout() {
        let tmp = TempDir::new().unwrap();
        let generator = ScaffoldGenerator::new(tmp.path().join("personas"));

        let root = generator.generate("scout", "Tracks releases", false).unwrap();

        assert_eq!(root, tmp.path().join("personas").join("scout"));
        assert!(root.join("README.md").is_file());
        assert!(root.join("PERSONA.md").is_file());
        assert!(root.join("memory").join(".gitkeep").is_file());
        assert!(root.join("skills").join(".gitkeep").is_file());

        let readme = fs::read_to_string(root.join("README.md")).unwrap();
        assert!(readme.contains("Tracks releases"));
    }

    #[test]
    fn test_generate_refuses_existing_without_force() {
        let tmp = TempDir::new().unwrap();
        let generator = ScaffoldGenerator::new(tmp.path());
        fs::create_dir_all(tmp.path().join("scout")).unwrap();
        fs::write(tmp.path().join("scout").join("notes.txt"), "keep me").unwrap();

        let err = generator.generate("scout", "d", false).unwrap_err();
        assert!(matches!(err, Error::ScaffoldExists { .. }));
        assert!(!tmp.path().join("scout").join("README.md").exists());

        generator.generate("scout", "d", true).unwrap();
        assert!(tmp.path().join("scout").join("README.md").exists());
        assert_eq!(
            fs::read_to_string(tmp.path().join("scout").join("notes.txt")).unwrap(),
            "keep me"
        );
    }

    #[test]
    fn test_write_config() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(tmp.path(), "scout", "gpt-4o").unwrap();

        assert_eq!(path, tmp.path().join("persona.toml"));
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("model = \"gpt-4o\""));
    }
}
