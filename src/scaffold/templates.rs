//! Document templates for a persona scaffold.
//!
//! Pure functions from fields to text; nothing here touches the filesystem.

use serde::Serialize;

use crate::error::Result;

/// Fields substituted into the scaffold documents.
#[derive(Debug, Clone)]
pub struct TemplateFields<'a> {
    pub name: &'a str,
    pub description: &'a str,
}

/// Default description when the operator gives none.
pub fn default_description(name: &str) -> String {
    format!("{} persona", name)
}

/// README for the scaffold root.
pub fn render_readme(fields: &TemplateFields<'_>) -> String {
    format!(
        r#"# {name}

{description}

## Layout

| Path           | Purpose                                   |
|----------------|-------------------------------------------|
| `PERSONA.md`   | Identity, voice and operating rules       |
| `persona.toml` | Model and runtime settings                |
| `memory/`      | Long-lived notes the persona accumulates  |
| `skills/`      | Reusable procedures and tool instructions |

## Credentials

Credentials are never stored in this repository. Mark each one as
configured once it is available to the runtime:

```sh
persona-forge add-key --name {name} --key <kind>
persona-forge status --name {name}
```
"#,
        name = fields.name,
        description = fields.description,
    )
}

/// Identity document describing who the persona is.
pub fn render_persona_doc(fields: &TemplateFields<'_>) -> String {
    format!(
        r#"# {name}

## Identity

{description}

## Voice

- Direct and concise.
- States uncertainty plainly instead of guessing.

## Operating Rules

1. Stay within the scope described above.
2. Record durable learnings under `memory/`.
3. Put repeatable procedures under `skills/`.
"#,
        name = fields.name,
        description = fields.description,
    )
}

// ─────────────────────────────────────────────────────────────────
// Config document
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct PersonaConfigDoc<'a> {
    persona: PersonaSection<'a>,
    settings: RuntimeSettings,
}

#[derive(Debug, Serialize)]
struct PersonaSection<'a> {
    name: &'a str,
    model: &'a str,
}

/// Fixed defaults written into every new persona config.
#[derive(Debug, Serialize)]
struct RuntimeSettings {
    temperature: f64,
    max_tokens: u32,
    memory_enabled: bool,
    memory_dir: &'static str,
    skills_dir: &'static str,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 4096,
            memory_enabled: true,
            memory_dir: "memory",
            skills_dir: "skills",
        }
    }
}

/// `persona.toml` for a persona using `model`.
pub fn render_config(name: &str, model: &str) -> Result<String> {
    let doc = PersonaConfigDoc {
        persona: PersonaSection { name, model },
        settings: RuntimeSettings::default(),
    };
    let body = toml::to_string_pretty(&doc)?;
    Ok(format!("# Generated by persona-forge\n\n{}", body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> TemplateFields<'static> {
        TemplateFields {
            name: "scout",
            description: "Tracks upstream releases",
        }
    }

    #[test]
    fn test_readme_substitutes_fields() {
        let readme = render_readme(&fields());
        assert!(readme.starts_with("# scout\n"));
        assert!(readme.contains("Tracks upstream releases"));
        assert!(readme.contains("add-key --name scout"));
    }

    #[test]
    fn test_persona_doc_substitutes_fields() {
        let doc = render_persona_doc(&fields());
        assert!(doc.contains("# scout"));
        assert!(doc.contains("## Identity\n\nTracks upstream releases"));
    }

    #[test]
    fn test_default_description() {
        assert_eq!(default_description("scout"), "scout persona");
    }

    #[test]
    fn test_config_renders_name_model_and_defaults() {
        let text = render_config("scout", "claude-sonnet-4").unwrap();
        assert!(text.starts_with("# Generated by persona-forge"));

        let value: toml::Value = toml::from_str(&text).unwrap();
        assert_eq!(value["persona"]["name"].as_str(), Some("scout"));
        assert_eq!(value["persona"]["model"].as_str(), Some("claude-sonnet-4"));
        assert_eq!(value["settings"]["max_tokens"].as_integer(), Some(4096));
        assert_eq!(value["settings"]["memory_enabled"].as_bool(), Some(true));
    }
}
