//! JSON attribute import
//!
//! ```json
//! { "attributes": [ { "name": "Void", "system": "因果系", "kanji": "虚無", "reading": "キョム" } ] }
//! ```
//!
//! The whole document is validated before the codex is touched.

use crate::codex::{AttributeDef, Codex};
use crate::types::MagicSystem;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to read import file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid JSON: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Document has no \"attributes\" array")]
    MissingAttributes,
    #[error("Attribute #{index}: unknown system '{system}'")]
    UnknownSystem { index: usize, system: String },
    #[error("Attribute #{index}: {reason}")]
    InvalidEntry { index: usize, reason: String },
}

/// Summary of an applied import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    /// Attributes that did not exist before
    pub added: usize,
    /// Existing attributes whose keyword data was replaced
    pub updated: usize,
}

#[derive(Debug, Deserialize)]
struct RawAttribute {
    name: String,
    system: String,
    #[serde(default)]
    kanji: Option<String>,
    #[serde(default)]
    reading: Option<String>,
    #[serde(default)]
    tone: Option<String>,
}

/// Parse and validate a document without applying it
pub fn parse_attributes(json: &str) -> Result<Vec<AttributeDef>, ImportError> {
    let doc: serde_json::Value = serde_json::from_str(json)?;
    let list = doc
        .get("attributes")
        .and_then(|v| v.as_array())
        .ok_or(ImportError::MissingAttributes)?;

    let mut parsed = Vec::with_capacity(list.len());
    for (index, value) in list.iter().enumerate() {
        let raw: RawAttribute =
            serde_json::from_value(value.clone()).map_err(|e| ImportError::InvalidEntry {
                index,
                reason: e.to_string(),
            })?;

        let name = raw.name.trim();
        if name.is_empty() {
            return Err(ImportError::InvalidEntry {
                index,
                reason: "name is empty".to_string(),
            });
        }
        let system = MagicSystem::parse(&raw.system).ok_or_else(|| ImportError::UnknownSystem {
            index,
            system: raw.system.clone(),
        })?;

        let kanji = raw.kanji.filter(|k| !k.trim().is_empty()).unwrap_or_else(|| name.to_string());
        let reading = raw.reading.filter(|r| !r.trim().is_empty()).unwrap_or_else(|| kanji.clone());
        parsed.push(AttributeDef {
            name: name.to_string(),
            system,
            kanji,
            reading,
            tone: raw.tone.unwrap_or_else(|| "neutral".to_string()),
        });
    }
    Ok(parsed)
}

/// Validate the whole document, then upsert every attribute into the codex
pub fn import_attributes(codex: &mut Codex, json: &str) -> Result<ImportReport, ImportError> {
    let attributes = match parse_attributes(json) {
        Ok(attributes) => attributes,
        Err(e) => {
            tracing::warn!("import rejected: {}", e);
            return Err(e);
        }
    };

    let mut report = ImportReport { added: 0, updated: 0 };
    for attribute in attributes {
        if codex.upsert_attribute(attribute) {
            report.added += 1;
        } else {
            report.updated += 1;
        }
    }
    tracing::info!(
        "imported attributes: {} added, {} updated",
        report.added,
        report.updated
    );
    Ok(report)
}

/// Read a JSON file and import it
pub fn import_attributes_file(
    codex: &mut Codex,
    path: impl AsRef<Path>,
) -> Result<ImportReport, ImportError> {
    let content = std::fs::read_to_string(path)?;
    import_attributes(codex, &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VOID: &str = r#"{ "attributes": [ { "name": "Void", "system": "因果系", "kanji": "虚無", "reading": "キョム" } ] }"#;

    #[test]
    fn test_void_example_adds_one_causal_attribute() {
        let mut codex = Codex::default();
        let before = codex.clone();
        let causal_before = codex.attributes_of(MagicSystem::Causal).len();

        let report = import_attributes(&mut codex, VOID).unwrap();
        assert_eq!(report, ImportReport { added: 1, updated: 0 });

        let causal = codex.attributes_of(MagicSystem::Causal);
        assert_eq!(causal.len(), causal_before + 1);
        assert_eq!(causal.last().map(|a| a.name.as_str()), Some("Void"));
        let void = codex.attribute("Void").unwrap();
        assert_eq!(void.kanji, "虚無");
        assert_eq!(void.tone, "neutral");

        for system in MagicSystem::all() {
            if *system != MagicSystem::Causal {
                assert_eq!(codex.attributes_of(*system), before.attributes_of(*system));
            }
        }
        assert_eq!(codex.protections(), before.protections());
    }

    #[test]
    fn test_missing_attributes_leaves_codex_untouched() {
        let mut codex = Codex::default();
        let before = codex.clone();
        let err = import_attributes(&mut codex, r#"{ "spells": [] }"#).unwrap_err();
        assert!(matches!(err, ImportError::MissingAttributes));
        assert_eq!(codex, before);

        let err = import_attributes(&mut codex, r#"{ "attributes": 5 }"#).unwrap_err();
        assert!(matches!(err, ImportError::MissingAttributes));
    }

    #[test]
    fn test_invalid_entry_rejects_whole_document() {
        let mut codex = Codex::default();
        let before = codex.clone();
        let json = r#"{ "attributes": [
            { "name": "Good", "system": "Dawn", "kanji": "良", "reading": "ヨイ" },
            { "name": "Bad", "system": "Arcane", "kanji": "悪", "reading": "ワル" }
        ] }"#;
        let err = import_attributes(&mut codex, json).unwrap_err();
        assert!(matches!(err, ImportError::UnknownSystem { index: 1, .. }));
        assert_eq!(codex, before);

        let json = r#"{ "attributes": [ { "name": " ", "system": "因果系" } ] }"#;
        assert!(matches!(
            import_attributes(&mut codex, json),
            Err(ImportError::InvalidEntry { index: 0, .. })
        ));
        assert!(matches!(
            import_attributes(&mut codex, "not json"),
            Err(ImportError::ParseError(_))
        ));
        assert_eq!(codex, before);
    }

    #[test]
    fn test_reimport_updates_in_place() {
        let mut codex = Codex::default();
        import_attributes(&mut codex, VOID).unwrap();
        let json = r#"{ "attributes": [ { "name": "Void", "system": "causal", "kanji": "空", "reading": "クウ", "tone": "hollow" } ] }"#;
        let report = import_attributes(&mut codex, json).unwrap();
        assert_eq!(report, ImportReport { added: 0, updated: 1 });
        assert_eq!(codex.attribute("Void").unwrap().tone, "hollow");
    }
}
