//! Codex - reference tables for attributes, protections, tools and presets
//!
//! The codex is an explicit store passed by reference; every mutation is an
//! upsert keyed by id (or attribute name).

mod defs;

pub use defs::{
    AttributeDef, CharacterPreset, HiddenArt, HiddenArtTrigger, LibrarySpell, ProtectionDef,
    RankDef, ToolDef,
};

use crate::battle::EnemyDef;
use crate::config::{parse_toml, ConfigError};
use crate::types::MagicSystem;
use serde::{Deserialize, Serialize};

/// All reference data used by the forge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Codex {
    #[serde(default)]
    attributes: Vec<AttributeDef>,
    #[serde(default)]
    protections: Vec<ProtectionDef>,
    #[serde(default)]
    tools: Vec<ToolDef>,
    #[serde(default)]
    characters: Vec<CharacterPreset>,
    #[serde(default)]
    ranks: Vec<RankDef>,
    #[serde(default)]
    hidden_arts: Vec<HiddenArt>,
    #[serde(default)]
    library: Vec<LibrarySpell>,
    #[serde(default)]
    enemies: Vec<EnemyDef>,
    #[serde(default)]
    failure_reasons: Vec<String>,
}

impl Default for Codex {
    fn default() -> Self {
        let toml = include_str!("../../config/codex.toml");
        Codex::parse(toml).unwrap_or_else(|e| {
            tracing::warn!("embedded codex failed to parse, using minimal codex: {}", e);
            Codex::minimal()
        })
    }
}

impl Codex {
    /// Parse a codex from TOML; the inert protection and tool are always present
    pub fn parse(content: &str) -> Result<Codex, ConfigError> {
        let mut codex: Codex = parse_toml(content)?;
        codex.ensure_builtins();
        Ok(codex)
    }

    /// Smallest usable codex: one attribute per system, no named modifiers
    pub fn minimal() -> Self {
        let mut codex = Codex {
            attributes: Vec::new(),
            protections: Vec::new(),
            tools: Vec::new(),
            characters: Vec::new(),
            ranks: Vec::new(),
            hidden_arts: Vec::new(),
            library: Vec::new(),
            enemies: Vec::new(),
            failure_reasons: Vec::new(),
        };
        for (name, system) in [
            ("火属性", MagicSystem::Elemental),
            ("因果域", MagicSystem::Causal),
            ("創生域", MagicSystem::Creation),
            ("星焔域", MagicSystem::Dawn),
            ("生活魔法", MagicSystem::Other),
        ] {
            codex.attributes.push(AttributeDef::unknown(name, system));
        }
        codex.ensure_builtins();
        codex
    }

    fn ensure_builtins(&mut self) {
        if !self.protections.iter().any(|p| p.is_none()) {
            self.protections.insert(0, ProtectionDef::none());
        }
        if !self.tools.iter().any(|t| t.id == ToolDef::NONE_ID) {
            self.tools.push(ToolDef::unarmed());
        }
        if self.failure_reasons.is_empty() {
            self.failure_reasons.push("Circuit Criticality Collapse".to_string());
        }
    }

    // === Attributes ===

    pub fn attributes(&self) -> &[AttributeDef] {
        &self.attributes
    }

    /// Attributes of one system in insertion order
    pub fn attributes_of(&self, system: MagicSystem) -> Vec<&AttributeDef> {
        self.attributes.iter().filter(|a| a.system == system).collect()
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Keyword data for an attribute, falling back to the bare name
    pub fn keyword(&self, name: &str, system: MagicSystem) -> AttributeDef {
        self.attribute(name)
            .cloned()
            .unwrap_or_else(|| AttributeDef::unknown(name, system))
    }

    pub fn first_attribute(&self, system: MagicSystem) -> Option<&AttributeDef> {
        self.attributes.iter().find(|a| a.system == system)
    }

    pub fn has_attribute(&self, system: MagicSystem, name: &str) -> bool {
        self.attributes.iter().any(|a| a.system == system && a.name == name)
    }

    /// Insert or replace an attribute by name. Returns true when it was new.
    pub fn upsert_attribute(&mut self, attribute: AttributeDef) -> bool {
        match self.attributes.iter_mut().find(|a| a.name == attribute.name) {
            Some(existing) => {
                *existing = attribute;
                false
            }
            None => {
                self.attributes.push(attribute);
                true
            }
        }
    }

    // === Protections ===

    pub fn protections(&self) -> &[ProtectionDef] {
        &self.protections
    }

    pub fn protection(&self, id: &str) -> Option<&ProtectionDef> {
        self.protections.iter().find(|p| p.id == id)
    }

    /// Protection by id, or the inert protection
    pub fn protection_or_none(&self, id: &str) -> ProtectionDef {
        match self.protection(id) {
            Some(p) => p.clone(),
            None => {
                tracing::warn!("unknown protection '{}', using none", id);
                ProtectionDef::none()
            }
        }
    }

    pub fn upsert_protection(&mut self, protection: ProtectionDef) -> bool {
        match self.protections.iter_mut().find(|p| p.id == protection.id) {
            Some(existing) => {
                *existing = protection;
                false
            }
            None => {
                self.protections.push(protection);
                true
            }
        }
    }

    // === Tools ===

    pub fn tools(&self) -> &[ToolDef] {
        &self.tools
    }

    pub fn tool(&self, id: &str) -> Option<&ToolDef> {
        self.tools.iter().find(|t| t.id == id)
    }

    /// Tool by id, or bare hands
    pub fn tool_or_unarmed(&self, id: &str) -> ToolDef {
        match self.tool(id) {
            Some(t) => t.clone(),
            None => {
                tracing::warn!("unknown tool '{}', using unarmed", id);
                self.tool(ToolDef::NONE_ID)
                    .cloned()
                    .unwrap_or_else(ToolDef::unarmed)
            }
        }
    }

    pub fn upsert_tool(&mut self, tool: ToolDef) -> bool {
        match self.tools.iter_mut().find(|t| t.id == tool.id) {
            Some(existing) => {
                *existing = tool;
                false
            }
            None => {
                self.tools.push(tool);
                true
            }
        }
    }

    // === Characters ===

    pub fn characters(&self) -> &[CharacterPreset] {
        &self.characters
    }

    pub fn character(&self, id: &str) -> Option<&CharacterPreset> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn character_mut(&mut self, id: &str) -> Option<&mut CharacterPreset> {
        self.characters.iter_mut().find(|c| c.id == id)
    }

    pub fn upsert_character(&mut self, character: CharacterPreset) -> bool {
        match self.characters.iter_mut().find(|c| c.id == character.id) {
            Some(existing) => {
                *existing = character;
                false
            }
            None => {
                self.characters.push(character);
                true
            }
        }
    }

    // === Ranks, hidden arts, library ===

    /// Rank data, falling back to rank 1 data (then a built-in) when missing
    pub fn rank(&self, rank: u8) -> RankDef {
        self.ranks
            .iter()
            .find(|r| r.rank == rank)
            .or_else(|| self.ranks.iter().find(|r| r.rank == 1))
            .cloned()
            .unwrap_or_else(|| RankDef::fallback(rank))
    }

    pub fn hidden_art(
        &self,
        protection_id: &str,
        system: MagicSystem,
        attribute: &str,
        rank: u8,
    ) -> Option<&HiddenArt> {
        self.hidden_arts
            .iter()
            .find(|art| art.matches(protection_id, system, attribute, rank))
    }

    pub fn library(&self) -> &[LibrarySpell] {
        &self.library
    }

    // === Battle ===

    pub fn enemies(&self) -> &[EnemyDef] {
        &self.enemies
    }

    pub fn enemy(&self, id: &str) -> Option<&EnemyDef> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn upsert_enemy(&mut self, enemy: EnemyDef) -> bool {
        match self.enemies.iter_mut().find(|e| e.id == enemy.id) {
            Some(existing) => {
                *existing = enemy;
                false
            }
            None => {
                self.enemies.push(enemy);
                true
            }
        }
    }

    pub fn failure_reasons(&self) -> &[String] {
        &self.failure_reasons
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_codex_loads_all_tables() {
        let codex = Codex::default();

        assert_eq!(codex.attributes_of(MagicSystem::Elemental).len(), 12);
        assert_eq!(codex.attributes_of(MagicSystem::Causal).len(), 3);
        assert_eq!(codex.attributes_of(MagicSystem::Creation).len(), 4);
        assert_eq!(codex.attributes_of(MagicSystem::Dawn).len(), 3);
        assert_eq!(codex.attributes_of(MagicSystem::Other).len(), 3);

        assert_eq!(codex.protections().len(), 19);
        assert_eq!(codex.tools().len(), 6);
        assert_eq!(codex.characters().len(), 3);
        for rank in 1..=7 {
            assert_eq!(codex.rank(rank).rank, rank);
        }
        assert_eq!(codex.failure_reasons().len(), 5);
        assert!(!codex.enemies().is_empty());
        assert_eq!(codex.library().len(), 1);
    }

    #[test]
    fn test_first_attribute_order() {
        let codex = Codex::default();
        assert_eq!(
            codex.first_attribute(MagicSystem::Elemental).map(|a| a.name.as_str()),
            Some("火属性")
        );
        assert_eq!(
            codex.first_attribute(MagicSystem::Causal).map(|a| a.name.as_str()),
            Some("律界域")
        );
    }

    #[test]
    fn test_upsert_protection_replaces_by_id() {
        let mut codex = Codex::default();
        let count = codex.protections().len();

        let mut fire = codex.protection("kago_fire").cloned().unwrap();
        fire.multiplier = 9.0;
        assert!(!codex.upsert_protection(fire));
        assert_eq!(codex.protections().len(), count);
        assert!((codex.protection("kago_fire").unwrap().multiplier - 9.0).abs() < f64::EPSILON);

        let mut custom = ProtectionDef::none();
        custom.id = "kago_custom".to_string();
        assert!(codex.upsert_protection(custom));
        assert_eq!(codex.protections().len(), count + 1);
    }

    #[test]
    fn test_upsert_tool_replaces_default() {
        let mut codex = Codex::default();
        let mut staff = codex.tool("tool_staff").cloned().unwrap();
        staff.power_bonus = 2.0;
        assert!(!codex.upsert_tool(staff));
        assert!((codex.tool("tool_staff").unwrap().power_bonus - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fallbacks() {
        let codex = Codex::default();
        assert!(codex.protection_or_none("missing").is_none());
        assert_eq!(codex.tool_or_unarmed("missing").id, ToolDef::NONE_ID);
        assert_eq!(codex.keyword("謎属性", MagicSystem::Other).reading, "UNKNOWN");
        assert_eq!(codex.rank(9).rank, 1);
    }

    #[test]
    fn test_parse_adds_builtins() {
        let codex = Codex::parse(
            r#"
[[attributes]]
name = "火属性"
system = "元素系"
kanji = "紅蓮"
reading = "グレン"
tone = "burning"
"#,
        )
        .unwrap();
        assert!(codex.protection(ProtectionDef::NONE_ID).is_some());
        assert!(codex.tool(ToolDef::NONE_ID).is_some());
        assert!(!codex.failure_reasons().is_empty());
    }

    #[test]
    fn test_hidden_art_lookup() {
        let codex = Codex::default();
        assert!(codex
            .hidden_art("kago_world", MagicSystem::Causal, "因果域", 7)
            .is_some());
        assert!(codex
            .hidden_art("kago_world", MagicSystem::Causal, "因果域", 6)
            .is_none());
    }
}
