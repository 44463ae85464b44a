//! Reference record definitions

use crate::types::MagicSystem;
use serde::{Deserialize, Serialize};

/// An attribute within a magic system, with the keyword data used for naming
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDef {
    pub name: String,
    pub system: MagicSystem,
    pub kanji: String,
    pub reading: String,
    #[serde(default = "default_tone")]
    pub tone: String,
}

fn default_tone() -> String {
    "neutral".to_string()
}

impl AttributeDef {
    /// Keyword fallback for an attribute missing from the codex
    pub fn unknown(name: &str, system: MagicSystem) -> Self {
        AttributeDef {
            name: name.to_string(),
            system,
            kanji: name.to_string(),
            reading: "UNKNOWN".to_string(),
            tone: default_tone(),
        }
    }
}

/// Divine protection: a multiplier that only resonates with compatible tags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtectionDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// Attribute or system labels this protection resonates with
    #[serde(default)]
    pub compatible: Vec<String>,
    pub multiplier: f64,
}

impl ProtectionDef {
    pub const NONE_ID: &'static str = "none";

    /// The inert "no protection" entry
    pub fn none() -> Self {
        ProtectionDef {
            id: Self::NONE_ID.to_string(),
            name: "None".to_string(),
            category: "None".to_string(),
            description: "No divine protection.".to_string(),
            compatible: Vec::new(),
            multiplier: 1.0,
        }
    }

    pub fn is_none(&self) -> bool {
        self.id == Self::NONE_ID
    }

    /// Whether any compatibility tag appears in the attribute or system label
    pub fn resonates_with(&self, attribute: &str, system: MagicSystem) -> bool {
        self.compatible
            .iter()
            .filter(|tag| !tag.is_empty())
            .any(|tag| attribute.contains(tag.as_str()) || system.label().contains(tag.as_str()))
    }
}

/// Casting tool (staff, grimoire, orb...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub compatible_systems: Vec<MagicSystem>,
    pub power_bonus: f64,
}

impl ToolDef {
    pub const NONE_ID: &'static str = "tool_none";

    /// Bare hands
    pub fn unarmed() -> Self {
        ToolDef {
            id: Self::NONE_ID.to_string(),
            name: "Unarmed".to_string(),
            category: "None".to_string(),
            description: "No tool in use.".to_string(),
            compatible_systems: Vec::new(),
            power_bonus: 1.0,
        }
    }

    pub fn supports(&self, system: MagicSystem) -> bool {
        self.compatible_systems.contains(&system)
    }
}

/// Saved caster persona
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterPreset {
    pub id: String,
    pub name: String,
    pub protection_id: String,
    /// 0-100
    pub activity_rate: f64,
    #[serde(default)]
    pub description: String,
}

/// Per-rank naming data and ring titles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankDef {
    pub rank: u8,
    /// Appended to the attribute kanji to form a spell name
    pub suffix: String,
    pub theory: String,
    pub effect: String,
    pub ring_name: String,
    pub ring_alias: String,
}

impl RankDef {
    /// Used when the codex has no entry for a rank
    pub fn fallback(rank: u8) -> Self {
        RankDef {
            rank,
            suffix: "球 (Sphere)".to_string(),
            theory: "Basic Condensation".to_string(),
            effect: "Minor Manifestation".to_string(),
            ring_name: "Unknown Ring".to_string(),
            ring_alias: "Unknown".to_string(),
        }
    }
}

/// Selection that unlocks a hidden art
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiddenArtTrigger {
    pub protection_id: String,
    pub system: MagicSystem,
    pub attribute: String,
    pub rank: u8,
}

/// Fixed spell returned instead of the formula when its trigger matches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiddenArt {
    pub trigger: HiddenArtTrigger,
    pub name: String,
    pub description: String,
    pub chant: String,
    pub predicted_damage: u64,
    pub oip_amplitude: String,
    pub oip_frequency: String,
    pub eye_color: String,
}

impl HiddenArt {
    pub fn matches(&self, protection_id: &str, system: MagicSystem, attribute: &str, rank: u8) -> bool {
        self.trigger.protection_id == protection_id
            && self.trigger.system == system
            && self.trigger.attribute == attribute
            && self.trigger.rank == rank
    }
}

/// Library spell preloaded into the grimoire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibrarySpell {
    pub id: String,
    pub name: String,
    pub system: MagicSystem,
    pub attribute: String,
    pub rank: u8,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub chant: String,
    pub predicted_damage: u64,
}
