//! SpellResult - outcome of one evaluation

use crate::types::{CasterStatus, MagicSystem, SpellEnvironment};
use serde::{Deserialize, Serialize};

/// Every multiplier stage that went into the damage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulaBreakdown {
    pub base: f64,
    /// True when a known spell supplied the base
    pub base_from_spell: bool,
    pub internal: f64,
    pub vitality: f64,
    pub crisis: bool,
    /// w_density / divisor
    pub density: f64,
    pub weather: f64,
    /// 1.0 unless climate synergy is enabled
    pub climate: f64,
    /// density * weather * climate
    pub environment: f64,
    pub protection: f64,
    pub protection_active: bool,
    pub tool: f64,
    pub buff: f64,
    /// Set when a fate roll multiplied the result
    pub fate: Option<f64>,
}

impl FormulaBreakdown {
    /// Product of every stage before flooring
    pub fn product(&self) -> f64 {
        self.base
            * self.internal
            * self.vitality
            * self.environment
            * self.protection
            * self.tool
            * self.buff
            * self.fate.unwrap_or(1.0)
    }
}

/// Flavor data attached to a spell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellLore {
    /// Ritual or instant
    pub magic_type: String,
    pub cost: String,
    pub theory: String,
}

/// Immutable result of evaluating a spell request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellResult {
    // === Identity ===
    pub name: String,
    pub system: MagicSystem,
    pub attribute: String,
    pub domain: String,
    pub rank: u8,

    // === Damage ===
    pub predicted_damage: u64,
    /// Human-readable calculation, one line per stage
    pub trace: String,
    /// None for hidden arts, which skip the formula
    pub breakdown: Option<FormulaBreakdown>,

    // === Flavor ===
    pub description: String,
    pub chant: String,
    pub eye_color: String,
    pub oip_amplitude: String,
    pub oip_frequency: String,
    pub lore: SpellLore,

    // === Inputs snapshot ===
    pub caster: CasterStatus,
    pub environment: SpellEnvironment,
    pub protection_id: String,
    pub protection_name: String,
    pub tool_id: String,
    pub tool_name: String,
    pub reinforcement: i8,
    pub buff_level: i8,

    pub hidden_art: bool,
}

impl SpellResult {
    /// Multiply the damage by a fate multiplier and note it in the trace
    pub fn apply_fate(&self, multiplier: f64) -> SpellResult {
        let mut result = self.clone();
        let boosted = (self.predicted_damage as f64 * multiplier).floor();
        result.predicted_damage = if boosted.is_finite() && boosted > 0.0 {
            boosted as u64
        } else {
            0
        };
        if let Some(breakdown) = result.breakdown.as_mut() {
            breakdown.fate = Some(breakdown.fate.unwrap_or(1.0) * multiplier);
        }
        result.trace.push_str(&format!(
            "\n[FATE] Miracle resonance: x{:.2}\nTOTAL (FATE): {}",
            multiplier, result.predicted_damage
        ));
        result
    }

    /// One-line summary for logs and status bars
    pub fn summary(&self) -> String {
        format!(
            "{} [{} / {} / rank {}] {} dmg",
            self.name, self.system, self.attribute, self.rank, self.predicted_damage
        )
    }
}
