//! SpellRequest - transient input of one evaluation

use crate::codex::{ProtectionDef, ToolDef};
use crate::types::{CasterStatus, MagicSystem, SpellEnvironment};
use serde::{Deserialize, Serialize};

pub const MIN_RANK: u8 = 1;
pub const MAX_RANK: u8 = 7;
pub const MIN_REINFORCEMENT: i8 = -3;
pub const MAX_REINFORCEMENT: i8 = 3;
pub const MIN_BUFF: i8 = -5;
pub const MAX_BUFF: i8 = 5;

/// Previously recorded spell whose power and texts override the rank defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnownSpell {
    pub name: Option<String>,
    pub description: Option<String>,
    pub chant: Option<String>,
    /// Ignored unless positive
    pub predicted_damage: u64,
}

/// Everything the evaluator needs for one spell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellRequest {
    pub system: MagicSystem,
    pub attribute: String,
    pub rank: u8,
    pub protection_id: String,
    pub tool_id: String,
    pub reinforcement: i8,
    pub buff_level: i8,
    pub caster: CasterStatus,
    pub environment: SpellEnvironment,
    pub known_spell: Option<KnownSpell>,
}

impl SpellRequest {
    /// Request with no modifiers and default readings
    pub fn new(system: MagicSystem, attribute: impl Into<String>, rank: u8) -> Self {
        SpellRequest {
            system,
            attribute: attribute.into(),
            rank,
            protection_id: ProtectionDef::NONE_ID.to_string(),
            tool_id: ToolDef::NONE_ID.to_string(),
            reinforcement: 0,
            buff_level: 0,
            caster: CasterStatus::default(),
            environment: SpellEnvironment::default(),
            known_spell: None,
        }
    }

    pub fn with_protection(mut self, id: impl Into<String>) -> Self {
        self.protection_id = id.into();
        self
    }

    pub fn with_tool(mut self, id: impl Into<String>, reinforcement: i8) -> Self {
        self.tool_id = id.into();
        self.reinforcement = reinforcement;
        self
    }

    pub fn with_buff(mut self, level: i8) -> Self {
        self.buff_level = level;
        self
    }

    pub fn with_caster(mut self, caster: CasterStatus) -> Self {
        self.caster = caster;
        self
    }

    pub fn with_environment(mut self, environment: SpellEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_known_spell(mut self, known: KnownSpell) -> Self {
        self.known_spell = Some(known);
        self
    }

    /// Copy with every dial clamped into its legal range
    pub fn normalized(&self) -> SpellRequest {
        let mut request = self.clone();
        request.rank = request.rank.clamp(MIN_RANK, MAX_RANK);
        request.reinforcement = request.reinforcement.clamp(MIN_REINFORCEMENT, MAX_REINFORCEMENT);
        request.buff_level = request.buff_level.clamp(MIN_BUFF, MAX_BUFF);
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_clamps_dials() {
        let request = SpellRequest::new(MagicSystem::Elemental, "火属性", 12)
            .with_tool("tool_staff", 9)
            .with_buff(-8);
        let normalized = request.normalized();
        assert_eq!(normalized.rank, 7);
        assert_eq!(normalized.reinforcement, 3);
        assert_eq!(normalized.buff_level, -5);

        let zero_rank = SpellRequest::new(MagicSystem::Elemental, "火属性", 0).normalized();
        assert_eq!(zero_rank.rank, 1);
    }
}
