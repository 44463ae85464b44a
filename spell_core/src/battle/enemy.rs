//! Enemy definitions and elemental effectiveness

use crate::config::BattleConstants;
use serde::{Deserialize, Serialize};

/// How well an attribute lands against an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Effectiveness {
    Super,
    Normal,
    Poor,
    Immune,
}

impl Effectiveness {
    pub fn multiplier(&self, constants: &BattleConstants) -> f64 {
        match self {
            Effectiveness::Super => constants.weakness_multiplier,
            Effectiveness::Normal => 1.0,
            Effectiveness::Poor => constants.resistance_multiplier,
            Effectiveness::Immune => 0.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Effectiveness::Super => "SUPER",
            Effectiveness::Normal => "NORMAL",
            Effectiveness::Poor => "POOR",
            Effectiveness::Immune => "IMMUNE",
        }
    }
}

/// Battle opponent from the codex
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub attribute: String,
    pub max_hp: u64,
    /// Damage per enemy turn before jitter
    pub attack_power: u32,
    /// Tags are matched as substrings of the incoming attribute
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub resistances: Vec<String>,
    #[serde(default)]
    pub immunities: Vec<String>,
}

impl EnemyDef {
    /// Immunity beats weakness, weakness beats resistance
    pub fn effectiveness(&self, attribute: &str) -> Effectiveness {
        let hit = |tags: &[String]| {
            tags.iter()
                .any(|t| !t.is_empty() && attribute.contains(t.as_str()))
        };
        if hit(&self.immunities) {
            Effectiveness::Immune
        } else if hit(&self.weaknesses) {
            Effectiveness::Super
        } else if hit(&self.resistances) {
            Effectiveness::Poor
        } else {
            Effectiveness::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wyrm() -> EnemyDef {
        EnemyDef {
            id: "enemy_wyrm".to_string(),
            name: "Flame Wyrm".to_string(),
            description: String::new(),
            attribute: "火属性".to_string(),
            max_hp: 250_000,
            attack_power: 25,
            weaknesses: vec!["水".to_string(), "氷".to_string()],
            resistances: vec!["火".to_string()],
            immunities: vec!["律界".to_string()],
        }
    }

    #[test]
    fn test_effectiveness() {
        let wyrm = wyrm();
        assert_eq!(wyrm.effectiveness("水属性"), Effectiveness::Super);
        assert_eq!(wyrm.effectiveness("凍氷域"), Effectiveness::Super);
        assert_eq!(wyrm.effectiveness("火属性"), Effectiveness::Poor);
        assert_eq!(wyrm.effectiveness("律界域"), Effectiveness::Immune);
        assert_eq!(wyrm.effectiveness("風属性"), Effectiveness::Normal);
    }

    #[test]
    fn test_multipliers() {
        let c = BattleConstants::default();
        assert!((Effectiveness::Super.multiplier(&c) - 1.5).abs() < f64::EPSILON);
        assert!((Effectiveness::Poor.multiplier(&c) - 0.5).abs() < f64::EPSILON);
        assert!((Effectiveness::Immune.multiplier(&c) - 0.0).abs() < f64::EPSILON);
    }
}
