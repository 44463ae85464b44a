//! Tunable forge constants

use super::ConfigError;
use serde::{Deserialize, Serialize};

/// Top-level forge configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    /// Fixed RNG seed; a random seed is used when absent
    pub seed: Option<u64>,
    pub formula: FormulaConstants,
    pub stability: StabilityConstants,
    pub timing: InvocationTiming,
    pub simulation: SimulationConstants,
    pub battle: BattleConstants,
    pub logging: LoggingConfig,
}

impl ForgeConfig {
    /// Reject values that would make the formulas meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        let divisor = self.formula.density_divisor;
        if !(divisor.is_finite() && divisor > 0.0) {
            return Err(ConfigError::ValidationError(
                "formula.density_divisor must be positive".to_string(),
            ));
        }
        if self.stability.rank_requirements.len() != 7 {
            return Err(ConfigError::ValidationError(format!(
                "stability.rank_requirements needs 7 entries, got {}",
                self.stability.rank_requirements.len()
            )));
        }
        if !(0.0..=1.0).contains(&self.battle.stance_attack_below)
            || self.battle.stance_attack_below > self.battle.stance_defend_below
            || self.battle.stance_defend_below > 1.0
        {
            return Err(ConfigError::ValidationError(
                "battle stance thresholds must satisfy 0 <= attack <= defend <= 1".to_string(),
            ));
        }
        let interval = self.simulation.vitals_interval_secs;
        if !(interval.is_finite() && interval > 0.0) {
            return Err(ConfigError::ValidationError(
                "simulation.vitals_interval_secs must be positive".to_string(),
            ));
        }

        let battle = &self.battle;
        fraction("battle.enemy_jitter", battle.enemy_jitter)?;
        fraction("battle.crit_chance", battle.crit_chance)?;
        fraction("battle.recover_fraction", battle.recover_fraction)?;
        fraction("battle.defend_mitigation", battle.defend_mitigation)?;
        fraction("stability.fate_chance", self.stability.fate_chance)?;
        non_negative("battle.enemy_delay_secs", battle.enemy_delay_secs)?;

        let timing = &self.timing;
        for (name, secs) in [
            ("timing.analyze_secs", timing.analyze_secs),
            ("timing.fate_analyze_secs", timing.fate_analyze_secs),
            ("timing.manifest_secs", timing.manifest_secs),
            ("timing.failure_secs", timing.failure_secs),
            ("timing.analyze_step_secs", timing.analyze_step_secs),
            ("timing.manifest_step_secs", timing.manifest_step_secs),
        ] {
            non_negative(name, secs)?;
        }
        Ok(())
    }
}

/// Probabilities and damage fractions live in 0..=1
fn fraction(name: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{} must be between 0 and 1, got {}",
            name, value
        )))
    }
}

fn non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{} must be a finite, non-negative number of seconds, got {}",
            name, value
        )))
    }
}

/// Constants of the damage multiplier chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormulaConstants {
    /// base = base_power * rank_growth^rank
    pub base_power: f64,
    pub rank_growth: f64,
    /// environment = w_density / density_divisor * weather
    pub density_divisor: f64,
    /// Upper bound of the crisis HP band (exclusive of 0)
    pub crisis_threshold: f64,
    pub crisis_multiplier: f64,
    /// Bonus when the tool lists the active system
    pub tool_system_bonus: f64,
    /// Per reinforcement level
    pub reinforcement_step: f64,
    /// Per buff level
    pub buff_step: f64,
    pub buff_floor: f64,
    /// Temperature/humidity synergy on top of the weather table
    pub climate_synergy: bool,
}

impl Default for FormulaConstants {
    fn default() -> Self {
        FormulaConstants {
            base_power: 50.0,
            rank_growth: 6.0,
            density_divisor: 3000.0,
            crisis_threshold: 0.05,
            crisis_multiplier: 3.0,
            tool_system_bonus: 1.2,
            reinforcement_step: 0.1,
            buff_step: 0.2,
            buff_floor: 0.1,
            climate_synergy: false,
        }
    }
}

/// Cast success and rank gating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConstants {
    pub base: f64,
    /// Added per unit of HP ratio
    pub hp_weight: f64,
    /// Subtracted per rank
    pub rank_penalty: f64,
    /// Minimum activity rate for ranks 1..=7
    pub rank_requirements: Vec<f64>,
    /// Rank growth used by the live output estimate
    pub estimate_rank_growth: f64,
    /// A failed cast at or below this HP ratio may be offered a fate roll
    pub fate_hp_threshold: f64,
    pub fate_chance: f64,
    pub fate_multiplier: f64,
}

impl Default for StabilityConstants {
    fn default() -> Self {
        StabilityConstants {
            base: 30.0,
            hp_weight: 25.0,
            rank_penalty: 5.0,
            rank_requirements: vec![1.0, 10.0, 20.0, 35.0, 50.0, 70.0, 81.0],
            estimate_rank_growth: 1.6,
            fate_hp_threshold: 0.10,
            fate_chance: 0.05,
            fate_multiplier: 2.0,
        }
    }
}

/// Pacing of the invocation animation, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvocationTiming {
    pub analyze_secs: f64,
    /// Analysis length after a successful fate roll
    pub fate_analyze_secs: f64,
    pub manifest_secs: f64,
    /// Analysis length before a failed cast is reported
    pub failure_secs: f64,
    pub analyze_step_secs: f64,
    pub manifest_step_secs: f64,
}

impl Default for InvocationTiming {
    fn default() -> Self {
        InvocationTiming {
            analyze_secs: 3.0,
            fate_analyze_secs: 1.0,
            manifest_secs: 3.2,
            failure_secs: 1.5,
            analyze_step_secs: 1.0,
            manifest_step_secs: 0.8,
        }
    }
}

/// Sensor drift simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConstants {
    pub enabled: bool,
    pub vitals_interval_secs: f64,
}

impl Default for SimulationConstants {
    fn default() -> Self {
        SimulationConstants {
            enabled: true,
            vitals_interval_secs: 1.5,
        }
    }
}

/// Battle mode tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConstants {
    /// Focus values below this pick Attack
    pub stance_attack_below: f64,
    /// Focus values below this (and not Attack) pick Defend; the rest Recover
    pub stance_defend_below: f64,
    /// Fraction of incoming damage removed while defending
    pub defend_mitigation: f64,
    /// Fraction of max HP restored by Recover
    pub recover_fraction: f64,
    pub crit_chance: f64,
    pub crit_multiplier: f64,
    pub weakness_multiplier: f64,
    pub resistance_multiplier: f64,
    /// Enemy damage varies by +/- this fraction
    pub enemy_jitter: f64,
    /// Pause before the enemy acts
    pub enemy_delay_secs: f64,
}

impl Default for BattleConstants {
    fn default() -> Self {
        BattleConstants {
            stance_attack_below: 0.34,
            stance_defend_below: 0.67,
            defend_mitigation: 0.5,
            recover_fraction: 0.3,
            crit_chance: 0.1,
            crit_multiplier: 1.5,
            weakness_multiplier: 1.5,
            resistance_multiplier: 0.5,
            enemy_jitter: 0.2,
            enemy_delay_secs: 1.2,
        }
    }
}

/// Log output of the front-end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file; nothing is logged when absent
    pub file: Option<String>,
    /// One of trace, debug, info, warn, error
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            file: None,
            level: "info".to_string(),
        }
    }
}
