//! Multiplier stages of the damage formula
//!
//! damage = floor(base * internal * vitality * environment * protection * tool * buff)
//!
//! Each stage is a pure function so it can be checked in isolation.

use crate::codex::{ProtectionDef, ToolDef};
use crate::config::FormulaConstants;
use crate::types::{MagicSystem, SpellEnvironment, Weather};

/// Base power of a rank, unless a known spell supplies a positive override
pub fn base_power(rank: u8, known_damage: Option<u64>, constants: &FormulaConstants) -> f64 {
    match known_damage {
        Some(damage) if damage > 0 => damage as f64,
        _ => constants.base_power * constants.rank_growth.powi(rank as i32),
    }
}

/// Emotional and cardiac contribution. A resting caster (0, 60 bpm) gives 1.0.
pub fn internal_factor(emotion_index: u32, heart_rate: u32) -> f64 {
    1.0 + emotion_index as f64 / 200.0 + (heart_rate as f64 - 60.0) / 400.0
}

/// Whether the HP ratio is inside the crisis band (0, threshold]
pub fn is_crisis(hp_ratio: f64, constants: &FormulaConstants) -> bool {
    hp_ratio > 0.0 && hp_ratio <= constants.crisis_threshold
}

/// Health factor: crisis boost near death, otherwise 0.5 to 1.0 with HP
pub fn vitality_factor(hp_ratio: f64, constants: &FormulaConstants) -> f64 {
    let ratio = hp_ratio.clamp(0.0, 1.0);
    if is_crisis(ratio, constants) {
        constants.crisis_multiplier
    } else {
        0.5 + 0.5 * ratio
    }
}

/// Weather affinity of an attribute, matched on characters of its name
pub fn weather_bonus(attribute: &str, weather: Weather) -> f64 {
    let has = |chars: &[&str]| chars.iter().any(|c| attribute.contains(c));
    match weather {
        Weather::Rain => {
            if has(&["水", "氷", "海"]) {
                1.25
            } else if has(&["火"]) {
                0.8
            } else {
                1.0
            }
        }
        Weather::Cloudy => {
            if has(&["風", "音", "雷"]) {
                1.20
            } else {
                1.0
            }
        }
        Weather::Sunny => {
            if has(&["光", "火", "灼"]) {
                1.15
            } else {
                1.0
            }
        }
    }
}

/// Short label for the trace when the weather changes anything
pub fn weather_note(attribute: &str, weather: Weather) -> &'static str {
    let bonus = weather_bonus(attribute, weather);
    match weather {
        Weather::Rain if bonus > 1.0 => "(Rain Boost)",
        Weather::Rain if bonus < 1.0 => "(Rain Penalty)",
        Weather::Cloudy if bonus > 1.0 => "(Cloud Boost)",
        Weather::Sunny if bonus > 1.0 => "(Sun Boost)",
        _ => "",
    }
}

/// Temperature and humidity synergy for fire-like and water-like attributes
pub fn climate_bonus(attribute: &str, environment: &SpellEnvironment) -> f64 {
    let mut bonus = 1.0;
    if attribute.contains('火') || attribute.contains("煉獄") {
        if environment.temperature > 25.0 {
            bonus += 0.1;
        }
        if environment.humidity < 40 {
            bonus += 0.1;
        }
    } else if attribute.contains('水') || attribute.contains('氷') {
        if environment.temperature < 10.0 {
            bonus += 0.1;
        }
        if environment.humidity > 60 {
            bonus += 0.1;
        }
    }
    bonus
}

/// Ambient W density relative to the reference density
pub fn density_ratio(w_density: u32, constants: &FormulaConstants) -> f64 {
    w_density as f64 / constants.density_divisor
}

/// Protection multiplier when it resonates with the attribute or system, else 1.0
pub fn protection_factor(protection: &ProtectionDef, attribute: &str, system: MagicSystem) -> f64 {
    if protection.is_none() {
        return 1.0;
    }
    if protection.resonates_with(attribute, system) {
        protection.multiplier
    } else {
        1.0
    }
}

/// Tool power, system affinity and reinforcement
pub fn tool_factor(
    tool: &ToolDef,
    system: MagicSystem,
    reinforcement: i8,
    constants: &FormulaConstants,
) -> f64 {
    let affinity = if tool.supports(system) {
        constants.tool_system_bonus
    } else {
        1.0
    };
    tool.power_bonus * affinity * (1.0 + constants.reinforcement_step * reinforcement as f64)
}

/// Buff or debuff multiplier with a floor
pub fn buff_factor(buff_level: i8, constants: &FormulaConstants) -> f64 {
    (1.0 + constants.buff_step * buff_level as f64).max(constants.buff_floor)
}
