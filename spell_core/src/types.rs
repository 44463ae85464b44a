//! Core types shared across the spell system

use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level magic category
///
/// Serialized by its Japanese label, which is also the string the
/// protection compatibility tags match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MagicSystem {
    #[serde(rename = "元素系")]
    Elemental,
    #[serde(rename = "因果系")]
    Causal,
    #[serde(rename = "創造系")]
    Creation,
    #[serde(rename = "黎明系")]
    Dawn,
    #[serde(rename = "その他")]
    Other,
}

impl MagicSystem {
    /// Get all systems in display order
    pub fn all() -> &'static [MagicSystem] {
        &[
            MagicSystem::Elemental,
            MagicSystem::Causal,
            MagicSystem::Creation,
            MagicSystem::Dawn,
            MagicSystem::Other,
        ]
    }

    /// Japanese label
    pub fn label(&self) -> &'static str {
        match self {
            MagicSystem::Elemental => "元素系",
            MagicSystem::Causal => "因果系",
            MagicSystem::Creation => "創造系",
            MagicSystem::Dawn => "黎明系",
            MagicSystem::Other => "その他",
        }
    }

    /// English name
    pub fn english(&self) -> &'static str {
        match self {
            MagicSystem::Elemental => "Elemental",
            MagicSystem::Causal => "Causal",
            MagicSystem::Creation => "Creation",
            MagicSystem::Dawn => "Dawn",
            MagicSystem::Other => "Other",
        }
    }

    /// Parse either the Japanese label or the English name (case-insensitive)
    pub fn parse(s: &str) -> Option<MagicSystem> {
        let trimmed = s.trim();
        MagicSystem::all().iter().copied().find(|sys| {
            sys.label() == trimmed || sys.english().eq_ignore_ascii_case(trimmed)
        })
    }
}

impl fmt::Display for MagicSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Weather type rolled for the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Weather {
    Sunny,
    Rain,
    Cloudy,
}

impl Weather {
    pub fn all() -> &'static [Weather] {
        &[Weather::Sunny, Weather::Rain, Weather::Cloudy]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Weather::Sunny => "SUNNY",
            Weather::Rain => "RAIN",
            Weather::Cloudy => "CLOUDY",
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Simulated biometric readings of the caster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CasterStatus {
    /// Current HP
    pub hp: u32,
    /// Maximum HP
    pub max_hp: u32,
    /// Heart rate in bpm
    pub heart_rate: u32,
    /// Body temperature in Celsius
    pub body_temp: f64,
    /// Blood pressure as "sys/dia" mmHg
    pub blood_pressure: String,
    /// Respiration in breaths per minute
    pub respiration: u32,
    /// Blood oxygen saturation percentage
    pub spo2: f64,
    /// Descriptive consciousness level
    pub consciousness: String,
    /// Emotion index 0-100, feeds the internal multiplier
    pub emotion_index: u32,
}

impl Default for CasterStatus {
    fn default() -> Self {
        CasterStatus {
            hp: 100,
            max_hp: 100,
            heart_rate: 72,
            body_temp: 36.6,
            blood_pressure: "118/76".to_string(),
            respiration: 16,
            spo2: 98.5,
            consciousness: "Clear".to_string(),
            emotion_index: 45,
        }
    }
}

impl CasterStatus {
    /// HP ratio clamped to [0, 1]; a zero max HP counts as empty
    pub fn hp_ratio(&self) -> f64 {
        if self.max_hp == 0 {
            return 0.0;
        }
        (self.hp as f64 / self.max_hp as f64).clamp(0.0, 1.0)
    }

    /// HP as a percentage (0-100)
    pub fn hp_percent(&self) -> f64 {
        self.hp_ratio() * 100.0
    }
}

/// Geographic location of the casting site
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    /// Altitude in meters
    pub alt: u32,
}

/// Simulated environment around the caster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellEnvironment {
    pub location: Location,
    /// Celsius
    pub temperature: f64,
    /// Percent
    pub humidity: u32,
    /// Ambient W density
    pub w_density: u32,
    pub weather: Weather,
}

impl Default for SpellEnvironment {
    fn default() -> Self {
        SpellEnvironment {
            location: Location {
                lat: 35.6895,
                lng: 139.6917,
                alt: 45,
            },
            temperature: 24.5,
            humidity: 55,
            w_density: 4500,
            weather: Weather::Sunny,
        }
    }
}

/// Current time as milliseconds since the Unix epoch
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
