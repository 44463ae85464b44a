//! Prelude module for convenient imports
//!
//! ```rust
//! use spell_core::prelude::*;
//! ```

// Core types
pub use crate::types::{CasterStatus, MagicSystem, SpellEnvironment, Weather};

// Reference data
pub use crate::codex::{AttributeDef, CharacterPreset, Codex, ProtectionDef, ToolDef};

// Formula
pub use crate::formula::{evaluate, SpellRequest, SpellResult};

// Casting
pub use crate::invocation::{Invocation, InvocationState};
pub use crate::session::{Session, SessionError};

// Grimoire and battle
pub use crate::battle::{Battle, BattlePhase, Stance};
pub use crate::grimoire::{Grimoire, ManifestedSpell};

// Config
pub use crate::config::ForgeConfig;
