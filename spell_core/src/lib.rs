//! spell_core - Core library of the spell forge
//!
//! This library provides:
//! - Codex: reference tables (attributes, protections, tools, ranks, enemies)
//! - Formula: the seven-factor damage evaluator and spell naming
//! - Invocation: the timed cast state machine
//! - Grimoire: saved spells with search and manual entries
//! - Battle: turn-based fights against codex enemies
//! - Session: the forge's input state tying everything together

pub mod battle;
pub mod codex;
pub mod config;
pub mod formula;
pub mod grimoire;
pub mod import;
pub mod invocation;
pub mod prelude;
pub mod session;
pub mod simulation;
pub mod types;

// Re-export core types for convenience
pub use battle::{Battle, BattleError, BattlePhase, CombatLog, CombatLogEntry, Effectiveness, EnemyDef, Stance};
pub use codex::Codex;
pub use config::{ConfigError, ForgeConfig};
pub use formula::{evaluate, evaluate_with_rng, FormulaBreakdown, KnownSpell, SpellRequest, SpellResult};
pub use grimoire::{Grimoire, GrimoireError, GrimoireQuery, ManifestedSpell, SortOrder, SpellDraft};
pub use import::{import_attributes, ImportError, ImportReport};
pub use invocation::{CastOutcome, Invocation, InvocationState, TransitionError};
pub use session::{Selection, Session, SessionError, TickReport};
pub use types::{CasterStatus, Location, MagicSystem, SpellEnvironment, Weather};
