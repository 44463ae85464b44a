//! Formula evaluator
//!
//! A pure function from a SpellRequest plus the codex to a SpellResult.

mod evaluator;
pub mod factors;
pub mod naming;
mod request;
mod result;

pub use evaluator::{evaluate, evaluate_with_rng};
pub use request::{
    KnownSpell, SpellRequest, MAX_BUFF, MAX_RANK, MAX_REINFORCEMENT, MIN_BUFF, MIN_RANK,
    MIN_REINFORCEMENT,
};
pub use result::{FormulaBreakdown, SpellLore, SpellResult};
