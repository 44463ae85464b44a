//! Invocation state machine
//!
//! Idle -> Analyzing -> Manifesting -> Ready -> Complete, with a failure
//! branch into Error and a rare detour through AwaitingFate. The outcome of a
//! cast is decided up front; the controller only paces it through `tick`.

use crate::config::InvocationTiming;
use crate::formula::SpellResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Labels of the seven invocation steps
pub const INVOCATION_STEPS: [&str; 7] = [
    "意志集中 (Intent Focus)",
    "物質W視核活性 (W-Core Activation)",
    "魔法陣形成 (Circle Formation)",
    "物質W流動 (W-Flow)",
    "属性変容 (Elemental Conversion)",
    "魔素収束 (Essence Convergence)",
    "現象顕現 (Phenomenon Manifestation)",
];

/// Last step shown while analyzing
const LAST_ANALYZE_STEP: usize = 2;
const FIRST_MANIFEST_STEP: usize = 3;
const LAST_MANIFEST_STEP: usize = 6;

/// Absorbs float drift from summing tick deltas
const TIME_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvocationState {
    Idle,
    Analyzing,
    Manifesting,
    Ready,
    Complete,
    AwaitingFate,
    Error(String),
}

impl InvocationState {
    pub fn name(&self) -> &'static str {
        match self {
            InvocationState::Idle => "IDLE",
            InvocationState::Analyzing => "ANALYZING",
            InvocationState::Manifesting => "MANIFESTING",
            InvocationState::Ready => "READY",
            InvocationState::Complete => "COMPLETE",
            InvocationState::AwaitingFate => "AWAITING_FATE",
            InvocationState::Error(_) => "ERROR",
        }
    }

    /// Whether a cast is in flight
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            InvocationState::Analyzing | InvocationState::Manifesting | InvocationState::AwaitingFate
        )
    }
}

impl fmt::Display for InvocationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationEvent {
    Begin,
    Analyzed,
    Manifested,
    Finalize,
    OfferFate,
    Fail(String),
    Acknowledge,
    Reset,
}

impl InvocationEvent {
    pub fn name(&self) -> &'static str {
        match self {
            InvocationEvent::Begin => "Begin",
            InvocationEvent::Analyzed => "Analyzed",
            InvocationEvent::Manifested => "Manifested",
            InvocationEvent::Finalize => "Finalize",
            InvocationEvent::OfferFate => "OfferFate",
            InvocationEvent::Fail(_) => "Fail",
            InvocationEvent::Acknowledge => "Acknowledge",
            InvocationEvent::Reset => "Reset",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot apply {event} while {from}")]
pub struct TransitionError {
    pub from: String,
    pub event: String,
}

/// The transition table
pub fn transition(
    state: &InvocationState,
    event: &InvocationEvent,
) -> Result<InvocationState, TransitionError> {
    use InvocationEvent as E;
    use InvocationState as S;

    let next = match (state, event) {
        (_, E::Reset) => S::Idle,
        (S::Idle | S::Complete | S::AwaitingFate, E::Begin) => S::Analyzing,
        (S::Analyzing, E::Analyzed) => S::Manifesting,
        (S::Analyzing, E::OfferFate) => S::AwaitingFate,
        (S::Analyzing | S::AwaitingFate, E::Fail(reason)) => S::Error(reason.clone()),
        (S::Manifesting, E::Manifested) => S::Ready,
        (S::Ready, E::Finalize) => S::Complete,
        (S::Error(_), E::Acknowledge) => S::Idle,
        _ => {
            return Err(TransitionError {
                from: state.name().to_string(),
                event: event.name().to_string(),
            })
        }
    };
    Ok(next)
}

/// Pre-decided result of a cast
#[derive(Debug, Clone, PartialEq)]
pub enum CastOutcome {
    /// Manifest this spell
    Success(SpellResult),
    /// Fail with a reason after the short analysis
    Failure(String),
    /// Fail into the fate prompt after the short analysis
    Fate,
}

/// Paces a cast through its states
#[derive(Debug, Clone)]
pub struct Invocation {
    state: InvocationState,
    timing: InvocationTiming,
    outcome: Option<CastOutcome>,
    analysis: Option<SpellResult>,
    analyze_secs: f64,
    elapsed: f64,
    step: usize,
}

impl Invocation {
    pub fn new(timing: InvocationTiming) -> Self {
        Invocation {
            state: InvocationState::Idle,
            timing,
            outcome: None,
            analysis: None,
            analyze_secs: 0.0,
            elapsed: 0.0,
            step: 0,
        }
    }

    pub fn state(&self) -> &InvocationState {
        &self.state
    }

    /// Current step index into INVOCATION_STEPS
    pub fn step(&self) -> usize {
        self.step
    }

    /// Label of the current step while a cast is animating
    pub fn step_label(&self) -> Option<&'static str> {
        match self.state {
            InvocationState::Idle => None,
            _ => INVOCATION_STEPS.get(self.step).copied(),
        }
    }

    /// Spell being manifested (from Manifesting on)
    pub fn analysis(&self) -> Option<&SpellResult> {
        self.analysis.as_ref()
    }

    /// Fraction of the current timed phase that has elapsed
    pub fn progress(&self) -> f64 {
        let total = match self.state {
            InvocationState::Analyzing => self.analyze_secs,
            InvocationState::Manifesting => self.timing.manifest_secs,
            InvocationState::Ready | InvocationState::Complete => return 1.0,
            _ => return 0.0,
        };
        if total <= 0.0 {
            1.0
        } else {
            (self.elapsed / total).clamp(0.0, 1.0)
        }
    }

    fn apply(&mut self, event: InvocationEvent) -> Result<(), TransitionError> {
        let next = transition(&self.state, &event)?;
        tracing::info!("invocation: {} --{}--> {}", self.state, event.name(), next);
        self.state = next;
        self.elapsed = 0.0;
        Ok(())
    }

    /// Start a cast whose outcome is already decided
    ///
    /// `fated` selects the shorter analysis used after a successful fate roll.
    pub fn begin(&mut self, outcome: CastOutcome, fated: bool) -> Result<(), TransitionError> {
        self.apply(InvocationEvent::Begin)?;
        self.analyze_secs = match (&outcome, fated) {
            (CastOutcome::Success(_), true) => self.timing.fate_analyze_secs,
            (CastOutcome::Success(_), false) => self.timing.analyze_secs,
            _ => self.timing.failure_secs,
        };
        self.outcome = Some(outcome);
        self.analysis = None;
        self.step = 0;
        Ok(())
    }

    /// Advance timers; returns the new state when it changed
    pub fn tick(&mut self, delta: f64) -> Option<InvocationState> {
        match self.state {
            InvocationState::Analyzing => {
                self.elapsed += delta;
                let steps = self.steps_elapsed(self.timing.analyze_step_secs);
                self.step = steps.min(LAST_ANALYZE_STEP);
                if self.elapsed + TIME_EPSILON >= self.analyze_secs {
                    self.finish_analysis();
                    return Some(self.state.clone());
                }
                None
            }
            InvocationState::Manifesting => {
                self.elapsed += delta;
                let steps = self.steps_elapsed(self.timing.manifest_step_secs);
                self.step = (FIRST_MANIFEST_STEP + steps).min(LAST_MANIFEST_STEP);
                if self.elapsed + TIME_EPSILON >= self.timing.manifest_secs {
                    if self.apply(InvocationEvent::Manifested).is_ok() {
                        self.step = LAST_MANIFEST_STEP;
                        return Some(self.state.clone());
                    }
                }
                None
            }
            _ => None,
        }
    }

    fn steps_elapsed(&self, step_secs: f64) -> usize {
        if step_secs <= 0.0 {
            return 0;
        }
        ((self.elapsed + TIME_EPSILON) / step_secs).floor() as usize
    }

    fn finish_analysis(&mut self) {
        let result = match self.outcome.take() {
            Some(CastOutcome::Success(spell)) => {
                self.analysis = Some(spell);
                self.step = FIRST_MANIFEST_STEP;
                self.apply(InvocationEvent::Analyzed)
            }
            Some(CastOutcome::Failure(reason)) => self.apply(InvocationEvent::Fail(reason)),
            Some(CastOutcome::Fate) => self.apply(InvocationEvent::OfferFate),
            None => self.apply(InvocationEvent::Fail("No cast in progress".to_string())),
        };
        if let Err(e) = result {
            tracing::warn!("invocation: {}", e);
        }
    }

    /// Ready -> Complete; hands back the manifested spell
    pub fn finalize(&mut self) -> Result<SpellResult, TransitionError> {
        let spell = match (&self.state, &self.analysis) {
            (InvocationState::Ready, Some(spell)) => spell.clone(),
            _ => {
                return Err(TransitionError {
                    from: self.state.name().to_string(),
                    event: InvocationEvent::Finalize.name().to_string(),
                })
            }
        };
        self.apply(InvocationEvent::Finalize)?;
        Ok(spell)
    }

    /// Fail directly (fate denied)
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), TransitionError> {
        self.apply(InvocationEvent::Fail(reason.into()))?;
        self.outcome = None;
        Ok(())
    }

    /// Error -> Idle, discarding the analysis
    pub fn acknowledge(&mut self) -> Result<(), TransitionError> {
        self.apply(InvocationEvent::Acknowledge)?;
        self.clear();
        Ok(())
    }

    /// Any state -> Idle, discarding the analysis
    pub fn reset(&mut self) {
        if self.apply(InvocationEvent::Reset).is_ok() {
            self.clear();
        }
    }

    fn clear(&mut self) {
        self.outcome = None;
        self.analysis = None;
        self.step = 0;
        self.elapsed = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codex::Codex;
    use crate::config::FormulaConstants;
    use crate::formula::{evaluate_with_rng, SpellRequest};
    use crate::types::MagicSystem;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn spell() -> SpellResult {
        let mut rng = StdRng::seed_from_u64(12345);
        evaluate_with_rng(
            &Codex::default(),
            &SpellRequest::new(MagicSystem::Elemental, "火属性", 1),
            &FormulaConstants::default(),
            &mut rng,
        )
    }

    fn run_until_change(inv: &mut Invocation, max_ticks: usize) -> (usize, Option<InvocationState>) {
        for n in 1..=max_ticks {
            if let Some(state) = inv.tick(0.1) {
                return (n, Some(state));
            }
        }
        (max_ticks, None)
    }

    #[test]
    fn test_transition_table() {
        use InvocationEvent as E;
        use InvocationState as S;

        assert_eq!(transition(&S::Idle, &E::Begin), Ok(S::Analyzing));
        assert_eq!(transition(&S::Analyzing, &E::Analyzed), Ok(S::Manifesting));
        assert_eq!(transition(&S::Manifesting, &E::Manifested), Ok(S::Ready));
        assert_eq!(transition(&S::Ready, &E::Finalize), Ok(S::Complete));
        assert_eq!(transition(&S::Analyzing, &E::OfferFate), Ok(S::AwaitingFate));
        assert_eq!(transition(&S::AwaitingFate, &E::Begin), Ok(S::Analyzing));
        assert_eq!(
            transition(&S::Analyzing, &E::Fail("x".to_string())),
            Ok(S::Error("x".to_string()))
        );
        assert_eq!(transition(&S::Error("x".to_string()), &E::Acknowledge), Ok(S::Idle));
        assert_eq!(transition(&S::Manifesting, &E::Reset), Ok(S::Idle));

        assert!(transition(&S::Idle, &E::Finalize).is_err());
        assert!(transition(&S::Analyzing, &E::Begin).is_err());
        assert!(transition(&S::Ready, &E::Analyzed).is_err());
        assert!(transition(&S::Idle, &E::Acknowledge).is_err());
    }

    #[test]
    fn test_success_pacing() {
        let mut inv = Invocation::new(InvocationTiming::default());
        inv.begin(CastOutcome::Success(spell()), false).unwrap();
        assert_eq!(inv.state(), &InvocationState::Analyzing);
        assert_eq!(inv.step(), 0);

        for _ in 0..15 {
            inv.tick(0.1);
        }
        assert_eq!(inv.step(), 1);
        assert!(inv.analysis().is_none());

        let (_, state) = run_until_change(&mut inv, 40);
        assert_eq!(state, Some(InvocationState::Manifesting));
        assert_eq!(inv.step(), 3);
        assert!(inv.analysis().is_some());

        let (ticks, state) = run_until_change(&mut inv, 40);
        assert_eq!(state, Some(InvocationState::Ready));
        assert!((31..=33).contains(&ticks));
        assert_eq!(inv.step(), 6);

        let finalized = inv.finalize().unwrap();
        assert_eq!(finalized, spell());
        assert_eq!(inv.state(), &InvocationState::Complete);
    }

    #[test]
    fn test_fated_success_is_faster() {
        let mut inv = Invocation::new(InvocationTiming::default());
        inv.begin(CastOutcome::Fate, false).unwrap();
        let (ticks, state) = run_until_change(&mut inv, 30);
        assert_eq!(state, Some(InvocationState::AwaitingFate));
        assert!((15..=16).contains(&ticks));

        inv.begin(CastOutcome::Success(spell()), true).unwrap();
        let (ticks, state) = run_until_change(&mut inv, 40);
        assert_eq!(state, Some(InvocationState::Manifesting));
        assert!((10..=11).contains(&ticks));
    }

    #[test]
    fn test_failure_then_acknowledge() {
        let mut inv = Invocation::new(InvocationTiming::default());
        inv.begin(CastOutcome::Failure("Mana Supply Interrupted".to_string()), false)
            .unwrap();
        let (_, state) = run_until_change(&mut inv, 30);
        assert_eq!(
            state,
            Some(InvocationState::Error("Mana Supply Interrupted".to_string()))
        );
        assert!(inv.finalize().is_err());
        inv.acknowledge().unwrap();
        assert_eq!(inv.state(), &InvocationState::Idle);
    }

    #[test]
    fn test_reset_discards_analysis() {
        let mut inv = Invocation::new(InvocationTiming::default());
        inv.begin(CastOutcome::Success(spell()), false).unwrap();
        run_until_change(&mut inv, 40);
        assert!(inv.analysis().is_some());
        inv.reset();
        assert_eq!(inv.state(), &InvocationState::Idle);
        assert!(inv.analysis().is_none());
        assert_eq!(inv.step_label(), None);
    }

    #[test]
    fn test_cannot_begin_while_busy() {
        let mut inv = Invocation::new(InvocationTiming::default());
        inv.begin(CastOutcome::Fate, false).unwrap();
        let err = inv.begin(CastOutcome::Fate, false).unwrap_err();
        assert_eq!(err.from, "ANALYZING");
        assert_eq!(err.event, "Begin");
    }
}
