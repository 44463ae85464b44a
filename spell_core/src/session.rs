//! Session - the forge's input state and the operations on it
//!
//! All range clamping happens here. Randomness goes through one seedable
//! StdRng so whole sessions replay under a fixed seed.

use crate::battle::{Battle, BattleError, CombatLogEntry, Stance, TurnResult};
use crate::codex::{CharacterPreset, Codex, ProtectionDef, ToolDef};
use crate::config::ForgeConfig;
use crate::formula::{
    evaluate_with_rng, factors, SpellRequest, SpellResult, MAX_BUFF, MAX_RANK, MAX_REINFORCEMENT,
    MIN_BUFF, MIN_RANK, MIN_REINFORCEMENT,
};
use crate::grimoire::{Grimoire, GrimoireError, ManifestedSpell, SpellDraft};
use crate::import::{import_attributes, import_attributes_file, ImportError, ImportReport};
use crate::invocation::{CastOutcome, Invocation, InvocationState, TransitionError};
use crate::simulation::{drift_body_temp, roll_environment, VitalsMonitor};
use crate::types::{now_millis, CasterStatus, MagicSystem, SpellEnvironment};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use thiserror::Error;

pub const FATE_DENIED: &str = "運命は微笑まなかった... (Fate Denied)";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Character name cannot be empty")]
    EmptyCharacterName,
    #[error("Unknown character '{0}'")]
    UnknownCharacter(String),
    #[error("Unknown protection '{0}'")]
    UnknownProtection(String),
    #[error("Unknown tool '{0}'")]
    UnknownTool(String),
    #[error("Unknown enemy '{0}'")]
    UnknownEnemy(String),
    #[error("No battle in progress: the codex has no enemies")]
    NoBattle,
    #[error("Attribute '{attribute}' is not part of {system}")]
    AttributeMismatch { attribute: String, system: MagicSystem },
    #[error("Cannot {action} while {state}")]
    Busy { action: &'static str, state: InvocationState },
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Grimoire(#[from] GrimoireError),
    #[error(transparent)]
    Battle(#[from] BattleError),
    #[error(transparent)]
    Import(#[from] ImportError),
}

/// The user's current picks
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub system: MagicSystem,
    pub attribute: String,
    pub rank: u8,
    pub protection_id: String,
    pub tool_id: String,
    pub reinforcement: i8,
    pub buff_level: i8,
    /// 0-100
    pub activity_rate: f64,
    pub character_id: Option<String>,
    /// Grimoire entry reused as the known spell
    pub active_spell_id: Option<String>,
}

impl Selection {
    fn initial(codex: &Codex) -> Self {
        Selection {
            system: MagicSystem::Elemental,
            attribute: codex
                .first_attribute(MagicSystem::Elemental)
                .map(|a| a.name.clone())
                .unwrap_or_default(),
            rank: 1,
            protection_id: ProtectionDef::NONE_ID.to_string(),
            tool_id: ToolDef::NONE_ID.to_string(),
            reinforcement: 0,
            buff_level: 0,
            activity_rate: 50.0,
            character_id: None,
            active_spell_id: None,
        }
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub state_changed: Option<InvocationState>,
    pub vitals_sampled: bool,
    pub enemy_action: Option<CombatLogEntry>,
}

pub struct Session {
    config: ForgeConfig,
    codex: Codex,
    grimoire: Grimoire,
    selection: Selection,
    caster: CasterStatus,
    environment: SpellEnvironment,
    invocation: Invocation,
    monitor: VitalsMonitor,
    battle: Option<Battle>,
    battle_focus: f64,
    current_spell: Option<ManifestedSpell>,
    rng: StdRng,
}

impl Session {
    pub fn new(config: ForgeConfig, codex: Codex) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let environment = roll_environment(&mut rng);
        let battle = codex
            .enemies()
            .first()
            .cloned()
            .map(|enemy| Battle::new(enemy, CasterStatus::default().max_hp, config.battle.clone()));

        Session {
            grimoire: Grimoire::with_library(&codex),
            selection: Selection::initial(&codex),
            caster: CasterStatus::default(),
            environment,
            invocation: Invocation::new(config.timing.clone()),
            monitor: VitalsMonitor::new(&config.simulation),
            battle,
            battle_focus: 0.0,
            current_spell: None,
            rng,
            codex,
            config,
        }
    }

    /// Default codex and constants with a fixed seed
    pub fn with_seed(seed: u64) -> Self {
        let config = ForgeConfig {
            seed: Some(seed),
            ..ForgeConfig::default()
        };
        Session::new(config, Codex::default())
    }

    // === Accessors ===

    pub fn config(&self) -> &ForgeConfig {
        &self.config
    }

    pub fn codex(&self) -> &Codex {
        &self.codex
    }

    pub fn codex_mut(&mut self) -> &mut Codex {
        &mut self.codex
    }

    pub fn grimoire(&self) -> &Grimoire {
        &self.grimoire
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn caster(&self) -> &CasterStatus {
        &self.caster
    }

    pub fn environment(&self) -> &SpellEnvironment {
        &self.environment
    }

    pub fn set_environment(&mut self, environment: SpellEnvironment) {
        self.environment = environment;
    }

    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    pub fn state(&self) -> &InvocationState {
        self.invocation.state()
    }

    pub fn current_spell(&self) -> Option<&ManifestedSpell> {
        self.current_spell.as_ref()
    }

    pub fn simulation_enabled(&self) -> bool {
        self.monitor.enabled
    }

    fn ensure_idle(&self, action: &'static str) -> Result<(), SessionError> {
        let state = self.invocation.state();
        if state.is_busy() {
            return Err(SessionError::Busy {
                action,
                state: state.clone(),
            });
        }
        Ok(())
    }

    // === Selection ===

    /// Change system; the attribute falls back to the system's first one
    pub fn select_system(&mut self, system: MagicSystem) {
        self.selection.system = system;
        if !self.codex.has_attribute(system, &self.selection.attribute) {
            self.selection.attribute = self
                .codex
                .first_attribute(system)
                .map(|a| a.name.clone())
                .unwrap_or_default();
        }
    }

    pub fn select_attribute(&mut self, name: &str) -> Result<(), SessionError> {
        if !self.codex.has_attribute(self.selection.system, name) {
            return Err(SessionError::AttributeMismatch {
                attribute: name.to_string(),
                system: self.selection.system,
            });
        }
        self.selection.attribute = name.to_string();
        Ok(())
    }

    /// Minimum activity rate for a rank
    pub fn rank_requirement(&self, rank: u8) -> f64 {
        let idx = rank.clamp(MIN_RANK, MAX_RANK) as usize - 1;
        self.config
            .stability
            .rank_requirements
            .get(idx)
            .copied()
            .unwrap_or(0.0)
    }

    pub fn is_rank_available(&self, rank: u8) -> bool {
        self.selection.activity_rate >= self.rank_requirement(rank)
    }

    /// Highest rank the activity rate allows (at least 1)
    pub fn max_available_rank(&self) -> u8 {
        (MIN_RANK..=MAX_RANK)
            .rev()
            .find(|r| self.is_rank_available(*r))
            .unwrap_or(MIN_RANK)
    }

    /// Clamp into 1..7, then down to the highest available rank
    pub fn set_rank(&mut self, rank: u8) {
        let rank = rank.clamp(MIN_RANK, MAX_RANK);
        self.selection.rank = if self.is_rank_available(rank) {
            rank
        } else {
            self.max_available_rank()
        };
    }

    fn recheck_rank(&mut self) {
        if !self.is_rank_available(self.selection.rank) {
            self.selection.rank = self.max_available_rank();
        }
    }

    /// Manual activity change; deselects the character
    pub fn set_activity_rate(&mut self, rate: f64) {
        self.selection.activity_rate = rate.clamp(0.0, 100.0);
        self.selection.character_id = None;
        self.recheck_rank();
    }

    pub fn select_protection(&mut self, id: &str) -> Result<(), SessionError> {
        if self.codex.protection(id).is_none() {
            return Err(SessionError::UnknownProtection(id.to_string()));
        }
        self.selection.protection_id = id.to_string();
        Ok(())
    }

    pub fn select_tool(&mut self, id: &str) -> Result<(), SessionError> {
        if self.codex.tool(id).is_none() {
            return Err(SessionError::UnknownTool(id.to_string()));
        }
        self.selection.tool_id = id.to_string();
        Ok(())
    }

    pub fn adjust_reinforcement(&mut self, delta: i8) {
        self.selection.reinforcement = self
            .selection
            .reinforcement
            .saturating_add(delta)
            .clamp(MIN_REINFORCEMENT, MAX_REINFORCEMENT);
    }

    pub fn adjust_buff(&mut self, delta: i8) {
        self.selection.buff_level = self
            .selection
            .buff_level
            .saturating_add(delta)
            .clamp(MIN_BUFF, MAX_BUFF);
    }

    pub fn set_hp(&mut self, hp: u32) {
        self.caster.hp = hp.min(self.caster.max_hp);
    }

    // === Characters ===

    pub fn apply_character(&mut self, id: &str) -> Result<(), SessionError> {
        let character = self
            .codex
            .character(id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownCharacter(id.to_string()))?;
        self.selection.protection_id = character.protection_id.clone();
        self.selection.activity_rate = character.activity_rate.clamp(0.0, 100.0);
        self.selection.character_id = Some(character.id);
        self.recheck_rank();
        Ok(())
    }

    /// Create a persona with a random activity rate and select it
    pub fn add_character(&mut self, name: &str) -> Result<String, SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyCharacterName);
        }
        let mut id = format!("char_{}", now_millis());
        while self.codex.character(&id).is_some() {
            id.push('_');
        }
        let character = CharacterPreset {
            id: id.clone(),
            name: name.to_string(),
            protection_id: ProtectionDef::NONE_ID.to_string(),
            activity_rate: self.rng.gen_range(0..100) as f64,
            description: "Custom Persona".to_string(),
        };
        self.codex.upsert_character(character);
        self.apply_character(&id)?;
        tracing::info!("added character {} ({})", name, id);
        Ok(id)
    }

    /// Replace a persona's data; a selected persona is re-applied
    pub fn update_character(&mut self, character: CharacterPreset) -> Result<(), SessionError> {
        if self.codex.character(&character.id).is_none() {
            return Err(SessionError::UnknownCharacter(character.id));
        }
        if self.codex.protection(&character.protection_id).is_none() {
            return Err(SessionError::UnknownProtection(character.protection_id));
        }
        let id = character.id.clone();
        self.codex.upsert_character(character);
        if self.selection.character_id.as_deref() == Some(id.as_str()) {
            self.apply_character(&id)?;
        }
        Ok(())
    }

    // === Grimoire ===

    /// Load an entry's system, rank and attribute and reuse it as known spell
    pub fn select_grimoire_entry(&mut self, id: &str) -> Result<(), SessionError> {
        self.ensure_idle("select a grimoire entry")?;
        let entry = self
            .grimoire
            .get(id)
            .ok_or_else(|| GrimoireError::UnknownEntry(id.to_string()))?;
        let (system, rank, attribute) = (entry.spell.system, entry.spell.rank, entry.spell.attribute.clone());

        self.selection.system = system;
        self.selection.attribute = attribute;
        self.set_rank(rank);
        self.selection.active_spell_id = Some(id.to_string());
        self.reset();
        Ok(())
    }

    pub fn clear_active_spell(&mut self) {
        self.selection.active_spell_id = None;
    }

    pub fn delete_spell(&mut self, id: &str) -> Result<(), SessionError> {
        self.grimoire
            .remove(id)
            .ok_or_else(|| GrimoireError::UnknownEntry(id.to_string()))?;
        if self.selection.active_spell_id.as_deref() == Some(id) {
            self.selection.active_spell_id = None;
        }
        Ok(())
    }

    pub fn clear_grimoire(&mut self) {
        self.grimoire.clear();
        self.selection.active_spell_id = None;
    }

    /// Add or edit a manual grimoire entry
    pub fn save_draft(&mut self, draft: &SpellDraft, editing: Option<&str>) -> Result<String, SessionError> {
        Ok(self.grimoire.save_draft(draft, editing, &mut self.rng)?)
    }

    // === Import ===

    pub fn import_json(&mut self, json: &str) -> Result<ImportReport, SessionError> {
        Ok(import_attributes(&mut self.codex, json)?)
    }

    pub fn import_file(&mut self, path: impl AsRef<Path>) -> Result<ImportReport, SessionError> {
        Ok(import_attributes_file(&mut self.codex, path)?)
    }

    // === Derived readings ===

    /// activity + base + hp_weight * hp - rank_penalty * rank (unclamped)
    pub fn success_probability(&self) -> f64 {
        let s = &self.config.stability;
        self.selection.activity_rate + s.base + s.hp_weight * self.caster.hp_ratio()
            - s.rank_penalty * self.selection.rank as f64
    }

    /// Success chance as shown, floored and clamped to 0-100
    pub fn stability(&self) -> u32 {
        self.success_probability().clamp(0.0, 100.0).floor() as u32
    }

    /// Live output estimate shown next to the dials
    pub fn estimated_output(&self) -> u64 {
        let base = self.environment.w_density as f64 * (self.selection.activity_rate / 100.0);
        let rank_mult = self
            .config
            .stability
            .estimate_rank_growth
            .powi(self.selection.rank as i32 - 1);
        let vitality = factors::vitality_factor(self.caster.hp_ratio(), &self.config.formula);
        let output = base * rank_mult * vitality;
        if output.is_finite() && output > 0.0 {
            output.floor() as u64
        } else {
            0
        }
    }

    /// Request for the current selection and readings
    pub fn build_request(&self) -> SpellRequest {
        let s = &self.selection;
        let known = self
            .grimoire
            .known_spell(s.active_spell_id.as_deref(), s.system, s.rank, &s.attribute)
            .map(|entry| entry.as_known());
        SpellRequest {
            system: s.system,
            attribute: s.attribute.clone(),
            rank: s.rank,
            protection_id: s.protection_id.clone(),
            tool_id: s.tool_id.clone(),
            reinforcement: s.reinforcement,
            buff_level: s.buff_level,
            caster: self.caster.clone(),
            environment: self.environment.clone(),
            known_spell: known,
        }
    }

    /// Evaluate without casting
    pub fn preview(&mut self) -> SpellResult {
        let request = self.build_request();
        evaluate_with_rng(&self.codex, &request, &self.config.formula, &mut self.rng)
    }

    // === Casting ===

    /// Roll for success and start the invocation
    pub fn cast(&mut self) -> Result<(), SessionError> {
        // Ready and Error must be finalized or acknowledged first
        if !matches!(
            self.invocation.state(),
            InvocationState::Idle | InvocationState::Complete
        ) {
            return Err(SessionError::Busy {
                action: "cast",
                state: self.invocation.state().clone(),
            });
        }
        self.current_spell = None;

        let probability = self.success_probability();
        let roll = self.rng.gen::<f64>() * 100.0;
        let outcome = if roll <= probability {
            CastOutcome::Success(self.preview())
        } else {
            let stability = &self.config.stability;
            let fate_offered = self.caster.hp_ratio() <= stability.fate_hp_threshold
                && self.rng.gen::<f64>() <= stability.fate_chance;
            if fate_offered {
                CastOutcome::Fate
            } else {
                CastOutcome::Failure(format!("Activation Failed: {}", self.failure_reason()))
            }
        };
        tracing::info!(
            "cast rolled {:.1} against {:.1}: {}",
            roll,
            probability,
            match &outcome {
                CastOutcome::Success(_) => "success",
                CastOutcome::Failure(_) => "failure",
                CastOutcome::Fate => "fate",
            }
        );
        self.invocation.begin(outcome, false)?;
        Ok(())
    }

    fn failure_reason(&mut self) -> String {
        let reasons = self.codex.failure_reasons();
        if reasons.is_empty() {
            return "Unknown".to_string();
        }
        let idx = self.rng.gen_range(0..reasons.len());
        reasons[idx].clone()
    }

    /// Roll the fate die; a 1 manifests the spell with the fate multiplier
    pub fn roll_fate(&mut self) -> Result<u8, SessionError> {
        if self.invocation.state() != &InvocationState::AwaitingFate {
            return Err(SessionError::Busy {
                action: "roll fate",
                state: self.invocation.state().clone(),
            });
        }
        let die: u8 = self.rng.gen_range(1..=6);
        if die == 1 {
            let spell = self.preview().apply_fate(self.config.stability.fate_multiplier);
            self.invocation.begin(CastOutcome::Success(spell), true)?;
        } else {
            self.invocation.fail(FATE_DENIED)?;
        }
        tracing::info!("fate die: {}", die);
        Ok(die)
    }

    /// Ready -> Complete; records the spell in the grimoire
    pub fn finalize(&mut self) -> Result<ManifestedSpell, SessionError> {
        let spell = self.invocation.finalize()?;
        let entry = self.grimoire.record(spell, "INV", &mut self.rng);
        self.current_spell = Some(entry.clone());
        Ok(entry)
    }

    pub fn acknowledge(&mut self) -> Result<(), SessionError> {
        self.invocation.acknowledge()?;
        Ok(())
    }

    /// Back to Idle from anywhere, discarding the analysis
    pub fn reset(&mut self) {
        self.invocation.reset();
        self.current_spell = None;
    }

    // === Sensors ===

    pub fn toggle_simulation(&mut self) {
        self.monitor.toggle();
    }

    pub fn drift_body_temp(&mut self) {
        self.caster.body_temp = drift_body_temp(self.caster.body_temp, &mut self.rng);
    }

    pub fn reroll_environment(&mut self) {
        self.environment = roll_environment(&mut self.rng);
    }

    // === Battle ===

    pub fn battle(&self) -> Option<&Battle> {
        self.battle.as_ref()
    }

    pub fn battle_focus(&self) -> f64 {
        self.battle_focus
    }

    pub fn set_battle_focus(&mut self, focus: f64) {
        self.battle_focus = focus.clamp(0.0, 1.0);
    }

    pub fn battle_stance(&self) -> Stance {
        Stance::from_focus(self.battle_focus, &self.config.battle)
    }

    pub fn select_enemy(&mut self, id: &str) -> Result<(), SessionError> {
        let enemy = self
            .codex
            .enemy(id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownEnemy(id.to_string()))?;
        match self.battle.as_mut() {
            Some(battle) => battle.select_enemy(enemy),
            None => {
                self.battle = Some(Battle::new(
                    enemy,
                    self.caster.max_hp,
                    self.config.battle.clone(),
                ))
            }
        }
        Ok(())
    }

    pub fn reset_battle(&mut self) {
        if let Some(battle) = self.battle.as_mut() {
            battle.reset();
        }
    }

    /// Take the stance picked by the focus slider
    ///
    /// Attacks evaluate the current selection with the battle HP as caster HP.
    pub fn battle_act(&mut self) -> Result<TurnResult, SessionError> {
        let stance = self.battle_stance();
        let (player_hp, player_max_hp) = match self.battle.as_ref() {
            Some(b) => (b.player_hp(), b.player_max_hp()),
            None => return Err(SessionError::NoBattle),
        };

        let mut request = self.build_request();
        request.caster.hp = player_hp;
        request.caster.max_hp = player_max_hp;
        let spell = evaluate_with_rng(&self.codex, &request, &self.config.formula, &mut self.rng);

        let battle = self.battle.as_mut().ok_or(SessionError::NoBattle)?;
        Ok(battle.act(stance, &spell, &mut self.rng)?)
    }

    // === Time ===

    /// Advance every timer by `delta` seconds
    pub fn tick(&mut self, delta: f64) -> TickReport {
        TickReport {
            state_changed: self.invocation.tick(delta),
            vitals_sampled: self.monitor.tick(delta, &mut self.caster, &mut self.rng),
            enemy_action: match self.battle.as_mut() {
                Some(battle) => battle.tick(delta, &mut self.rng),
                None => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        let mut config = ForgeConfig {
            seed: Some(12345),
            ..ForgeConfig::default()
        };
        config.simulation.enabled = false;
        Session::new(config, Codex::default())
    }

    #[test]
    fn test_initial_selection() {
        let s = session();
        assert_eq!(s.selection().system, MagicSystem::Elemental);
        assert_eq!(s.selection().attribute, "火属性");
        assert_eq!(s.selection().rank, 1);
        assert_eq!(s.state(), &InvocationState::Idle);
        assert!(s.grimoire().get("LIB_001").is_some());
        assert!(s.battle().is_some());
    }

    #[test]
    fn test_select_system_falls_back_to_first_attribute() {
        let mut s = session();
        s.select_system(MagicSystem::Causal);
        assert_eq!(s.selection().attribute, "律界域");
        s.select_attribute("因果域").unwrap();
        s.select_system(MagicSystem::Causal);
        assert_eq!(s.selection().attribute, "因果域");
        assert!(s.select_attribute("火属性").is_err());
    }

    #[test]
    fn test_rank_gated_by_activity() {
        let mut s = session();
        s.set_activity_rate(50.0);
        s.set_rank(7);
        assert_eq!(s.selection().rank, 5);
        s.set_rank(3);
        assert_eq!(s.selection().rank, 3);

        s.set_activity_rate(15.0);
        assert_eq!(s.selection().rank, 2);

        s.set_activity_rate(0.0);
        assert_eq!(s.selection().rank, 1);

        s.set_activity_rate(250.0);
        assert!((s.selection().activity_rate - 100.0).abs() < f64::EPSILON);
        s.set_rank(0);
        assert_eq!(s.selection().rank, 1);
        s.set_rank(99);
        assert_eq!(s.selection().rank, 7);
    }

    #[test]
    fn test_dials_clamp() {
        let mut s = session();
        for _ in 0..10 {
            s.adjust_reinforcement(1);
            s.adjust_buff(-1);
        }
        assert_eq!(s.selection().reinforcement, 3);
        assert_eq!(s.selection().buff_level, -5);
        s.set_hp(500);
        assert_eq!(s.caster().hp, 100);
    }

    #[test]
    fn test_characters() {
        let mut s = session();
        s.apply_character("char_canon").unwrap();
        assert_eq!(s.selection().protection_id, "kago_world");
        assert!((s.selection().activity_rate - 93.2).abs() < 1e-9);
        assert_eq!(s.selection().character_id.as_deref(), Some("char_canon"));

        s.set_activity_rate(40.0);
        assert_eq!(s.selection().character_id, None);

        assert!(matches!(s.add_character("   "), Err(SessionError::EmptyCharacterName)));
        let id = s.add_character("Mira").unwrap();
        assert!(id.starts_with("char_"));
        assert_eq!(s.selection().character_id.as_deref(), Some(id.as_str()));
        let created = s.codex().character(&id).unwrap();
        assert!(created.activity_rate >= 0.0 && created.activity_rate < 100.0);

        let mut edited = created.clone();
        edited.protection_id = "kago_light".to_string();
        edited.activity_rate = 90.0;
        s.update_character(edited).unwrap();
        assert_eq!(s.selection().protection_id, "kago_light");
        assert!(matches!(
            s.apply_character("char_missing"),
            Err(SessionError::UnknownCharacter(_))
        ));
    }

    #[test]
    fn test_stability_and_estimate() {
        let mut s = session();
        s.set_activity_rate(50.0);
        s.set_rank(1);
        // 50 + 30 + 25 - 5
        assert_eq!(s.stability(), 100);
        s.set_hp(0);
        assert_eq!(s.stability(), 75);

        s.set_hp(100);
        s.set_environment(SpellEnvironment {
            w_density: 4000,
            ..SpellEnvironment::default()
        });
        s.set_rank(2);
        // 4000 * 0.5 * 1.6
        assert_eq!(s.estimated_output(), 3200);
    }

    #[test]
    fn test_grimoire_selection_sets_known_spell() {
        let mut s = session();
        s.set_activity_rate(100.0);
        s.select_system(MagicSystem::Dawn);
        s.set_rank(6);
        s.select_grimoire_entry("LIB_001").unwrap();
        assert_eq!(s.selection().system, MagicSystem::Elemental);
        assert_eq!(s.selection().attribute, "火属性");
        assert_eq!(s.selection().rank, 1);
        assert_eq!(s.selection().active_spell_id.as_deref(), Some("LIB_001"));
        let request = s.build_request();
        assert_eq!(request.known_spell.map(|k| k.predicted_damage), Some(150));

        s.delete_spell("LIB_001").unwrap();
        assert_eq!(s.selection().active_spell_id, None);
        assert!(s.delete_spell("LIB_001").is_err());
    }

    #[test]
    fn test_guaranteed_cast_flow() {
        let mut s = session();
        s.set_activity_rate(100.0);
        s.set_rank(1);
        s.cast().unwrap();
        assert_eq!(s.state(), &InvocationState::Analyzing);
        assert!(s.cast().is_err());

        let mut reached_ready = false;
        for _ in 0..100 {
            if s.tick(0.1).state_changed == Some(InvocationState::Ready) {
                reached_ready = true;
                break;
            }
        }
        assert!(reached_ready);

        let before = s.grimoire().len();
        let entry = s.finalize().unwrap();
        assert!(entry.id.starts_with("INV"));
        assert_eq!(s.grimoire().len(), before + 1);
        assert_eq!(s.state(), &InvocationState::Complete);
        assert_eq!(s.current_spell().map(|e| e.id.clone()), Some(entry.id));

        s.reset();
        assert_eq!(s.state(), &InvocationState::Idle);
        assert!(s.current_spell().is_none());
    }

    #[test]
    fn test_hopeless_cast_fails() {
        let mut s = session();
        s.set_activity_rate(0.0);
        s.set_hp(50);
        // 0 + 30 + 12.5 - 5 = 37.5; retry until a failure shows up
        let mut saw_error = false;
        for _ in 0..50 {
            s.cast().unwrap();
            let mut state = s.state().clone();
            for _ in 0..100 {
                if let Some(next) = s.tick(0.1).state_changed {
                    state = next;
                    if matches!(state, InvocationState::Ready | InvocationState::Error(_)) {
                        break;
                    }
                }
            }
            match state {
                InvocationState::Error(reason) => {
                    assert!(reason.starts_with("Activation Failed"));
                    s.acknowledge().unwrap();
                    saw_error = true;
                    break;
                }
                _ => s.reset(),
            }
        }
        assert!(saw_error);
    }

    #[test]
    fn test_roll_fate_requires_prompt() {
        let mut s = session();
        assert!(s.roll_fate().is_err());
    }

    /// Tick until the invocation stops on a state that needs input
    fn settle(s: &mut Session) -> InvocationState {
        for _ in 0..200 {
            if let Some(next) = s.tick(0.1).state_changed {
                if matches!(
                    next,
                    InvocationState::Ready | InvocationState::Error(_) | InvocationState::AwaitingFate
                ) {
                    return next;
                }
            }
        }
        s.state().clone()
    }

    #[test]
    fn test_fate_path_near_death() {
        let mut config = ForgeConfig {
            seed: Some(3),
            ..ForgeConfig::default()
        };
        config.simulation.enabled = false;
        config.stability.fate_chance = 1.0;
        let mut s = Session::new(config, Codex::default());
        s.set_activity_rate(0.0);
        s.set_hp(5);
        // 0 + 30 + 1.25 - 5 = 26.25; every failure at 5% HP offers fate

        let mut saw_miracle = false;
        let mut saw_denial = false;
        for _ in 0..300 {
            if saw_miracle && saw_denial {
                break;
            }
            s.cast().unwrap();
            if settle(&mut s) != InvocationState::AwaitingFate {
                s.reset();
                continue;
            }

            let plain = s.preview().predicted_damage;
            let before = s.grimoire().len();
            let die = s.roll_fate().unwrap();
            assert!((1..=6).contains(&die));

            if die == 1 {
                assert_eq!(s.state(), &InvocationState::Analyzing);
                // Fated analysis is one second long
                assert_eq!(s.tick(0.9).state_changed, None);
                assert_eq!(s.tick(0.1).state_changed, Some(InvocationState::Manifesting));

                let spell = s.invocation().analysis().unwrap().clone();
                assert_eq!(spell.predicted_damage, plain * 2);
                assert!(spell.trace.contains("[FATE]"));

                assert_eq!(settle(&mut s), InvocationState::Ready);
                let entry = s.finalize().unwrap();
                assert_eq!(s.grimoire().len(), before + 1);
                assert!(entry.spell.trace.contains("[FATE]"));
                s.reset();
                saw_miracle = true;
            } else {
                assert_eq!(s.state(), &InvocationState::Error(FATE_DENIED.to_string()));
                assert_eq!(s.grimoire().len(), before);
                assert!(s.current_spell().is_none());
                s.acknowledge().unwrap();
                assert_eq!(s.state(), &InvocationState::Idle);
                saw_denial = true;
            }
        }
        assert!(saw_miracle, "no fate roll came up 1");
        assert!(saw_denial, "no fate roll was denied");
    }

    #[test]
    fn test_battle_act_without_enemies() {
        let mut s = Session::new(ForgeConfig::default(), Codex::minimal());
        assert!(s.battle().is_none());
        let err = s.battle_act().unwrap_err();
        assert!(matches!(err, SessionError::NoBattle));
        assert!(!err.to_string().contains("''"));
    }

    #[test]
    fn test_battle_round() {
        let mut config = ForgeConfig {
            seed: Some(9),
            ..ForgeConfig::default()
        };
        config.battle.crit_chance = 0.0;
        let mut s = Session::new(config, Codex::default());

        s.set_battle_focus(0.1);
        assert_eq!(s.battle_stance(), Stance::Attack);
        let turn = s.battle_act().unwrap();
        assert!(turn.entry.damage.unwrap_or(0) > 0);
        assert!(matches!(
            s.battle_act(),
            Err(SessionError::Battle(BattleError::NotPlayerTurn(_)))
        ));

        let mut enemy_acted = false;
        for _ in 0..20 {
            if s.tick(0.1).enemy_action.is_some() {
                enemy_acted = true;
                break;
            }
        }
        assert!(enemy_acted);

        s.select_enemy("enemy_wyrm").unwrap();
        assert_eq!(s.battle().map(|b| b.enemy_hp()), Some(250_000));
        assert!(s.select_enemy("enemy_missing").is_err());
    }

    #[test]
    fn test_import_through_session() {
        let mut s = session();
        let report = s
            .import_json(r#"{ "attributes": [ { "name": "Void", "system": "因果系", "kanji": "虚無", "reading": "キョム" } ] }"#)
            .unwrap();
        assert_eq!(report.added, 1);
        s.select_system(MagicSystem::Causal);
        s.select_attribute("Void").unwrap();
    }
}
