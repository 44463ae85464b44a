//! Battle mode - turn-based HP exchange on top of the spell formula
//!
//! The player acts in PlayerTurn with one of three stances. The enemy answers
//! after a pacing delay driven by `tick`.

mod enemy;
mod log;
mod stance;

pub use enemy::{EnemyDef, Effectiveness};
pub use log::{CombatLog, CombatLogEntry, MAX_LOG_ENTRIES};
pub use stance::Stance;

use crate::config::BattleConstants;
use crate::formula::SpellResult;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattlePhase {
    PlayerTurn,
    EnemyTurn,
    Victory,
    Defeat,
}

impl BattlePhase {
    pub fn is_over(&self) -> bool {
        matches!(self, BattlePhase::Victory | BattlePhase::Defeat)
    }
}

impl fmt::Display for BattlePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BattlePhase::PlayerTurn => "PLAYER TURN",
            BattlePhase::EnemyTurn => "ENEMY TURN",
            BattlePhase::Victory => "VICTORY",
            BattlePhase::Defeat => "DEFEAT",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleError {
    #[error("Not your turn ({0})")]
    NotPlayerTurn(BattlePhase),
    #[error("The enemy cannot act during {0}")]
    NotEnemyTurn(BattlePhase),
    #[error("The battle is already decided ({0})")]
    Finished(BattlePhase),
}

/// Outcome of one player action
#[derive(Debug, Clone, PartialEq)]
pub struct TurnResult {
    pub stance: Stance,
    pub entry: CombatLogEntry,
    pub phase: BattlePhase,
}

/// One encounter against one enemy
#[derive(Debug, Clone)]
pub struct Battle {
    enemy: EnemyDef,
    enemy_hp: u64,
    player_hp: u32,
    player_max_hp: u32,
    phase: BattlePhase,
    defending: bool,
    enemy_timer: f64,
    log: CombatLog,
    constants: BattleConstants,
}

impl Battle {
    pub fn new(enemy: EnemyDef, player_max_hp: u32, constants: BattleConstants) -> Self {
        let mut battle = Battle {
            enemy_hp: enemy.max_hp,
            enemy,
            player_hp: player_max_hp,
            player_max_hp,
            phase: BattlePhase::PlayerTurn,
            defending: false,
            enemy_timer: 0.0,
            log: CombatLog::default(),
            constants,
        };
        battle.announce();
        battle
    }

    fn announce(&mut self) {
        let message = format!(
            "A wild {} appears! ({}, {} HP)",
            self.enemy.name, self.enemy.attribute, self.enemy.max_hp
        );
        self.log.note(message);
    }

    // === Accessors ===

    pub fn enemy(&self) -> &EnemyDef {
        &self.enemy
    }

    pub fn enemy_hp(&self) -> u64 {
        self.enemy_hp
    }

    pub fn player_hp(&self) -> u32 {
        self.player_hp
    }

    pub fn player_max_hp(&self) -> u32 {
        self.player_max_hp
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn is_defending(&self) -> bool {
        self.defending
    }

    pub fn log(&self) -> &CombatLog {
        &self.log
    }

    pub fn constants(&self) -> &BattleConstants {
        &self.constants
    }

    pub fn enemy_hp_percent(&self) -> f64 {
        if self.enemy.max_hp == 0 {
            return 0.0;
        }
        self.enemy_hp as f64 / self.enemy.max_hp as f64 * 100.0
    }

    // === Setup ===

    /// Switch opponent; both sides return to full HP
    pub fn select_enemy(&mut self, enemy: EnemyDef) {
        self.enemy = enemy;
        self.reset();
    }

    /// Restart against the same enemy
    pub fn reset(&mut self) {
        self.enemy_hp = self.enemy.max_hp;
        self.player_hp = self.player_max_hp;
        self.phase = BattlePhase::PlayerTurn;
        self.defending = false;
        self.enemy_timer = 0.0;
        self.log.clear();
        self.announce();
    }

    fn require_player_turn(&self) -> Result<(), BattleError> {
        match self.phase {
            BattlePhase::PlayerTurn => Ok(()),
            BattlePhase::EnemyTurn => Err(BattleError::NotPlayerTurn(self.phase)),
            phase => Err(BattleError::Finished(phase)),
        }
    }

    // === Player actions ===

    /// Resolve the stance for this turn. Attack needs the evaluated spell.
    pub fn act(
        &mut self,
        stance: Stance,
        spell: &SpellResult,
        rng: &mut impl Rng,
    ) -> Result<TurnResult, BattleError> {
        let entry = match stance {
            Stance::Attack => self.attack(spell, rng)?,
            Stance::Defend => self.defend()?,
            Stance::Recover => self.recover()?,
        };
        Ok(TurnResult {
            stance,
            entry,
            phase: self.phase,
        })
    }

    /// Hit the enemy with a spell, scaled by effectiveness and a crit roll
    pub fn attack(&mut self, spell: &SpellResult, rng: &mut impl Rng) -> Result<CombatLogEntry, BattleError> {
        self.require_player_turn()?;

        let effectiveness = self.enemy.effectiveness(&spell.attribute);
        let critical = rng.gen::<f64>() < self.constants.crit_chance;
        let crit_mult = if critical { self.constants.crit_multiplier } else { 1.0 };
        let raw = spell.predicted_damage as f64 * effectiveness.multiplier(&self.constants) * crit_mult;
        let damage = if raw.is_finite() && raw > 0.0 { raw.floor() as u64 } else { 0 };

        self.enemy_hp = self.enemy_hp.saturating_sub(damage);
        let entry = self.log.push(
            format!("{} strikes {}", spell.name, self.enemy.name),
            Some(damage),
            critical,
            Some(effectiveness),
        );
        self.end_player_turn();
        Ok(entry)
    }

    /// Halve the next enemy hit
    pub fn defend(&mut self) -> Result<CombatLogEntry, BattleError> {
        self.require_player_turn()?;
        self.defending = true;
        let entry = self.log.note("You raise a barrier.");
        self.end_player_turn();
        Ok(entry)
    }

    /// Heal a fraction of max HP
    pub fn recover(&mut self) -> Result<CombatLogEntry, BattleError> {
        self.require_player_turn()?;
        let heal = (self.player_max_hp as f64 * self.constants.recover_fraction).floor() as u32;
        let before = self.player_hp;
        self.player_hp = self.player_hp.saturating_add(heal).min(self.player_max_hp);
        let entry = self.log.note(format!(
            "You recover {} HP ({} -> {}).",
            self.player_hp - before,
            before,
            self.player_hp
        ));
        self.end_player_turn();
        Ok(entry)
    }

    fn end_player_turn(&mut self) {
        if self.enemy_hp == 0 {
            self.phase = BattlePhase::Victory;
            self.log.note(format!("{} is defeated!", self.enemy.name));
            tracing::info!("battle: victory over {}", self.enemy.id);
        } else {
            self.phase = BattlePhase::EnemyTurn;
            self.enemy_timer = 0.0;
        }
    }

    // === Enemy turn ===

    /// Enemy attack: attack power with jitter, halved when defending
    pub fn enemy_attack(&mut self, rng: &mut impl Rng) -> Result<CombatLogEntry, BattleError> {
        match self.phase {
            BattlePhase::EnemyTurn => {}
            BattlePhase::PlayerTurn => return Err(BattleError::NotEnemyTurn(self.phase)),
            phase => return Err(BattleError::Finished(phase)),
        }

        let jitter = self.constants.enemy_jitter;
        let roll = if jitter > 0.0 { rng.gen_range(-jitter..=jitter) } else { 0.0 };
        let mut raw = self.enemy.attack_power as f64 * (1.0 + roll);
        let mut message = format!("{} attacks!", self.enemy.name);
        if self.defending {
            raw *= 1.0 - self.constants.defend_mitigation;
            message.push_str(" The barrier absorbs part of the blow.");
        }
        let damage = raw.round().max(0.0) as u32;

        self.defending = false;
        self.player_hp = self.player_hp.saturating_sub(damage);
        let entry = self.log.push(message, Some(damage as u64), false, None);

        if self.player_hp == 0 {
            self.phase = BattlePhase::Defeat;
            self.log.note("You collapse...");
            tracing::info!("battle: defeated by {}", self.enemy.id);
        } else {
            self.phase = BattlePhase::PlayerTurn;
        }
        Ok(entry)
    }

    /// Advance the enemy's pacing delay; the enemy acts once it elapses
    pub fn tick(&mut self, delta: f64, rng: &mut impl Rng) -> Option<CombatLogEntry> {
        if self.phase != BattlePhase::EnemyTurn {
            return None;
        }
        self.enemy_timer += delta;
        if self.enemy_timer + 1e-9 < self.constants.enemy_delay_secs {
            return None;
        }
        self.enemy_attack(rng).ok()
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

    fn no_crit() -> BattleConstants {
        BattleConstants {
            crit_chance: 0.0,
            enemy_jitter: 0.0,
            ..BattleConstants::default()
        }
    }

    fn dummy() -> EnemyDef {
        Codex::default().enemy("enemy_dummy").cloned().unwrap()
    }

    fn spell(attribute: &str, system: MagicSystem) -> SpellResult {
        let mut rng = StdRng::seed_from_u64(1);
        evaluate_with_rng(
            &Codex::default(),
            &SpellRequest::new(system, attribute, 1),
            &FormulaConstants::default(),
            &mut rng,
        )
    }

    #[test]
    fn test_attack_applies_effectiveness() {
        let mut rng = StdRng::seed_from_u64(12345);
        let mut battle = Battle::new(dummy(), 100, no_crit());
        let wind = spell("風属性", MagicSystem::Elemental);

        let entry = battle.attack(&wind, &mut rng).unwrap();
        let expected = (wind.predicted_damage as f64 * 1.5).floor() as u64;
        assert_eq!(entry.damage, Some(expected));
        assert_eq!(entry.effectiveness, Some(Effectiveness::Super));
        assert_eq!(battle.enemy_hp(), 5000 - expected);
        assert_eq!(battle.phase(), BattlePhase::EnemyTurn);
    }

    #[test]
    fn test_actions_rejected_out_of_turn() {
        let mut rng = StdRng::seed_from_u64(12345);
        let mut battle = Battle::new(dummy(), 100, no_crit());
        battle.defend().unwrap();
        assert_eq!(
            battle.recover(),
            Err(BattleError::NotPlayerTurn(BattlePhase::EnemyTurn))
        );
        battle.enemy_attack(&mut rng).unwrap();
        assert_eq!(
            battle.enemy_attack(&mut rng),
            Err(BattleError::NotEnemyTurn(BattlePhase::PlayerTurn))
        );
    }

    #[test]
    fn test_defend_halves_next_hit() {
        let mut rng = StdRng::seed_from_u64(12345);
        let mut battle = Battle::new(dummy(), 100, no_crit());
        battle.defend().unwrap();
        assert!(battle.is_defending());
        let entry = battle.enemy_attack(&mut rng).unwrap();
        assert_eq!(entry.damage, Some(6));
        assert_eq!(battle.player_hp(), 94);
        assert!(!battle.is_defending());

        battle.recover().unwrap();
        let entry = battle.enemy_attack(&mut rng).unwrap();
        assert_eq!(entry.damage, Some(12));
    }

    #[test]
    fn test_recover_caps_at_max() {
        let mut rng = StdRng::seed_from_u64(12345);
        let mut battle = Battle::new(dummy(), 100, no_crit());
        battle.recover().unwrap();
        assert_eq!(battle.player_hp(), 100);
        battle.enemy_attack(&mut rng).unwrap();
        assert_eq!(battle.player_hp(), 88);
        battle.recover().unwrap();
        assert_eq!(battle.player_hp(), 100);
    }

    #[test]
    fn test_enemy_waits_for_delay() {
        let mut rng = StdRng::seed_from_u64(12345);
        let mut battle = Battle::new(dummy(), 100, no_crit());
        battle.defend().unwrap();
        for _ in 0..11 {
            assert!(battle.tick(0.1, &mut rng).is_none());
        }
        assert!(battle.tick(0.1, &mut rng).is_some());
        assert_eq!(battle.phase(), BattlePhase::PlayerTurn);
    }

    #[test]
    fn test_victory_and_defeat() {
        let mut rng = StdRng::seed_from_u64(12345);
        let mut enemy = dummy();
        enemy.max_hp = 10;
        let mut battle = Battle::new(enemy, 100, no_crit());
        battle
            .act(Stance::Attack, &spell("火属性", MagicSystem::Elemental), &mut rng)
            .unwrap();
        assert_eq!(battle.phase(), BattlePhase::Victory);
        assert_eq!(battle.enemy_hp(), 0);
        assert_eq!(battle.defend(), Err(BattleError::Finished(BattlePhase::Victory)));

        let mut strong = dummy();
        strong.attack_power = 500;
        let mut battle = Battle::new(strong, 100, no_crit());
        battle.defend().unwrap();
        battle.enemy_attack(&mut rng).unwrap();
        assert_eq!(battle.phase(), BattlePhase::Defeat);
        assert_eq!(battle.player_hp(), 0);
    }

    #[test]
    fn test_select_enemy_restores_hp() {
        let mut rng = StdRng::seed_from_u64(12345);
        let codex = Codex::default();
        let mut battle = Battle::new(dummy(), 100, no_crit());
        battle.defend().unwrap();
        battle.enemy_attack(&mut rng).unwrap();
        assert!(battle.player_hp() < 100);

        let wyrm = codex.enemy("enemy_wyrm").cloned().unwrap();
        battle.select_enemy(wyrm);
        assert_eq!(battle.player_hp(), 100);
        assert_eq!(battle.enemy_hp(), 250_000);
        assert_eq!(battle.phase(), BattlePhase::PlayerTurn);
        assert_eq!(battle.log().entries().len(), 1);
    }

    #[test]
    fn test_immune_deals_nothing() {
        let mut rng = StdRng::seed_from_u64(12345);
        let herald = Codex::default().enemy("enemy_herald").cloned().unwrap();
        let mut battle = Battle::new(herald, 100, no_crit());
        let entry = battle
            .attack(&spell("律界域", MagicSystem::Causal), &mut rng)
            .unwrap();
        assert_eq!(entry.damage, Some(0));
        assert_eq!(entry.effectiveness, Some(Effectiveness::Immune));
    }
}
