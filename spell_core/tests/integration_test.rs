//! Integration test: Configure -> Build a spell -> Cast -> Record -> Battle
//!
//! Drives the forge through its public session API the way the front-end does.

use spell_core::config::{load_forge_config, ForgeConfig};
use spell_core::grimoire::{GrimoireQuery, SortOrder};
use spell_core::{
    BattleError, BattlePhase, Codex, InvocationState, MagicSystem, Session, SessionError,
    SpellEnvironment, Stance, Weather,
};
use std::path::Path;

/// Helper to print a separator
fn separator(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("  {}", title);
    println!("{}\n", "=".repeat(60));
}

fn seeded_session(seed: u64) -> Session {
    let mut config = ForgeConfig {
        seed: Some(seed),
        ..ForgeConfig::default()
    };
    config.simulation.enabled = false;
    let mut session = Session::new(config, Codex::default());
    session.set_environment(SpellEnvironment {
        w_density: 4500,
        weather: Weather::Sunny,
        ..SpellEnvironment::default()
    });
    session
}

/// Tick until the invocation settles in Ready or Error
fn run_invocation(session: &mut Session) -> InvocationState {
    for _ in 0..200 {
        session.tick(0.1);
        match session.state() {
            InvocationState::Ready | InvocationState::Error(_) | InvocationState::AwaitingFate => {
                return session.state().clone();
            }
            _ => {}
        }
    }
    session.state().clone()
}

#[test]
fn test_shipped_config_matches_defaults() {
    let config = load_forge_config(Path::new("config/forge.toml")).expect("forge.toml should load");
    assert_eq!(config, ForgeConfig::default());
}

#[test]
fn test_forge_cast_records_spell() {
    separator("CAST -> FINALIZE -> GRIMOIRE");
    let mut session = seeded_session(12345);
    session.set_activity_rate(100.0);
    session.select_system(MagicSystem::Elemental);
    session.select_attribute("雷属性").unwrap();
    session.set_rank(3);
    session.select_tool("tool_staff").unwrap();
    session.adjust_reinforcement(2);

    let preview = session.preview();
    println!("  Preview: {}", preview.summary());
    println!("{}", preview.trace);
    assert!(preview.predicted_damage > 0);
    assert!(session.stability() >= 100);

    session.cast().unwrap();
    assert_eq!(run_invocation(&mut session), InvocationState::Ready);
    let analysis = session.invocation().analysis().cloned().unwrap();
    assert_eq!(analysis.attribute, "雷属性");
    assert_eq!(analysis.rank, 3);

    let entry = session.finalize().unwrap();
    println!("  Recorded {} -> {}", entry.id, entry.spell.name);
    assert!(entry.id.starts_with("INV"));
    assert_eq!(entry.spell.tool_id, "tool_staff");
    assert_eq!(entry.spell.reinforcement, 2);

    let found = session.grimoire().query(&GrimoireQuery {
        system: Some(MagicSystem::Elemental),
        search: "雷".to_string(),
        sort: SortOrder::Newest,
    });
    assert_eq!(found.first().map(|e| e.id.as_str()), Some(entry.id.as_str()));

    // Casting again reuses the recorded spell's power as the base
    session.select_grimoire_entry(&entry.id).unwrap();
    let known = session.build_request().known_spell.unwrap();
    assert_eq!(known.predicted_damage, entry.spell.predicted_damage);
}

#[test]
fn test_hidden_art_via_persona() {
    separator("HIDDEN ART");
    let mut session = seeded_session(7);
    session.apply_character("char_canon").unwrap();
    session.select_system(MagicSystem::Causal);
    session.select_attribute("因果域").unwrap();
    session.set_rank(7);
    assert_eq!(session.selection().rank, 7);

    session.cast().unwrap();
    assert_eq!(run_invocation(&mut session), InvocationState::Ready);
    let entry = session.finalize().unwrap();
    println!("{}", entry.spell.trace);
    assert!(entry.spell.hidden_art);
    assert_eq!(entry.spell.predicted_damage, 9_999_999);
}

#[test]
fn test_imported_attribute_is_castable() {
    separator("IMPORT");
    let mut session = seeded_session(3);
    let report = session
        .import_json(r#"{ "attributes": [ { "name": "Void", "system": "因果系", "kanji": "虚無", "reading": "キョム" } ] }"#)
        .unwrap();
    println!("  Imported: {:?}", report);

    session.select_system(MagicSystem::Causal);
    session.select_attribute("Void").unwrap();
    let spell = session.preview();
    println!("  {}", spell.summary());
    assert!(spell.name.contains("虚無"));
    assert_eq!(spell.attribute, "Void");

    let err = session.import_json(r#"{ "attributes": [ { "name": "X", "system": "nowhere" } ] }"#);
    assert!(matches!(err, Err(SessionError::Import(_))));
    assert!(session.codex().attribute("X").is_none());
}

#[test]
fn test_battle_ends_in_victory() {
    separator("BATTLE");
    let mut session = seeded_session(21);
    session.select_enemy("enemy_wyrm").unwrap();
    session.apply_character("char_canon").unwrap();
    session.select_system(MagicSystem::Causal);
    session.select_attribute("因果域").unwrap();
    session.set_rank(7);

    // The wyrm only resists fire; the hidden art lands at full power
    session.set_battle_focus(0.0);
    assert_eq!(session.battle_stance(), Stance::Attack);
    let mut rounds = 0;
    while session.battle().map(|b| b.phase()) == Some(BattlePhase::PlayerTurn) && rounds < 10 {
        let turn = session.battle_act().unwrap();
        println!("  {}", turn.entry.display());
        for _ in 0..20 {
            if session.tick(0.1).enemy_action.is_some() {
                break;
            }
        }
        rounds += 1;
    }

    let battle = session.battle().unwrap();
    assert_eq!(battle.phase(), BattlePhase::Victory);
    assert_eq!(battle.enemy_hp(), 0);
    assert!(matches!(
        session.battle_act(),
        Err(SessionError::Battle(BattleError::Finished(BattlePhase::Victory)))
    ));

    session.reset_battle();
    let battle = session.battle().unwrap();
    assert_eq!(battle.phase(), BattlePhase::PlayerTurn);
    assert_eq!(battle.enemy_hp(), battle.enemy().max_hp);
}

#[test]
fn test_defend_and_recover_turns() {
    let mut session = seeded_session(5);
    session.select_enemy("enemy_wyrm").unwrap();

    session.set_battle_focus(0.5);
    assert_eq!(session.battle_stance(), Stance::Defend);
    session.battle_act().unwrap();
    let hit = loop {
        if let Some(entry) = session.tick(0.1).enemy_action {
            break entry;
        }
    };
    // 25 attack, +/-20%, halved by the barrier
    let damage = hit.damage.unwrap_or(0);
    assert!((10..=15).contains(&damage));

    session.set_battle_focus(0.9);
    assert_eq!(session.battle_stance(), Stance::Recover);
    session.battle_act().unwrap();
    let battle = session.battle().unwrap();
    assert_eq!(battle.player_hp(), battle.player_max_hp());
}
