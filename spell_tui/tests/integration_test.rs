//! Integration test: Cast -> Release -> Mouse input -> Import -> Battle -> Render
//!
//! Drives the App the way key and mouse events do and draws every tab.

use ratatui::{backend::TestBackend, layout::Rect, Terminal};
use spell_core::codex::Codex;
use spell_core::config::ForgeConfig;
use spell_core::invocation::InvocationState;
use spell_core::{MagicSystem, Session};
use spell_tui::app::{App, ForgeField, PromptKind, Tab};
use spell_tui::ui;

const FRAME: Rect = Rect {
    x: 0,
    y: 0,
    width: 140,
    height: 40,
};

/// Helper to print a separator
fn separator(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("  {}", title);
    println!("{}\n", "=".repeat(60));
}

fn seeded_app(seed: u64) -> App {
    let mut config = ForgeConfig {
        seed: Some(seed),
        ..ForgeConfig::default()
    };
    config.simulation.enabled = false;
    App::new(Session::new(config, Codex::default()))
}

fn tick_until_settled(app: &mut App) {
    for _ in 0..200 {
        app.tick(0.1);
        if !app.session.state().is_busy() {
            return;
        }
    }
}

fn type_into_prompt(app: &mut App, text: &str) {
    for c in text.chars() {
        app.prompt_input(c);
    }
}

#[test]
fn test_cast_and_release_from_the_forge() {
    separator("FORGE: CAST -> RELEASE");
    let mut app = seeded_app(7);
    // Full HP, rank 1 and activity 50 make a certain cast
    assert_eq!(app.session.stability(), 100);

    app.on_enter();
    assert_eq!(app.session.state(), &InvocationState::Analyzing);

    // Enter while busy only reports progress
    app.on_enter();
    assert_eq!(app.session.state(), &InvocationState::Analyzing);

    tick_until_settled(&mut app);
    assert_eq!(app.session.state(), &InvocationState::Ready);
    assert!(app.status.contains("Manifestation complete"));

    app.on_space();
    assert_eq!(app.session.state(), &InvocationState::Complete);
    assert!(app.status.starts_with('✓'));
    assert_eq!(app.session.grimoire().len(), 2);
    let recorded = app.session.current_spell().expect("spell recorded");
    assert!(recorded.id.starts_with("INV"));
    println!("  Recorded {} ({} dmg)", recorded.spell.name, recorded.spell.predicted_damage);
    assert_eq!(recorded.spell.attribute, "火属性");
}

#[test]
fn test_mouse_drives_hp_slider_and_dial() {
    let mut app = seeded_app(3);
    let regions = ui::forge_view::regions(ui::content_area(FRAME));
    let hp_track = ui::track(regions.hp_slider);

    // Bottom of the track empties the bar, the top fills it
    app.on_click(hp_track.x, hp_track.y + hp_track.height - 1, FRAME);
    assert_eq!(app.session.caster().hp, 0);
    assert_eq!(app.forge_field, ForgeField::Hp);
    app.on_click(hp_track.x, hp_track.y, FRAME);
    assert_eq!(app.session.caster().hp, app.session.caster().max_hp);

    // Three o'clock on the dial is a quarter turn
    let dial = ui::track(regions.dial);
    app.on_click(dial.x + dial.width - 1, dial.y + (dial.height - 1) / 2, FRAME);
    assert!((app.session.selection().activity_rate - 25.0).abs() < 1e-9);
    assert_eq!(app.forge_field, ForgeField::Activity);

    // Clicks elsewhere, or on other tabs, change nothing
    app.current_tab = Tab::Grimoire;
    app.on_click(hp_track.x, hp_track.y + hp_track.height - 1, FRAME);
    assert_eq!(app.session.caster().hp, app.session.caster().max_hp);
}

#[test]
fn test_import_prompt_adds_attribute() {
    separator("IMPORT TAB");
    let path = std::env::temp_dir().join(format!("spell_tui_void_{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"{ "attributes": [ { "name": "Void", "system": "Causal", "kanji": "虚無", "reading": "キョム" } ] }"#,
    )
    .expect("write temp file");

    let mut app = seeded_app(11);
    let causal_before = app.session.codex().attributes_of(MagicSystem::Causal).len();

    app.set_tab(4);
    assert_eq!(app.current_tab, Tab::Import);
    app.on_enter();
    assert!(matches!(
        app.prompt.as_ref().map(|p| &p.kind),
        Some(PromptKind::ImportPath)
    ));
    type_into_prompt(&mut app, &path.to_string_lossy());
    app.submit_prompt();

    assert_eq!(
        app.session.codex().attributes_of(MagicSystem::Causal).len(),
        causal_before + 1
    );
    assert!(app.import_history.last().is_some_and(|l| l.starts_with('✓')));

    // A missing file is reported and changes nothing
    app.start_prompt(PromptKind::ImportPath);
    type_into_prompt(&mut app, "/definitely/not/here.json");
    app.submit_prompt();
    assert!(app.status.starts_with('✗'));
    assert_eq!(
        app.session.codex().attributes_of(MagicSystem::Causal).len(),
        causal_before + 1
    );

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_battle_tab_focus_and_act() {
    separator("BATTLE TAB");
    let mut app = seeded_app(5);
    app.set_tab(3);
    let hp_before = app.session.battle().map(|b| b.enemy_hp());

    // Focus starts on Attack
    app.on_enter();
    let hp_after = app.session.battle().map(|b| b.enemy_hp());
    assert!(hp_after < hp_before);

    // The enemy answers after its delay, then the player may act again
    for _ in 0..20 {
        app.tick(0.1);
    }
    for _ in 0..20 {
        app.on_right();
    }
    assert!((app.session.battle_focus() - 1.0).abs() < 1e-9);
    app.on_enter();
    let battle = app.session.battle().expect("battle");
    assert_eq!(battle.player_hp(), battle.player_max_hp());

    for entry in battle.log().entries() {
        println!("  {}", entry.display());
    }

    app.reset();
    let battle = app.session.battle().expect("battle");
    assert_eq!(battle.enemy_hp(), battle.enemy().max_hp);
}

#[test]
fn test_every_tab_renders() {
    let mut app = seeded_app(1);
    app.on_enter();
    for _ in 0..35 {
        app.tick(0.1);
    }

    for size in [(140, 40), (80, 24), (40, 12)] {
        let backend = TestBackend::new(size.0, size.1);
        let mut terminal = Terminal::new(backend).expect("terminal");
        for index in 0..Tab::all().len() {
            app.set_tab(index);
            terminal.draw(|f| ui::draw(f, &app)).expect("draw");
        }
    }

    app.start_prompt(PromptKind::Search);
    let backend = TestBackend::new(100, 30);
    let mut terminal = Terminal::new(backend).expect("terminal");
    terminal.draw(|f| ui::draw(f, &app)).expect("draw");
}
