//! spell_tui - Interactive TUI for constructing, casting and battling with spells

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
        MouseButton, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use spell_core::codex::Codex;
use spell_core::config::{load_forge_config, ForgeConfig, LoggingConfig};
use spell_core::Session;
use spell_tui::app::{App, PromptKind, Tab};
use spell_tui::ui;
use std::fs::File;
use std::io;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

const CONFIG_PATHS: [&str; 3] = [
    "spellforge.toml",
    "config/forge.toml",
    "spell_core/config/forge.toml",
];

const CODEX_PATHS: [&str; 2] = ["config/codex.toml", "spell_core/config/codex.toml"];

/// First config file that exists; defaults when none does or it is invalid
fn load_config() -> ForgeConfig {
    for path in CONFIG_PATHS {
        let path = Path::new(path);
        if !path.exists() {
            continue;
        }
        match load_forge_config(path) {
            Ok(config) => return config,
            Err(e) => eprintln!("Warning: {}: {}, using defaults", path.display(), e),
        }
    }
    ForgeConfig::default()
}

/// A codex file on disk overrides the built-in tables
fn load_codex() -> Codex {
    for path in CODEX_PATHS {
        let Ok(content) = std::fs::read_to_string(path) else {
            continue;
        };
        match Codex::parse(&content) {
            Ok(codex) => return codex,
            Err(e) => eprintln!("Warning: {}: {}, using built-in codex", path, e),
        }
    }
    Codex::default()
}

/// Logs go to a file so they never tear the terminal
fn init_logging(logging: &LoggingConfig) {
    let Some(path) = logging.file.as_deref() else {
        return;
    };
    let level = tracing::Level::from_str(&logging.level).unwrap_or(tracing::Level::INFO);
    match File::create(path) {
        Ok(file) => tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init(),
        Err(e) => eprintln!("Warning: cannot open log file {}: {}", path, e),
    }
}

fn handle_prompt_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.cancel_prompt(),
        KeyCode::Enter => app.submit_prompt(),
        KeyCode::Backspace => app.prompt_backspace(),
        KeyCode::Char(c) => app.prompt_input(c),
        _ => {}
    }
}

/// Returns true when the user asked to quit
fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
    match (code, modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => return true,
        (KeyCode::Tab, _) => app.next_tab(),
        (KeyCode::BackTab, _) => app.prev_tab(),
        (KeyCode::Char('1'), _) => app.set_tab(0),
        (KeyCode::Char('2'), _) => app.set_tab(1),
        (KeyCode::Char('3'), _) => app.set_tab(2),
        (KeyCode::Char('4'), _) => app.set_tab(3),
        (KeyCode::Char('5'), _) => app.set_tab(4),
        (KeyCode::Char('6'), _) => app.set_tab(5),
        (KeyCode::Up, _) | (KeyCode::Char('k'), _) => app.on_up(),
        (KeyCode::Down, _) | (KeyCode::Char('j'), _) => app.on_down(),
        (KeyCode::Left, _) | (KeyCode::Char('h'), _) => app.on_left(),
        (KeyCode::Right, _) | (KeyCode::Char('l'), _) => app.on_right(),
        (KeyCode::Enter, _) => app.on_enter(),
        (KeyCode::Char(' '), _) => app.on_space(),
        (KeyCode::Char('r'), _) => app.reset(),
        (KeyCode::Char('?'), _) => app.current_tab = Tab::Help,
        (KeyCode::Char('s'), _) => app.toggle_simulation(),
        (KeyCode::Char('g'), _) => app.reroll_environment(),
        (KeyCode::Char('b'), _) => app.drift_body_temp(),
        (KeyCode::Char('n'), _) => app.start_prompt(PromptKind::CharacterName),
        (KeyCode::Char('/'), _) => {
            app.current_tab = Tab::Grimoire;
            app.start_prompt(PromptKind::Search);
        }
        (KeyCode::Char('f'), _) => app.cycle_grimoire_filter(),
        (KeyCode::Char('o'), _) => app.cycle_grimoire_sort(),
        (KeyCode::Char('a'), _) => app.start_prompt(PromptKind::DraftName),
        (KeyCode::Char('e'), _) => match app.current_tab {
            Tab::Battle => app.next_enemy(),
            _ => app.rename_selected_entry(),
        },
        (KeyCode::Char('d'), _) if app.current_tab == Tab::Grimoire => {
            app.delete_selected_entry()
        }
        (KeyCode::Char('x'), _) if app.current_tab == Tab::Grimoire => {
            app.clear_grimoire()
        }
        (KeyCode::Char('+'), _) | (KeyCode::Char('='), _) => {
            app.adjust_selected_character(1.0)
        }
        (KeyCode::Char('-'), _) => app.adjust_selected_character(-1.0),
        (KeyCode::PageUp, _) => app.scroll_trace(-5),
        (KeyCode::PageDown, _) => app.scroll_trace(5),
        (KeyCode::Char('i'), _) => {
            app.current_tab = Tab::Import;
            app.start_prompt(PromptKind::ImportPath);
        }
        _ => {}
    }
    false
}

fn main() -> io::Result<()> {
    let config = load_config();
    init_logging(&config.logging);
    let codex = load_codex();
    tracing::info!("spell_tui starting (seed {:?})", config.seed);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app
    let mut app = App::new(Session::new(config, codex));

    // Main loop
    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if app.is_prompting() {
                        handle_prompt_key(&mut app, key.code);
                    } else if handle_key(&mut app, key.code, key.modifiers) {
                        break;
                    }
                }
                Event::Mouse(mouse) => {
                    if matches!(
                        mouse.kind,
                        MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left)
                    ) {
                        let size = terminal.size()?;
                        app.on_click(mouse.column, mouse.row, Rect::new(0, 0, size.width, size.height));
                    }
                }
                _ => {}
            }
        }

        // Tick simulation
        app.tick(0.1);
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    tracing::info!("spell_tui exiting");
    Ok(())
}
