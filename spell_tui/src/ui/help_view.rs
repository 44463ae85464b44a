//! Help tab view

use super::header;
use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let keys = vec![
        header("Navigation"),
        key_line("1-6", "Jump to tab (Forge/Grimoire/Codex/Battle/Import/Help)"),
        key_line("Tab / Shift+Tab", "Next/previous tab"),
        key_line("↑/k  ↓/j", "Move / scroll"),
        key_line("←/h  →/l", "Adjust value / switch section"),
        key_line("q / Ctrl+C", "Quit"),
        key_line("?", "Help"),
        Line::from(""),
        header("Forge"),
        key_line("Enter / Space", "Cast, release, roll fate or acknowledge"),
        key_line("r", "Reset the invocation"),
        key_line("Mouse", "Drag the HP slider or click the dial"),
        key_line("n", "New persona from the current dial"),
        key_line("a", "Save the selection as a manual spell"),
        key_line("s", "Pause / resume live vitals"),
        key_line("g", "Reroll the environment"),
        key_line("b", "Drift body temperature"),
        key_line("PgUp / PgDn", "Scroll the calculation"),
        Line::from(""),
        header("Grimoire"),
        key_line("Enter", "Load as known spell"),
        key_line("/", "Search by name or attribute"),
        key_line("f / o", "Cycle system filter / sort order"),
        key_line("e / d / x", "Rename / delete / clear all"),
        Line::from(""),
        header("Codex & Battle"),
        key_line("Enter", "Apply the row (Codex) / act (Battle)"),
        key_line("+ / -", "Persona activity rate"),
        key_line("← / →", "Battle focus: Attack | Defend | Recover"),
        key_line("e", "Next enemy"),
        Line::from(""),
        header("Import"),
        key_line("Enter / i", "Type a JSON path to import"),
    ];

    let constants = &app.session.config().formula;
    let mechanics = vec![
        header("Damage Formula"),
        Line::from("  base × internal × vitality × environment"),
        Line::from("       × protection × tool × buff"),
        Line::from(""),
        formula_head("Base:"),
        Line::from(format!(
            "  {} × {}^rank, or the known spell's damage",
            constants.base_power, constants.rank_growth
        )),
        formula_head("Internal:"),
        Line::from("  1 + emotion/200 + (heart rate - 60)/400"),
        formula_head("Vitality:"),
        Line::from("  0.5 + 0.5 × HP ratio"),
        Line::from("  HP at 5% or less (not zero): crisis ×3"),
        formula_head("Environment:"),
        Line::from(format!(
            "  W density / {} × weather",
            constants.density_divisor
        )),
        Line::from("  Rain: water ×1.25, fire ×0.8"),
        Line::from("  Cloudy: wind, sound, thunder ×1.2"),
        Line::from("  Sunny: light, fire ×1.15"),
        formula_head("Protection:"),
        Line::from("  Its multiplier when it resonates with the"),
        Line::from("  attribute or system, otherwise ×1"),
        formula_head("Tool:"),
        Line::from("  power × 1.2 on a matching system × (1 + 0.1 × reinforcement)"),
        formula_head("Buff:"),
        Line::from("  1 + 0.2 × level, never below 0.1"),
        Line::from(""),
        header("Stability"),
        Line::from("  activity + 30 + 25 × HP ratio - 5 × rank"),
        Line::from("  Rank unlocks: 1, 10, 20, 35, 50, 70, 81% activity"),
        Line::from("  A failed cast near death may open Chance Mode:"),
        Line::from("  roll a 1 on a d6 for a ×2 miracle."),
    ];

    let left = Paragraph::new(keys).block(Block::default().borders(Borders::ALL).title(" Keys "));
    let right = Paragraph::new(mechanics)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Mechanics "));

    f.render_widget(left, chunks[0]);
    f.render_widget(right, chunks[1]);
}

fn formula_head(title: &str) -> Line<'static> {
    Line::from(Span::styled(title.to_string(), Style::default().fg(Color::Yellow)))
}

fn key_line(key: &str, desc: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("  {:20}", key),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(desc.to_string(), Style::default().fg(Color::White)),
    ])
}
