//! Import tab - load extra attributes from a JSON file

use super::{circle, header, stat_line};
use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use spell_core::MagicSystem;

const EXAMPLE: [&str; 10] = [
    "{",
    "  \"attributes\": [",
    "    {",
    "      \"name\": \"Void\",",
    "      \"system\": \"因果系\",",
    "      \"kanji\": \"虚無\",",
    "      \"reading\": \"キョム\"",
    "    }",
    "  ]",
    "}",
];

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(0)])
        .split(chunks[1]);

    draw_instructions(f, chunks[0]);
    draw_counts(f, app, right[0]);
    draw_history(f, app, right[1]);
}

fn draw_instructions(f: &mut Frame, area: Rect) {
    let mut lines = vec![
        header("Attribute Import"),
        Line::from("Press [Enter] or [i] and type the path of a JSON file."),
        Line::from("The whole file is checked first; one bad record rejects it."),
        Line::from(""),
        Line::from(Span::styled("Fields:", Style::default().fg(Color::Yellow))),
        Line::from("  name     attribute name (required)"),
        Line::from("  system   因果系 / Causal, 元素系 / Elemental, ..."),
        Line::from("  kanji    used for the spell name"),
        Line::from("  reading  shown next to the attribute"),
        Line::from("  tone     optional flavour tag"),
        Line::from(""),
        Line::from(Span::styled("Example:", Style::default().fg(Color::Yellow))),
    ];
    lines.extend(
        EXAMPLE
            .iter()
            .map(|l| Line::from(Span::styled(*l, Style::default().fg(Color::Green)))),
    );

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Import "));
    f.render_widget(paragraph, area);
}

fn draw_counts(f: &mut Frame, app: &App, area: Rect) {
    let codex = app.codex();
    let mut lines = vec![header("Attributes per system")];
    for system in MagicSystem::all() {
        let count = codex.attributes_of(*system).len();
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:12}", system.english()),
                Style::default().fg(circle::system_color(*system)),
            ),
            Span::styled(format!("{}", count), Style::default().fg(Color::White)),
        ]));
    }
    lines.push(stat_line("Total", format!("{}", codex.attributes().len())));

    let paragraph = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

fn draw_history(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .import_history
        .iter()
        .rev()
        .take(area.height.saturating_sub(2) as usize)
        .map(|line| {
            let style = if line.starts_with('✗') {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            };
            ListItem::new(Line::from(Span::styled(line.clone(), style)))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" History "));
    f.render_widget(list, area);
}
