//! UI rendering

mod battle_view;
mod circle;
mod codex_view;
pub mod forge_view;
mod grimoire_view;
mod help_view;
mod import_view;

use crate::app::{App, Tab};
use ratatui::{
    layout::{Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

fn root_chunks(frame: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status / prompt
            Constraint::Length(3), // Keybindings footer
        ])
        .split(frame)
}

/// Area the active tab draws into
pub fn content_area(frame: Rect) -> Rect {
    root_chunks(frame)[1]
}

/// Inside of a bordered widget
pub fn track(area: Rect) -> Rect {
    area.inner(Margin::new(1, 1))
}

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = root_chunks(f.area());

    draw_tabs(f, app, chunks[0]);

    match app.current_tab {
        Tab::Forge => forge_view::draw(f, app, chunks[1]),
        Tab::Grimoire => grimoire_view::draw(f, app, chunks[1]),
        Tab::Codex => codex_view::draw(f, app, chunks[1]),
        Tab::Battle => battle_view::draw(f, app, chunks[1]),
        Tab::Import => import_view::draw(f, app, chunks[1]),
        Tab::Help => help_view::draw(f, app, chunks[1]),
    }

    draw_status(f, app, chunks[2]);
    draw_keybindings(f, app, chunks[3]);
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let line = match &app.prompt {
        Some(prompt) => Line::from(vec![
            Span::styled(
                format!(" {}: ", prompt.kind.title()),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(prompt.buffer.clone(), Style::default().fg(Color::White)),
            Span::styled("█", Style::default().fg(Color::Yellow)),
        ]),
        None => {
            let color = if app.status.starts_with('✗') {
                Color::Red
            } else if app.status.starts_with('✓') {
                Color::Green
            } else {
                Color::Gray
            };
            Line::from(Span::styled(format!(" {}", app.status), Style::default().fg(color)))
        }
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_keybindings(f: &mut Frame, app: &App, area: Rect) {
    let common_keys = vec![
        ("Tab", "Next tab"),
        ("q", "Quit"),
    ];

    let tab_keys: Vec<(&str, &str)> = if app.prompt.is_some() {
        vec![("Enter", "Confirm"), ("Esc", "Cancel")]
    } else {
        match app.current_tab {
            Tab::Forge => vec![
                ("↑/↓", "Field"),
                ("←/→", "Adjust"),
                ("Enter", "Cast/Release"),
                ("r", "Reset"),
                ("n", "Persona"),
                ("g", "Env"),
                ("s", "Sim"),
            ],
            Tab::Grimoire => vec![
                ("Enter", "Use"),
                ("/", "Search"),
                ("f", "Filter"),
                ("o", "Sort"),
                ("a", "Add"),
                ("e", "Rename"),
                ("d", "Delete"),
            ],
            Tab::Codex => vec![
                ("←/→", "Section"),
                ("↑/↓", "Select"),
                ("Enter", "Apply"),
                ("+/-", "Persona activity"),
            ],
            Tab::Battle => vec![
                ("←/→", "Focus"),
                ("Enter/Space", "Act"),
                ("e", "Next enemy"),
                ("r", "Reset"),
            ],
            Tab::Import => vec![("Enter", "Import file")],
            Tab::Help => vec![],
        }
    };

    let mut spans: Vec<Span> = Vec::new();

    // Add tab-specific keys first
    for (i, (key, desc)) in tab_keys.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  │  ", Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::styled(
            format!("[{}]", key),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!(" {}", desc),
            Style::default().fg(Color::White),
        ));
    }

    if !tab_keys.is_empty() {
        spans.push(Span::styled("  │  ", Style::default().fg(Color::DarkGray)));
    }

    for (i, (key, desc)) in common_keys.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  │  ", Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::styled(
            format!("[{}]", key),
            Style::default().fg(Color::Cyan),
        ));
        spans.push(Span::styled(
            format!(" {}", desc),
            Style::default().fg(Color::Gray),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title(" Keys "))
        .alignment(ratatui::layout::Alignment::Center);

    f.render_widget(paragraph, area);
}

fn draw_tabs(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Tab::all()
        .iter()
        .map(|t| {
            let style = if *t == app.current_tab {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(Span::styled(t.name(), style))
        })
        .collect();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Spellforge "),
        )
        .highlight_style(Style::default().fg(Color::Yellow))
        .divider("|");

    f.render_widget(tabs, area);
}

/// Section header line used by every panel
pub fn header(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("═══ {} ═══", title),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))
}

pub fn bar(current: f64, max: f64, width: usize) -> String {
    let percent = if max > 0.0 { (current / max).clamp(0.0, 1.0) } else { 0.0 };
    let filled = (percent * width as f64) as usize;
    let empty = width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Green above half, yellow above a quarter, red below
pub fn health_color(percent: f64) -> Color {
    if percent > 50.0 {
        Color::Green
    } else if percent > 25.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}

pub fn stat_line(name: &str, value: impl Into<String>) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{:12}", name),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(value.into(), Style::default().fg(Color::White)),
    ])
}
