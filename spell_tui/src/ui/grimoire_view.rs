//! Grimoire tab - recorded spells with filter, search and sort

use super::{circle, header, stat_line};
use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(chunks[0]);

    draw_query(f, app, left[0]);
    draw_entries(f, app, left[1]);
    draw_detail(f, app, chunks[1]);
}

fn draw_query(f: &mut Frame, app: &App, area: Rect) {
    let query = &app.grimoire_query;
    let filter = query
        .system
        .map(|s| s.label().to_string())
        .unwrap_or_else(|| "ALL".to_string());
    let search = if query.search.is_empty() {
        "-".to_string()
    } else {
        query.search.clone()
    };

    let line = Line::from(vec![
        Span::styled("Filter: ", Style::default().fg(Color::Gray)),
        Span::styled(filter, Style::default().fg(Color::Yellow)),
        Span::styled("  Sort: ", Style::default().fg(Color::Gray)),
        Span::styled(query.sort.name(), Style::default().fg(Color::Yellow)),
        Span::styled("  Search: ", Style::default().fg(Color::Gray)),
        Span::styled(search, Style::default().fg(Color::White)),
    ]);

    let paragraph = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

fn draw_entries(f: &mut Frame, app: &App, area: Rect) {
    let entries = app.visible_entries();
    let active = app.session.selection().active_spell_id.as_deref();
    let visible_rows = area.height.saturating_sub(2) as usize;
    let skip = app.selected_entry.saturating_sub(visible_rows.saturating_sub(1));

    let items: Vec<ListItem> = entries
        .iter()
        .enumerate()
        .skip(skip)
        .take(visible_rows)
        .map(|(i, entry)| {
            let selected = i == app.selected_entry;
            let marker = if Some(entry.id.as_str()) == active { "★" } else { " " };
            let style = if selected {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::from(vec![
                Span::styled(if selected { "▶ " } else { "  " }, style),
                Span::styled(marker, Style::default().fg(Color::Magenta)),
                Span::styled(
                    format!("{} ", entry.spell.system.label()),
                    Style::default().fg(circle::system_color(entry.spell.system)),
                ),
                Span::styled(entry.spell.name.clone(), style),
                Span::styled(
                    format!("  R{}  {}", entry.spell.rank, entry.spell.predicted_damage),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let title = format!(" Grimoire ({}/{}) ", entries.len(), app.session.grimoire().len());
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(list, area);
}

fn draw_detail(f: &mut Frame, app: &App, area: Rect) {
    let entries = app.visible_entries();
    let Some(entry) = entries.get(app.selected_entry) else {
        let paragraph = Paragraph::new(vec![
            Line::from(Span::styled(
                "No spells match.",
                Style::default().fg(Color::DarkGray),
            )),
            Line::from("Cast in the forge or press [a] to register one."),
        ])
        .block(Block::default().borders(Borders::ALL).title(" Entry "));
        f.render_widget(paragraph, area);
        return;
    };

    let spell = &entry.spell;
    let color = circle::parse_hex(&spell.eye_color).unwrap_or(Color::White);
    let mut lines = vec![
        Line::from(Span::styled(
            spell.name.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        stat_line("Id", entry.id.clone()),
        stat_line("System", format!("{} ({})", spell.system.label(), spell.system.english())),
        stat_line("Attribute", spell.attribute.clone()),
        stat_line("Rank", format!("{}", spell.rank)),
        stat_line("Damage", format!("{}", spell.predicted_damage)),
        stat_line("Protection", spell.protection_name.clone()),
        stat_line("Tool", spell.tool_name.clone()),
        Line::from(""),
        header("Chant"),
        Line::from(Span::styled(
            format!("「{}」", spell.chant),
            Style::default().fg(Color::LightCyan).add_modifier(Modifier::ITALIC),
        )),
        Line::from(""),
        header("Description"),
        Line::from(spell.description.clone()),
    ];
    if spell.hidden_art {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "✦ Hidden art",
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Entry "));
    f.render_widget(paragraph, area);
}
