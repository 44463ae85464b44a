//! Codex tab - reference records the forge draws on

use super::{circle, header, stat_line};
use crate::app::{App, CodexSection};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(rows[1]);

    draw_sections(f, app, rows[0]);
    draw_list(f, app, columns[0]);
    draw_detail(f, app, columns[1]);
}

fn draw_sections(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = Vec::new();
    for (i, section) in CodexSection::all().iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
        }
        let style = if *section == app.codex_section {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(section.name(), style));
    }
    let paragraph = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title(" Codex "));
    f.render_widget(paragraph, area);
}

/// (label, colour) of every row in the current section
fn rows(app: &App) -> Vec<(String, Color)> {
    let codex = app.codex();
    let selection = app.session.selection();
    match app.codex_section {
        CodexSection::Attributes => codex
            .attributes()
            .iter()
            .map(|a| {
                (
                    format!("{} {} [{}]", a.system.label(), a.name, a.reading),
                    circle::system_color(a.system),
                )
            })
            .collect(),
        CodexSection::Protections => codex
            .protections()
            .iter()
            .map(|p| {
                let color = if p.id == selection.protection_id { Color::Yellow } else { Color::White };
                (format!("{} x{:.1}", p.name, p.multiplier), color)
            })
            .collect(),
        CodexSection::Tools => codex
            .tools()
            .iter()
            .map(|t| {
                let color = if t.id == selection.tool_id { Color::Yellow } else { Color::White };
                (format!("{} x{:.2}", t.name, t.power_bonus), color)
            })
            .collect(),
        CodexSection::Characters => codex
            .characters()
            .iter()
            .map(|c| {
                let color = if selection.character_id.as_deref() == Some(c.id.as_str()) {
                    Color::Yellow
                } else {
                    Color::White
                };
                (format!("{} ({:.1}%)", c.name, c.activity_rate), color)
            })
            .collect(),
        CodexSection::Ranks => (1..=7u8)
            .map(|r| {
                let rank = codex.rank(r);
                let color = if app.session.is_rank_available(r) { Color::White } else { Color::DarkGray };
                (format!("{} {}", r, rank.ring_name), color)
            })
            .collect(),
        CodexSection::Enemies => codex
            .enemies()
            .iter()
            .map(|e| (format!("{} ({} HP)", e.name, e.max_hp), Color::White))
            .collect(),
    }
}

fn draw_list(f: &mut Frame, app: &App, area: Rect) {
    let visible_rows = area.height.saturating_sub(2) as usize;
    let skip = app.codex_selected.saturating_sub(visible_rows.saturating_sub(1));

    let items: Vec<ListItem> = rows(app)
        .into_iter()
        .enumerate()
        .skip(skip)
        .take(visible_rows)
        .map(|(i, (label, color))| {
            let selected = i == app.codex_selected;
            let style = if selected {
                Style::default().fg(color).add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(color)
            };
            ListItem::new(Line::from(Span::styled(format!(" {} ", label), style)))
        })
        .collect();

    let title = format!(" {} ({}) ", app.codex_section.name(), app.codex_len());
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(list, area);
}

fn detail_lines(app: &App) -> Vec<Line<'static>> {
    let codex = app.codex();
    let idx = app.codex_selected;

    match app.codex_section {
        CodexSection::Attributes => codex
            .attributes()
            .get(idx)
            .map(|a| {
                vec![
                    header(&a.name),
                    stat_line("System", format!("{} ({})", a.system.label(), a.system.english())),
                    stat_line("Kanji", a.kanji.clone()),
                    stat_line("Reading", a.reading.clone()),
                    stat_line("Tone", a.tone.clone()),
                ]
            })
            .unwrap_or_default(),
        CodexSection::Protections => codex
            .protections()
            .get(idx)
            .map(|p| {
                let compatible = if p.compatible.is_empty() {
                    "-".to_string()
                } else {
                    p.compatible.join(", ")
                };
                vec![
                    header(&p.name),
                    stat_line("Category", p.category.clone()),
                    stat_line("Multiplier", format!("x{:.1}", p.multiplier)),
                    stat_line("Resonates", compatible),
                    Line::from(""),
                    Line::from(p.description.clone()),
                ]
            })
            .unwrap_or_default(),
        CodexSection::Tools => codex
            .tools()
            .get(idx)
            .map(|t| {
                let systems: Vec<&str> = t.compatible_systems.iter().map(|s| s.label()).collect();
                vec![
                    header(&t.name),
                    stat_line("Category", t.category.clone()),
                    stat_line("Power", format!("x{:.2}", t.power_bonus)),
                    stat_line(
                        "Systems",
                        if systems.is_empty() { "-".to_string() } else { systems.join(", ") },
                    ),
                    Line::from(""),
                    Line::from(t.description.clone()),
                ]
            })
            .unwrap_or_default(),
        CodexSection::Characters => codex
            .characters()
            .get(idx)
            .map(|c| {
                let protection = codex.protection_or_none(&c.protection_id);
                vec![
                    header(&c.name),
                    stat_line("Id", c.id.clone()),
                    stat_line("Protection", protection.name),
                    stat_line("Activity", format!("{:.1}%", c.activity_rate)),
                    Line::from(""),
                    Line::from(c.description.clone()),
                    Line::from(""),
                    Line::from(Span::styled(
                        "[Enter] apply  [+/-] activity",
                        Style::default().fg(Color::DarkGray),
                    )),
                ]
            })
            .unwrap_or_default(),
        CodexSection::Ranks => {
            let r = (idx as u8).saturating_add(1);
            let rank = codex.rank(r);
            let available = app.session.is_rank_available(r);
            vec![
                header(&format!("Rank {}", r)),
                stat_line("Ring", format!("{} ({})", rank.ring_name, rank.ring_alias)),
                stat_line("Suffix", rank.suffix.clone()),
                stat_line("Theory", rank.theory.clone()),
                stat_line("Effect", rank.effect.clone()),
                stat_line("Requires", format!("{:.0}% activity", app.session.rank_requirement(r))),
                Line::from(Span::styled(
                    if available { "Available" } else { "Locked" },
                    Style::default().fg(if available { Color::Green } else { Color::Red }),
                )),
            ]
        }
        CodexSection::Enemies => codex
            .enemies()
            .get(idx)
            .map(|e| {
                let tags = |list: &[String]| if list.is_empty() { "-".to_string() } else { list.join(", ") };
                vec![
                    header(&e.name),
                    stat_line("Attribute", e.attribute.clone()),
                    stat_line("HP", format!("{}", e.max_hp)),
                    stat_line("Attack", format!("{}", e.attack_power)),
                    stat_line("Weak", tags(&e.weaknesses)),
                    stat_line("Resists", tags(&e.resistances)),
                    stat_line("Immune", tags(&e.immunities)),
                    Line::from(""),
                    Line::from(e.description.clone()),
                ]
            })
            .unwrap_or_default(),
    }
}

fn draw_detail(f: &mut Frame, app: &App, area: Rect) {
    let paragraph = Paragraph::new(detail_lines(app))
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Details "));
    f.render_widget(paragraph, area);
}
