//! Battle tab - HP exchange against a codex enemy

use super::{bar, health_color, header, stat_line};
use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use spell_core::{Battle, BattlePhase, CombatLogEntry, Effectiveness, Stance};

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let Some(battle) = app.session.battle() else {
        let paragraph = Paragraph::new("The codex lists no enemies.")
            .block(Block::default().borders(Borders::ALL).title(" Battle "));
        f.render_widget(paragraph, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(50),    // Status and log
            Constraint::Length(40), // Stance panel
        ])
        .split(area);

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Both HP bars
            Constraint::Min(0),    // Combat log
        ])
        .split(chunks[0]);

    draw_status(f, battle, main_chunks[0]);
    draw_log(f, app, battle, main_chunks[1]);
    draw_stance(f, app, battle, chunks[1]);
}

fn phase_style(phase: BattlePhase) -> Style {
    match phase {
        BattlePhase::PlayerTurn => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        BattlePhase::EnemyTurn => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        BattlePhase::Victory => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        BattlePhase::Defeat => Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD),
    }
}

fn draw_status(f: &mut Frame, battle: &Battle, area: Rect) {
    let enemy = battle.enemy();
    let width = area.width.saturating_sub(4) as usize;
    let enemy_percent = battle.enemy_hp_percent();
    let player_percent = if battle.player_max_hp() == 0 {
        0.0
    } else {
        battle.player_hp() as f64 / battle.player_max_hp() as f64 * 100.0
    };
    let enemy_color = health_color(enemy_percent);
    let player_color = health_color(player_percent);

    let mut player_line = vec![
        Span::styled("You: ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{}/{}", battle.player_hp(), battle.player_max_hp()),
            Style::default().fg(player_color).add_modifier(Modifier::BOLD),
        ),
    ];
    if battle.is_defending() {
        player_line.push(Span::styled("  🛡 Guarding", Style::default().fg(Color::Cyan)));
    }

    let lines = vec![
        Line::from(vec![
            Span::styled(format!("{}: ", enemy.name), Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}/{}", battle.enemy_hp(), enemy.max_hp),
                Style::default().fg(enemy_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" ({:.0}%)", enemy_percent), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(Span::styled(
            bar(battle.enemy_hp() as f64, enemy.max_hp as f64, width),
            Style::default().fg(enemy_color),
        )),
        Line::from(player_line),
        Line::from(Span::styled(
            bar(battle.player_hp() as f64, battle.player_max_hp() as f64, width),
            Style::default().fg(player_color),
        )),
        Line::from(""),
        Line::from(Span::styled(battle.phase().to_string(), phase_style(battle.phase()))),
    ];

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Combat Status "));
    f.render_widget(paragraph, area);
}

fn entry_style(entry: &CombatLogEntry, enemy_name: &str) -> Style {
    if entry.critical {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else if entry.message.starts_with(enemy_name) && entry.damage.is_some() {
        // Incoming hit
        Style::default().fg(Color::Red)
    } else {
        match entry.effectiveness {
            Some(Effectiveness::Super) => Style::default().fg(Color::LightGreen).add_modifier(Modifier::BOLD),
            Some(Effectiveness::Poor) => Style::default().fg(Color::Gray),
            Some(Effectiveness::Immune) => Style::default().fg(Color::DarkGray),
            Some(Effectiveness::Normal) => Style::default().fg(Color::Green),
            None if entry.message.contains("defeated") => {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            }
            None if entry.message.contains("collapse") => {
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
            }
            None => Style::default().fg(Color::White),
        }
    }
}

/// Newest entries first
fn draw_log(f: &mut Frame, app: &App, battle: &Battle, area: Rect) {
    let enemy_name = battle.enemy().name.as_str();
    let items: Vec<ListItem> = battle
        .log()
        .entries()
        .iter()
        .rev()
        .skip(app.log_scroll)
        .take(area.height.saturating_sub(2) as usize)
        .map(|entry| {
            ListItem::new(Line::from(Span::styled(
                entry.display(),
                entry_style(entry, enemy_name),
            )))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Combat Log (↑/↓ to scroll) "),
    );
    f.render_widget(list, area);
}

/// Focus slider with the stance bands marked
fn focus_track(focus: f64, attack_below: f64, defend_below: f64, width: usize) -> Vec<Span<'static>> {
    if width == 0 {
        return Vec::new();
    }
    let knob = ((focus.clamp(0.0, 1.0) * (width - 1) as f64).round()) as usize;
    (0..width)
        .map(|i| {
            let at = i as f64 / (width - 1).max(1) as f64;
            let color = if at < attack_below {
                Color::Red
            } else if at < defend_below {
                Color::Cyan
            } else {
                Color::Green
            };
            if i == knob {
                Span::styled("●", Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
            } else {
                Span::styled("─", Style::default().fg(color))
            }
        })
        .collect()
}

fn draw_stance(f: &mut Frame, app: &App, battle: &Battle, area: Rect) {
    let constants = battle.constants();
    let focus = app.session.battle_focus();
    let stance = app.session.battle_stance();
    let width = area.width.saturating_sub(4) as usize;
    let selection = app.session.selection();
    let effectiveness = battle.enemy().effectiveness(&selection.attribute);

    let mut lines = vec![
        header("Focus"),
        Line::from(focus_track(
            focus,
            constants.stance_attack_below,
            constants.stance_defend_below,
            width,
        )),
        Line::from(""),
    ];
    for option in Stance::all() {
        let selected = *option == stance;
        let style = if selected {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let note = match option {
            Stance::Attack => format!("cast {}", selection.attribute),
            Stance::Defend => format!("-{:.0}% next hit", constants.defend_mitigation * 100.0),
            Stance::Recover => format!("+{:.0}% HP", constants.recover_fraction * 100.0),
        };
        lines.push(Line::from(vec![
            Span::styled(if selected { "▶ " } else { "  " }, style),
            Span::styled(format!("{:8}", option.name()), style),
            Span::styled(note, Style::default().fg(Color::Gray)),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(header("Matchup"));
    lines.push(stat_line("Enemy attr", battle.enemy().attribute.clone()));
    lines.push(stat_line("Your attr", selection.attribute.clone()));
    lines.push(stat_line(
        "Effect",
        format!("{} x{:.1}", effectiveness.name(), effectiveness.multiplier(constants)),
    ));
    lines.push(stat_line("Rank", format!("{}", selection.rank)));

    if battle.phase().is_over() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "[r] fight again  [e] next enemy",
            Style::default().fg(Color::Yellow),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Stance "));
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_track_knob_position() {
        let track = focus_track(0.0, 0.34, 0.67, 11);
        assert_eq!(track.len(), 11);
        assert_eq!(track[0].content, "●");
        let track = focus_track(1.0, 0.34, 0.67, 11);
        assert_eq!(track[10].content, "●");
        assert_eq!(track[0].content, "─");
        assert!(focus_track(0.5, 0.34, 0.67, 0).is_empty());
    }

    #[test]
    fn test_focus_track_band_colors() {
        let track = focus_track(0.0, 0.34, 0.67, 11);
        assert_eq!(track[2].style.fg, Some(Color::Red));
        assert_eq!(track[5].style.fg, Some(Color::Cyan));
        assert_eq!(track[9].style.fg, Some(Color::Green));
    }
}
