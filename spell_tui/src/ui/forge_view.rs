//! Forge tab view: vitals, magic circle, parameters and the analysis

use super::{bar, circle, header, stat_line, track};
use crate::app::{App, ForgeField};
use crate::{ecg, slider};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::canvas::{Canvas, Circle, Line as CanvasLine, Points},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use spell_core::formula::factors;
use spell_core::invocation::{InvocationState, INVOCATION_STEPS};

/// Seconds of heartbeat shown on the ECG strip
const ECG_WINDOW: f64 = 4.0;

/// Screen regions of the forge tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForgeRegions {
    pub hp_slider: Rect,
    pub dial: Rect,
    pub ecg: Rect,
    pub sensors: Rect,
    pub circle: Rect,
    pub steps: Rect,
    pub params: Rect,
    pub result: Rect,
}

/// Split the content area; mouse hit-testing uses the same rectangles
pub fn regions(area: Rect) -> ForgeRegions {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(34), // Vitals
            Constraint::Min(30),    // Magic circle
            Constraint::Length(48), // Parameters
        ])
        .split(area);

    let vitals = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(13),
            Constraint::Length(6),
            Constraint::Min(0),
        ])
        .split(columns[0]);

    let sliders = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(8), Constraint::Min(0)])
        .split(vitals[0]);

    let center = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(12), Constraint::Length(10)])
        .split(columns[1]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(14), Constraint::Min(0)])
        .split(columns[2]);

    ForgeRegions {
        hp_slider: sliders[0],
        dial: sliders[1],
        ecg: vitals[1],
        sensors: vitals[2],
        circle: center[0],
        steps: center[1],
        params: right[0],
        result: right[1],
    }
}

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let r = regions(area);
    draw_hp_slider(f, app, r.hp_slider);
    draw_dial(f, app, r.dial);
    draw_ecg(f, app, r.ecg);
    draw_sensors(f, app, r.sensors);
    circle::draw(f, app, r.circle);
    draw_steps(f, app, r.steps);
    draw_params(f, app, r.params);
    draw_result(f, app, r.result);
}

fn hp_color(percent: f64) -> Style {
    if percent <= 5.0 {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK)
    } else if percent <= 20.0 {
        Style::default().fg(Color::Red)
    } else if percent <= 50.0 {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Green)
    }
}

fn activity_color(rate: f64) -> Color {
    if rate >= 81.0 {
        Color::LightMagenta
    } else if rate >= 50.0 {
        Color::Cyan
    } else {
        Color::Blue
    }
}

fn draw_hp_slider(f: &mut Frame, app: &App, area: Rect) {
    let caster = app.session.caster();
    let inner = track(area);
    let filled = slider::filled_rows(caster.hp as f64, caster.max_hp as f64, inner.height);
    let style = hp_color(caster.hp_percent());

    let lines: Vec<Line> = (0..inner.height)
        .map(|row| {
            let cell = if row >= inner.height - filled { "█" } else { "░" };
            Line::from(Span::styled(cell.repeat(inner.width as usize), style))
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" HP ")
            .title_bottom(format!("{}", caster.hp)),
    );
    f.render_widget(paragraph, area);
}

fn draw_dial(f: &mut Frame, app: &App, area: Rect) {
    let rate = app.session.selection().activity_rate;
    let color = activity_color(rate);
    let arc: Vec<(f64, f64)> = (0..=(rate * 2.0) as usize)
        .map(|half| slider::dial_point(half as f64 / 2.0, 1.0))
        .collect();
    let (kx, ky) = slider::dial_point(rate, 1.0);

    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title(" Activity "))
        .marker(Marker::Braille)
        .x_bounds([-1.3, 1.3])
        .y_bounds([-1.3, 1.3])
        .paint(move |ctx| {
            ctx.draw(&Circle {
                x: 0.0,
                y: 0.0,
                radius: 1.0,
                color: Color::DarkGray,
            });
            ctx.draw(&Points { coords: &arc, color });
            ctx.draw(&CanvasLine {
                x1: kx * 0.8,
                y1: ky * 0.8,
                x2: kx,
                y2: ky,
                color: Color::White,
            });
            ctx.print(
                -0.35,
                0.0,
                Span::styled(format!("{:.1}%", rate), Style::default().fg(color).add_modifier(Modifier::BOLD)),
            );
        });
    f.render_widget(canvas, area);
}

fn draw_ecg(f: &mut Frame, app: &App, area: Rect) {
    let bpm = app.session.caster().heart_rate;
    let color = ecg::trace_color(bpm);
    let points = ecg::trace(bpm, app.time_elapsed, ECG_WINDOW, (area.width as usize * 2).max(2));

    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" ECG {} BPM ", bpm)),
        )
        .marker(Marker::Braille)
        .x_bounds([0.0, ECG_WINDOW])
        .y_bounds([-0.5, 1.0])
        .paint(move |ctx| {
            for pair in points.windows(2) {
                ctx.draw(&CanvasLine {
                    x1: pair[0].0,
                    y1: pair[0].1,
                    x2: pair[1].0,
                    y2: pair[1].1,
                    color,
                });
            }
        });
    f.render_widget(canvas, area);
}

fn draw_sensors(f: &mut Frame, app: &App, area: Rect) {
    let caster = app.session.caster();
    let env = app.session.environment();

    let lines = vec![
        header("Vitals"),
        stat_line("Body temp", format!("{:.1}°C", caster.body_temp)),
        stat_line("BP", format!("{} mmHg", caster.blood_pressure)),
        stat_line("Resp", format!("{} /min", caster.respiration)),
        stat_line("SpO2", format!("{:.1}%", caster.spo2)),
        stat_line("Emotion", format!("{}", caster.emotion_index)),
        stat_line("State", caster.consciousness.clone()),
        Line::from(""),
        header("Environment"),
        stat_line("Weather", env.weather.to_string()),
        stat_line("Temp", format!("{:.1}°C  {}%", env.temperature, env.humidity)),
        stat_line("W density", format!("{}", env.w_density)),
        stat_line(
            "Location",
            format!("{:.2}, {:.2} {}m", env.location.lat, env.location.lng, env.location.alt),
        ),
        Line::from(""),
        header("Forecast"),
        stat_line("Stability", format!("{}%", app.session.stability())),
        stat_line("Est. output", format!("{}", app.session.estimated_output())),
        stat_line(
            "Sensors",
            if app.session.simulation_enabled() { "live" } else { "paused" },
        ),
    ];

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Sensors "));
    f.render_widget(paragraph, area);
}

fn draw_steps(f: &mut Frame, app: &App, area: Rect) {
    let invocation = app.session.invocation();
    let state = invocation.state();
    let step = invocation.step();
    let width = area.width.saturating_sub(4) as usize;

    let mut lines = vec![
        Line::from(vec![
            Span::styled("State: ", Style::default().fg(Color::Gray)),
            Span::styled(state.name(), Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        ]),
        Line::from(Span::styled(
            bar(invocation.progress(), 1.0, width),
            Style::default().fg(Color::Magenta),
        )),
    ];

    for (i, label) in INVOCATION_STEPS.iter().enumerate() {
        let (marker, style) = match state {
            InvocationState::Ready | InvocationState::Complete => ("✓", Style::default().fg(Color::Green)),
            InvocationState::Analyzing | InvocationState::Manifesting if i < step => {
                ("✓", Style::default().fg(Color::Green))
            }
            InvocationState::Analyzing | InvocationState::Manifesting if i == step => (
                "▶",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            _ => ("·", Style::default().fg(Color::DarkGray)),
        };
        lines.push(Line::from(Span::styled(format!("{} {}", marker, label), style)));
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Invocation "));
    f.render_widget(paragraph, area);
}

fn field_value(app: &App, field: ForgeField) -> (String, Option<Color>) {
    let session = &app.session;
    let selection = session.selection();
    let codex = session.codex();
    let constants = &session.config().formula;

    match field {
        ForgeField::Character => {
            let name = selection
                .character_id
                .as_deref()
                .and_then(|id| codex.character(id))
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "(manual)".to_string());
            (name, None)
        }
        ForgeField::System => (
            format!("{} ({})", selection.system.label(), selection.system.english()),
            Some(circle::system_color(selection.system)),
        ),
        ForgeField::Attribute => {
            let keyword = codex.keyword(&selection.attribute, selection.system);
            (format!("{} [{}]", selection.attribute, keyword.reading), None)
        }
        ForgeField::Rank => {
            let rank = codex.rank(selection.rank);
            (
                format!("{} {} (max {})", selection.rank, rank.ring_name, session.max_available_rank()),
                None,
            )
        }
        ForgeField::Activity => (
            format!("{:.1}%", selection.activity_rate),
            Some(activity_color(selection.activity_rate)),
        ),
        ForgeField::Hp => {
            let caster = session.caster();
            let crisis = factors::is_crisis(caster.hp_ratio(), constants);
            let text = format!("{}/{}{}", caster.hp, caster.max_hp, if crisis { "  CRISIS x3" } else { "" });
            (text, crisis.then_some(Color::Red))
        }
        ForgeField::Protection => {
            let protection = codex.protection_or_none(&selection.protection_id);
            let active = protection.resonates_with(&selection.attribute, selection.system);
            let text = if protection.is_none() {
                protection.name.clone()
            } else if active {
                format!("{} x{:.1} ✦", protection.name, protection.multiplier)
            } else {
                format!("{} (dormant)", protection.name)
            };
            (text, active.then_some(Color::Yellow))
        }
        ForgeField::Tool => {
            let tool = codex.tool_or_unarmed(&selection.tool_id);
            let factor = factors::tool_factor(&tool, selection.system, selection.reinforcement, constants);
            (format!("{} x{:.2}", tool.name, factor), None)
        }
        ForgeField::Reinforcement => (format!("{:+}", selection.reinforcement), None),
        ForgeField::Buff => (
            format!(
                "{:+} (x{:.1})",
                selection.buff_level,
                factors::buff_factor(selection.buff_level, constants)
            ),
            None,
        ),
    }
}

fn draw_params(f: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = ForgeField::all()
        .iter()
        .map(|field| {
            let selected = *field == app.forge_field;
            let (value, color) = field_value(app, *field);
            let marker = if selected { "▶ " } else { "  " };
            let name_style = if selected {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(vec![
                Span::styled(format!("{}{:11}", marker, field.name()), name_style),
                Span::styled(value, Style::default().fg(color.unwrap_or(Color::White))),
            ])
        })
        .collect();

    if let Some(id) = app.session.selection().active_spell_id.as_deref() {
        let name = app
            .session
            .grimoire()
            .get(id)
            .map(|e| e.spell.name.clone())
            .unwrap_or_else(|| id.to_string());
        lines.push(Line::from(Span::styled(
            format!("  Known spell: {}", name),
            Style::default().fg(Color::Magenta),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Parameters "));
    f.render_widget(paragraph, area);
}

fn draw_result(f: &mut Frame, app: &App, area: Rect) {
    let invocation = app.session.invocation();
    let mut lines: Vec<Line> = Vec::new();

    match invocation.state() {
        InvocationState::Error(reason) => {
            lines.push(Line::from(Span::styled(
                "⚠ INVOCATION FAILED",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(reason.clone(), Style::default().fg(Color::Red))));
            lines.push(Line::from(""));
            lines.push(Line::from("[Enter] acknowledge"));
        }
        InvocationState::AwaitingFate => {
            lines.push(Line::from(Span::styled(
                "🎲 CHANCE MODE",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from("The spell is collapsing, yet something answers."));
            lines.push(Line::from("Roll a 1 on the die to force a miracle (x2)."));
            lines.push(Line::from(""));
            lines.push(Line::from("[Enter] roll   [r] give up"));
        }
        _ => {
            let spell = invocation
                .analysis()
                .or_else(|| app.session.current_spell().map(|e| &e.spell));
            match spell {
                Some(spell) => {
                    let color = circle::parse_hex(&spell.eye_color).unwrap_or(Color::White);
                    lines.push(Line::from(Span::styled(
                        spell.name.clone(),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    )));
                    lines.push(stat_line("Damage", format!("{}", spell.predicted_damage)));
                    lines.push(stat_line("Domain", spell.domain.clone()));
                    lines.push(stat_line("Type", spell.lore.magic_type.clone()));
                    lines.push(stat_line("Cost", spell.lore.cost.clone()));
                    lines.push(stat_line("OIP", format!("{} @ {}", spell.oip_amplitude, spell.oip_frequency)));
                    lines.push(Line::from(Span::styled(
                        format!("「{}」", spell.chant),
                        Style::default().fg(Color::LightCyan).add_modifier(Modifier::ITALIC),
                    )));
                    lines.push(Line::from(spell.description.clone()));
                    lines.push(Line::from(""));
                    lines.push(header("Calculation"));
                    for line in spell.trace.lines().skip(app.trace_scroll) {
                        let style = if line.starts_with("TOTAL") {
                            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                        } else if line.starts_with("[FATE]") || line.starts_with("[HIDDEN") {
                            Style::default().fg(Color::Magenta)
                        } else {
                            Style::default().fg(Color::Gray)
                        };
                        lines.push(Line::from(Span::styled(line.to_string(), style)));
                    }
                }
                None => {
                    lines.push(Line::from(Span::styled(
                        "No spell analysed yet.",
                        Style::default().fg(Color::DarkGray),
                    )));
                    lines.push(Line::from("Press [Enter] to begin the invocation."));
                }
            }
        }
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Analysis "));
    f.render_widget(paragraph, area);
}
