//! Magic circle canvas: dashed ring, counter-rotating square and the W-core eye

use crate::app::App;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::canvas::{Canvas, Circle, Line as CanvasLine, Points},
    widgets::{Block, Borders},
    Frame,
};
use spell_core::invocation::InvocationState;
use spell_core::MagicSystem;
use std::f64::consts::PI;

/// Seconds per turn of the outer ring
const RING_PERIOD: f64 = 30.0;
/// Seconds per turn of the square, counter-clockwise
const SQUARE_PERIOD: f64 = 20.0;
/// Dash-dot pattern along the ring, in degrees: dash, gap, dot, gap
const DASH_PATTERN: [f64; 4] = [15.0, 5.0, 2.0, 5.0];

pub fn system_color(system: MagicSystem) -> Color {
    match system {
        MagicSystem::Elemental => Color::Rgb(0xef, 0x44, 0x44),
        MagicSystem::Causal => Color::Rgb(0x8b, 0x5c, 0xf6),
        MagicSystem::Creation => Color::Rgb(0x10, 0xb9, 0x81),
        MagicSystem::Dawn => Color::Rgb(0xfe, 0xf0, 0x8a),
        MagicSystem::Other => Color::Rgb(0x94, 0xa3, 0xb8),
    }
}

/// "#rrggbb" to an RGB colour
pub fn parse_hex(hex: &str) -> Option<Color> {
    let digits = hex.trim().strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// Rings are hidden during the first analysis steps
pub fn circle_active(state: &InvocationState, step: usize) -> bool {
    match state {
        InvocationState::Idle | InvocationState::Manifesting | InvocationState::Ready => true,
        InvocationState::Analyzing => step >= 2,
        _ => false,
    }
}

/// The eye opens once the analysis has started reading the caster
pub fn eye_active(state: &InvocationState, step: usize) -> bool {
    match state {
        InvocationState::Manifesting | InvocationState::Ready => true,
        InvocationState::Analyzing => step >= 1,
        _ => false,
    }
}

/// Points of the dash-dot ring rotated to `time`
pub fn ring_points(radius: f64, time: f64) -> Vec<(f64, f64)> {
    let offset = (time / RING_PERIOD).rem_euclid(1.0) * 360.0;
    let cycle: f64 = DASH_PATTERN.iter().sum();
    let mut points = Vec::new();
    let mut degree = 0.0;
    while degree < 360.0 {
        let within = degree % cycle;
        let on = within < DASH_PATTERN[0]
            || (within >= DASH_PATTERN[0] + DASH_PATTERN[1]
                && within < DASH_PATTERN[0] + DASH_PATTERN[1] + DASH_PATTERN[2]);
        if on {
            let angle = (degree + offset).to_radians();
            points.push((radius * angle.sin(), radius * angle.cos()));
        }
        degree += 0.5;
    }
    points
}

/// Corners of the square, rotated against the ring
pub fn square_corners(half: f64, time: f64) -> [(f64, f64); 4] {
    let spin = (time / SQUARE_PERIOD).rem_euclid(1.0) * 2.0 * PI;
    let radius = half * 2f64.sqrt();
    let corner = |k: f64| {
        let angle = spin + PI / 4.0 + k * PI / 2.0;
        (radius * angle.cos(), radius * angle.sin())
    };
    [corner(0.0), corner(1.0), corner(2.0), corner(3.0)]
}

fn eye_outline(width: f64, height: f64) -> Vec<(f64, f64)> {
    (0..=120)
        .flat_map(|i| {
            let x = -width + 2.0 * width * i as f64 / 120.0;
            let y = height * (1.0 - (x / width).powi(2));
            [(x, y), (x, -y)]
        })
        .collect()
}

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let session = &app.session;
    let invocation = session.invocation();
    let state = invocation.state().clone();
    let step = invocation.step();
    let time = app.time_elapsed;

    let base = system_color(session.selection().system);
    let eye_color = invocation
        .analysis()
        .and_then(|spell| parse_hex(&spell.eye_color))
        .unwrap_or(base);
    let manifesting = matches!(state, InvocationState::Manifesting | InvocationState::Ready);
    let stroke = if manifesting { eye_color } else { base };
    let show_circle = circle_active(&state, step);
    let show_eye = eye_active(&state, step);

    let ring = ring_points(1.0, time);
    let inner_ring_radius = 0.92;
    let corners = square_corners(0.5, time);
    let eye = eye_outline(0.42, 0.22);

    let title = match invocation.step_label() {
        Some(label) => format!(" {} ", label),
        None => format!(" {} ", session.selection().attribute),
    };
    let footer = if matches!(state, InvocationState::Ready) {
        " [Enter] RELEASE "
    } else {
        ""
    };

    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_bottom(footer),
        )
        .marker(Marker::Braille)
        .x_bounds([-1.2, 1.2])
        .y_bounds([-1.2, 1.2])
        .paint(move |ctx| {
            if show_circle {
                ctx.draw(&Points {
                    coords: &ring,
                    color: stroke,
                });
                ctx.draw(&Circle {
                    x: 0.0,
                    y: 0.0,
                    radius: inner_ring_radius,
                    color: Color::DarkGray,
                });
                for i in 0..4 {
                    let (x1, y1) = corners[i];
                    let (x2, y2) = corners[(i + 1) % 4];
                    ctx.draw(&CanvasLine { x1, y1, x2, y2, color: stroke });
                }
                // Stabilizer crosshair
                ctx.draw(&CanvasLine { x1: -1.15, y1: 0.0, x2: 1.15, y2: 0.0, color: Color::DarkGray });
                ctx.draw(&CanvasLine { x1: 0.0, y1: -1.15, x2: 0.0, y2: 1.15, color: Color::DarkGray });
            }
            ctx.layer();
            if show_eye {
                ctx.draw(&Points {
                    coords: &eye,
                    color: Color::White,
                });
                ctx.draw(&Circle {
                    x: 0.0,
                    y: 0.0,
                    radius: 0.16,
                    color: eye_color,
                });
                ctx.draw(&Circle {
                    x: 0.0,
                    y: 0.0,
                    radius: 0.05,
                    color: eye_color,
                });
            }
            if manifesting {
                ctx.print(
                    -0.2,
                    -0.45,
                    Span::styled(
                        "W-CORE",
                        Style::default().fg(eye_color).add_modifier(Modifier::BOLD),
                    ),
                );
            }
        });
    f.render_widget(canvas, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#ef4444"), Some(Color::Rgb(0xef, 0x44, 0x44)));
        assert_eq!(parse_hex("  #00FF7f "), Some(Color::Rgb(0, 255, 127)));
        assert_eq!(parse_hex("ef4444"), None);
        assert_eq!(parse_hex("#ef44"), None);
        assert_eq!(parse_hex("#gg0000"), None);
    }

    #[test]
    fn test_visibility_by_state() {
        assert!(circle_active(&InvocationState::Idle, 0));
        assert!(!circle_active(&InvocationState::Analyzing, 1));
        assert!(circle_active(&InvocationState::Analyzing, 2));
        assert!(!circle_active(&InvocationState::Error("x".into()), 0));

        assert!(!eye_active(&InvocationState::Idle, 0));
        assert!(eye_active(&InvocationState::Analyzing, 1));
        assert!(eye_active(&InvocationState::Ready, 0));
    }

    #[test]
    fn test_ring_rotates_and_stays_on_radius() {
        let a = ring_points(1.0, 0.0);
        let b = ring_points(1.0, 7.5);
        assert!(!a.is_empty());
        assert_eq!(a.len(), b.len());
        assert!(a.iter().all(|(x, y)| ((x * x + y * y).sqrt() - 1.0).abs() < 1e-9));
        // A quarter of the period is a quarter turn
        assert!((b[0].0 - 1.0).abs() < 1e-9);
        // Full period returns to the start
        let c = ring_points(1.0, RING_PERIOD);
        assert!((c[0].0 - a[0].0).abs() < 1e-9);
    }

    #[test]
    fn test_square_corners_counter_rotate() {
        let start = square_corners(0.5, 0.0);
        assert!((start[0].0 - 0.5).abs() < 1e-9);
        assert!((start[0].1 - 0.5).abs() < 1e-9);
        // A quarter period turns a corner counter-clockwise by 90 degrees
        let later = square_corners(0.5, SQUARE_PERIOD / 4.0);
        assert!((later[0].0 + 0.5).abs() < 1e-9);
        assert!((later[0].1 - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_system_colors_differ() {
        let colors: Vec<Color> = MagicSystem::all().iter().map(|s| system_color(*s)).collect();
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
