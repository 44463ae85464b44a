//! Pointer-to-value mappings for the HP slider and activity dial

use ratatui::layout::Rect;
use std::f64::consts::PI;

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f64 = 2.0;

/// Value of a vertical slider at a pointer row: bottom row is `min`, top row is `max`
pub fn vertical_value(row: u16, area: Rect, min: f64, max: f64) -> f64 {
    if area.height <= 1 {
        return max;
    }
    let bottom = area.y + area.height - 1;
    let delta = bottom.saturating_sub(row) as f64;
    let fraction = (delta / (area.height - 1) as f64).clamp(0.0, 1.0);
    min + fraction * (max - min)
}

/// HP picked by clicking the slider, rounded to whole points
pub fn hp_from_row(row: u16, area: Rect, max_hp: u32) -> u32 {
    vertical_value(row, area, 0.0, max_hp as f64).round() as u32
}

/// Filled rows of a vertical slider showing `value`
pub fn filled_rows(value: f64, max: f64, height: u16) -> u16 {
    if max <= 0.0 {
        return 0;
    }
    ((value / max).clamp(0.0, 1.0) * height as f64).round() as u16
}

/// Dial reading (0-100, one decimal) for a pointer position
///
/// Zero sits at twelve o'clock and values grow clockwise. Clicking the exact
/// centre has no angle and yields `None`.
pub fn dial_value(column: u16, row: u16, area: Rect) -> Option<f64> {
    let cx = area.x as f64 + (area.width as f64 - 1.0) / 2.0;
    let cy = area.y as f64 + (area.height as f64 - 1.0) / 2.0;
    let dx = column as f64 - cx;
    let dy = (cy - row as f64) * CELL_ASPECT;
    if dx.abs() < f64::EPSILON && dy.abs() < f64::EPSILON {
        return None;
    }

    let mut degrees = dx.atan2(dy).to_degrees();
    if degrees < 0.0 {
        degrees += 360.0;
    }
    let value = (degrees / 360.0 * 100.0 * 10.0).round() / 10.0;
    Some(value.clamp(0.0, 100.0))
}

/// Point on a dial of `radius` for `value`, in canvas coordinates (y up)
pub fn dial_point(value: f64, radius: f64) -> (f64, f64) {
    let angle = value.clamp(0.0, 100.0) / 100.0 * 2.0 * PI;
    (radius * angle.sin(), radius * angle.cos())
}

/// Step a value and keep it inside bounds
pub fn nudge(value: f64, delta: f64, min: f64, max: f64) -> f64 {
    (value + delta).clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertical_value_ends() {
        let area = Rect::new(0, 2, 3, 11);
        assert!((vertical_value(12, area, 0.0, 100.0) - 0.0).abs() < f64::EPSILON);
        assert!((vertical_value(2, area, 0.0, 100.0) - 100.0).abs() < f64::EPSILON);
        assert!((vertical_value(7, area, 0.0, 100.0) - 50.0).abs() < f64::EPSILON);
        // Outside the track clamps
        assert!((vertical_value(0, area, 0.0, 100.0) - 100.0).abs() < f64::EPSILON);
        assert!((vertical_value(30, area, 0.0, 100.0) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hp_from_row() {
        let area = Rect::new(0, 0, 3, 5);
        assert_eq!(hp_from_row(4, area, 100), 0);
        assert_eq!(hp_from_row(3, area, 100), 25);
        assert_eq!(hp_from_row(0, area, 100), 100);
    }

    #[test]
    fn test_filled_rows() {
        assert_eq!(filled_rows(50.0, 100.0, 10), 5);
        assert_eq!(filled_rows(150.0, 100.0, 10), 10);
        assert_eq!(filled_rows(5.0, 0.0, 10), 0);
    }

    #[test]
    fn test_dial_quadrants() {
        // 21 x 11 area, centre at (10, 5)
        let area = Rect::new(0, 0, 21, 11);
        assert_eq!(dial_value(10, 0, area), Some(0.0));
        assert_eq!(dial_value(20, 5, area), Some(25.0));
        assert_eq!(dial_value(10, 10, area), Some(50.0));
        assert_eq!(dial_value(0, 5, area), Some(75.0));
        assert_eq!(dial_value(10, 5, area), None);
    }

    #[test]
    fn test_dial_point_matches_dial_value() {
        let (x, y) = dial_point(25.0, 1.0);
        assert!((x - 1.0).abs() < 1e-9);
        assert!(y.abs() < 1e-9);
        let (x, y) = dial_point(50.0, 2.0);
        assert!(x.abs() < 1e-9);
        assert!((y + 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_nudge_clamps() {
        assert!((nudge(99.0, 5.0, 0.0, 100.0) - 100.0).abs() < f64::EPSILON);
        assert!((nudge(1.0, -5.0, 0.0, 100.0) - 0.0).abs() < f64::EPSILON);
        assert!((nudge(40.0, 1.0, 0.0, 100.0) - 41.0).abs() < f64::EPSILON);
    }
}
