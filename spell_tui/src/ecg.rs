//! ECG waveform synthesis from a PQRST template

use ratatui::style::Color;

/// One heartbeat as (phase, amplitude) knots, upward positive
pub const PQRST: [(f64, f64); 10] = [
    (0.0, 0.0),
    (0.1, 0.1),   // P
    (0.2, 0.0),
    (0.25, -0.1), // Q
    (0.3, 0.8),   // R
    (0.35, -0.3), // S
    (0.4, 0.0),
    (0.5, 0.2),   // T
    (0.6, 0.0),
    (1.0, 0.0),
];

/// Amplitude at a beat phase in [0, 1), linearly interpolated
pub fn sample(phase: f64) -> f64 {
    let phase = phase.rem_euclid(1.0);
    for pair in PQRST.windows(2) {
        let (t0, v0) = pair[0];
        let (t1, v1) = pair[1];
        if phase >= t0 && phase <= t1 {
            let span = t1 - t0;
            if span <= 0.0 {
                return v0;
            }
            return v0 + (v1 - v0) * (phase - t0) / span;
        }
    }
    0.0
}

/// Seconds per beat; a stopped heart is drawn at 60 bpm
pub fn beat_interval(bpm: u32) -> f64 {
    60.0 / if bpm == 0 { 60.0 } else { bpm as f64 }
}

/// `points` samples covering the last `window` seconds up to `now`
///
/// x runs from 0 (oldest) to `window` (now).
pub fn trace(bpm: u32, now: f64, window: f64, points: usize) -> Vec<(f64, f64)> {
    if points < 2 {
        return Vec::new();
    }
    let interval = beat_interval(bpm);
    let start = now - window;
    (0..points)
        .map(|i| {
            let x = window * i as f64 / (points - 1) as f64;
            let t = start + x;
            (x, sample(t.rem_euclid(interval) / interval))
        })
        .collect()
}

/// Red above 120 bpm, blue below 50, green otherwise
pub fn trace_color(bpm: u32) -> Color {
    if bpm > 120 {
        Color::Red
    } else if bpm < 50 {
        Color::Blue
    } else {
        Color::Green
    }
}
