//! Simulated sensor readings
//!
//! Vitals follow the caster's HP with a little noise; the environment can be
//! rerolled on demand.

use crate::config::SimulationConstants;
use crate::types::{CasterStatus, Location, SpellEnvironment, Weather};
use rand::Rng;

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Resting heart rate for an HP ratio
pub fn base_heart_rate(hp_ratio: f64) -> u32 {
    if hp_ratio < 0.2 {
        130
    } else if hp_ratio < 0.5 {
        100
    } else if hp_ratio > 0.9 {
        65
    } else {
        72
    }
}

/// One sample of the vitals monitor
pub fn sample_vitals(caster: &CasterStatus, rng: &mut impl Rng) -> CasterStatus {
    let ratio = caster.hp_ratio();
    let mut next = caster.clone();

    let heart_rate = base_heart_rate(ratio) as i64 + rng.gen_range(-5i64..5);
    next.heart_rate = heart_rate.clamp(30, 220) as u32;

    let emotion_base = if ratio < 0.3 { 80 } else { 40 };
    let emotion: i32 = emotion_base + rng.gen_range(-10..10);
    next.emotion_index = emotion.clamp(0, 100) as u32;

    let spo2 = 98.5 - (1.0 - ratio) * 5.0 + rng.gen_range(-0.2..0.2);
    next.spo2 = round1(spo2.clamp(85.0, 100.0));

    let respiration = 16.0 + (1.0 - ratio) * 20.0 + rng.gen_range(-1i32..=1) as f64;
    next.respiration = respiration.round().clamp(10.0, 45.0) as u32;

    next
}

/// Nudge body temperature by up to 0.3 degrees, kept within 34-42
pub fn drift_body_temp(body_temp: f64, rng: &mut impl Rng) -> f64 {
    round1((body_temp + rng.gen_range(-0.3..0.3)).clamp(34.0, 42.0))
}

/// Temperature and humidity typical of a weather
pub fn weather_baseline(weather: Weather) -> (f64, f64) {
    match weather {
        Weather::Sunny => (28.0, 40.0),
        Weather::Rain => (18.0, 85.0),
        Weather::Cloudy => (22.0, 60.0),
    }
}

/// Reroll the whole environment around the Kanto region
pub fn roll_environment(rng: &mut impl Rng) -> SpellEnvironment {
    let weathers = Weather::all();
    let weather = weathers[rng.gen_range(0..weathers.len())];
    let (temp_base, humid_base) = weather_baseline(weather);

    SpellEnvironment {
        location: Location {
            lat: 35.0 + rng.gen_range(-2.5..2.5),
            lng: 139.0 + rng.gen_range(-2.5..2.5),
            alt: rng.gen_range(0..500),
        },
        temperature: round1(temp_base + rng.gen_range(-5.0..5.0)),
        humidity: (humid_base + rng.gen_range(-10.0..10.0)).clamp(10.0, 100.0).floor() as u32,
        w_density: rng.gen_range(1500..9500),
        weather,
    }
}

/// Fires a vitals sample at a fixed interval while enabled
#[derive(Debug, Clone)]
pub struct VitalsMonitor {
    pub enabled: bool,
    interval: f64,
    elapsed: f64,
}

impl VitalsMonitor {
    pub fn new(constants: &SimulationConstants) -> Self {
        VitalsMonitor {
            enabled: constants.enabled,
            interval: constants.vitals_interval_secs,
            elapsed: 0.0,
        }
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
        self.elapsed = 0.0;
    }

    /// Advance time; resamples the caster when an interval has passed
    pub fn tick(&mut self, delta: f64, caster: &mut CasterStatus, rng: &mut impl Rng) -> bool {
        if !self.enabled || self.interval <= 0.0 {
            return false;
        }
        self.elapsed += delta;
        if self.elapsed + 1e-9 < self.interval {
            return false;
        }
        self.elapsed = 0.0;
        *caster = sample_vitals(caster, rng);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_vitals_follow_hp() {
        let mut rng = StdRng::seed_from_u64(12345);
        let mut caster = CasterStatus::default();

        caster.hp = 10;
        for _ in 0..50 {
            let sampled = sample_vitals(&caster, &mut rng);
            assert!((125..=134).contains(&sampled.heart_rate));
            assert!((70..=89).contains(&sampled.emotion_index));
            assert!(sampled.spo2 >= 85.0 && sampled.spo2 <= 100.0);
            assert!((10..=45).contains(&sampled.respiration));
        }

        caster.hp = 100;
        for _ in 0..50 {
            let sampled = sample_vitals(&caster, &mut rng);
            assert!((60..=69).contains(&sampled.heart_rate));
            assert!((30..=49).contains(&sampled.emotion_index));
        }
    }

    #[test]
    fn test_body_temp_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut temp = 41.9;
        for _ in 0..200 {
            temp = drift_body_temp(temp, &mut rng);
            assert!((34.0..=42.0).contains(&temp));
        }
    }

    #[test]
    fn test_environment_ranges() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..100 {
            let env = roll_environment(&mut rng);
            assert!((1500..9500).contains(&env.w_density));
            assert!((10..=100).contains(&env.humidity));
            let (base, _) = weather_baseline(env.weather);
            assert!((env.temperature - base).abs() <= 5.0 + 1e-9);
            assert!(env.location.alt < 500);
        }
    }

    #[test]
    fn test_monitor_interval() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut monitor = VitalsMonitor::new(&SimulationConstants::default());
        let mut caster = CasterStatus::default();

        let fired: usize = (0..30)
            .filter(|_| monitor.tick(0.1, &mut caster, &mut rng))
            .count();
        assert_eq!(fired, 2);

        monitor.toggle();
        assert!(!monitor.tick(5.0, &mut caster, &mut rng));
    }
}
