//! Efficiency Scoring Module
//!
//! Deterministic penalty model turning one raw reading into a [0, 100]
//! efficiency score. All baselines and coefficients come from
//! [`ScoringConfig`]; the digital-flag and analog-magnitude installations are
//! configuration profiles of this one function.

use serde::Serialize;

use crate::config::ScoringConfig;
use crate::types::{Reading, VibrationMode};

/// Intermediate terms of the penalty model, kept for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// output / energy, or 0 when energy <= 0
    pub base: f64,
    pub temp_penalty: f64,
    pub vib_penalty: f64,
    pub carbon_penalty: f64,
    /// Score before clamping
    pub raw: f64,
    /// Final score, clamped to [0, 100]
    pub efficiency: f64,
}

/// Calculate the efficiency score (0-100) of a reading.
///
/// # Scoring Algorithm
///
/// ```text
/// base           = output / energy            (0 when energy <= 0)
/// temp_penalty   = max(0, (temperature - temp_baseline) * temp_coefficient)
/// vib_penalty    = vibration * vib_coefficient_digital                    (digital)
///                = max(0, (vibration - vib_baseline) * vib_coefficient_analog)  (analog)
/// carbon_penalty = co2 * co2_coefficient
/// efficiency     = clamp(100 * base - penalties, 0, 100)
/// ```
///
/// Energy at or below zero is valid input: the output ratio contributes
/// nothing and the score is made of penalties only.
pub fn score(reading: &Reading, config: &ScoringConfig) -> f64 {
    score_breakdown(reading, config).efficiency
}

/// Same as [`score`], returning every intermediate term.
pub fn score_breakdown(reading: &Reading, config: &ScoringConfig) -> ScoreBreakdown {
    let base = if reading.energy > 0.0 {
        reading.output / reading.energy
    } else {
        0.0
    };

    let temp_penalty = ((reading.temperature - config.temp_baseline) * config.temp_coefficient).max(0.0);
    let vib_penalty = vibration_penalty(reading.vibration, config);
    let carbon_penalty = reading.co2 * config.co2_coefficient;

    let raw = 100.0 * base - temp_penalty - vib_penalty - carbon_penalty;

    ScoreBreakdown {
        base,
        temp_penalty,
        vib_penalty,
        carbon_penalty,
        raw,
        efficiency: clamp_efficiency(raw),
    }
}

fn vibration_penalty(vibration: f64, config: &ScoringConfig) -> f64 {
    match config.vibration_mode {
        VibrationMode::Digital => vibration * config.vib_coefficient_digital,
        VibrationMode::Analog => {
            ((vibration - config.vib_baseline) * config.vib_coefficient_analog).max(0.0)
        }
    }
}

/// Clamp to [0, 100]. Infinite raw scores land on the bounds.
fn clamp_efficiency(raw: f64) -> f64 {
    if raw.is_nan() {
        // Overflowing finite input can reach inf - inf, as can non-finite input
        return 0.0;
    }
    raw.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(temperature: f64, co2: f64, vibration: f64, energy: f64, output: f64) -> Reading {
        Reading::now("M1", temperature, co2, vibration, energy, output)
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_worked_example_analog() {
        let config = ScoringConfig::analog();
        let b = score_breakdown(&reading(72.0, 20.0, 1.0, 100.0, 80.0), &config);
        assert_close(b.base, 0.8);
        assert_close(b.temp_penalty, 0.0);
        assert_close(b.vib_penalty, 0.0);
        assert_close(b.carbon_penalty, 6.0);
        assert_close(b.raw, 74.0);
        assert_close(b.efficiency, 74.0);
    }

    #[test]
    fn test_digital_flag_penalty() {
        let config = ScoringConfig::digital();
        // base 100/120, temp 5 * 0.5, vib 1 * 10, co2 400 * 0.02
        let b = score_breakdown(&reading(75.0, 400.0, 1.0, 120.0, 100.0), &config);
        assert_close(b.temp_penalty, 2.5);
        assert_close(b.vib_penalty, 10.0);
        assert_close(b.carbon_penalty, 8.0);
        assert_close(b.efficiency, 100.0 * 100.0 / 120.0 - 20.5);
    }

    #[test]
    fn test_digital_quiet_flag_has_no_penalty() {
        let config = ScoringConfig::digital();
        let b = score_breakdown(&reading(60.0, 0.0, 0.0, 120.0, 100.0), &config);
        assert_close(b.vib_penalty, 0.0);
    }

    #[test]
    fn test_zero_energy_zeroes_base() {
        let config = ScoringConfig::analog();
        let b = score_breakdown(&reading(70.0, 0.0, 0.0, 0.0, 80.0), &config);
        assert_close(b.base, 0.0);
        assert_close(b.efficiency, 0.0);
    }

    #[test]
    fn test_negative_energy_zeroes_base() {
        let config = ScoringConfig::analog();
        let b = score_breakdown(&reading(70.0, 0.0, 0.0, -5.0, 80.0), &config);
        assert_close(b.base, 0.0);
    }

    #[test]
    fn test_clamped_at_100() {
        let config = ScoringConfig::analog();
        assert_close(score(&reading(60.0, 0.0, 0.0, 50.0, 200.0), &config), 100.0);
    }

    #[test]
    fn test_clamped_at_0_for_extreme_input() {
        let config = ScoringConfig::analog();
        let extremes = [
            reading(1e300, 1e300, 1e300, 1.0, 1.0),
            reading(f64::MAX, f64::MAX, f64::MAX, f64::MIN_POSITIVE, f64::MAX),
            reading(-1e300, -1e300, -1e300, 1e-300, -1e300),
        ];
        for r in &extremes {
            let eff = score(r, &config);
            assert!((0.0..=100.0).contains(&eff), "efficiency {eff} out of range for {r:?}");
        }
    }

    #[test]
    fn test_monotonic_in_temperature_above_baseline() {
        let config = ScoringConfig::analog();
        let mut previous = f64::INFINITY;
        for step in 0..40 {
            let temp = config.temp_baseline + f64::from(step) * 0.5;
            let eff = score(&reading(temp, 10.0, 1.0, 100.0, 95.0), &config);
            assert!(eff <= previous, "efficiency rose at temperature {temp}");
            previous = eff;
        }
    }

    #[test]
    fn test_monotonic_in_co2() {
        let config = ScoringConfig::analog();
        let mut previous = f64::INFINITY;
        for step in 0..50 {
            let co2 = f64::from(step);
            let eff = score(&reading(70.0, co2, 1.0, 100.0, 95.0), &config);
            assert!(eff <= previous, "efficiency rose at co2 {co2}");
            previous = eff;
        }
    }

    #[test]
    fn test_monotonic_in_vibration_above_baseline() {
        for config in [ScoringConfig::analog(), ScoringConfig::digital()] {
            let mut previous = f64::INFINITY;
            for step in 0..30 {
                let vib = config.vib_baseline + f64::from(step) * 0.1;
                let eff = score(&reading(70.0, 10.0, vib, 100.0, 95.0), &config);
                assert!(eff <= previous, "efficiency rose at vibration {vib}");
                previous = eff;
            }
        }
    }

    #[test]
    fn test_below_baseline_temperature_is_not_a_bonus() {
        let config = ScoringConfig::analog();
        let cold = score(&reading(20.0, 10.0, 1.0, 100.0, 80.0), &config);
        let at_baseline = score(&reading(75.0, 10.0, 1.0, 100.0, 80.0), &config);
        assert_close(cold, at_baseline);
    }
}
