//! Scoring and classification - pure functions of a reading and configuration

mod classification;
mod efficiency;

pub use classification::{classify, critical_trigger};
pub use efficiency::{score, score_breakdown, ScoreBreakdown};

use crate::config::{LimitsConfig, ScoringConfig};
use crate::types::{Reading, ScoredReading};

/// Score then classify a reading.
pub fn evaluate(reading: Reading, scoring: &ScoringConfig, limits: &LimitsConfig) -> ScoredReading {
    let efficiency = score(&reading, scoring);
    let status = classify(&reading, efficiency, limits, scoring.vibration_mode);
    ScoredReading {
        reading,
        efficiency,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HealthStatus;

    #[test]
    fn test_evaluate_worked_example_is_warning() {
        let reading = Reading::now("M1", 72.0, 20.0, 1.0, 100.0, 80.0);
        let scored = evaluate(reading.clone(), &ScoringConfig::analog(), &LimitsConfig::analog());
        assert!((scored.efficiency - 74.0).abs() < 1e-9);
        assert_eq!(scored.status, HealthStatus::Warning);
        assert_eq!(scored.reading, reading);
    }

    #[test]
    fn test_evaluate_hot_machine_is_critical() {
        let reading = Reading::now("M1", 95.0, 10.0, 1.0, 100.0, 120.0);
        let scored = evaluate(reading, &ScoringConfig::analog(), &LimitsConfig::analog());
        assert!(scored.efficiency >= 75.0, "efficiency {}", scored.efficiency);
        assert_eq!(scored.status, HealthStatus::Critical);
    }
}
