//! Reading quality validation
//!
//! A reading with a non-finite channel cannot be scored meaningfully. Such
//! readings are discarded by the pipeline and the machine's previous state
//! stays in place.

use thiserror::Error;

use crate::types::{MachineId, Reading};

/// Why a reading was rejected before scoring.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReadingError {
    #[error("{field} is not a finite number ({value})")]
    NonFinite { field: &'static str, value: f64 },

    #[error("reading for machine {actual} delivered to the worker of machine {expected}")]
    MachineMismatch {
        expected: MachineId,
        actual: MachineId,
    },
}

/// Check that every numeric channel of a reading is finite.
///
/// Energy at or below zero is NOT an error; the scorer handles it.
pub fn validate_reading(reading: &Reading) -> Result<(), ReadingError> {
    match reading
        .channels()
        .into_iter()
        .find(|(_, value)| !value.is_finite())
    {
        Some((field, value)) => Err(ReadingError::NonFinite { field, value }),
        None => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_reading_passes() {
        let reading = Reading::now("M1", 70.0, 20.0, 1.0, 100.0, 80.0);
        assert_eq!(validate_reading(&reading), Ok(()));
    }

    #[test]
    fn test_zero_energy_is_valid() {
        let reading = Reading::now("M1", 70.0, 20.0, 1.0, 0.0, 80.0);
        assert!(validate_reading(&reading).is_ok());
    }

    #[test]
    fn test_nan_channel_rejected() {
        let reading = Reading::now("M1", 70.0, f64::NAN, 1.0, 100.0, 80.0);
        match validate_reading(&reading) {
            Err(ReadingError::NonFinite { field, .. }) => assert_eq!(field, "co2"),
            other => panic!("expected NonFinite, got {other:?}"),
        }
    }

    #[test]
    fn test_infinite_channel_rejected() {
        let reading = Reading::now("M1", 70.0, 20.0, 1.0, 100.0, f64::INFINITY);
        let err = validate_reading(&reading).unwrap_err();
        assert!(err.to_string().contains("output"));
    }
}
