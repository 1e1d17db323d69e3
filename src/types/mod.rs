//! Shared data structures for the machine efficiency pipeline
//!
//! - `Reading`: one timestamped sensor sample from one machine
//! - `ScoredReading`: a reading plus its efficiency score and health status
//! - `HealthStatus`: NORMAL / WARNING / CRITICAL
//! - `VibrationMode`: how the vibration channel is interpreted

mod reading;
mod status;

pub use reading::*;
pub use status::*;
