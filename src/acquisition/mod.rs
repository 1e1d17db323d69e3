//! Sensor data acquisition module
//!
//! Reading sanitization and the simulated machine feed. The `ReadingSource`
//! trait that the pipeline consumes lives in `pipeline::source`.

pub mod quality;
pub mod simulator;

pub use quality::{validate_reading, ReadingError};
pub use simulator::SimulatedMachine;
