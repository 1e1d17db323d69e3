//! GreenFactory: Real-time Machine Efficiency Monitoring
//!
//! Scores each factory machine's sensor readings into a 0-100 efficiency and
//! a NORMAL / WARNING / CRITICAL health status, keeping the latest state of
//! every machine available to dashboards and alerting.
//!
//! ## Architecture
//!
//! - **Acquisition**: Reading sanitization and simulated machine feeds
//! - **Processing**: Efficiency scoring and health classification
//! - **Pipeline**: One concurrent processing loop per machine
//! - **Storage**: Latest-state store shared by workers and consumers
//! - **API**: Read-only fleet view and summary

pub mod acquisition;
pub mod api;
pub mod config;
pub mod pipeline;
pub mod processing;
pub mod storage;
pub mod types;

// Re-export configuration
pub use config::{ConfigError, FactoryConfig, SensorProfile};

// Re-export commonly used types
pub use types::{HealthStatus, MachineId, Reading, ScoredReading, VibrationMode};

// Re-export pipeline and consumer surfaces
pub use api::{FleetSummary, FleetView};
pub use pipeline::{PipelineCoordinator, PipelineError, PipelineStats};
pub use storage::MachineStateStore;
