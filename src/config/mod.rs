//! Factory Configuration Module
//!
//! Scoring coefficients, classification limits and pipeline tuning, loaded
//! from TOML and validated before the pipeline is allowed to start.
//!
//! ## Loading Order
//!
//! 1. `GREENFACTORY_CONFIG` environment variable (path to TOML file)
//! 2. `factory_config.toml` in the current working directory
//! 3. Built-in defaults for the requested sensor profile
//!
//! ## Profiles
//!
//! A config file selects a sensor profile (`[plant] profile = "digital"`).
//! The profile's preset values form the base and every key present in the
//! file overrides the matching preset value:
//!
//! ```ignore
//! let config = FactoryConfig::from_toml_str(r#"
//! [plant]
//! profile = "digital"
//!
//! [limits]
//! temp_limit = 80.0
//! "#)?;
//! assert_eq!(config.scoring.temp_baseline, 70.0); // from the digital preset
//! ```
//!
//! Configuration is immutable once the pipeline starts; share it with `Arc`.

mod factory_config;
pub mod defaults;
pub mod validation;

pub use factory_config::*;
