//! Configuration loading and management for the Benefit Engine.
//!
//! This module loads engine settings, the benefit type catalogue and the
//! known employees from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use benefit_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Default timezone: {}", config.settings().default_timezone);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{BenefitTypesConfig, EmployeesConfig, EngineConfig, EngineSettings};
