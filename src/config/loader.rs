//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::models::BenefitType;
use crate::store::InMemoryStore;

use super::types::{BenefitTypesConfig, EmployeesConfig, EngineConfig, EngineSettings};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── settings.yaml       # Global attendance type, default timezone
/// ├── benefit_types.yaml  # Benefit type catalogue
/// └── employees.yaml      # Known employees (optional)
/// ```
///
/// # Example
///
/// ```no_run
/// use benefit_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default")?;
/// let leave = loader.get_benefit_type_by_code("LEAVE100")?;
/// assert!(leave.is_leave);
/// # Ok::<(), benefit_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - The configured global attendance type is not in the catalogue
    ///
    /// `employees.yaml` may be absent, in which case no employee is known.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<EngineSettings>(&path.join("settings.yaml"))?;
        let types = Self::load_yaml::<BenefitTypesConfig>(&path.join("benefit_types.yaml"))?;
        let employees_path = path.join("employees.yaml");
        let employees = if employees_path.exists() {
            Self::load_yaml::<EmployeesConfig>(&employees_path)?
        } else {
            EmployeesConfig::default()
        };

        let loader = Self {
            config: EngineConfig::new(settings, types.benefit_types)
                .with_employees(employees.employees),
        };
        if let Some(code) = &loader.settings().global_attendance_type {
            loader.get_benefit_type_by_code(code)?;
        }
        Ok(loader)
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        self.config.settings()
    }

    /// Gets a benefit type by its short code.
    pub fn get_benefit_type_by_code(&self, code: &str) -> EngineResult<&BenefitType> {
        self.config
            .benefit_types()
            .iter()
            .find(|t| t.has_code(code))
            .ok_or_else(|| EngineError::BenefitTypeNotFound {
                reference: code.to_string(),
            })
    }

    /// Builds a store seeded with the configured benefit types and employees.
    pub fn seeded_store(&self) -> InMemoryStore {
        let mut store =
            InMemoryStore::with_benefit_types(self.config.benefit_types().iter().cloned());
        for employee in self.config.employees() {
            store.insert_employee(employee.clone());
        }
        store
    }
}
