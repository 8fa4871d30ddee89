//! Configuration types for the Benefit Engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use chrono_tz::Tz;
use serde::Deserialize;

use crate::models::{BenefitType, Employee};

fn default_timezone() -> Tz {
    chrono_tz::UTC
}

/// Engine-wide settings from `settings.yaml`.
///
/// These replace the implicit company/user context: everything the engine
/// would otherwise read from its environment is passed in explicitly.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineSettings {
    /// Code of the benefit type that stands for plain attendance.
    ///
    /// Benefits of this type are global to all employees and are not copied
    /// into individual calendars.
    #[serde(default)]
    pub global_attendance_type: Option<String>,
    /// Timezone used for employees that have none.
    #[serde(default = "default_timezone")]
    pub default_timezone: Tz,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            global_attendance_type: None,
            default_timezone: default_timezone(),
        }
    }
}

/// Benefit types configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct BenefitTypesConfig {
    /// The catalogue of benefit types.
    pub benefit_types: Vec<BenefitType>,
}

/// Employees configuration file structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeesConfig {
    /// The employees known to the engine.
    #[serde(default)]
    pub employees: Vec<Employee>,
}

/// The complete engine configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Engine settings.
    settings: EngineSettings,
    /// Benefit types (sorted by sequence, then id).
    benefit_types: Vec<BenefitType>,
    /// Employees (sorted by id).
    employees: Vec<Employee>,
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts.
    pub fn new(settings: EngineSettings, benefit_types: Vec<BenefitType>) -> Self {
        let mut sorted_types = benefit_types;
        sorted_types.sort_by(|a, b| a.sequence.cmp(&b.sequence).then(a.id.cmp(&b.id)));
        Self {
            settings,
            benefit_types: sorted_types,
            employees: Vec::new(),
        }
    }

    /// Sets the configured employees.
    pub fn with_employees(mut self, employees: Vec<Employee>) -> Self {
        self.employees = employees;
        self.employees.sort_by_key(|e| e.id);
        self
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns all benefit types.
    pub fn benefit_types(&self) -> &[BenefitType] {
        &self.benefit_types
    }

    /// Returns all configured employees.
    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }
}
