//! Benefit type model.

use serde::{Deserialize, Serialize};

use super::BenefitTypeId;

fn default_color() -> i32 {
    1
}

fn default_sequence() -> i32 {
    25
}

fn default_active() -> bool {
    true
}

/// A category of benefit, such as plain attendance or paid leave.
///
/// The `is_leave` flag decides how a validated benefit is projected into the
/// calendar: leave types become leave periods, the rest become attendances.
///
/// # Example
///
/// ```
/// use benefit_engine::models::BenefitType;
///
/// let yaml = "id: 3\nname: Paid Time Off\ncode: LEAVE100\nis_leave: true\n";
/// let benefit_type: BenefitType = serde_yaml::from_str(yaml).unwrap();
/// assert!(benefit_type.is_leave);
/// assert_eq!(benefit_type.sequence, 25);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitType {
    /// Unique identifier.
    pub id: BenefitTypeId,
    /// Human-readable name.
    pub name: String,
    /// Short code used to reference the type from configuration.
    #[serde(default)]
    pub code: Option<String>,
    /// Display color index.
    #[serde(default = "default_color")]
    pub color: i32,
    /// Ordering sequence.
    #[serde(default = "default_sequence")]
    pub sequence: i32,
    /// Inactive types are hidden but kept.
    #[serde(default = "default_active")]
    pub active: bool,
    /// True if benefits of this type are time off.
    #[serde(default)]
    pub is_leave: bool,
}

impl BenefitType {
    /// Returns true if the type carries the given code.
    pub fn has_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_applies_defaults() {
        let json = r#"{ "id": 1, "name": "Attendance", "code": "WORK100" }"#;
        let benefit_type: BenefitType = serde_json::from_str(json).unwrap();
        assert_eq!(benefit_type.color, 1);
        assert_eq!(benefit_type.sequence, 25);
        assert!(benefit_type.active);
        assert!(!benefit_type.is_leave);
    }

    #[test]
    fn test_has_code() {
        let benefit_type = BenefitType {
            id: BenefitTypeId(1),
            name: "Attendance".to_string(),
            code: Some("WORK100".to_string()),
            color: 1,
            sequence: 25,
            active: true,
            is_leave: false,
        };
        assert!(benefit_type.has_code("WORK100"));
        assert!(!benefit_type.has_code("LEAVE100"));
    }
}
