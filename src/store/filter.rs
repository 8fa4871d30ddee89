//! Search filters over benefit records.
//!
//! A [`Filter`] is a conjunction of field/operator/value triples, the same
//! shape a relational store would turn into a `WHERE` clause.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::models::{Benefit, BenefitId, BenefitState, BenefitTypeId, EmployeeId, LeaveId};

/// A searchable benefit field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    /// Record identifier.
    Id,
    /// Display name.
    Name,
    /// Owning employee.
    EmployeeId,
    /// Start timestamp.
    DateStart,
    /// End timestamp.
    DateStop,
    /// Benefit type.
    BenefitTypeId,
    /// Lifecycle state.
    State,
    /// Warning flag.
    DisplayWarning,
    /// Linked leave.
    LeaveId,
    /// Active flag.
    Active,
}

impl Field {
    /// Reads this field from a benefit.
    pub fn value_of(self, benefit: &Benefit) -> Value {
        match self {
            Field::Id => benefit.id.into(),
            Field::Name => Value::Text(benefit.name.clone()),
            Field::EmployeeId => benefit.employee_id.into(),
            Field::DateStart => benefit.date_start.into(),
            Field::DateStop => benefit.date_stop.into(),
            Field::BenefitTypeId => benefit.benefit_type_id.into(),
            Field::State => benefit.state.into(),
            Field::DisplayWarning => benefit.display_warning.into(),
            Field::LeaveId => benefit.leave_id.into(),
            Field::Active => benefit.active.into(),
        }
    }
}

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `in`
    In,
}

/// A field value as seen by filters and projected rows.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum Value {
    /// No value (an unset reference).
    Null,
    /// A boolean.
    Bool(bool),
    /// A record reference.
    Id(u64),
    /// A text value.
    Text(String),
    /// A timestamp.
    DateTime(DateTime<Utc>),
    /// A lifecycle state.
    State(BenefitState),
    /// A list, used as the right-hand side of `in`.
    List(Vec<Value>),
}

impl Value {
    fn same_kind(&self, other: &Value) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// The raw identifier of a record reference.
    pub fn as_id(&self) -> Option<u64> {
        match self {
            Value::Id(id) => Some(*id),
            _ => None,
        }
    }

    /// The timestamp, if this is one.
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::DateTime(at) => Some(*at),
            _ => None,
        }
    }
}

macro_rules! id_value {
    ($($id:ty),*) => {
        $(
            impl From<$id> for Value {
                fn from(id: $id) -> Self {
                    Value::Id(id.0)
                }
            }
        )*
    };
}

id_value!(BenefitId, BenefitTypeId, EmployeeId, LeaveId);

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::DateTime(value)
    }
}

impl From<BenefitState> for Value {
    fn from(value: BenefitState) -> Self {
        Value::State(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value> + Copy> From<&[T]> for Value {
    fn from(values: &[T]) -> Self {
        Value::List(values.iter().map(|v| (*v).into()).collect())
    }
}

/// One `field operator value` predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// The field being tested.
    pub field: Field,
    /// The comparison.
    pub operator: Operator,
    /// The right-hand side.
    pub value: Value,
}

impl Condition {
    /// Tests a benefit against this condition.
    ///
    /// Ordering comparisons against a null or a value of another kind are
    /// false, as in SQL.
    pub fn matches(&self, benefit: &Benefit) -> bool {
        let lhs = self.field.value_of(benefit);
        match self.operator {
            Operator::Eq => lhs == self.value,
            Operator::Ne => lhs != self.value,
            Operator::In => match &self.value {
                Value::List(items) => items.contains(&lhs),
                _ => false,
            },
            Operator::Lt | Operator::Gt | Operator::Le | Operator::Ge => {
                if lhs == Value::Null || !lhs.same_kind(&self.value) {
                    return false;
                }
                let Some(ordering) = lhs.partial_cmp(&self.value) else {
                    return false;
                };
                match self.operator {
                    Operator::Lt => ordering.is_lt(),
                    Operator::Gt => ordering.is_gt(),
                    Operator::Le => ordering.is_le(),
                    _ => ordering.is_ge(),
                }
            }
        }
    }
}

/// A conjunction of conditions.
///
/// # Example
///
/// ```
/// use benefit_engine::models::{BenefitId, BenefitState};
/// use benefit_engine::store::{Field, Filter, Operator};
///
/// let filter = Filter::new()
///     .and(Field::Id, Operator::In, vec![BenefitId(1), BenefitId(2)])
///     .and(Field::State, Operator::Ne, BenefitState::Validated);
/// assert_eq!(filter.conditions().len(), 2);
/// assert!(!filter.constrains(Field::Active));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// Creates a filter that matches every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a condition.
    pub fn and(mut self, field: Field, operator: Operator, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition {
            field,
            operator,
            value: value.into(),
        });
        self
    }

    /// Returns the conditions of this filter.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Returns true if any condition tests `field`.
    pub fn constrains(&self, field: Field) -> bool {
        self.conditions.iter().any(|c| c.field == field)
    }

    /// Returns true if the benefit satisfies every condition.
    pub fn matches(&self, benefit: &Benefit) -> bool {
        self.conditions.iter().all(|c| c.matches(benefit))
    }
}

/// A projected benefit: the requested fields and their values.
pub type Row = BTreeMap<Field, Value>;

/// Projects a benefit onto the given fields.
pub fn project(benefit: &Benefit, fields: &[Field]) -> Row {
    fields
        .iter()
        .map(|field| (*field, field.value_of(benefit)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewBenefit;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 14, hour, 0, 0).unwrap()
    }

    fn benefit() -> Benefit {
        NewBenefit::new("Attendance", EmployeeId(7), at(9), at(17), None)
            .into_benefit(BenefitId(3))
            .unwrap()
    }

    #[test]
    fn test_open_interval_filter() {
        let b = benefit();
        let overlapping = Filter::new()
            .and(Field::DateStart, Operator::Lt, at(10))
            .and(Field::DateStop, Operator::Gt, at(8));
        let touching = Filter::new()
            .and(Field::DateStart, Operator::Lt, at(20))
            .and(Field::DateStop, Operator::Gt, at(17));
        assert!(overlapping.matches(&b));
        assert!(!touching.matches(&b));
    }

    #[test]
    fn test_in_operator() {
        let b = benefit();
        assert!(Filter::new()
            .and(Field::Id, Operator::In, vec![BenefitId(1), BenefitId(3)])
            .matches(&b));
        assert!(!Filter::new()
            .and(Field::Id, Operator::In, Vec::<BenefitId>::new())
            .matches(&b));
    }

    #[test]
    fn test_null_comparisons() {
        let b = benefit();
        assert!(Filter::new()
            .and(Field::BenefitTypeId, Operator::Eq, None::<BenefitTypeId>)
            .matches(&b));
        assert!(!Filter::new()
            .and(Field::BenefitTypeId, Operator::Gt, BenefitTypeId(0))
            .matches(&b));
    }

    #[test]
    fn test_ordering_against_other_kind_is_false() {
        let b = benefit();
        assert!(!Filter::new()
            .and(Field::DateStart, Operator::Ge, BenefitId(1))
            .matches(&b));
    }

    #[test]
    fn test_project_selects_fields() {
        let row = project(&benefit(), &[Field::EmployeeId, Field::DateStart]);
        assert_eq!(row.len(), 2);
        assert_eq!(row[&Field::EmployeeId], Value::Id(7));
        assert_eq!(row[&Field::DateStart], Value::DateTime(at(9)));
    }
}
