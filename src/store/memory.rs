//! In-memory record store.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Constraint, EngineError, EngineResult};
use crate::models::{
    AttendancePattern, Benefit, BenefitChanges, BenefitId, BenefitType, BenefitTypeId,
    CalendarAttendance, CalendarAttendanceId, CalendarLeave, CalendarLeaveId, Employee,
    EmployeeId, Leave, LeaveId, LeavePeriod, NewBenefit,
};

use super::{Field, Filter, Operator, RecordStore};

#[derive(Debug, Clone, Default)]
struct Tables {
    next_benefit_id: u64,
    next_attendance_id: u64,
    next_calendar_leave_id: u64,
    benefits: BTreeMap<BenefitId, Benefit>,
    benefit_types: BTreeMap<BenefitTypeId, BenefitType>,
    employees: BTreeMap<EmployeeId, Employee>,
    leaves: BTreeMap<LeaveId, Leave>,
    attendances: BTreeMap<CalendarAttendanceId, CalendarAttendance>,
    calendar_leaves: BTreeMap<CalendarLeaveId, CalendarLeave>,
}

impl Tables {
    /// Rejects `benefit` if another active benefit already has its key.
    fn check_unique(&self, benefit: &Benefit) -> EngineResult<()> {
        if !benefit.active {
            return Ok(());
        }
        let key = benefit.key();
        let taken = self
            .benefits
            .values()
            .any(|other| other.id != benefit.id && other.active && other.key() == key);
        if taken {
            return Err(EngineError::ConstraintViolation {
                constraint: Constraint::Unique,
                message: "Benefit already exists for this attendance".to_string(),
            });
        }
        Ok(())
    }
}

/// A [`RecordStore`] held entirely in memory.
///
/// Transactions are implemented by snapshotting the tables on
/// [`RecordStore::begin`]; nested begins act as savepoints.
///
/// # Example
///
/// ```
/// use benefit_engine::models::{EmployeeId, NewBenefit};
/// use benefit_engine::store::{Filter, InMemoryStore, RecordStore};
/// use chrono::{TimeZone, Utc};
///
/// let mut store = InMemoryStore::new();
/// let start = Utc.with_ymd_and_hms(2026, 1, 14, 9, 0, 0).unwrap();
/// let stop = Utc.with_ymd_and_hms(2026, 1, 14, 17, 0, 0).unwrap();
/// store
///     .create_benefit(NewBenefit::new("Attendance", EmployeeId(1), start, stop, None))
///     .unwrap();
/// assert_eq!(store.search_benefits(&Filter::new()).unwrap().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Tables,
    snapshots: Vec<Tables>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with benefit types.
    pub fn with_benefit_types(benefit_types: impl IntoIterator<Item = BenefitType>) -> Self {
        let mut store = Self::new();
        for benefit_type in benefit_types {
            store.insert_benefit_type(benefit_type);
        }
        store
    }

    /// Adds or replaces a benefit type.
    pub fn insert_benefit_type(&mut self, benefit_type: BenefitType) {
        self.tables
            .benefit_types
            .insert(benefit_type.id, benefit_type);
    }

    /// Adds or replaces an employee.
    pub fn insert_employee(&mut self, employee: Employee) {
        self.tables.employees.insert(employee.id, employee);
    }

    /// Adds or replaces a leave.
    pub fn insert_leave(&mut self, leave: Leave) {
        self.tables.leaves.insert(leave.id, leave);
    }

    /// Returns a benefit by id, active or not.
    pub fn benefit(&self, id: BenefitId) -> Option<&Benefit> {
        self.tables.benefits.get(&id)
    }

    /// Returns every stored benefit in id order, inactive ones included.
    pub fn benefits(&self) -> impl Iterator<Item = &Benefit> {
        self.tables.benefits.values()
    }

    /// Returns every materialized attendance.
    pub fn calendar_attendances(&self) -> impl Iterator<Item = &CalendarAttendance> {
        self.tables.attendances.values()
    }

    /// Returns every materialized leave period.
    pub fn calendar_leaves(&self) -> impl Iterator<Item = &CalendarLeave> {
        self.tables.calendar_leaves.values()
    }
}

impl RecordStore for InMemoryStore {
    fn create_benefit(&mut self, values: NewBenefit) -> EngineResult<Benefit> {
        let id = BenefitId(self.tables.next_benefit_id + 1);
        let benefit = values.into_benefit(id)?;
        self.tables.check_unique(&benefit)?;

        self.tables.next_benefit_id = id.0;
        self.tables.benefits.insert(id, benefit.clone());
        debug!(benefit_id = %id, employee_id = %benefit.employee_id, "Benefit created");
        Ok(benefit)
    }

    fn write_benefits(&mut self, ids: &[BenefitId], changes: &BenefitChanges) -> EngineResult<()> {
        let mut staged = self.tables.clone();
        for id in ids {
            let mut benefit = staged
                .benefits
                .get(id)
                .cloned()
                .ok_or(EngineError::BenefitNotFound { id: *id })?;
            benefit.apply(changes)?;
            staged.benefits.insert(*id, benefit);
        }
        for id in ids {
            if let Some(benefit) = staged.benefits.get(id) {
                staged.check_unique(benefit)?;
            }
        }
        self.tables = staged;
        Ok(())
    }

    fn unlink_benefits(&mut self, ids: &[BenefitId]) -> EngineResult<()> {
        if let Some(id) = ids.iter().find(|id| !self.tables.benefits.contains_key(id)) {
            return Err(EngineError::BenefitNotFound { id: *id });
        }
        for id in ids {
            self.tables.benefits.remove(id);
        }
        debug!(count = ids.len(), "Benefits unlinked");
        Ok(())
    }

    fn search_benefits(&self, filter: &Filter) -> EngineResult<Vec<Benefit>> {
        let implicit_active = !filter.constrains(Field::Active);
        let mut found: Vec<Benefit> = self
            .tables
            .benefits
            .values()
            .filter(|b| !implicit_active || b.active)
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.display_warning
                .cmp(&a.display_warning)
                .then(a.state.cmp(&b.state))
                .then(a.date_start.cmp(&b.date_start))
                .then(a.id.cmp(&b.id))
        });
        Ok(found)
    }

    fn benefit_type(&self, id: BenefitTypeId) -> EngineResult<Option<BenefitType>> {
        Ok(self.tables.benefit_types.get(&id).cloned())
    }

    fn benefit_type_by_code(&self, code: &str) -> EngineResult<Option<BenefitType>> {
        Ok(self
            .tables
            .benefit_types
            .values()
            .find(|t| t.has_code(code))
            .cloned())
    }

    fn employee(&self, id: EmployeeId) -> EngineResult<Option<Employee>> {
        Ok(self.tables.employees.get(&id).cloned())
    }

    fn leave(&self, id: LeaveId) -> EngineResult<Option<Leave>> {
        Ok(self.tables.leaves.get(&id).cloned())
    }

    fn pending_leave_overlaps(&self, ids: &[BenefitId]) -> EngineResult<Vec<(BenefitId, LeaveId)>> {
        let filter = Filter::new()
            .and(Field::Id, Operator::In, ids)
            .and(Field::Active, Operator::In, vec![true, false]);

        let mut pairs = Vec::new();
        for benefit in self.tables.benefits.values().filter(|b| filter.matches(b)) {
            for leave in self.tables.leaves.values() {
                if leave.employee_id == benefit.employee_id
                    && leave.state.is_pending()
                    && leave.touches(benefit.date_start, benefit.date_stop)
                {
                    pairs.push((benefit.id, leave.id));
                }
            }
        }
        Ok(pairs)
    }

    fn create_calendar_attendance(
        &mut self,
        pattern: AttendancePattern,
    ) -> EngineResult<CalendarAttendance> {
        self.tables.next_attendance_id += 1;
        let attendance = CalendarAttendance {
            id: CalendarAttendanceId(self.tables.next_attendance_id),
            pattern,
        };
        self.tables
            .attendances
            .insert(attendance.id, attendance.clone());
        Ok(attendance)
    }

    fn create_calendar_leave(&mut self, period: LeavePeriod) -> EngineResult<CalendarLeave> {
        self.tables.next_calendar_leave_id += 1;
        let leave = CalendarLeave {
            id: CalendarLeaveId(self.tables.next_calendar_leave_id),
            period,
        };
        self.tables.calendar_leaves.insert(leave.id, leave.clone());
        Ok(leave)
    }

    fn begin(&mut self) -> EngineResult<()> {
        self.snapshots.push(self.tables.clone());
        Ok(())
    }

    fn commit(&mut self) -> EngineResult<()> {
        self.snapshots
            .pop()
            .map(|_| ())
            .ok_or_else(no_transaction)
    }

    fn rollback(&mut self) -> EngineResult<()> {
        self.tables = self.snapshots.pop().ok_or_else(no_transaction)?;
        Ok(())
    }
}

fn no_transaction() -> EngineError {
    EngineError::Store {
        message: "no open transaction".to_string(),
    }
}
