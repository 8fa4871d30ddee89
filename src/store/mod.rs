//! Record storage for the Benefit Engine.
//!
//! The engine never talks to a database directly. Everything it needs from
//! persistence goes through the [`RecordStore`] trait: create/write/unlink/
//! search on benefits, lookups on the records benefits reference, a leave
//! overlap query, calendar writes, and transaction boundaries.
//!
//! [`InMemoryStore`] implements the trait over ordered maps and backs both the
//! HTTP service and the tests.

mod filter;
mod memory;

pub use filter::{Condition, Field, Filter, Operator, Row, Value, project};
pub use memory::InMemoryStore;

use tracing::warn;

use crate::error::EngineResult;
use crate::models::{
    AttendancePattern, Benefit, BenefitChanges, BenefitId, BenefitType, BenefitTypeId,
    CalendarAttendance, CalendarLeave, Employee, EmployeeId, Leave, LeaveId, LeavePeriod,
    NewBenefit,
};

/// The persistence capability the engine runs against.
///
/// Searches exclude inactive benefits unless the filter tests
/// [`Field::Active`] itself. Results come back warnings first, then by state
/// and start.
pub trait RecordStore {
    /// Creates a benefit in draft state, enforcing the record constraints.
    fn create_benefit(&mut self, values: NewBenefit) -> EngineResult<Benefit>;

    /// Applies the same changes to every listed benefit.
    ///
    /// The write is atomic: if any record rejects the changes, none are kept.
    fn write_benefits(&mut self, ids: &[BenefitId], changes: &BenefitChanges) -> EngineResult<()>;

    /// Deletes benefits permanently.
    fn unlink_benefits(&mut self, ids: &[BenefitId]) -> EngineResult<()>;

    /// Returns the benefits matching `filter`.
    fn search_benefits(&self, filter: &Filter) -> EngineResult<Vec<Benefit>>;

    /// Returns the listed fields of the benefits matching `filter`.
    fn search_read(&self, filter: &Filter, fields: &[Field]) -> EngineResult<Vec<Row>> {
        Ok(self
            .search_benefits(filter)?
            .iter()
            .map(|benefit| project(benefit, fields))
            .collect())
    }

    /// Returns the listed benefits whether or not they are active.
    fn browse_benefits(&self, ids: &[BenefitId]) -> EngineResult<Vec<Benefit>> {
        let filter = Filter::new()
            .and(Field::Id, Operator::In, ids)
            .and(Field::Active, Operator::In, vec![true, false]);
        self.search_benefits(&filter)
    }

    /// Looks up a benefit type by identifier.
    fn benefit_type(&self, id: BenefitTypeId) -> EngineResult<Option<BenefitType>>;

    /// Looks up a benefit type by its short code.
    fn benefit_type_by_code(&self, code: &str) -> EngineResult<Option<BenefitType>>;

    /// Looks up an employee.
    fn employee(&self, id: EmployeeId) -> EngineResult<Option<Employee>>;

    /// Looks up a leave.
    fn leave(&self, id: LeaveId) -> EngineResult<Option<Leave>>;

    /// Returns `(benefit, leave)` pairs where a pending leave of the same
    /// employee touches the benefit, endpoints included.
    ///
    /// Pairs are ordered by benefit then leave.
    fn pending_leave_overlaps(&self, ids: &[BenefitId]) -> EngineResult<Vec<(BenefitId, LeaveId)>>;

    /// Stores an attendance slot.
    fn create_calendar_attendance(
        &mut self,
        pattern: AttendancePattern,
    ) -> EngineResult<CalendarAttendance>;

    /// Stores a leave period.
    fn create_calendar_leave(&mut self, period: LeavePeriod) -> EngineResult<CalendarLeave>;

    /// Opens a transaction (or a savepoint inside one).
    fn begin(&mut self) -> EngineResult<()>;

    /// Keeps every write since the matching [`RecordStore::begin`].
    fn commit(&mut self) -> EngineResult<()>;

    /// Discards every write since the matching [`RecordStore::begin`].
    fn rollback(&mut self) -> EngineResult<()>;
}

/// Runs `work` inside a transaction, rolling back if it fails.
pub fn in_transaction<S, T, F>(store: &mut S, work: F) -> EngineResult<T>
where
    S: RecordStore + ?Sized,
    F: FnOnce(&mut S) -> EngineResult<T>,
{
    store.begin()?;
    match work(store) {
        Ok(value) => {
            store.commit()?;
            Ok(value)
        }
        Err(err) => {
            warn!(error = %err, "Rolling back transaction");
            store.rollback()?;
            Err(err)
        }
    }
}
