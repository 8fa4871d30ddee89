//! Bulk creation that skips benefits which already exist.
//!
//! Generators re-run over a period must not duplicate what a previous run
//! created. Existing benefits inside the period are read once and every new
//! row whose key is already taken is dropped.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::EngineResult;
use crate::models::{Benefit, BenefitKey, BenefitTypeId, EmployeeId, NewBenefit};
use crate::store::{Field, Filter, Operator, RecordStore, Row, in_transaction};

const KEY_FIELDS: [Field; 4] = [
    Field::DateStart,
    Field::DateStop,
    Field::EmployeeId,
    Field::BenefitTypeId,
];

fn key_from_row(row: &Row) -> Option<BenefitKey> {
    Some(BenefitKey {
        date_start: row.get(&Field::DateStart)?.as_datetime()?,
        date_stop: row.get(&Field::DateStop)?.as_datetime()?,
        employee_id: EmployeeId(row.get(&Field::EmployeeId)?.as_id()?),
        benefit_type_id: row.get(&Field::BenefitTypeId)?.as_id().map(BenefitTypeId),
    })
}

/// Creates the benefits in `values` that do not exist yet.
///
/// Existing keys are read from the active benefits lying within
/// `[date_start, date_stop]`. Among the new values, the first occurrence of a
/// key wins and input order is kept. A row rejected as a duplicate by the
/// store is skipped; any other error aborts the whole batch.
pub fn safe_duplicate_create<S>(
    store: &mut S,
    values: Vec<NewBenefit>,
    date_start: DateTime<Utc>,
    date_stop: DateTime<Utc>,
) -> EngineResult<Vec<Benefit>>
where
    S: RecordStore + ?Sized,
{
    in_transaction(store, |store| {
        let filter = Filter::new()
            .and(Field::DateStart, Operator::Ge, date_start)
            .and(Field::DateStop, Operator::Le, date_stop);
        let mut seen: BTreeSet<BenefitKey> = store
            .search_read(&filter, &KEY_FIELDS)?
            .iter()
            .filter_map(key_from_row)
            .collect();

        let requested = values.len();
        let mut created = Vec::new();
        for value in values {
            if let Some(key) = value.key()
                && !seen.insert(key)
            {
                continue;
            }
            match store.create_benefit(value) {
                Ok(benefit) => created.push(benefit),
                Err(err) if err.is_unique_violation() => {
                    debug!(error = %err, "Skipping duplicate benefit");
                }
                Err(err) => return Err(err),
            }
        }

        info!(
            requested,
            created = created.len(),
            "Bulk benefit creation finished"
        );
        Ok(created)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::models::{BenefitChanges, BenefitState};
    use crate::store::InMemoryStore;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, day, hour, 0, 0).unwrap()
    }

    fn values(day: u32) -> NewBenefit {
        NewBenefit::new(
            "Attendance",
            EmployeeId(1),
            at(day, 9),
            at(day, 17),
            Some(BenefitTypeId(1)),
        )
    }

    #[test]
    fn test_existing_key_is_skipped() {
        let mut store = InMemoryStore::new();
        store.create_benefit(values(14)).unwrap();

        let created =
            safe_duplicate_create(&mut store, vec![values(14), values(15)], at(1, 0), at(31, 23))
                .unwrap();

        assert_eq!(created.len(), 1);
        assert_eq!(created[0].date_start, at(15, 9));
        assert_eq!(store.benefits().count(), 2);
    }

    #[test]
    fn test_duplicates_within_batch_keep_first() {
        let mut store = InMemoryStore::new();
        let mut renamed = values(14);
        renamed.name = "Second".to_string();

        let created =
            safe_duplicate_create(&mut store, vec![values(14), renamed], at(1, 0), at(31, 23))
                .unwrap();

        assert_eq!(created.len(), 1);
        assert_eq!(created[0].name, "Attendance");
    }

    #[test]
    fn test_existing_outside_period_hits_store_constraint() {
        let mut store = InMemoryStore::new();
        store.create_benefit(values(14)).unwrap();

        // The period does not cover day 14, so the store rejects the row.
        let created =
            safe_duplicate_create(&mut store, vec![values(14), values(15)], at(15, 0), at(31, 23))
                .unwrap();

        assert_eq!(created.len(), 1);
        assert_eq!(created[0].date_start, at(15, 9));
    }

    #[test]
    fn test_cancelled_key_can_be_recreated() {
        let mut store = InMemoryStore::new();
        let cancelled = store.create_benefit(values(14)).unwrap();
        store
            .write_benefits(&[cancelled.id], &BenefitChanges::state(BenefitState::Cancelled))
            .unwrap();

        let created =
            safe_duplicate_create(&mut store, vec![values(14)], at(1, 0), at(31, 23)).unwrap();
        assert_eq!(created.len(), 1);
    }

    #[test]
    fn test_invalid_row_rolls_back_batch() {
        let mut store = InMemoryStore::new();
        let mut open_ended = values(16);
        open_ended.date_stop = None;

        let err = safe_duplicate_create(
            &mut store,
            vec![values(15), open_ended],
            at(1, 0),
            at(31, 23),
        )
        .unwrap_err();

        assert!(matches!(err, EngineError::ConstraintViolation { .. }));
        assert_eq!(store.benefits().count(), 0);
    }

    #[test]
    fn test_oversized_duration_rolls_back_batch() {
        let mut store = InMemoryStore::new();
        let mut endless = values(16);
        endless.date_stop = None;
        endless.duration = Some(rust_decimal::Decimal::MAX);

        let err =
            safe_duplicate_create(&mut store, vec![values(15), endless], at(1, 0), at(31, 23))
                .unwrap_err();

        assert!(matches!(err, EngineError::ConstraintViolation { .. }));
        assert_eq!(store.benefits().count(), 0);
        // The store is usable again once the batch has been rolled back.
        assert_eq!(
            safe_duplicate_create(&mut store, vec![values(15)], at(1, 0), at(31, 23))
                .unwrap()
                .len(),
            1
        );
    }
}
