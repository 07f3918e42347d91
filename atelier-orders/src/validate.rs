//! Aggregate validation
//!
//! Runs before the first network call; a rejected aggregate writes
//! nothing. Money-bearing rows are checked in [`crate::money`], the
//! rest here.

use crate::aggregate::OrderAggregate;
use crate::error::{SaveError, SaveResult};
use crate::money;
use shared::models::{OrderDraft, WorkshopFields};

/// Validate the order header draft
pub fn validate_draft(draft: &OrderDraft) -> SaveResult<()> {
    if draft.client_id <= 0 {
        return Err(SaveError::validation("order must reference a client"));
    }
    if draft.status_id <= 0 {
        return Err(SaveError::validation("order must carry a status"));
    }
    if draft.payment_status_id <= 0 {
        return Err(SaveError::validation("order must carry a payment status"));
    }
    Ok(())
}

/// Validate a workshop assignment
pub fn validate_workshop(fields: &WorkshopFields) -> SaveResult<()> {
    if fields.workshop_id <= 0 {
        return Err(SaveError::validation(
            "assignment must reference a workshop",
        ));
    }
    Ok(())
}

/// Validate the whole aggregate, stopping at the first problem
pub fn validate_aggregate(aggregate: &OrderAggregate) -> SaveResult<()> {
    // 1. Header draft
    validate_draft(&aggregate.draft)?;

    // 2. Child rows
    for entry in aggregate.details.entries() {
        money::validate_detail(&entry.fields)?;
    }
    for entry in aggregate.payments.entries() {
        money::validate_payment(&entry.fields)?;
    }
    for entry in aggregate.workshops.entries() {
        validate_workshop(&entry.fields)?;
    }
    for entry in aggregate.requirements.entries() {
        money::validate_requirement(&entry.fields)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::DetailFields;

    fn test_draft() -> OrderDraft {
        OrderDraft {
            client_id: 11,
            manager_id: None,
            status_id: 1,
            payment_status_id: 1,
            ordered_on: None,
            due_on: None,
            fitted_on: None,
            drawing_file: None,
            measure_sheet: None,
        }
    }

    #[test]
    fn test_validate_draft_rejects_missing_references() {
        assert!(validate_draft(&test_draft()).is_ok());

        let no_client = OrderDraft {
            client_id: 0,
            ..test_draft()
        };
        assert!(matches!(
            validate_draft(&no_client),
            Err(SaveError::Validation(_))
        ));

        let no_status = OrderDraft {
            status_id: -1,
            ..test_draft()
        };
        assert!(validate_draft(&no_status).is_err());
    }

    #[test]
    fn test_validate_workshop() {
        let good = WorkshopFields {
            workshop_id: 3,
            scheduled_on: None,
            note: None,
        };
        assert!(validate_workshop(&good).is_ok());

        let bad = WorkshopFields {
            workshop_id: 0,
            ..good
        };
        assert!(validate_workshop(&bad).is_err());
    }

    #[test]
    fn test_validate_aggregate_checks_children() {
        let mut aggregate = OrderAggregate::new(test_draft());
        assert!(validate_aggregate(&aggregate).is_ok());

        aggregate.details.push(DetailFields {
            material_id: 21,
            finish_id: None,
            width_mm: -5.0,
            height_mm: 400.0,
            quantity: 1,
            area_m2: 0.0,
            line_cost: 0.0,
            note: None,
        });
        assert!(matches!(
            validate_aggregate(&aggregate),
            Err(SaveError::Validation(_))
        ));
    }
}
