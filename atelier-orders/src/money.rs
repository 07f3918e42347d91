//! Money and measurement arithmetic using rust_decimal for precision
//!
//! Detail lines and totals are stored as `f64` but never computed as
//! `f64`: all arithmetic goes through `Decimal` and is rounded once at
//! the end. Input validation for the money-bearing child rows lives
//! here too.

use crate::error::{SaveError, SaveResult};
use rust_decimal::prelude::*;
use shared::models::{DetailFields, DetailRecord, PaymentFields, RequirementFields};

/// Rounding for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Rounding for areas in square metres
const AREA_PLACES: u32 = 3;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum cut dimension per side (20 metres, in mm)
const MAX_DIMENSION_MM: f64 = 20_000.0;
/// Maximum allowed quantity per detail line
const MAX_QUANTITY: i32 = 9999;
/// Maximum allowed cost per detail line (€1,000,000)
const MAX_LINE_COST: f64 = 1_000_000.0;
/// Maximum allowed payment amount (€1,000,000)
const MAX_PAYMENT_AMOUNT: f64 = 1_000_000.0;

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
fn require_finite(value: f64, field_name: &str) -> SaveResult<()> {
    if !value.is_finite() {
        return Err(SaveError::validation(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Validate a detail line before persisting
pub fn validate_detail(fields: &DetailFields) -> SaveResult<()> {
    if fields.material_id <= 0 {
        return Err(SaveError::validation(
            "detail line must reference a material",
        ));
    }

    // Dimensions must be finite, positive, and within cutting range
    require_finite(fields.width_mm, "width_mm")?;
    if fields.width_mm <= 0.0 {
        return Err(SaveError::validation(format!(
            "width_mm must be positive, got {}",
            fields.width_mm
        )));
    }
    if fields.width_mm > MAX_DIMENSION_MM {
        return Err(SaveError::validation(format!(
            "width_mm exceeds maximum allowed ({}), got {}",
            MAX_DIMENSION_MM, fields.width_mm
        )));
    }
    require_finite(fields.height_mm, "height_mm")?;
    if fields.height_mm <= 0.0 {
        return Err(SaveError::validation(format!(
            "height_mm must be positive, got {}",
            fields.height_mm
        )));
    }
    if fields.height_mm > MAX_DIMENSION_MM {
        return Err(SaveError::validation(format!(
            "height_mm exceeds maximum allowed ({}), got {}",
            MAX_DIMENSION_MM, fields.height_mm
        )));
    }

    // Quantity must be positive and within bounds
    if fields.quantity <= 0 {
        return Err(SaveError::validation(format!(
            "quantity must be positive, got {}",
            fields.quantity
        )));
    }
    if fields.quantity > MAX_QUANTITY {
        return Err(SaveError::validation(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, fields.quantity
        )));
    }

    // Derived figures must be finite and non-negative
    require_finite(fields.area_m2, "area_m2")?;
    if fields.area_m2 < 0.0 {
        return Err(SaveError::validation(format!(
            "area_m2 must be non-negative, got {}",
            fields.area_m2
        )));
    }
    require_finite(fields.line_cost, "line_cost")?;
    if fields.line_cost < 0.0 {
        return Err(SaveError::validation(format!(
            "line_cost must be non-negative, got {}",
            fields.line_cost
        )));
    }
    if fields.line_cost > MAX_LINE_COST {
        return Err(SaveError::validation(format!(
            "line_cost exceeds maximum allowed ({}), got {}",
            MAX_LINE_COST, fields.line_cost
        )));
    }

    Ok(())
}

/// Validate a payment before persisting
pub fn validate_payment(fields: &PaymentFields) -> SaveResult<()> {
    require_finite(fields.amount, "payment amount")?;
    if fields.amount <= 0.0 {
        return Err(SaveError::validation(format!(
            "payment amount must be positive, got {}",
            fields.amount
        )));
    }
    if fields.amount > MAX_PAYMENT_AMOUNT {
        return Err(SaveError::validation(format!(
            "payment amount exceeds maximum allowed ({}), got {}",
            MAX_PAYMENT_AMOUNT, fields.amount
        )));
    }

    if fields.method_id <= 0 {
        return Err(SaveError::validation(
            "payment must reference a payment method",
        ));
    }

    Ok(())
}

/// Validate a resource requirement before persisting
pub fn validate_requirement(fields: &RequirementFields) -> SaveResult<()> {
    if fields.resource_id <= 0 {
        return Err(SaveError::validation(
            "requirement must reference a resource",
        ));
    }

    require_finite(fields.quantity, "requirement quantity")?;
    if fields.quantity <= 0.0 {
        return Err(SaveError::validation(format!(
            "requirement quantity must be positive, got {}",
            fields.quantity
        )));
    }

    Ok(())
}

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Area of a detail line in square metres: width * height * quantity,
/// rounded to 3 decimal places
pub fn area_m2(width_mm: f64, height_mm: f64, quantity: i32) -> f64 {
    let area = to_decimal(width_mm) * to_decimal(height_mm) * Decimal::from(quantity)
        / Decimal::from(1_000_000);
    area.round_dp_with_strategy(AREA_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Cost of a detail line from its area and the material rate per m²
pub fn line_cost(area_m2: f64, rate_per_m2: f64) -> f64 {
    to_f64(to_decimal(area_m2) * to_decimal(rate_per_m2))
}

/// Sum detail line costs with precise arithmetic.
///
/// This is the order total: nothing else feeds it.
pub fn sum_line_costs(details: &[DetailRecord]) -> f64 {
    let total: Decimal = details
        .iter()
        .map(|d| to_decimal(d.fields.line_cost))
        .sum();

    to_f64(total)
}

/// Compare two monetary values for equality (within 0.01 tolerance)
pub fn money_eq(a: f64, b: f64) -> bool {
    let diff = (to_decimal(a) - to_decimal(b)).abs();
    diff < MONEY_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail_fields() -> DetailFields {
        DetailFields {
            material_id: 21,
            finish_id: None,
            width_mm: 600.0,
            height_mm: 400.0,
            quantity: 2,
            area_m2: 0.48,
            line_cost: 57.60,
            note: None,
        }
    }

    fn detail_record(line_cost: f64) -> DetailRecord {
        DetailRecord {
            id: 1,
            order_id: 1,
            fields: DetailFields {
                line_cost,
                ..detail_fields()
            },
            created_at: None,
            updated_at: None,
        }
    }

    // ========================================================================
    // Conversion and rounding
    // ========================================================================

    #[test]
    fn test_to_decimal_precision() {
        // Classic floating point problem: 0.1 + 0.2 != 0.3
        let sum_f64 = 0.1_f64 + 0.2_f64;
        assert_ne!(sum_f64, 0.3);

        let sum_dec = to_decimal(0.1) + to_decimal(0.2);
        assert_eq!(to_f64(sum_dec), 0.3);
    }

    #[test]
    fn test_accumulation_precision() {
        // Sum 0.01 one thousand times
        let mut total = Decimal::ZERO;
        for _ in 0..1000 {
            total += to_decimal(0.01);
        }
        assert_eq!(to_f64(total), 10.0);
    }

    #[test]
    fn test_rounding_half_up() {
        let value = Decimal::new(5, 3); // 0.005
        let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        assert_eq!(rounded.to_f64().unwrap(), 0.01);

        let value2 = Decimal::new(4, 3); // 0.004
        let rounded2 = value2.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        assert_eq!(rounded2.to_f64().unwrap(), 0.0);
    }

    #[test]
    fn test_to_decimal_non_finite_becomes_zero() {
        assert_eq!(to_decimal(f64::NAN), Decimal::ZERO);
        assert_eq!(to_decimal(f64::INFINITY), Decimal::ZERO);
        assert_eq!(to_decimal(f64::NEG_INFINITY), Decimal::ZERO);
    }

    // ========================================================================
    // Area and line cost
    // ========================================================================

    #[test]
    fn test_area_m2() {
        // 600mm x 400mm x 2 = 0.48 m²
        assert_eq!(area_m2(600.0, 400.0, 2), 0.48);
        // Rounds to 3 places: 333 x 333 = 0.110889 m²
        assert_eq!(area_m2(333.0, 333.0, 1), 0.111);
    }

    #[test]
    fn test_line_cost_from_rate() {
        // 0.48 m² at 120/m² = 57.60
        assert_eq!(line_cost(0.48, 120.0), 57.60);
        // Rounds half-up: 0.111 * 45.5 = 5.0505 -> 5.05
        assert_eq!(line_cost(0.111, 45.5), 5.05);
    }

    #[test]
    fn test_sum_line_costs() {
        let details = vec![detail_record(100.0), detail_record(250.50)];
        assert_eq!(sum_line_costs(&details), 350.50);
    }

    #[test]
    fn test_sum_line_costs_empty_is_zero() {
        assert_eq!(sum_line_costs(&[]), 0.0);
    }

    #[test]
    fn test_sum_line_costs_many_small_lines() {
        // 100 lines at 0.01 each
        let details: Vec<DetailRecord> = (0..100).map(|_| detail_record(0.01)).collect();
        assert_eq!(sum_line_costs(&details), 1.0);
    }

    #[test]
    fn test_money_eq() {
        assert!(money_eq(100.0, 100.0));
        assert!(money_eq(100.004, 100.006));
        assert!(!money_eq(100.0, 100.02));
    }

    // ========================================================================
    // Detail validation
    // ========================================================================

    #[test]
    fn test_validate_detail_accepts_normal_line() {
        assert!(validate_detail(&detail_fields()).is_ok());
    }

    #[test]
    fn test_validate_detail_rejects_missing_material() {
        let fields = DetailFields {
            material_id: 0,
            ..detail_fields()
        };
        assert!(matches!(
            validate_detail(&fields),
            Err(SaveError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_detail_rejects_bad_dimensions() {
        let zero_width = DetailFields {
            width_mm: 0.0,
            ..detail_fields()
        };
        assert!(validate_detail(&zero_width).is_err());

        let oversized = DetailFields {
            height_mm: MAX_DIMENSION_MM + 1.0,
            ..detail_fields()
        };
        assert!(validate_detail(&oversized).is_err());

        let nan = DetailFields {
            width_mm: f64::NAN,
            ..detail_fields()
        };
        assert!(validate_detail(&nan).is_err());
    }

    #[test]
    fn test_validate_detail_rejects_bad_quantity() {
        let zero = DetailFields {
            quantity: 0,
            ..detail_fields()
        };
        assert!(validate_detail(&zero).is_err());

        let too_many = DetailFields {
            quantity: MAX_QUANTITY + 1,
            ..detail_fields()
        };
        assert!(validate_detail(&too_many).is_err());
    }

    #[test]
    fn test_validate_detail_rejects_bad_cost() {
        let negative = DetailFields {
            line_cost: -1.0,
            ..detail_fields()
        };
        assert!(validate_detail(&negative).is_err());

        let infinite = DetailFields {
            line_cost: f64::INFINITY,
            ..detail_fields()
        };
        assert!(validate_detail(&infinite).is_err());

        let absurd = DetailFields {
            line_cost: MAX_LINE_COST + 1.0,
            ..detail_fields()
        };
        assert!(validate_detail(&absurd).is_err());
    }

    // ========================================================================
    // Payment validation
    // ========================================================================

    #[test]
    fn test_validate_payment() {
        let good = PaymentFields {
            amount: 50.0,
            method_id: 1,
            paid_on: None,
            reference: None,
            note: None,
        };
        assert!(validate_payment(&good).is_ok());

        let zero = PaymentFields {
            amount: 0.0,
            ..good.clone()
        };
        assert!(validate_payment(&zero).is_err());

        let negative = PaymentFields {
            amount: -5.0,
            ..good.clone()
        };
        assert!(validate_payment(&negative).is_err());

        let nan = PaymentFields {
            amount: f64::NAN,
            ..good.clone()
        };
        assert!(validate_payment(&nan).is_err());

        let huge = PaymentFields {
            amount: MAX_PAYMENT_AMOUNT + 1.0,
            ..good.clone()
        };
        assert!(validate_payment(&huge).is_err());

        let no_method = PaymentFields {
            method_id: 0,
            ..good
        };
        assert!(validate_payment(&no_method).is_err());
    }

    // ========================================================================
    // Requirement validation
    // ========================================================================

    #[test]
    fn test_validate_requirement() {
        let good = RequirementFields {
            resource_id: 4,
            quantity: 2.5,
            note: None,
        };
        assert!(validate_requirement(&good).is_ok());

        let no_resource = RequirementFields {
            resource_id: 0,
            ..good.clone()
        };
        assert!(validate_requirement(&no_resource).is_err());

        let zero_quantity = RequirementFields {
            quantity: 0.0,
            ..good
        };
        assert!(validate_requirement(&zero_quantity).is_err());
    }
}
