//! Detail line model
//!
//! One priced line item: a cut piece with dimensions, quantity, and the
//! material/finish it is made from.

use serde::{Deserialize, Serialize};

/// User-entered portion of a detail line; what change detection compares
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailFields {
    pub material_id: i64,
    pub finish_id: Option<i64>,
    pub width_mm: f64,
    pub height_mm: f64,
    pub quantity: i32,
    /// Computed from dimensions and quantity
    pub area_m2: f64,
    /// Computed price of the line
    pub line_cost: f64,
    pub note: Option<String>,
}

/// Detail line as returned by the data service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailRecord {
    pub id: i64,
    pub order_id: i64,
    #[serde(flatten)]
    pub fields: DetailFields,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
}

/// Create/update payload for a detail line
#[derive(Debug, Clone, Serialize)]
pub struct DetailWrite {
    pub order_id: i64,
    #[serde(flatten)]
    pub fields: DetailFields,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_flattens_fields() {
        let json = serde_json::json!({
            "id": 7,
            "order_id": 3,
            "material_id": 21,
            "finish_id": null,
            "width_mm": 600.0,
            "height_mm": 400.0,
            "quantity": 2,
            "area_m2": 0.48,
            "line_cost": 57.60,
            "note": "polished edge",
            "updated_at": 1755000000000i64
        });

        let record: DetailRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.fields.material_id, 21);
        assert_eq!(record.fields.line_cost, 57.60);
        assert_eq!(record.created_at, None);
    }

    #[test]
    fn test_fields_equality_ignores_identity_and_audit() {
        let fields = DetailFields {
            material_id: 21,
            finish_id: None,
            width_mm: 600.0,
            height_mm: 400.0,
            quantity: 2,
            area_m2: 0.48,
            line_cost: 57.60,
            note: None,
        };

        let a = DetailRecord {
            id: 1,
            order_id: 3,
            fields: fields.clone(),
            created_at: Some(1),
            updated_at: Some(2),
        };
        let b = DetailRecord {
            id: 2,
            order_id: 3,
            fields: fields.clone(),
            created_at: Some(8),
            updated_at: Some(9),
        };

        assert_eq!(a.fields, b.fields);
    }
}
