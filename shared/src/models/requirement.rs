//! Resource requirement model
//!
//! Quantified material/resource a workshop needs to produce the order.
//! Like workshop assignments, requirements carry no change-detection
//! snapshot; present ones are rewritten on save.

use serde::{Deserialize, Serialize};

/// User-entered portion of a resource requirement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementFields {
    pub resource_id: i64,
    pub quantity: f64,
    pub note: Option<String>,
}

/// Resource requirement as returned by the data service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementRecord {
    pub id: i64,
    pub order_id: i64,
    #[serde(flatten)]
    pub fields: RequirementFields,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
}

/// Create/update payload for a resource requirement
#[derive(Debug, Clone, Serialize)]
pub struct RequirementWrite {
    pub order_id: i64,
    #[serde(flatten)]
    pub fields: RequirementFields,
}
