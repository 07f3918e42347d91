//! Workshop assignment model
//!
//! Links an order to a workshop that will fabricate or fit it. Assignments
//! carry no change-detection snapshot; present ones are rewritten on save.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// User-entered portion of a workshop assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkshopFields {
    pub workshop_id: i64,
    pub scheduled_on: Option<NaiveDate>,
    pub note: Option<String>,
}

/// Workshop assignment as returned by the data service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkshopRecord {
    pub id: i64,
    pub order_id: i64,
    #[serde(flatten)]
    pub fields: WorkshopFields,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
}

/// Create/update payload for a workshop assignment
#[derive(Debug, Clone, Serialize)]
pub struct WorkshopWrite {
    pub order_id: i64,
    #[serde(flatten)]
    pub fields: WorkshopFields,
}
