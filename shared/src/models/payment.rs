//! Payment model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// User-entered portion of a payment; what change detection compares
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentFields {
    pub amount: f64,
    pub method_id: i64,
    pub paid_on: Option<NaiveDate>,
    /// Bank/slip reference
    pub reference: Option<String>,
    pub note: Option<String>,
}

/// Payment as returned by the data service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: i64,
    pub order_id: i64,
    #[serde(flatten)]
    pub fields: PaymentFields,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
}

/// Create/update payload for a payment
#[derive(Debug, Clone, Serialize)]
pub struct PaymentWrite {
    pub order_id: i64,
    #[serde(flatten)]
    pub fields: PaymentFields,
}
