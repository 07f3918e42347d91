//! Order header model

use crate::util::blank_to_none;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Order header as returned by the data service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: i64,
    pub client_id: i64,
    pub manager_id: Option<i64>,
    pub status_id: i64,
    pub payment_status_id: i64,
    pub ordered_on: Option<NaiveDate>,
    pub due_on: Option<NaiveDate>,
    pub fitted_on: Option<NaiveDate>,
    pub drawing_file: Option<String>,
    pub measure_sheet: Option<String>,
    /// Derived from the persisted detail set, never user-entered
    pub total_amount: f64,
    /// Optimistic-concurrency counter, bumped by the service on every update
    pub version: i64,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
}

/// User-entered portion of the order header.
///
/// Serialized in full on every save; unset optionals travel as JSON null
/// so the service clears them rather than keeping stale values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub client_id: i64,
    pub manager_id: Option<i64>,
    pub status_id: i64,
    pub payment_status_id: i64,
    pub ordered_on: Option<NaiveDate>,
    pub due_on: Option<NaiveDate>,
    pub fitted_on: Option<NaiveDate>,
    pub drawing_file: Option<String>,
    pub measure_sheet: Option<String>,
}

impl OrderDraft {
    /// Coerce blank file-link strings to explicit absence before transmission
    pub fn normalized(mut self) -> Self {
        self.drawing_file = blank_to_none(self.drawing_file);
        self.measure_sheet = blank_to_none(self.measure_sheet);
        self
    }
}

impl From<&OrderRecord> for OrderDraft {
    fn from(record: &OrderRecord) -> Self {
        Self {
            client_id: record.client_id,
            manager_id: record.manager_id,
            status_id: record.status_id,
            payment_status_id: record.payment_status_id,
            ordered_on: record.ordered_on,
            due_on: record.due_on,
            fitted_on: record.fitted_on,
            drawing_file: record.drawing_file.clone(),
            measure_sheet: record.measure_sheet.clone(),
        }
    }
}

/// Update payload for the order header: the draft plus the version the
/// client loaded, for compare-and-swap on the service side
#[derive(Debug, Clone, Serialize)]
pub struct OrderUpdate {
    #[serde(flatten)]
    pub fields: OrderDraft,
    pub version: i64,
}
