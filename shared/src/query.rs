//! List-query types
//!
//! One query shape for every `get_list` call, regardless of resource.

use serde::{Deserialize, Serialize};

/// Query for a filtered, optionally paginated list of records
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    /// Filter object, matched field-by-field against records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<serde_json::Value>,
    /// Sort field (e.g. "id", "paid_on_desc")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    /// Page number (1-based)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Page size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl ListQuery {
    /// Query every record of the resource
    pub fn all() -> Self {
        Self::default()
    }

    /// Query with a filter object
    pub fn with_filter(filter: serde_json::Value) -> Self {
        Self {
            filter: Some(filter),
            ..Self::default()
        }
    }

    /// Query the child records of one order
    pub fn by_order(order_id: i64) -> Self {
        Self::with_filter(serde_json::json!({ "order_id": order_id }))
    }

    /// Query one record by id
    pub fn by_id(id: i64) -> Self {
        Self::with_filter(serde_json::json!({ "id": id }))
    }

    /// Add pagination
    pub fn paginate(mut self, page: u32, limit: u32) -> Self {
        self.page = Some(page);
        self.limit = Some(limit);
        self
    }

    /// Add sorting
    pub fn order_by(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }
}
