//! Resource names exposed by the data service

use serde::{Deserialize, Serialize};

/// Resources the data service exposes CRUD operations on.
///
/// Every provider call names one of these; the wire path is derived from
/// the variant so callers never pass free-form strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// Order headers
    Orders,
    /// Priced line items of an order
    OrderDetails,
    /// Payments recorded against an order
    Payments,
    /// Workshop assignments of an order
    OrderWorkshops,
    /// Material/resource requirements of an order
    OrderRequirements,
}

impl Resource {
    /// Wire path segment for this resource
    pub fn path(&self) -> &'static str {
        match self {
            Self::Orders => "orders",
            Self::OrderDetails => "order_details",
            Self::Payments => "payments",
            Self::OrderWorkshops => "order_workshops",
            Self::OrderRequirements => "order_requirements",
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}
