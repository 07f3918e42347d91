//! Child record identity

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a child record within an aggregate.
///
/// A record either carries a server-assigned id or a client-only temp id,
/// never both. Temp ids exist for list reconciliation during an edit
/// session and resolve to server ids on the first successful save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ChildKey {
    /// Already persisted under this server id
    Persisted(i64),
    /// Exists only in the editing session
    Temp(Uuid),
}

impl ChildKey {
    /// Fresh client-only identity
    pub fn fresh() -> Self {
        Self::Temp(Uuid::new_v4())
    }

    /// Server id, if the record is persisted
    pub fn persisted_id(&self) -> Option<i64> {
        match self {
            Self::Persisted(id) => Some(*id),
            Self::Temp(_) => None,
        }
    }

    /// True if the record has never been saved
    pub fn is_temp(&self) -> bool {
        matches!(self, Self::Temp(_))
    }
}
