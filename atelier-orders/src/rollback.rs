//! Post-failure cleanup
//!
//! A failed save of a brand-new order would otherwise leave behind a
//! header the user never knew existed. The just-created header is
//! deleted on a best-effort basis; a failure of the delete itself is
//! logged and swallowed so the original save error is what surfaces.
//! Edits never destroy data on failure.

use atelier_client::OrderApi;
use std::fmt;

/// What happened to a header created by a failed save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackOutcome {
    /// Nothing to undo: the save was an edit, or the header never landed
    NotAttempted,
    /// The just-created header was deleted
    HeaderDeleted,
    /// The delete failed; the order remains and may need manual cleanup
    HeaderDeleteFailed,
}

impl fmt::Display for RollbackOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RollbackOutcome::NotAttempted => "not attempted",
            RollbackOutcome::HeaderDeleted => "header deleted",
            RollbackOutcome::HeaderDeleteFailed => "header delete failed",
        };
        write!(f, "{name}")
    }
}

/// Best-effort removal of a header created earlier in the failed save
pub async fn roll_back_created_header(
    api: &OrderApi,
    created_header: Option<i64>,
) -> RollbackOutcome {
    let Some(order_id) = created_header else {
        return RollbackOutcome::NotAttempted;
    };

    match api.delete_order(order_id).await {
        Ok(()) => {
            tracing::warn!(order_id, "Rolled back order header created by failed save");
            RollbackOutcome::HeaderDeleted
        }
        Err(e) => {
            tracing::error!(
                order_id,
                error = %e,
                "Failed to roll back created order header"
            );
            RollbackOutcome::HeaderDeleteFailed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_client::{MemoryProvider, ProviderOp};
    use serde_json::json;
    use shared::{ProviderError, Resource};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_rollback_deletes_created_header() {
        let provider = Arc::new(MemoryProvider::new());
        let order_id = provider.seed(Resource::Orders, json!({ "client_id": 1 }));
        let api = OrderApi::new(provider.clone());

        let outcome = roll_back_created_header(&api, Some(order_id)).await;

        assert_eq!(outcome, RollbackOutcome::HeaderDeleted);
        assert_eq!(provider.count(Resource::Orders), 0);
    }

    #[tokio::test]
    async fn test_rollback_without_created_header_touches_nothing() {
        let provider = Arc::new(MemoryProvider::new());
        let api = OrderApi::new(provider.clone());

        let outcome = roll_back_created_header(&api, None).await;

        assert_eq!(outcome, RollbackOutcome::NotAttempted);
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_rollback_swallows_delete_failure() {
        let provider = Arc::new(MemoryProvider::new());
        let order_id = provider.seed(Resource::Orders, json!({ "client_id": 1 }));
        provider.fail_on(
            Resource::Orders,
            ProviderOp::Delete,
            ProviderError::network("gone away"),
        );
        let api = OrderApi::new(provider.clone());

        let outcome = roll_back_created_header(&api, Some(order_id)).await;

        assert_eq!(outcome, RollbackOutcome::HeaderDeleteFailed);
        assert_eq!(provider.count(Resource::Orders), 1, "order is left behind");
    }
}
