//! Order total recomputation
//!
//! The editor never supplies the total. After detail writes and deletes
//! land, the persisted lines are re-read and summed; what actually
//! persisted is the only source of truth.

use crate::money;
use atelier_client::OrderApi;
use shared::ProviderResult;
use shared::models::OrderRecord;

/// Sum of the persisted detail line costs; 0 when no lines remain
pub async fn recompute_total(api: &OrderApi, order_id: i64) -> ProviderResult<f64> {
    let details = api.list_details(order_id).await?;
    Ok(money::sum_line_costs(&details))
}

/// Recompute and persist through a version-checked header update.
/// Returns the updated header.
pub async fn store_total(api: &OrderApi, order_id: i64, version: i64) -> ProviderResult<OrderRecord> {
    let total = recompute_total(api, order_id).await?;
    api.set_order_total(order_id, version, total).await
}
