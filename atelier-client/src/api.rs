//! Typed access to the order resources
//!
//! Wraps the raw JSON provider with (de)serialization into the shared
//! models. Decode failures surface as `Unknown`: a record the server
//! returned but we cannot read is not a caller mistake.

use crate::provider::DataProvider;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use shared::models::{
    DetailRecord, DetailWrite, OrderDraft, OrderRecord, OrderUpdate, PaymentRecord, PaymentWrite,
    RequirementRecord, RequirementWrite, WorkshopRecord, WorkshopWrite,
};
use shared::{ListQuery, ProviderError, ProviderResult, Resource};
use std::sync::Arc;

/// Typed facade over a [`DataProvider`]
#[derive(Clone)]
pub struct OrderApi {
    provider: Arc<dyn DataProvider>,
}

impl OrderApi {
    pub fn new(provider: Arc<dyn DataProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<dyn DataProvider> {
        &self.provider
    }

    // ==================== Orders ====================

    pub async fn create_order(&self, draft: &OrderDraft) -> ProviderResult<OrderRecord> {
        let record = self
            .provider
            .create(Resource::Orders, encode(draft)?)
            .await?;
        decode(record)
    }

    pub async fn update_order(&self, id: i64, update: &OrderUpdate) -> ProviderResult<OrderRecord> {
        let record = self
            .provider
            .update(Resource::Orders, id, encode(update)?)
            .await?;
        decode(record)
    }

    pub async fn get_order(&self, id: i64) -> ProviderResult<OrderRecord> {
        let records = self
            .provider
            .get_list(Resource::Orders, ListQuery::by_id(id))
            .await?;
        let record = records
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::not_found(Resource::Orders, id))?;
        decode(record)
    }

    pub async fn delete_order(&self, id: i64) -> ProviderResult<()> {
        self.provider.delete_one(Resource::Orders, id).await
    }

    /// Write a freshly derived total through a version-checked update
    pub async fn set_order_total(
        &self,
        id: i64,
        version: i64,
        total: f64,
    ) -> ProviderResult<OrderRecord> {
        let values = json!({ "total_amount": total, "version": version });
        let record = self.provider.update(Resource::Orders, id, values).await?;
        decode(record)
    }

    // ==================== Detail lines ====================

    pub async fn list_details(&self, order_id: i64) -> ProviderResult<Vec<DetailRecord>> {
        let records = self
            .provider
            .get_list(
                Resource::OrderDetails,
                ListQuery::by_order(order_id).order_by("id"),
            )
            .await?;
        decode_list(records)
    }

    pub async fn create_detail(&self, write: &DetailWrite) -> ProviderResult<DetailRecord> {
        let record = self
            .provider
            .create(Resource::OrderDetails, encode(write)?)
            .await?;
        decode(record)
    }

    pub async fn update_detail(&self, id: i64, write: &DetailWrite) -> ProviderResult<DetailRecord> {
        let record = self
            .provider
            .update(Resource::OrderDetails, id, encode(write)?)
            .await?;
        decode(record)
    }

    pub async fn delete_detail(&self, id: i64) -> ProviderResult<()> {
        self.provider.delete_one(Resource::OrderDetails, id).await
    }

    // ==================== Payments ====================

    pub async fn list_payments(&self, order_id: i64) -> ProviderResult<Vec<PaymentRecord>> {
        let records = self
            .provider
            .get_list(
                Resource::Payments,
                ListQuery::by_order(order_id).order_by("id"),
            )
            .await?;
        decode_list(records)
    }

    pub async fn create_payment(&self, write: &PaymentWrite) -> ProviderResult<PaymentRecord> {
        let record = self
            .provider
            .create(Resource::Payments, encode(write)?)
            .await?;
        decode(record)
    }

    pub async fn update_payment(
        &self,
        id: i64,
        write: &PaymentWrite,
    ) -> ProviderResult<PaymentRecord> {
        let record = self
            .provider
            .update(Resource::Payments, id, encode(write)?)
            .await?;
        decode(record)
    }

    pub async fn delete_payment(&self, id: i64) -> ProviderResult<()> {
        self.provider.delete_one(Resource::Payments, id).await
    }

    // ==================== Workshop assignments ====================

    pub async fn list_workshops(&self, order_id: i64) -> ProviderResult<Vec<WorkshopRecord>> {
        let records = self
            .provider
            .get_list(
                Resource::OrderWorkshops,
                ListQuery::by_order(order_id).order_by("id"),
            )
            .await?;
        decode_list(records)
    }

    pub async fn create_workshop(&self, write: &WorkshopWrite) -> ProviderResult<WorkshopRecord> {
        let record = self
            .provider
            .create(Resource::OrderWorkshops, encode(write)?)
            .await?;
        decode(record)
    }

    pub async fn update_workshop(
        &self,
        id: i64,
        write: &WorkshopWrite,
    ) -> ProviderResult<WorkshopRecord> {
        let record = self
            .provider
            .update(Resource::OrderWorkshops, id, encode(write)?)
            .await?;
        decode(record)
    }

    pub async fn delete_workshop(&self, id: i64) -> ProviderResult<()> {
        self.provider.delete_one(Resource::OrderWorkshops, id).await
    }

    // ==================== Resource requirements ====================

    pub async fn list_requirements(&self, order_id: i64) -> ProviderResult<Vec<RequirementRecord>> {
        let records = self
            .provider
            .get_list(
                Resource::OrderRequirements,
                ListQuery::by_order(order_id).order_by("id"),
            )
            .await?;
        decode_list(records)
    }

    pub async fn create_requirement(
        &self,
        write: &RequirementWrite,
    ) -> ProviderResult<RequirementRecord> {
        let record = self
            .provider
            .create(Resource::OrderRequirements, encode(write)?)
            .await?;
        decode(record)
    }

    pub async fn update_requirement(
        &self,
        id: i64,
        write: &RequirementWrite,
    ) -> ProviderResult<RequirementRecord> {
        let record = self
            .provider
            .update(Resource::OrderRequirements, id, encode(write)?)
            .await?;
        decode(record)
    }

    pub async fn delete_requirement(&self, id: i64) -> ProviderResult<()> {
        self.provider
            .delete_one(Resource::OrderRequirements, id)
            .await
    }
}

fn encode<T: Serialize>(value: &T) -> ProviderResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| ProviderError::unknown(format!("Failed to encode payload: {e}")))
}

fn decode<T: DeserializeOwned>(value: Value) -> ProviderResult<T> {
    serde_json::from_value(value)
        .map_err(|e| ProviderError::unknown(format!("Invalid record from server: {e}")))
}

fn decode_list<T: DeserializeOwned>(values: Vec<Value>) -> ProviderResult<Vec<T>> {
    values.into_iter().map(decode).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryProvider;

    fn test_api() -> (OrderApi, Arc<MemoryProvider>) {
        let provider = Arc::new(MemoryProvider::new());
        (OrderApi::new(provider.clone()), provider)
    }

    fn test_draft() -> OrderDraft {
        OrderDraft {
            client_id: 11,
            manager_id: None,
            status_id: 1,
            payment_status_id: 1,
            ordered_on: None,
            due_on: None,
            fitted_on: None,
            drawing_file: None,
            measure_sheet: None,
        }
    }

    #[tokio::test]
    async fn test_create_then_get_order() {
        let (api, _) = test_api();

        let created = api.create_order(&test_draft()).await.unwrap();
        assert_eq!(created.version, 1);
        assert_eq!(created.total_amount, 0.0);

        let fetched = api.get_order(created.id).await.unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.client_id, 11);
    }

    #[tokio::test]
    async fn test_get_order_missing_is_unknown() {
        let (api, _) = test_api();
        let result = api.get_order(404).await;
        assert!(matches!(result, Err(ProviderError::Unknown(_))));
    }

    #[tokio::test]
    async fn test_set_order_total_bumps_version() {
        let (api, _) = test_api();
        let order = api.create_order(&test_draft()).await.unwrap();

        let updated = api.set_order_total(order.id, order.version, 350.50).await.unwrap();
        assert_eq!(updated.total_amount, 350.50);
        assert_eq!(updated.version, order.version + 1);
    }

    #[tokio::test]
    async fn test_detail_lifecycle() {
        let (api, _) = test_api();
        let order = api.create_order(&test_draft()).await.unwrap();

        let write = DetailWrite {
            order_id: order.id,
            fields: shared::models::DetailFields {
                material_id: 21,
                finish_id: None,
                width_mm: 600.0,
                height_mm: 400.0,
                quantity: 2,
                area_m2: 0.48,
                line_cost: 57.60,
                note: None,
            },
        };

        let created = api.create_detail(&write).await.unwrap();
        assert_eq!(created.order_id, order.id);

        let mut changed = write.clone();
        changed.fields.quantity = 3;
        let updated = api.update_detail(created.id, &changed).await.unwrap();
        assert_eq!(updated.fields.quantity, 3);

        let listed = api.list_details(order.id).await.unwrap();
        assert_eq!(listed.len(), 1);

        api.delete_detail(created.id).await.unwrap();
        assert!(api.list_details(order.id).await.unwrap().is_empty());
    }
}
