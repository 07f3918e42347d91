//! Data-provider contract

use async_trait::async_trait;
use serde_json::Value;
use shared::{ListQuery, ProviderResult, Resource};

/// Uniform CRUD access to the data service.
///
/// One implementation speaks HTTP to the hosted API; an in-memory one
/// backs tests. Implementations produce [`shared::ProviderError`] kinds
/// at their own boundary, and must be cancel-safe at every await point:
/// phase fan-out drops in-flight sibling calls on first error.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Create a record, returning it with server-assigned fields
    async fn create(&self, resource: Resource, values: Value) -> ProviderResult<Value>;

    /// Update a record by id, returning the stored result
    async fn update(&self, resource: Resource, id: i64, values: Value) -> ProviderResult<Value>;

    /// Delete a record by id
    async fn delete_one(&self, resource: Resource, id: i64) -> ProviderResult<()>;

    /// List records matching a query
    async fn get_list(&self, resource: Resource, query: ListQuery) -> ProviderResult<Vec<Value>>;
}
