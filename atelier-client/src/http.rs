//! HTTP data provider for the hosted data API

use crate::config::ClientConfig;
use crate::provider::DataProvider;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use shared::{ListQuery, ProviderError, ProviderResult, Resource};

/// Data provider speaking JSON over HTTP
#[derive(Debug, Clone)]
pub struct HttpProvider {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpProvider {
    /// Create a provider from configuration
    pub fn new(config: &ClientConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        }
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn collection_url(&self, resource: Resource) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), resource.path())
    }

    fn record_url(&self, resource: Resource, id: i64) -> String {
        format!("{}/{}", self.collection_url(resource), id)
    }

    /// Build authorization header value
    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth_header() {
            Some(auth) => request.header(reqwest::header::AUTHORIZATION, auth),
            None => request,
        }
    }

    /// Map transport failures into the taxonomy
    fn transport(err: reqwest::Error) -> ProviderError {
        if err.is_decode() {
            ProviderError::unknown(format!("Invalid response body: {err}"))
        } else {
            ProviderError::network(err.to_string())
        }
    }

    /// Decode the body on success, map the status into the taxonomy otherwise
    async fn handle_response<T: serde::de::DeserializeOwned>(
        resource: Resource,
        id: Option<i64>,
        response: reqwest::Response,
    ) -> ProviderResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.map_err(Self::transport)?;
            return Err(ProviderError::from_status(status, resource, id, text));
        }

        response.json().await.map_err(Self::transport)
    }
}

#[async_trait]
impl DataProvider for HttpProvider {
    async fn create(&self, resource: Resource, values: Value) -> ProviderResult<Value> {
        let request = self.client.post(self.collection_url(resource)).json(&values);
        let response = self.authorize(request).send().await.map_err(Self::transport)?;
        Self::handle_response(resource, None, response).await
    }

    async fn update(&self, resource: Resource, id: i64, values: Value) -> ProviderResult<Value> {
        let request = self.client.put(self.record_url(resource, id)).json(&values);
        let response = self.authorize(request).send().await.map_err(Self::transport)?;
        Self::handle_response(resource, Some(id), response).await
    }

    async fn delete_one(&self, resource: Resource, id: i64) -> ProviderResult<()> {
        let request = self.client.delete(self.record_url(resource, id));
        let response = self.authorize(request).send().await.map_err(Self::transport)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.map_err(Self::transport)?;
            return Err(ProviderError::from_status(status, resource, Some(id), text));
        }
        Ok(())
    }

    async fn get_list(&self, resource: Resource, query: ListQuery) -> ProviderResult<Vec<Value>> {
        let mut request = self.client.get(self.collection_url(resource));

        if let Some(filter) = &query.filter {
            request = request.query(&[("filter", filter.to_string())]);
        }
        if let Some(sort) = &query.sort {
            request = request.query(&[("sort", sort.as_str())]);
        }
        if let Some(page) = query.page {
            request = request.query(&[("page", page.to_string())]);
        }
        if let Some(limit) = query.limit {
            request = request.query(&[("limit", limit.to_string())]);
        }

        let response = self.authorize(request).send().await.map_err(Self::transport)?;
        Self::handle_response(resource, None, response).await
    }
}
