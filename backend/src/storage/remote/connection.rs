//! HTTP connection to the hosted table-store.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;
use crate::storage::StoreError;

/// Shared connection: base URL, API key and a pooled HTTP client.
///
/// The API key travels both as the store's `apikey` header and as a bearer
/// token, which is how the hosted service expects its public (anon) key.
#[derive(Debug, Clone)]
pub struct RemoteConnection {
    base_url: String,
    client: reqwest::Client,
}

impl RemoteConnection {
    pub fn new(config: &Config) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.store_api_key)
            .map_err(|e| StoreError::Decode(format!("API key is not a valid header value: {e}")))?;
        headers.insert("apikey", key);
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.store_api_key))
            .map_err(|e| StoreError::Decode(format!("API key is not a valid header value: {e}")))?;
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            base_url: config.store_url.clone(),
            client,
        })
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/rest/v1/{}", self.base_url, table))
    }

    /// `GET` rows matching the query parameters.
    pub(crate) async fn select<R: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<R>, StoreError> {
        self.execute(self.request(Method::GET, table).query(query))
            .await
    }

    /// `POST` one row; returns it as stored (id and timestamps filled in).
    pub(crate) async fn insert<T: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        row: &T,
    ) -> Result<R, StoreError> {
        let rows: Vec<R> = self
            .execute(
                self.request(Method::POST, table)
                    .header("Prefer", "return=representation")
                    .json(row),
            )
            .await?;
        rows.into_iter().next().ok_or_else(|| {
            StoreError::Decode(format!("insert into {table} returned no representation"))
        })
    }

    /// `PATCH` the rows matching the query parameters; returns them as
    /// updated.
    pub(crate) async fn update<T: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
        patch: &T,
    ) -> Result<Vec<R>, StoreError> {
        self.execute(
            self.request(Method::PATCH, table)
                .query(query)
                .header("Prefer", "return=representation")
                .json(patch),
        )
        .await
    }

    /// `DELETE` the rows matching the query parameters; returns how many
    /// rows the store removed.
    pub(crate) async fn delete(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<u64, StoreError> {
        let removed: Vec<serde_json::Value> = self
            .execute(
                self.request(Method::DELETE, table)
                    .query(query)
                    .header("Prefer", "return=representation"),
            )
            .await?;
        Ok(removed.len() as u64)
    }

    async fn execute<R: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<R, StoreError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }
}
