//! HTTP client for the store REST API.
//!
//! Wraps `reqwest` with base URL handling, optional bearer authentication and
//! typed (de)serialization of the two calls the editor needs: the store list
//! and the per-store geofence replace.

use std::time::Duration;

use geofence_core::{AppConfig, LatLng, Store, StoreGateway, StoreId};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};

use crate::error::ClientError;
use crate::retry::retry_with_backoff;
use crate::types::{ErrorBody, GeofencePayload, StoreList};

/// Client for the store REST API.
///
/// Use [`GeofenceClient::new`] for configured deployments or
/// [`GeofenceClient::with_base_url`] to point at a mock server in tests.
pub struct GeofenceClient {
    client: Client,
    base_url: Url,
    api_token: Option<String>,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl std::fmt::Debug for GeofenceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeofenceClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_token", &self.api_token.as_ref().map(|_| "[redacted]"))
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .finish_non_exhaustive()
    }
}

impl GeofenceClient {
    /// Creates a client from the application configuration.
    ///
    /// # Errors
    ///
    /// Same as [`GeofenceClient::with_base_url`].
    pub fn new(config: &AppConfig) -> Result<Self, ClientError> {
        Self::with_base_url(
            &config.api_base_url,
            config.request_timeout_secs,
            config.api_token.as_deref(),
            config.max_retries,
            config.retry_backoff_base_ms,
        )
    }

    /// Creates a client against an explicit base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ClientError::InvalidBaseUrl`] if
    /// `base_url` is not an absolute http(s) URL.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        api_token: Option<&str>,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("geofence-editor/0.1")
            .build()?;

        // Exactly one trailing slash, so that relative joins append to the
        // path instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
            api_token: api_token.filter(|t| !t.is_empty()).map(str::to_owned),
            max_retries,
            backoff_base_ms,
        })
    }

    /// Fetches every store with its current geofence.
    ///
    /// Transient failures (network errors, 5xx) are retried with back-off.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] on network failure after all retries.
    /// - [`ClientError::Api`] on a non-success status.
    /// - [`ClientError::Deserialize`] if the body is neither a store array
    ///   nor a `{ "data": [...] }` envelope.
    pub async fn list_stores(&self) -> Result<Vec<Store>, ClientError> {
        let url = self.endpoint("stores")?;
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.get_text(&url)
        })
        .await?;

        let list: StoreList =
            serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
                context: format!("GET {url}"),
                source: e,
            })?;
        let stores = list.into_stores();
        tracing::info!(count = stores.len(), "fetched store list");
        Ok(stores)
    }

    /// Replaces the geofence of `store_id`. An empty slice clears it.
    ///
    /// Not retried: a failure is surfaced so the user can decide to save again.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Api`] on a non-success status, carrying the server's
    ///   `message` when it sent one.
    pub async fn save_store_polygon(
        &self,
        store_id: StoreId,
        coordinates: &[LatLng],
    ) -> Result<(), ClientError> {
        let url = self.endpoint(&format!("stores/{store_id}/geofence"))?;
        let request = self
            .client
            .put(url)
            .json(&GeofencePayload { coordinates });
        let response = self.authorized(request).send().await?;
        Self::check_status(response).await?;
        tracing::info!(%store_id, vertices = coordinates.len(), "saved store geofence");
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_text(&self, url: &Url) -> Result<String, ClientError> {
        let response = self.authorized(self.client.get(url.clone())).send().await?;
        let response = Self::check_status(response).await?;
        Ok(response.text().await?)
    }

    /// Turns a non-success response into [`ClientError::Api`].
    async fn check_status(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(api_error(status, &body))
    }
}

fn api_error(status: StatusCode, body: &str) -> ClientError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_owned()
        });
    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

impl StoreGateway for GeofenceClient {
    type Error = ClientError;

    async fn list_stores(&self) -> Result<Vec<Store>, ClientError> {
        GeofenceClient::list_stores(self).await
    }

    async fn save_store_polygon(
        &self,
        store_id: StoreId,
        coordinates: &[LatLng],
    ) -> Result<(), ClientError> {
        GeofenceClient::save_store_polygon(self, store_id, coordinates).await
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
