//! HTTP client for the gamma exposure API.

use crate::error::Error;
use crate::types::*;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use url::Url;


/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API (e.g., "http://localhost:8080").
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the Gamma Exposure API.
#[derive(Debug, Clone)]
pub struct GexClient {
    client: Client,
    base_url: String,
}

impl GexClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    /// Returns error if the base URL is invalid or the HTTP client cannot be
    /// built.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        Url::parse(&config.base_url)?;
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Creates a new client with default configuration.
    ///
    /// # Errors
    /// Returns error if the base URL is invalid or the HTTP client cannot be
    /// built.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        Self::new(ClientConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
    }

    /// Base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ========================================================================
    // Health & Stats
    // ========================================================================

    /// Performs a health check.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn health_check(&self) -> Result<HealthResponse, Error> {
        let url = format!("{}/health", self.base_url);
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    /// Gets global statistics.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_global_stats(&self) -> Result<GlobalStatsResponse, Error> {
        let url = format!("{}/api/v1/stats", self.base_url);
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Datasets
    // ========================================================================

    /// Lists all datasets.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_datasets(&self) -> Result<DatasetsListResponse, Error> {
        let url = format!("{}/api/v1/datasets", self.base_url);
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    /// Uploads a raw legacy or snapshot payload.
    ///
    /// # Errors
    /// Returns error if the request fails or the payload is rejected.
    pub async fn upload_dataset(&self, payload: &str) -> Result<UploadResponse, Error> {
        let url = format!("{}/api/v1/datasets", self.base_url);
        let resp = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload.to_string())
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Serializes `payload` and uploads it.
    ///
    /// # Errors
    /// Returns error if serialization or the request fails, or the payload is
    /// rejected.
    pub async fn upload_json<T: Serialize + ?Sized>(
        &self,
        payload: &T,
    ) -> Result<UploadResponse, Error> {
        let body = serde_json::to_string(payload)?;
        self.upload_dataset(&body).await
    }

    /// Gets a dataset summary.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_dataset(&self, id: &str) -> Result<DatasetSummary, Error> {
        let url = format!("{}/api/v1/datasets/{}", self.base_url, id);
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    /// Deletes a dataset.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn delete_dataset(&self, id: &str) -> Result<DeleteResponse, Error> {
        let url = format!("{}/api/v1/datasets/{}", self.base_url, id);
        let resp = self.client.delete(&url).send().await?;
        self.handle_response(resp).await
    }

    /// Lists expirations of a dataset.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_expirations(&self, id: &str) -> Result<ExpirationsListResponse, Error> {
        let url = format!("{}/api/v1/datasets/{}/expirations", self.base_url, id);
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Strike Selection
    // ========================================================================

    /// Gets filtered strikes, highest first.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_strikes(&self, id: &str, query: &StrikeQuery) -> Result<StrikesResponse, Error> {
        let url = self.query_url(&format!("/api/v1/datasets/{}/strikes", id), query)?;
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    /// Gets strikes preceding each sign change of the filtered exposure.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_crossings(
        &self,
        id: &str,
        query: &StrikeQuery,
    ) -> Result<CrossingsResponse, Error> {
        let url = self.query_url(&format!("/api/v1/datasets/{}/crossings", id), query)?;
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Gamma Profile
    // ========================================================================

    /// Gets the gamma profile and flip point.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_profile(&self, id: &str, query: &ProfileQuery) -> Result<ProfileResponse, Error> {
        let url = self.query_url(&format!("/api/v1/datasets/{}/profile", id), query)?;
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    fn query_url<Q: Serialize>(&self, path: &str, query: &Q) -> Result<String, Error> {
        let mut url = format!("{}{}", self.base_url, path);
        let params = serde_urlencoded::to_string(query)?;
        if !params.is_empty() {
            url.push_str(&format!("?{}", params));
        }
        Ok(url)
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status.is_success() {
            return Ok(resp.json().await?);
        }

        let text = resp.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<ErrorResponse>(&text) {
            Ok(body) => (body.code, body.error),
            Err(_) => ("UNKNOWN".to_string(), text),
        };

        if status.as_u16() == 404 {
            Err(Error::NotFound(message))
        } else {
            Err(Error::Api {
                status: status.as_u16(),
                code,
                message,
            })
        }
    }
}
