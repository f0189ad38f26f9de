//! Authenticated JSON client for the hosted dashboard backend.

use std::time::Duration;

use dashsync_domain::{AnalyticsConfig, DashSyncError, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};
use url::Url;

use crate::errors::{status_error, InfraError};
use crate::http::HttpClient;

/// JSON-over-HTTP client rooted at the backend base URL.
///
/// Cheap to clone; the analytics and preference clients share one.
#[derive(Clone)]
pub struct BackendClient {
    base_url: Url,
    http: HttpClient,
}

impl BackendClient {
    /// Build a client from the analytics backend settings.
    ///
    /// # Errors
    /// `Config` when the base URL is empty or unparseable, or the token is
    /// not a valid header value.
    pub fn from_config(config: &AnalyticsConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = config.api_token.as_deref().filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| DashSyncError::Config("API token is not a valid header".into()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .max_attempts(config.max_attempts)
            .user_agent(concat!("dashsync/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Self::new(&config.base_url, http)
    }

    /// Client over an existing transport.
    pub fn new(base_url: &str, http: HttpClient) -> Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|err| DashSyncError::Config(format!("invalid backend URL '{base_url}': {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(DashSyncError::Config(format!("backend URL '{base_url}' cannot be a base")));
        }
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL with `segments` appended, each percent-encoded.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    #[instrument(skip(self, query))]
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<T> {
        let request = self.http.request(Method::GET, self.url(segments)).query(query);
        decode(self.execute(request).await?).await
    }

    #[instrument(skip(self, body))]
    pub async fn post_json<B: Serialize + ?Sized>(&self, segments: &[&str], body: &B) -> Result<()> {
        let request = self.http.request(Method::POST, self.url(segments)).json(body);
        self.execute(request).await.map(drop)
    }

    #[instrument(skip(self, body))]
    pub async fn patch_json<B, T>(&self, segments: &[&str], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.http.request(Method::PATCH, self.url(segments)).json(body);
        decode(self.execute(request).await?).await
    }

    /// Send with retries and turn non-success statuses into domain errors.
    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.http.send(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().clone();
        let body = response.text().await.unwrap_or_default();
        debug!(%url, %status, "backend returned error status");

        let message = if body.trim().is_empty() {
            format!("{url} returned status {status}")
        } else {
            format!("{url} returned status {status}: {}", body.trim())
        };
        Err(status_error(status, message))
    }
}

/// JSON body of a successful response; `204`/`205` decode from `null`.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
        return serde_json::from_value(serde_json::Value::Null).map_err(|_| {
            DashSyncError::Serialization(format!("expected a body but got status {status}"))
        });
    }

    let bytes = response.bytes().await.map_err(InfraError::from)?;
    Ok(serde_json::from_slice(&bytes).map_err(InfraError::from)?)
}
