//! [`AnalyticsPort`] over the dashboard's REST API.
//!
//! | Operation | Request |
//! |-----------|---------|
//! | fetch | `GET /api/analytics/{domain}?{filters}` |
//! | refresh all | `POST /api/analytics/refresh` |
//! | refresh domain | `POST /api/analytics/{domain}/refresh` |
//! | invalidate | `POST /api/analytics/invalidate` with `{"domains": [...]}` |

use async_trait::async_trait;
use dashsync_core::AnalyticsPort;
use dashsync_domain::{AnalyticsConfig, AnalyticsDomain, AnalyticsFilters, Result};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use super::client::BackendClient;

const ANALYTICS: [&str; 2] = ["api", "analytics"];

#[derive(Debug, Serialize)]
struct InvalidateRequest<'a> {
    /// Empty means every domain.
    domains: &'a [AnalyticsDomain],
}

/// HTTP analytics service client.
#[derive(Clone)]
pub struct HttpAnalyticsClient {
    backend: BackendClient,
}

impl HttpAnalyticsClient {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    pub fn from_config(config: &AnalyticsConfig) -> Result<Self> {
        BackendClient::from_config(config).map(Self::new)
    }

    fn path<'a>(tail: &[&'a str]) -> Vec<&'a str> {
        ANALYTICS.iter().copied().chain(tail.iter().copied()).collect()
    }
}

#[async_trait]
impl AnalyticsPort for HttpAnalyticsClient {
    async fn fetch(&self, domain: AnalyticsDomain, filters: &AnalyticsFilters) -> Result<Value> {
        let query: Vec<(&str, &str)> = filters.iter().collect();
        let data: Value =
            self.backend.get_json(&Self::path(&[domain.as_str()]), &query).await?;
        debug!(%domain, %filters, "fetched analytics");
        Ok(data)
    }

    async fn refresh_all(&self) -> Result<()> {
        self.backend.post_json(&Self::path(&["refresh"]), &json!({})).await
    }

    async fn refresh_domain(&self, domain: AnalyticsDomain) -> Result<()> {
        self.backend.post_json(&Self::path(&[domain.as_str(), "refresh"]), &json!({})).await
    }

    async fn invalidate_cache(&self, domains: &[AnalyticsDomain]) -> Result<()> {
        self.backend.post_json(&Self::path(&["invalidate"]), &InvalidateRequest { domains }).await
    }
}
