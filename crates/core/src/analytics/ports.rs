//! Port for the hosted analytics backend.

use async_trait::async_trait;
use dashsync_domain::{AnalyticsDomain, AnalyticsFilters, Result};
use serde_json::Value;

/// Analytics data-fetch service.
///
/// The refresh and invalidate calls ask the backend to recompute or drop
/// its own aggregates; they return no data. Reads go through
/// [`fetch`](Self::fetch).
#[async_trait]
pub trait AnalyticsPort: Send + Sync {
    /// Analytics payload for `domain` narrowed by `filters`.
    async fn fetch(&self, domain: AnalyticsDomain, filters: &AnalyticsFilters) -> Result<Value>;

    /// Recompute every domain.
    async fn refresh_all(&self) -> Result<()>;

    /// Recompute one domain.
    async fn refresh_domain(&self, domain: AnalyticsDomain) -> Result<()>;

    /// Drop server-side aggregates for `domains`; an empty slice means all.
    async fn invalidate_cache(&self, domains: &[AnalyticsDomain]) -> Result<()>;
}
