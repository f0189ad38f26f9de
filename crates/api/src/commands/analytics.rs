//! Analytics commands and the loading-state subscription.

use std::time::Instant;

use dashsync_common::CacheStats;
use dashsync_domain::{
    AnalyticsDomain, AnalyticsFilters, AnalyticsSnapshot, DashboardAction, InvalidationResult,
    LoadingState, RefreshOutcome,
};
use serde::Serialize;
use tokio::sync::watch;

use super::parse_arg;
use crate::utils::command_helpers::{execute_command, record_infallible};
use crate::AppContext;

/// Cache counters as sent to the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatsView {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub invalidations: u64,
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheStatsView {
    fn from(stats: CacheStats) -> Self {
        Self {
            size: stats.size,
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
            invalidations: stats.invalidations,
            hit_rate: stats.hit_rate(),
        }
    }
}

pub async fn refresh_all_analytics(ctx: &AppContext) -> Result<(), String> {
    execute_command("analytics::refresh_all", move || async move {
        ctx.analytics.refresh_all().await
    })
    .await
}

/// Refresh one domain. A failed refresh is an outcome, not an error; the
/// command only errors on an unknown domain name.
pub async fn refresh_domain(ctx: &AppContext, domain: String) -> Result<RefreshOutcome, String> {
    execute_command("analytics::refresh_domain", move || async move {
        let domain = parse_arg::<AnalyticsDomain>(&domain)?;
        Ok(ctx.analytics.refresh_domain(domain).await)
    })
    .await
}

/// Invalidate one domain, or every domain when `domain` is `None`.
pub async fn invalidate_analytics(
    ctx: &AppContext,
    domain: Option<String>,
) -> Result<InvalidationResult, String> {
    execute_command("analytics::invalidate", move || async move {
        let domain = domain.as_deref().map(parse_arg::<AnalyticsDomain>).transpose()?;
        Ok(ctx.analytics.invalidate_cache(domain).await)
    })
    .await
}

/// Drop cached data made stale by a user action.
pub async fn record_dashboard_action(
    ctx: &AppContext,
    action: String,
) -> Result<InvalidationResult, String> {
    execute_command("analytics::record_dashboard_action", move || async move {
        let action = parse_arg::<DashboardAction>(&action)?;
        Ok(ctx.analytics.invalidate_for_action(action).await)
    })
    .await
}

pub async fn get_analytics(
    ctx: &AppContext,
    domain: String,
    filters: AnalyticsFilters,
) -> Result<AnalyticsSnapshot, String> {
    execute_command("analytics::get_analytics", move || async move {
        let domain = parse_arg::<AnalyticsDomain>(&domain)?;
        let snapshot = ctx.analytics.fetch(domain, filters).await?;
        Ok(AnalyticsSnapshot::clone(&snapshot))
    })
    .await
}

pub async fn get_loading_state(ctx: &AppContext) -> Result<LoadingState, String> {
    let start = Instant::now();
    let state = ctx.analytics.loading_state();
    Ok(record_infallible("analytics::get_loading_state", start, state))
}

/// Receiver that yields every loading-state change; the UI hook binding.
pub fn subscribe_loading_state(ctx: &AppContext) -> watch::Receiver<LoadingState> {
    ctx.analytics.subscribe()
}

pub async fn get_cache_stats(ctx: &AppContext) -> Result<CacheStatsView, String> {
    let start = Instant::now();
    let stats = CacheStatsView::from(ctx.analytics.cache().stats());
    Ok(record_infallible("analytics::get_cache_stats", start, stats))
}
