//! Analytics partitions, cache keys and loading state.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_enum_conversions;

/// Business partition of analytics data.
///
/// Every cache entry and every loading/error flag belongs to exactly one
/// domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnalyticsDomain {
    Campaigns,
    Domains,
    Mailboxes,
    Leads,
    Templates,
    Billing,
    CrossDomain,
}

impl_domain_enum_conversions!(AnalyticsDomain {
    Campaigns => "campaigns",
    Domains => "domains",
    Mailboxes => "mailboxes",
    Leads => "leads",
    Templates => "templates",
    Billing => "billing",
    CrossDomain => "crossDomain",
});

/// Query parameters narrowing an analytics request (date range, status,
/// workspace...). Ordered so equal filter sets hash identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalyticsFilters(BTreeMap<String, String>);

impl AnalyticsFilters {
    /// No filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for AnalyticsFilters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{k}={v}")?;
        }
        Ok(())
    }
}

/// Identity of one cached analytics result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    pub domain: AnalyticsDomain,
    #[serde(default)]
    pub filters: AnalyticsFilters,
}

impl CacheKey {
    /// Unfiltered key for `domain`.
    pub fn domain(domain: AnalyticsDomain) -> Self {
        Self { domain, filters: AnalyticsFilters::new() }
    }

    /// Key for `domain` narrowed by `filters`.
    pub fn with_filters(domain: AnalyticsDomain, filters: AnalyticsFilters) -> Self {
        Self { domain, filters }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.filters.is_empty() {
            write!(f, "{}", self.domain)
        } else {
            write!(f, "{}?{}", self.domain, self.filters)
        }
    }
}

/// A fetched analytics payload and when it was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub domain: AnalyticsDomain,
    pub filters: AnalyticsFilters,
    pub data: serde_json::Value,
    pub fetched_at: DateTime<Utc>,
}

/// Why a cache invalidation was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidationReason {
    /// A refresh is about to re-fetch the domain
    Refresh,
    /// Explicit invalidation without re-fetch
    Invalidate,
    /// The user changed data; dependent domains are stale too
    Mutation,
    /// Freshness window elapsed
    Expired,
}

impl_domain_enum_conversions!(InvalidationReason {
    Refresh => "refresh",
    Invalidate => "invalidate",
    Mutation => "mutation",
    Expired => "expired",
});

/// Optional narrowing and provenance for an invalidation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidationContext {
    /// Only drop entries whose filters equal these
    pub filters: Option<AnalyticsFilters>,
    /// Label of the user action that triggered the invalidation
    pub action: Option<String>,
}

impl InvalidationContext {
    /// Context attributed to a dashboard action.
    pub fn for_action(action: DashboardAction) -> Self {
        Self { filters: None, action: Some(action.as_str().to_string()) }
    }
}

/// What an invalidation removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidationResult {
    pub keys_invalidated: usize,
    pub domains_affected: Vec<AnalyticsDomain>,
}

impl InvalidationResult {
    pub fn is_empty(&self) -> bool {
        self.keys_invalidated == 0
    }
}

/// User actions in the dashboard that make cached analytics stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardAction {
    CampaignLaunched,
    CampaignPaused,
    CampaignEdited,
    LeadsImported,
    DomainAdded,
    DomainVerified,
    MailboxConnected,
    WarmupToggled,
    TemplateSaved,
    PlanChanged,
    PaymentMethodUpdated,
}

impl_domain_enum_conversions!(DashboardAction {
    CampaignLaunched => "campaign_launched",
    CampaignPaused => "campaign_paused",
    CampaignEdited => "campaign_edited",
    LeadsImported => "leads_imported",
    DomainAdded => "domain_added",
    DomainVerified => "domain_verified",
    MailboxConnected => "mailbox_connected",
    WarmupToggled => "warmup_toggled",
    TemplateSaved => "template_saved",
    PlanChanged => "plan_changed",
    PaymentMethodUpdated => "payment_method_updated",
});

/// Per-domain refresh state as seen by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainStatus {
    Idle,
    Loading,
    Errored,
}

impl_domain_enum_conversions!(DomainStatus {
    Idle => "idle",
    Loading => "loading",
    Errored => "errored",
});

/// Loading flags and error messages for every analytics domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadingState {
    pub global: bool,
    pub domains: BTreeMap<AnalyticsDomain, bool>,
    pub errors: BTreeMap<AnalyticsDomain, Option<String>>,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self {
            global: false,
            domains: AnalyticsDomain::ALL.iter().map(|d| (*d, false)).collect(),
            errors: AnalyticsDomain::ALL.iter().map(|d| (*d, None)).collect(),
        }
    }
}

impl LoadingState {
    pub fn is_loading(&self, domain: AnalyticsDomain) -> bool {
        self.domains.get(&domain).copied().unwrap_or(false)
    }

    pub fn error(&self, domain: AnalyticsDomain) -> Option<&str> {
        self.errors.get(&domain).and_then(|e| e.as_deref())
    }

    /// `idle`, `loading` or `errored`; loading wins over a stale error.
    pub fn status(&self, domain: AnalyticsDomain) -> DomainStatus {
        if self.is_loading(domain) {
            DomainStatus::Loading
        } else if self.error(domain).is_some() {
            DomainStatus::Errored
        } else {
            DomainStatus::Idle
        }
    }

    /// Global flag or any domain flag set.
    pub fn any_loading(&self) -> bool {
        self.global || self.domains.values().any(|loading| *loading)
    }
}

/// How a single-domain refresh ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "error", rename_all = "lowercase")]
pub enum RefreshOutcome {
    /// Service call succeeded
    Refreshed,
    /// Service call failed; the message is also in the loading state
    Failed(String),
    /// No analytics service configured; cache was invalidated only
    Skipped,
}
