//! Domain analytics cache.
//!
//! Entries are keyed by [`CacheKey`] (domain plus filters) and expire after
//! the domain's TTL. Reads go through [`DomainAnalyticsCache::get_or_fetch`],
//! which shares one fetch between concurrent callers of the same key.
//!
//! # Coherency
//!
//! - **Read-through**: a fresh entry is returned as is; otherwise the fetch
//!   runs and its result is cached
//! - **Generations**: an unfiltered invalidation bumps the generation of
//!   each targeted domain, a filtered one only that of the matching keys; a
//!   fetch started under an older generation still answers its callers but
//!   is never written back
//! - **In-flight detach**: invalidation forgets pending fetches for the
//!   targeted domains so later readers start a new one

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use dashsync_common::{AsyncCache, CacheConfig, CacheStats, Clock, SystemClock};
use dashsync_domain::{
    AnalyticsDomain, AnalyticsSnapshot, CacheKey, CacheSettings, DashboardAction,
    InvalidationContext, InvalidationReason, InvalidationResult, Result,
};
use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::in_flight::{launch, Flight, FlightTokens, SharedWork};
use super::invalidation::{action_domain, target_domains};

type Fill = Result<Arc<AnalyticsSnapshot>>;

struct CacheShared<C: Clock + Clone> {
    entries: AsyncCache<CacheKey, Arc<AnalyticsSnapshot>, C>,
    in_flight: DashMap<CacheKey, Flight<Fill>>,
    generations: DashMap<AnalyticsDomain, u64>,
    key_generations: DashMap<CacheKey, u64>,
    tokens: FlightTokens,
    settings: CacheSettings,
    clock: C,
}

/// Domain generation and key generation observed when a fetch started.
type Generation = (u64, u64);

impl<C: Clock + Clone> CacheShared<C> {
    fn generation(&self, key: &CacheKey) -> Generation {
        (
            self.generations.get(&key.domain).map_or(0, |g| *g),
            self.key_generations.get(key).map_or(0, |g| *g),
        )
    }

    fn now(&self) -> DateTime<Utc> {
        DateTime::from(self.clock.system_time())
    }

    fn ttl(&self, domain: AnalyticsDomain) -> Duration {
        Duration::from_secs(self.settings.ttl_for(domain))
    }
}

/// Keyed analytics cache with rule-based invalidation.
///
/// Cheap to clone; clones share entries and in-flight fetches.
pub struct DomainAnalyticsCache<C: Clock + Clone = SystemClock> {
    shared: Arc<CacheShared<C>>,
}

impl DomainAnalyticsCache<SystemClock> {
    pub fn new(settings: CacheSettings) -> Self {
        Self::with_clock(settings, SystemClock)
    }
}

impl<C: Clock + Clone> DomainAnalyticsCache<C> {
    /// Cache whose TTLs are measured with `clock`.
    pub fn with_clock(settings: CacheSettings, clock: C) -> Self {
        let config = CacheConfig::builder()
            .max_size(settings.max_entries)
            .ttl(Duration::from_secs(settings.ttl_seconds))
            .build();

        Self {
            shared: Arc::new(CacheShared {
                entries: AsyncCache::with_clock(config, clock.clone()),
                in_flight: DashMap::new(),
                generations: DashMap::new(),
                key_generations: DashMap::new(),
                tokens: FlightTokens::default(),
                settings,
                clock,
            }),
        }
    }

    /// Fresh entry for `key`, if any.
    pub async fn get(&self, key: &CacheKey) -> Option<Arc<AnalyticsSnapshot>> {
        self.shared.entries.get(key).await
    }

    /// Store `data` under `key` with the domain's TTL.
    pub async fn insert(&self, key: CacheKey, data: Value) -> Arc<AnalyticsSnapshot> {
        let snapshot = Arc::new(AnalyticsSnapshot {
            domain: key.domain,
            filters: key.filters.clone(),
            data,
            fetched_at: self.shared.now(),
        });
        let ttl = self.shared.ttl(key.domain);
        self.shared.entries.insert_with_ttl(key, Arc::clone(&snapshot), ttl).await;
        snapshot
    }

    /// Cached value for `key`, or the result of `fetch`.
    ///
    /// Concurrent callers for the same key share a single call to `fetch`.
    /// Errors are returned to every waiter and not cached.
    pub async fn get_or_fetch<F, Fut>(&self, key: CacheKey, fetch: F) -> Fill
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        if let Some(hit) = self.shared.entries.get(&key).await {
            debug!(key = %key, "analytics cache hit");
            return Ok(hit);
        }

        let work = match self.shared.in_flight.entry(key.clone()) {
            Entry::Occupied(mut slot) => match slot.get().join() {
                Some(work) => {
                    debug!(key = %key, "joining in-flight analytics fetch");
                    work
                }
                None => {
                    let (work, flight) = self.start_fill(key.clone(), fetch());
                    if let Some(flight) = flight {
                        slot.insert(flight);
                    }
                    work
                }
            },
            Entry::Vacant(slot) => {
                let (work, flight) = self.start_fill(key.clone(), fetch());
                if let Some(flight) = flight {
                    slot.insert(flight);
                }
                work
            }
        };

        work.await
    }

    fn start_fill<Fut>(
        &self,
        key: CacheKey,
        fetch: Fut,
    ) -> (SharedWork<Fill>, Option<Flight<Fill>>)
    where
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        let token = self.shared.tokens.next();
        let generation = self.shared.generation(&key);
        let cache = self.clone();

        debug!(key = %key, "analytics cache miss; fetching");
        let work = async move {
            let outcome = match fetch.await {
                Ok(data) => Ok(cache.store_if_current(key.clone(), data, generation).await),
                Err(err) => {
                    warn!(key = %key, error = %err, "analytics fetch failed");
                    Err(err)
                }
            };
            cache.shared.in_flight.remove_if(&key, |_, flight| flight.is(token));
            outcome
        };

        launch(token, work.boxed())
    }

    /// Write a fetched payload unless its key or domain was invalidated
    /// after the fetch started.
    async fn store_if_current(
        &self,
        key: CacheKey,
        data: Value,
        generation: Generation,
    ) -> Arc<AnalyticsSnapshot> {
        let domain = key.domain;
        if self.shared.generation(&key) != generation {
            debug!(key = %key, "discarding fetch that outlived an invalidation");
            return Arc::new(AnalyticsSnapshot {
                domain,
                filters: key.filters,
                data,
                fetched_at: self.shared.now(),
            });
        }

        let snapshot = self.insert(key.clone(), data).await;

        // An invalidation may have landed while the insert waited for the lock.
        if self.shared.generation(&key) != generation {
            self.shared.entries.remove(&key).await;
        }
        snapshot
    }

    /// Drop entries made stale by a change to `domain` (every domain when
    /// `None`).
    ///
    /// Mutations cascade to dependent domains; other reasons only touch
    /// `domain`. Context filters restrict removal to keys with exactly
    /// those filters. Never fetches.
    pub async fn intelligent_invalidation(
        &self,
        domain: Option<AnalyticsDomain>,
        reason: InvalidationReason,
        context: &InvalidationContext,
    ) -> InvalidationResult {
        let targets = target_domains(domain, reason);
        let filters = context.filters.as_ref();
        let matches = |key: &CacheKey| {
            targets.contains(&key.domain) && filters.map_or(true, |f| &key.filters == f)
        };

        match filters {
            None => {
                for target in &targets {
                    *self.shared.generations.entry(*target).or_insert(0) += 1;
                }
            }
            Some(filters) => {
                for target in &targets {
                    let key = CacheKey::with_filters(*target, filters.clone());
                    *self.shared.key_generations.entry(key).or_insert(0) += 1;
                }
            }
        }
        self.shared.in_flight.retain(|key, _| !matches(key));

        let removed = self.shared.entries.invalidate_where(|key| matches(key)).await;
        let domains_affected: Vec<AnalyticsDomain> = AnalyticsDomain::ALL
            .iter()
            .copied()
            .filter(|d| removed.iter().any(|key| key.domain == *d))
            .collect();

        let result = InvalidationResult { keys_invalidated: removed.len(), domains_affected };
        debug!(
            reason = %reason,
            action = context.action.as_deref().unwrap_or("-"),
            targets = ?targets,
            keys = result.keys_invalidated,
            "analytics cache invalidation"
        );
        result
    }

    /// Mutation invalidation for the domain `action` changes.
    pub async fn invalidate_for_action(&self, action: DashboardAction) -> InvalidationResult {
        let result = self
            .intelligent_invalidation(
                Some(action_domain(action)),
                InvalidationReason::Mutation,
                &InvalidationContext::for_action(action),
            )
            .await;

        info!(
            action = %action,
            keys = result.keys_invalidated,
            domains = ?result.domains_affected,
            "invalidated analytics after dashboard action"
        );
        result
    }

    /// Drop expired entries; returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let removed = self.shared.entries.purge_expired().await;
        if removed > 0 {
            debug!(removed, "purged expired analytics entries");
        }
        removed
    }

    pub fn stats(&self) -> CacheStats {
        self.shared.entries.stats()
    }

    /// Stored entries, stale ones included.
    pub async fn len(&self) -> usize {
        self.shared.entries.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.shared.entries.is_empty().await
    }

    /// Keys with a fetch currently registered.
    pub fn in_flight_keys(&self) -> Vec<CacheKey> {
        self.shared.in_flight.iter().map(|entry| entry.key().clone()).collect()
    }
}

impl<C: Clock + Clone> Clone for DomainAnalyticsCache<C> {
    fn clone(&self) -> Self {
        Self { shared: Arc::clone(&self.shared) }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use dashsync_common::MockClock;
    use dashsync_domain::{AnalyticsFilters, DashSyncError};
    use serde_json::json;
    use tokio::sync::oneshot;

    use super::*;

    fn cache() -> DomainAnalyticsCache {
        DomainAnalyticsCache::new(CacheSettings::default())
    }

    fn key(domain: AnalyticsDomain) -> CacheKey {
        CacheKey::domain(domain)
    }

    #[tokio::test]
    async fn empty_cache_invalidation_is_a_noop() {
        let result = cache()
            .intelligent_invalidation(
                Some(AnalyticsDomain::Billing),
                InvalidationReason::Refresh,
                &InvalidationContext::default(),
            )
            .await;

        assert_eq!(result, InvalidationResult::default());
    }

    #[tokio::test]
    async fn refresh_invalidation_removes_only_named_domain() {
        let cache = cache();
        cache.insert(key(AnalyticsDomain::Campaigns), json!(1)).await;
        cache
            .insert(
                CacheKey::with_filters(
                    AnalyticsDomain::Campaigns,
                    AnalyticsFilters::new().with("range", "7d"),
                ),
                json!(2),
            )
            .await;
        cache.insert(key(AnalyticsDomain::Leads), json!(3)).await;

        let result = cache
            .intelligent_invalidation(
                Some(AnalyticsDomain::Campaigns),
                InvalidationReason::Refresh,
                &InvalidationContext::default(),
            )
            .await;

        assert_eq!(result.keys_invalidated, 2);
        assert_eq!(result.domains_affected, vec![AnalyticsDomain::Campaigns]);
        assert!(cache.get(&key(AnalyticsDomain::Leads)).await.is_some());
    }

    #[tokio::test]
    async fn mutation_reports_only_domains_that_lost_entries() {
        let cache = cache();
        cache.insert(key(AnalyticsDomain::CrossDomain), json!({})).await;
        cache.insert(key(AnalyticsDomain::Billing), json!({})).await;

        let result = cache.invalidate_for_action(DashboardAction::CampaignLaunched).await;

        assert_eq!(result.keys_invalidated, 1);
        assert_eq!(result.domains_affected, vec![AnalyticsDomain::CrossDomain]);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn context_filters_narrow_removal() {
        let cache = cache();
        let weekly = AnalyticsFilters::new().with("range", "7d");
        cache.insert(CacheKey::with_filters(AnalyticsDomain::Leads, weekly.clone()), json!(1)).await;
        cache.insert(key(AnalyticsDomain::Leads), json!(2)).await;

        let context = InvalidationContext { filters: Some(weekly), action: None };
        let result = cache
            .intelligent_invalidation(
                Some(AnalyticsDomain::Leads),
                InvalidationReason::Invalidate,
                &context,
            )
            .await;

        assert_eq!(result.keys_invalidated, 1);
        assert!(cache.get(&key(AnalyticsDomain::Leads)).await.is_some());
    }

    #[tokio::test]
    async fn read_through_caches_success() {
        let cache = cache();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let snapshot = cache
                .get_or_fetch(key(AnalyticsDomain::Templates), || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Ok::<_, DashSyncError>(json!({ "sent": 10 })) }
                })
                .await
                .unwrap();
            assert_eq!(snapshot.data, json!({ "sent": 10 }));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().hits, 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = cache();

        let err = cache
            .get_or_fetch(key(AnalyticsDomain::Domains), || async {
                Err::<Value, _>(DashSyncError::Network("502".into()))
            })
            .await
            .unwrap_err();

        assert_eq!(err, DashSyncError::Network("502".into()));
        assert!(cache.is_empty().await);
        assert!(cache.in_flight_keys().is_empty());
    }

    #[tokio::test]
    async fn concurrent_reads_share_one_fetch() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let (release, gate) = oneshot::channel::<()>();

        let first = cache.get_or_fetch(key(AnalyticsDomain::Mailboxes), {
            let calls = calls.clone();
            move || {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    let _ = gate.await;
                    Ok::<_, DashSyncError>(json!("shared"))
                }
            }
        });
        let second = cache.get_or_fetch(key(AnalyticsDomain::Mailboxes), {
            let calls = calls.clone();
            move || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, DashSyncError>(json!("duplicate")) }
            }
        });
        let opener = async move {
            tokio::task::yield_now().await;
            let _ = release.send(());
        };

        let (a, b, ()) = tokio::join!(first, second, opener);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.unwrap().data, json!("shared"));
        assert_eq!(b.unwrap().data, json!("shared"));
    }

    #[tokio::test]
    async fn fetch_outliving_invalidation_is_not_cached() {
        let cache = cache();
        let (release, gate) = oneshot::channel::<()>();

        let read = cache.get_or_fetch(key(AnalyticsDomain::Leads), move || async move {
            let _ = gate.await;
            Ok::<_, DashSyncError>(json!("stale"))
        });
        let invalidate = async {
            tokio::task::yield_now().await;
            let result = cache
                .intelligent_invalidation(
                    Some(AnalyticsDomain::Leads),
                    InvalidationReason::Invalidate,
                    &InvalidationContext::default(),
                )
                .await;
            let _ = release.send(());
            result
        };

        let (snapshot, result) = tokio::join!(read, invalidate);

        assert_eq!(snapshot.unwrap().data, json!("stale"));
        assert_eq!(result.keys_invalidated, 0);
        assert!(cache.get(&key(AnalyticsDomain::Leads)).await.is_none());
    }

    #[tokio::test]
    async fn filtered_invalidation_spares_fetches_for_other_filters() {
        let cache = cache();
        let weekly = CacheKey::with_filters(
            AnalyticsDomain::Leads,
            AnalyticsFilters::new().with("range", "7d"),
        );
        let monthly_filters = AnalyticsFilters::new().with("range", "30d");
        let monthly = CacheKey::with_filters(AnalyticsDomain::Leads, monthly_filters.clone());
        let (release_weekly, weekly_gate) = oneshot::channel::<()>();
        let (release_monthly, monthly_gate) = oneshot::channel::<()>();

        let weekly_read = cache.get_or_fetch(weekly.clone(), move || async move {
            let _ = weekly_gate.await;
            Ok::<_, DashSyncError>(json!("weekly"))
        });
        let monthly_read = cache.get_or_fetch(monthly.clone(), move || async move {
            let _ = monthly_gate.await;
            Ok::<_, DashSyncError>(json!("monthly"))
        });
        let invalidate = async {
            tokio::task::yield_now().await;
            cache
                .intelligent_invalidation(
                    Some(AnalyticsDomain::Leads),
                    InvalidationReason::Invalidate,
                    &InvalidationContext { filters: Some(monthly_filters), action: None },
                )
                .await;
            let _ = release_weekly.send(());
            let _ = release_monthly.send(());
        };

        let (weekly_snapshot, monthly_snapshot, ()) =
            tokio::join!(weekly_read, monthly_read, invalidate);

        assert_eq!(weekly_snapshot.unwrap().data, json!("weekly"));
        assert_eq!(monthly_snapshot.unwrap().data, json!("monthly"));
        assert!(cache.get(&weekly).await.is_some());
        assert!(cache.get(&monthly).await.is_none());
    }

    #[tokio::test]
    async fn snapshots_are_stamped_with_the_cache_clock() {
        let clock = MockClock::new();
        let cache = DomainAnalyticsCache::with_clock(CacheSettings::default(), clock.clone());
        clock.advance(Duration::from_secs(90));

        let snapshot = cache.insert(key(AnalyticsDomain::Templates), json!([])).await;

        assert_eq!(snapshot.fetched_at.timestamp(), 90);
    }

    #[tokio::test]
    async fn domain_ttl_override_applies() {
        let clock = MockClock::new();
        let cache = DomainAnalyticsCache::with_clock(CacheSettings::default(), clock.clone());
        cache.insert(key(AnalyticsDomain::Billing), json!(1)).await;
        cache.insert(key(AnalyticsDomain::Campaigns), json!(2)).await;

        clock.advance(Duration::from_secs(600));

        assert!(cache.get(&key(AnalyticsDomain::Billing)).await.is_some());
        assert!(cache.get(&key(AnalyticsDomain::Campaigns)).await.is_none());
        assert_eq!(cache.purge_expired().await, 0);

        clock.advance(Duration::from_secs(600));
        assert_eq!(cache.purge_expired().await, 1);
    }
}
