//! Analytics refresh coordinator.
//!
//! Orchestrates refresh and invalidation across the [`DomainAnalyticsCache`]
//! and the [`AnalyticsPort`], and publishes per-domain loading/error state
//! on a `watch` channel.
//!
//! Each domain moves `idle -> loading -> idle | errored`. The loading flag
//! is owned by a drop guard inside the refresh future, so it is cleared on
//! success, on failure and when every caller stops awaiting the refresh.
//! Concurrent refreshes of the same domain, and concurrent `refresh_all`
//! calls, share one in-flight run. A `refresh_all` and a `refresh_domain`
//! may overlap; the later write to the loading state wins.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use dashsync_common::{Clock, SystemClock};
use dashsync_domain::{
    AnalyticsDomain, AnalyticsFilters, AnalyticsSnapshot, CacheKey, DashSyncError,
    DashboardAction, DomainStatus, InvalidationContext, InvalidationReason, InvalidationResult,
    LoadingState, RefreshOutcome, Result,
};
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::cache::DomainAnalyticsCache;
use super::in_flight::{launch, Flight, FlightTokens, SharedWork};
use super::invalidation::{action_domain, target_domains};
use super::ports::AnalyticsPort;

struct Inner<C: Clock + Clone> {
    cache: DomainAnalyticsCache<C>,
    service: Option<Arc<dyn AnalyticsPort>>,
    state: watch::Sender<LoadingState>,
    domain_refreshes: DashMap<AnalyticsDomain, Flight<RefreshOutcome>>,
    global_refresh: Mutex<Option<Flight<Result<()>>>>,
    tokens: FlightTokens,
}

impl<C: Clock + Clone> Inner<C> {
    fn set_loading(&self, domain: AnalyticsDomain, loading: bool) {
        self.state.send_modify(|state| {
            state.domains.insert(domain, loading);
        });
    }

    fn set_error(&self, domain: AnalyticsDomain, error: Option<String>) {
        self.state.send_modify(|state| {
            state.errors.insert(domain, error);
        });
    }
}

/// Clears a domain's loading flag when the refresh future goes away.
struct DomainLoadingGuard<C: Clock + Clone> {
    inner: Arc<Inner<C>>,
    domain: AnalyticsDomain,
}

impl<C: Clock + Clone> DomainLoadingGuard<C> {
    fn engage(inner: Arc<Inner<C>>, domain: AnalyticsDomain) -> Self {
        inner.set_loading(domain, true);
        Self { inner, domain }
    }
}

impl<C: Clock + Clone> Drop for DomainLoadingGuard<C> {
    fn drop(&mut self) {
        self.inner.set_loading(self.domain, false);
    }
}

/// Clears the global loading flag when `refresh_all` goes away.
struct GlobalLoadingGuard<C: Clock + Clone> {
    inner: Arc<Inner<C>>,
}

impl<C: Clock + Clone> GlobalLoadingGuard<C> {
    fn engage(inner: Arc<Inner<C>>) -> Self {
        inner.state.send_modify(|state| state.global = true);
        Self { inner }
    }
}

impl<C: Clock + Clone> Drop for GlobalLoadingGuard<C> {
    fn drop(&mut self) {
        self.inner.state.send_modify(|state| state.global = false);
    }
}

/// Refresh/invalidate orchestration with observable loading state.
///
/// Cheap to clone; clones share state.
pub struct AnalyticsRefreshCoordinator<C: Clock + Clone = SystemClock> {
    inner: Arc<Inner<C>>,
}

impl<C: Clock + Clone> AnalyticsRefreshCoordinator<C> {
    /// Coordinator over `cache`. Without a `service` it runs cache-only:
    /// invalidation still happens, service calls are skipped with a warning.
    pub fn new(cache: DomainAnalyticsCache<C>, service: Option<Arc<dyn AnalyticsPort>>) -> Self {
        let (state, _) = watch::channel(LoadingState::default());
        Self {
            inner: Arc::new(Inner {
                cache,
                service,
                state,
                domain_refreshes: DashMap::new(),
                global_refresh: Mutex::new(None),
                tokens: FlightTokens::default(),
            }),
        }
    }

    pub fn cache(&self) -> &DomainAnalyticsCache<C> {
        &self.inner.cache
    }

    /// Whether an analytics service is wired in.
    pub fn is_configured(&self) -> bool {
        self.inner.service.is_some()
    }

    /// Current loading state.
    pub fn loading_state(&self) -> LoadingState {
        self.inner.state.borrow().clone()
    }

    pub fn status(&self, domain: AnalyticsDomain) -> DomainStatus {
        self.inner.state.borrow().status(domain)
    }

    /// Receiver that observes every loading-state change.
    pub fn subscribe(&self) -> watch::Receiver<LoadingState> {
        self.inner.state.subscribe()
    }

    /// Invalidate every domain, then ask the service to recompute
    /// everything.
    ///
    /// Domain errors are cleared on success. On failure the global loading
    /// flag is reset and the error returned.
    pub async fn refresh_all(&self) -> Result<()> {
        let work = {
            let mut slot = self.inner.global_refresh.lock();
            match slot.as_ref().and_then(Flight::join) {
                Some(work) => {
                    debug!("joining in-flight refresh of all analytics");
                    work
                }
                None => {
                    let token = self.inner.tokens.next();
                    let (work, flight) =
                        launch(token, run_refresh_all(Arc::clone(&self.inner), token).boxed());
                    *slot = flight;
                    work
                }
            }
        };

        work.await
    }

    /// Invalidate `domain` and ask the service to recompute it.
    ///
    /// Never fails: the outcome is returned and a failure is also recorded
    /// as the domain's error.
    pub async fn refresh_domain(&self, domain: AnalyticsDomain) -> RefreshOutcome {
        let work = match self.inner.domain_refreshes.entry(domain) {
            Entry::Occupied(mut slot) => match slot.get().join() {
                Some(work) => {
                    debug!(%domain, "joining in-flight analytics refresh");
                    work
                }
                None => {
                    let (work, flight) = self.launch_domain_refresh(domain);
                    if let Some(flight) = flight {
                        slot.insert(flight);
                    }
                    work
                }
            },
            Entry::Vacant(slot) => {
                let (work, flight) = self.launch_domain_refresh(domain);
                if let Some(flight) = flight {
                    slot.insert(flight);
                }
                work
            }
        };

        work.await
    }

    fn launch_domain_refresh(
        &self,
        domain: AnalyticsDomain,
    ) -> (SharedWork<RefreshOutcome>, Option<Flight<RefreshOutcome>>) {
        let token = self.inner.tokens.next();
        launch(token, run_domain_refresh(Arc::clone(&self.inner), domain, token).boxed())
    }

    /// Invalidate one domain, or every domain when `None`, without
    /// re-fetching. The service is asked to drop its aggregates too; a
    /// failure there is logged only.
    pub async fn invalidate_cache(&self, domain: Option<AnalyticsDomain>) -> InvalidationResult {
        let result = self
            .inner
            .cache
            .intelligent_invalidation(
                domain,
                InvalidationReason::Invalidate,
                &InvalidationContext::default(),
            )
            .await;

        info!(
            keys = result.keys_invalidated,
            domains = ?result.domains_affected,
            "analytics cache invalidated"
        );

        let domains: Vec<AnalyticsDomain> = domain.into_iter().collect();
        self.forward_invalidation(&domains).await;
        result
    }

    /// Cascade invalidation for a dashboard action, forwarded to the
    /// service for every targeted domain.
    pub async fn invalidate_for_action(&self, action: DashboardAction) -> InvalidationResult {
        let result = self.inner.cache.invalidate_for_action(action).await;
        let targets = target_domains(Some(action_domain(action)), InvalidationReason::Mutation);
        self.forward_invalidation(&targets).await;
        result
    }

    async fn forward_invalidation(&self, domains: &[AnalyticsDomain]) {
        let Some(service) = &self.inner.service else {
            debug!("analytics service not configured; local invalidation only");
            return;
        };

        if let Err(err) = service.invalidate_cache(domains).await {
            warn!(error = %err, domains = ?domains, "remote analytics invalidation failed");
        }
    }

    /// Read-through fetch of `domain` narrowed by `filters`.
    ///
    /// A failure is recorded as the domain's error and returned; a success
    /// clears it.
    pub async fn fetch(
        &self,
        domain: AnalyticsDomain,
        filters: AnalyticsFilters,
    ) -> Result<Arc<AnalyticsSnapshot>> {
        let key = CacheKey::with_filters(domain, filters.clone());
        let service = self.inner.service.clone();

        let result = self
            .inner
            .cache
            .get_or_fetch(key, move || async move {
                match service {
                    Some(service) => service.fetch(domain, &filters).await,
                    None => Err(DashSyncError::Unavailable(
                        "analytics service not configured".to_string(),
                    )),
                }
            })
            .await;

        match &result {
            Ok(_) => {
                if self.inner.state.borrow().error(domain).is_some() {
                    self.inner.set_error(domain, None);
                }
            }
            Err(err) => self.inner.set_error(domain, Some(err.to_string())),
        }
        result
    }
}

impl<C: Clock + Clone> Clone for AnalyticsRefreshCoordinator<C> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

async fn run_domain_refresh<C: Clock + Clone>(
    inner: Arc<Inner<C>>,
    domain: AnalyticsDomain,
    token: u64,
) -> RefreshOutcome {
    let loading = DomainLoadingGuard::engage(Arc::clone(&inner), domain);

    let invalidated = inner
        .cache
        .intelligent_invalidation(
            Some(domain),
            InvalidationReason::Refresh,
            &InvalidationContext::default(),
        )
        .await;

    let outcome = match &inner.service {
        None => {
            warn!(%domain, "analytics service not configured; skipping refresh");
            RefreshOutcome::Skipped
        }
        Some(service) => match service.refresh_domain(domain).await {
            Ok(()) => {
                inner.set_error(domain, None);
                info!(%domain, keys = invalidated.keys_invalidated, "analytics domain refreshed");
                RefreshOutcome::Refreshed
            }
            Err(err) => {
                let message = err.to_string();
                warn!(%domain, error = %message, "analytics domain refresh failed");
                inner.set_error(domain, Some(message.clone()));
                RefreshOutcome::Failed(message)
            }
        },
    };

    // Clear the flag before freeing the slot so a refresh launched into the
    // slot never has its flag overwritten by this one.
    drop(loading);
    inner.domain_refreshes.remove_if(&domain, |_, flight| flight.is(token));
    outcome
}

async fn run_refresh_all<C: Clock + Clone>(inner: Arc<Inner<C>>, token: u64) -> Result<()> {
    let loading = GlobalLoadingGuard::engage(Arc::clone(&inner));

    let invalidated = inner
        .cache
        .intelligent_invalidation(
            None,
            InvalidationReason::Refresh,
            &InvalidationContext::default(),
        )
        .await;

    let result = match &inner.service {
        None => {
            warn!("analytics service not configured; skipping refresh of all domains");
            Ok(())
        }
        Some(service) => service.refresh_all().await,
    };

    match &result {
        Ok(()) if inner.service.is_some() => {
            inner.state.send_modify(|state| {
                for error in state.errors.values_mut() {
                    *error = None;
                }
            });
            info!(keys = invalidated.keys_invalidated, "all analytics refreshed");
        }
        Ok(()) => {}
        Err(err) => warn!(error = %err, "refresh of all analytics failed"),
    }

    drop(loading);
    let mut slot = inner.global_refresh.lock();
    if slot.as_ref().is_some_and(|flight| flight.is(token)) {
        *slot = None;
    }
    drop(slot);

    result
}
