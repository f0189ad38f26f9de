//! Scripted `AnalyticsPort` for coordinator tests

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashsync_core::AnalyticsPort;
use dashsync_domain::{
    AnalyticsDomain, AnalyticsFilters, DashSyncError, LoadingState, Result as DomainResult,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::watch;

/// Records every call and fails or blocks on demand.
///
/// A gated mock holds every call until [`open_gate`](Self::open_gate).
pub struct ScriptedAnalytics {
    fetches: AtomicUsize,
    refresh_all_calls: AtomicUsize,
    domain_refreshes: Mutex<Vec<AnalyticsDomain>>,
    invalidations: Mutex<Vec<Vec<AnalyticsDomain>>>,
    failing_domains: Mutex<HashSet<AnalyticsDomain>>,
    fail_refresh_all: AtomicBool,
    gate: watch::Sender<bool>,
}

impl ScriptedAnalytics {
    pub fn new() -> Arc<Self> {
        Self::build(true)
    }

    /// Mock whose calls wait until the gate is opened.
    pub fn gated() -> Arc<Self> {
        Self::build(false)
    }

    fn build(open: bool) -> Arc<Self> {
        let (gate, _) = watch::channel(open);
        Arc::new(Self {
            fetches: AtomicUsize::new(0),
            refresh_all_calls: AtomicUsize::new(0),
            domain_refreshes: Mutex::new(Vec::new()),
            invalidations: Mutex::new(Vec::new()),
            failing_domains: Mutex::new(HashSet::new()),
            fail_refresh_all: AtomicBool::new(false),
            gate,
        })
    }

    pub fn open_gate(&self) {
        self.gate.send_replace(true);
    }

    pub fn fail_domain(&self, domain: AnalyticsDomain) {
        self.failing_domains.lock().insert(domain);
    }

    pub fn heal_domain(&self, domain: AnalyticsDomain) {
        self.failing_domains.lock().remove(&domain);
    }

    pub fn fail_refresh_all(&self) {
        self.fail_refresh_all.store(true, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn refresh_all_count(&self) -> usize {
        self.refresh_all_calls.load(Ordering::SeqCst)
    }

    pub fn domain_refreshes(&self) -> Vec<AnalyticsDomain> {
        self.domain_refreshes.lock().clone()
    }

    pub fn invalidations(&self) -> Vec<Vec<AnalyticsDomain>> {
        self.invalidations.lock().clone()
    }

    async fn pass_gate(&self) {
        let mut gate = self.gate.subscribe();
        let _ = gate.wait_for(|open| *open).await;
    }
}

#[async_trait]
impl AnalyticsPort for ScriptedAnalytics {
    async fn fetch(&self, domain: AnalyticsDomain, filters: &AnalyticsFilters) -> DomainResult<Value> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;
        if self.failing_domains.lock().contains(&domain) {
            return Err(DashSyncError::Network(format!("{domain} fetch failed")));
        }
        Ok(json!({ "domain": domain, "filters": filters }))
    }

    async fn refresh_all(&self) -> DomainResult<()> {
        self.refresh_all_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;
        if self.fail_refresh_all.load(Ordering::SeqCst) {
            return Err(DashSyncError::Network("503 Service Unavailable".into()));
        }
        Ok(())
    }

    async fn refresh_domain(&self, domain: AnalyticsDomain) -> DomainResult<()> {
        self.domain_refreshes.lock().push(domain);
        self.pass_gate().await;
        if self.failing_domains.lock().contains(&domain) {
            return Err(DashSyncError::Network(format!("{domain} refresh failed")));
        }
        Ok(())
    }

    async fn invalidate_cache(&self, domains: &[AnalyticsDomain]) -> DomainResult<()> {
        self.invalidations.lock().push(domains.to_vec());
        Ok(())
    }
}

/// Port that checks, during every domain refresh, that the coordinator
/// reports the domain as loading. Violations are counted.
#[derive(Default)]
pub struct LoadingObserver {
    state: Mutex<Option<watch::Receiver<LoadingState>>>,
    refreshes: AtomicUsize,
    unflagged: AtomicUsize,
}

impl LoadingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Hand over the coordinator's loading-state receiver.
    pub fn observe(&self, state: watch::Receiver<LoadingState>) {
        *self.state.lock() = Some(state);
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    /// Refreshes that ran while their domain's flag read `false`.
    pub fn unflagged_count(&self) -> usize {
        self.unflagged.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalyticsPort for LoadingObserver {
    async fn fetch(&self, domain: AnalyticsDomain, _filters: &AnalyticsFilters) -> DomainResult<Value> {
        Ok(json!({ "domain": domain }))
    }

    async fn refresh_all(&self) -> DomainResult<()> {
        Ok(())
    }

    async fn refresh_domain(&self, domain: AnalyticsDomain) -> DomainResult<()> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        let loading = self.state.lock().as_ref().map(|rx| rx.borrow().is_loading(domain));
        if loading == Some(false) {
            self.unflagged.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn invalidate_cache(&self, _domains: &[AnalyticsDomain]) -> DomainResult<()> {
        Ok(())
    }
}
