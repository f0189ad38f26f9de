//! Shared fixtures for command tests: contexts over in-memory storage and
//! recording stand-ins for the hosted backend.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashsync_app::AppContext;
use dashsync_core::{AnalyticsPort, ServerPreferencesPort};
use dashsync_domain::{
    AnalyticsDomain, AnalyticsFilters, Config, DashSyncError, Result as DomainResult,
    ServerPreferencesPatch, ServerUserPreferences,
};
use dashsync_infra::MemoryKeyValueStore;
use parking_lot::Mutex;
use serde_json::{json, Value};

/// Analytics backend that answers every fetch and records what it saw.
#[derive(Default)]
pub struct RecordingAnalytics {
    fetches: AtomicUsize,
    refreshed: Mutex<Vec<AnalyticsDomain>>,
    invalidated: Mutex<Vec<Vec<AnalyticsDomain>>>,
    failing: Mutex<Option<AnalyticsDomain>>,
}

impl RecordingAnalytics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail(&self, domain: AnalyticsDomain) {
        *self.failing.lock() = Some(domain);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn refreshed(&self) -> Vec<AnalyticsDomain> {
        self.refreshed.lock().clone()
    }

    pub fn invalidated(&self) -> Vec<Vec<AnalyticsDomain>> {
        self.invalidated.lock().clone()
    }

    fn check(&self, domain: AnalyticsDomain) -> DomainResult<()> {
        if *self.failing.lock() == Some(domain) {
            return Err(DashSyncError::Network(format!("{domain} backend down")));
        }
        Ok(())
    }
}

#[async_trait]
impl AnalyticsPort for RecordingAnalytics {
    async fn fetch(&self, domain: AnalyticsDomain, filters: &AnalyticsFilters) -> DomainResult<Value> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.check(domain)?;
        Ok(json!({ "domain": domain, "filters": filters, "total": 42 }))
    }

    async fn refresh_all(&self) -> DomainResult<()> {
        Ok(())
    }

    async fn refresh_domain(&self, domain: AnalyticsDomain) -> DomainResult<()> {
        self.refreshed.lock().push(domain);
        self.check(domain)
    }

    async fn invalidate_cache(&self, domains: &[AnalyticsDomain]) -> DomainResult<()> {
        self.invalidated.lock().push(domains.to_vec());
        Ok(())
    }
}

/// Server profile held in memory; patches are applied and recorded.
#[derive(Default)]
pub struct RecordingServer {
    profile: Mutex<ServerUserPreferences>,
    patches: Mutex<Vec<ServerPreferencesPatch>>,
}

impl RecordingServer {
    pub fn with_profile(profile: ServerUserPreferences) -> Arc<Self> {
        Arc::new(Self { profile: Mutex::new(profile), ..Self::default() })
    }

    pub fn patches(&self) -> Vec<ServerPreferencesPatch> {
        self.patches.lock().clone()
    }
}

#[async_trait]
impl ServerPreferencesPort for RecordingServer {
    async fn fetch(&self) -> DomainResult<ServerUserPreferences> {
        Ok(self.profile.lock().clone())
    }

    async fn update(&self, patch: &ServerPreferencesPatch) -> DomainResult<ServerUserPreferences> {
        self.patches.lock().push(*patch);
        let mut profile = self.profile.lock();
        if let Some(language) = patch.language {
            profile.language = Some(language.as_str().to_string());
        }
        Ok(profile.clone())
    }
}

/// Context with in-memory storage and no backend.
pub fn offline_context() -> AppContext {
    AppContext::with_ports(Config::default(), Arc::new(MemoryKeyValueStore::new()), None, None)
}

/// Context with in-memory storage wired to the given stand-ins.
pub fn connected_context(
    analytics: Arc<RecordingAnalytics>,
    server: Arc<RecordingServer>,
) -> AppContext {
    AppContext::with_ports(
        Config::default(),
        Arc::new(MemoryKeyValueStore::new()),
        Some(analytics),
        Some(server),
    )
}
