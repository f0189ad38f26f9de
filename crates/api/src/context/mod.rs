//! Application context - dependency injection container

use std::sync::Arc;

use dashsync_core::{
    AnalyticsPort, AnalyticsRefreshCoordinator, DomainAnalyticsCache, KeyValueStore,
    LocalPreferenceStore, PreferenceSyncCoordinator, ServerPreferencesPort,
};
use dashsync_domain::{Config, Result, StorageBackend};
use dashsync_infra::config;
use dashsync_infra::{
    BackendClient, FileKeyValueStore, HttpAnalyticsClient, HttpPreferencesClient,
    MemoryKeyValueStore, UnavailableKeyValueStore,
};
use tracing::{debug, info, warn};

use crate::utils::logging::init_tracing;

/// Type alias for key-value store port trait object
type DynKeyValueStore = dyn KeyValueStore + 'static;

/// Type alias for analytics port trait object
type DynAnalyticsPort = dyn AnalyticsPort + 'static;

/// Type alias for server preferences port trait object
type DynServerPreferencesPort = dyn ServerPreferencesPort + 'static;

/// Application context - holds all services and dependencies.
///
/// One context per dashboard session. Cloning shares the same services.
#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub preferences: Arc<PreferenceSyncCoordinator>,
    pub analytics: AnalyticsRefreshCoordinator,
}

impl AppContext {
    /// Build every service from configuration.
    ///
    /// # Errors
    /// Fails if the preference file cannot be opened or the backend URL or
    /// token is invalid.
    pub fn new(config: Config) -> Result<Self> {
        let store = build_store(&config)?;

        let (analytics, server) = if config.analytics.is_configured() {
            let backend = BackendClient::from_config(&config.analytics)?;
            info!(base_url = %backend.base_url(), "dashboard backend configured");

            let analytics: Arc<DynAnalyticsPort> =
                Arc::new(HttpAnalyticsClient::new(backend.clone()));
            let server: Arc<DynServerPreferencesPort> =
                Arc::new(HttpPreferencesClient::new(backend));
            (Some(analytics), Some(server))
        } else {
            warn!("no dashboard backend configured; running cache-only");
            (None, None)
        };

        Ok(Self::with_ports(config, store, analytics, server))
    }

    /// Load `.env`, read configuration, install logging and build the
    /// context.
    ///
    /// A missing configuration source is not an error: defaults apply and a
    /// warning is logged once logging is up.
    pub fn bootstrap() -> Result<Self> {
        let dotenv = dotenvy::dotenv();

        let (config, config_error) = match config::load() {
            Ok(config) => (config, None),
            Err(err) => (Config::default(), Some(err)),
        };
        init_tracing(&config.logging);

        match dotenv {
            Ok(path) => info!(path = %path.display(), "loaded .env"),
            Err(err) => debug!(error = %err, "no .env loaded"),
        }
        if let Some(err) = config_error {
            warn!(error = %err, "configuration not loaded; using defaults");
        }

        Self::new(config)
    }

    /// Wire the services over explicit ports (tests, embedding).
    pub fn with_ports(
        config: Config,
        store: Arc<DynKeyValueStore>,
        analytics: Option<Arc<DynAnalyticsPort>>,
        server: Option<Arc<DynServerPreferencesPort>>,
    ) -> Self {
        let mut preferences = PreferenceSyncCoordinator::new(LocalPreferenceStore::new(store));
        if let Some(server) = server {
            preferences = preferences.with_server(server);
        }

        let cache = DomainAnalyticsCache::new(config.cache.clone());
        let analytics = AnalyticsRefreshCoordinator::new(cache, analytics);

        Self { config, preferences: Arc::new(preferences), analytics }
    }
}

fn build_store(config: &Config) -> Result<Arc<DynKeyValueStore>> {
    let store: Arc<DynKeyValueStore> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(MemoryKeyValueStore::new()),
        StorageBackend::File => Arc::new(FileKeyValueStore::open(&config.storage.path)?),
        StorageBackend::Unavailable => Arc::new(UnavailableKeyValueStore),
    };
    info!(backend = ?config.storage.backend, "preference storage ready");
    Ok(store)
}
