//! [`ServerPreferencesPort`] over `/api/user/preferences`.

use async_trait::async_trait;
use dashsync_core::ServerPreferencesPort;
use dashsync_domain::{
    AnalyticsConfig, Result, ServerPreferencesPatch, ServerUserPreferences,
};
use tracing::info;

use super::client::BackendClient;

const PREFERENCES: [&str; 3] = ["api", "user", "preferences"];

/// HTTP client for the user's server-side preference profile.
#[derive(Clone)]
pub struct HttpPreferencesClient {
    backend: BackendClient,
}

impl HttpPreferencesClient {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    pub fn from_config(config: &AnalyticsConfig) -> Result<Self> {
        BackendClient::from_config(config).map(Self::new)
    }
}

#[async_trait]
impl ServerPreferencesPort for HttpPreferencesClient {
    async fn fetch(&self) -> Result<ServerUserPreferences> {
        self.backend.get_json(&PREFERENCES, &[]).await
    }

    async fn update(&self, patch: &ServerPreferencesPatch) -> Result<ServerUserPreferences> {
        let updated: ServerUserPreferences = self.backend.patch_json(&PREFERENCES, patch).await?;
        info!(language = ?updated.language, "server preferences updated");
        Ok(updated)
    }
}
