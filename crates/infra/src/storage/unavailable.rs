use dashsync_core::KeyValueStore;
use dashsync_domain::{DashSyncError, Result};

/// Backend for processes with no persistent storage.
///
/// Reports itself unavailable; any call that reaches it anyway fails with
/// [`DashSyncError::Unavailable`].
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableKeyValueStore;

impl UnavailableKeyValueStore {
    fn error() -> DashSyncError {
        DashSyncError::Unavailable("preference storage is not available".into())
    }
}

impl KeyValueStore for UnavailableKeyValueStore {
    fn is_available(&self) -> bool {
        false
    }

    fn get_item(&self, _key: &str) -> Result<Option<String>> {
        Err(Self::error())
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
        Err(Self::error())
    }

    fn remove_item(&self, _key: &str) -> Result<()> {
        Err(Self::error())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Err(Self::error())
    }
}
