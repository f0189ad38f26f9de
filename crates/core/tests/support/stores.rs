//! Mock key-value stores and server preference ports

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashsync_core::{KeyValueStore, ServerPreferencesPort};
use dashsync_domain::{
    DashSyncError, Result as DomainResult, ServerPreferencesPatch, ServerUserPreferences,
};
use parking_lot::Mutex;

#[derive(Debug, Default, Clone, Copy)]
enum WriteFault {
    #[default]
    None,
    All,
    /// Let this many writes through, fail the next one, then recover
    After(usize),
}

/// In-memory `KeyValueStore` with switchable failure modes.
#[derive(Default)]
pub struct MockKeyValueStore {
    items: Mutex<BTreeMap<String, String>>,
    unavailable: bool,
    fail_reads: bool,
    write_fault: Mutex<WriteFault>,
    writes: AtomicUsize,
}

impl MockKeyValueStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Backend that reports itself unavailable.
    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self { unavailable: true, ..Self::default() })
    }

    /// Backend whose reads always fail.
    pub fn failing_reads() -> Arc<Self> {
        Arc::new(Self { fail_reads: true, ..Self::default() })
    }

    /// Fail every write from now on.
    pub fn fail_all_writes(&self) {
        *self.write_fault.lock() = WriteFault::All;
    }

    /// Let `n` writes through, fail the next one, then accept writes again.
    pub fn fail_one_write_after(&self, n: usize) {
        *self.write_fault.lock() = WriteFault::After(n);
    }

    /// Copy of everything stored.
    pub fn dump(&self) -> BTreeMap<String, String> {
        self.items.lock().clone()
    }

    pub fn put_raw(&self, key: &str, value: &str) {
        self.items.lock().insert(key.to_string(), value.to_string());
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl KeyValueStore for MockKeyValueStore {
    fn is_available(&self) -> bool {
        !self.unavailable
    }

    fn get_item(&self, key: &str) -> DomainResult<Option<String>> {
        if self.fail_reads {
            return Err(DashSyncError::Storage("read blocked".into()));
        }
        Ok(self.items.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> DomainResult<()> {
        {
            let mut fault = self.write_fault.lock();
            match *fault {
                WriteFault::None => {}
                WriteFault::All => return Err(DashSyncError::Storage("quota exceeded".into())),
                WriteFault::After(0) => {
                    *fault = WriteFault::None;
                    return Err(DashSyncError::Storage("quota exceeded".into()));
                }
                WriteFault::After(n) => *fault = WriteFault::After(n - 1),
            }
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.items.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> DomainResult<()> {
        self.items.lock().remove(key);
        Ok(())
    }

    fn keys(&self) -> DomainResult<Vec<String>> {
        Ok(self.items.lock().keys().cloned().collect())
    }
}

/// `ServerPreferencesPort` serving a fixed profile and recording patches.
#[derive(Default)]
pub struct MockServerPreferences {
    profile: Mutex<ServerUserPreferences>,
    patches: Mutex<Vec<ServerPreferencesPatch>>,
}

impl MockServerPreferences {
    pub fn with_profile(profile: ServerUserPreferences) -> Arc<Self> {
        Arc::new(Self { profile: Mutex::new(profile), ..Self::default() })
    }

    pub fn patches(&self) -> Vec<ServerPreferencesPatch> {
        self.patches.lock().clone()
    }
}

#[async_trait]
impl ServerPreferencesPort for MockServerPreferences {
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
