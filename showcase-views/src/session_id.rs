//! Client session identifier
//!
//! One opaque id per browser tab, kept in tab-scoped storage that the caller
//! hands in at construction. The id is only a dedup key for the remote
//! store; it carries no identity.

use showcase_common::uuid_utils;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

use crate::storage::KeyValueStorage;

/// Storage key holding the tab's session id
pub const SESSION_ID_KEY: &str = "video_session_id";

/// Opaque per-tab session identifier; empty when no tab storage exists
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ClientSessionId(String);

impl ClientSessionId {
    /// Sentinel for contexts without tab storage ("cannot deduplicate")
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Produces the tab's session id, generating and persisting it on first use
#[derive(Clone)]
pub struct SessionIdProvider {
    storage: Option<Arc<dyn KeyValueStorage>>,
    // Serializes get-or-create so two callers in one tab cannot mint two ids
    create_lock: Arc<Mutex<()>>,
}

impl SessionIdProvider {
    /// Provider for an interactive context with tab storage
    pub fn for_tab(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage: Some(storage),
            create_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Provider for non-interactive contexts; always yields the empty id
    pub fn detached() -> Self {
        Self {
            storage: None,
            create_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The tab's session id, stable for the lifetime of the storage
    pub fn session_id(&self) -> ClientSessionId {
        let Some(storage) = &self.storage else {
            return ClientSessionId::empty();
        };

        let _guard = self.create_lock.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = storage.get(SESSION_ID_KEY).filter(|id| !id.is_empty()) {
            return ClientSessionId(existing);
        }

        let id = uuid_utils::generate().to_string();
        if let Err(e) = storage.set(SESSION_ID_KEY, &id) {
            // Still usable for this call; a later call may mint a new id
            warn!("Failed to persist session id: {}", e);
        } else {
            debug!("Generated new tab session id");
        }
        ClientSessionId(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::storage::MemoryStorage;

    struct ReadOnlyStorage;

    impl KeyValueStorage for ReadOnlyStorage {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Unavailable("quota exceeded".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_same_tab_returns_same_id() {
        let provider = SessionIdProvider::for_tab(Arc::new(MemoryStorage::new()));
        let first = provider.session_id();
        let second = provider.session_id();

        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_navigation_within_tab_keeps_id() {
        // A new provider over the same tab storage models a page navigation
        let tab = Arc::new(MemoryStorage::new());
        let before = SessionIdProvider::for_tab(tab.clone()).session_id();
        let after = SessionIdProvider::for_tab(tab).session_id();
        assert_eq!(before, after);
    }

    #[test]
    fn test_fresh_tab_gets_different_id() {
        let tab_a = SessionIdProvider::for_tab(Arc::new(MemoryStorage::new()));
        let tab_b = SessionIdProvider::for_tab(Arc::new(MemoryStorage::new()));
        assert_ne!(tab_a.session_id(), tab_b.session_id());
    }

    #[test]
    fn test_id_is_a_uuid() {
        let provider = SessionIdProvider::for_tab(Arc::new(MemoryStorage::new()));
        let id = provider.session_id();
        assert!(uuid_utils::parse(id.as_str()).is_ok());
    }

    #[test]
    fn test_detached_yields_empty() {
        let provider = SessionIdProvider::detached();
        assert!(provider.session_id().is_empty());
        assert_eq!(provider.session_id().to_string(), "");
    }

    #[test]
    fn test_unpersistable_storage_still_yields_an_id() {
        let provider = SessionIdProvider::for_tab(Arc::new(ReadOnlyStorage));
        assert!(!provider.session_id().is_empty());
    }
}
