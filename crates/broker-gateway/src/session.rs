//! In-memory session store mapping merchant ids to access tokens.
//!
//! One coarse lock serializes every operation, so `set`, `get` and `delete`
//! are linearizable with respect to each other. The lock is never held across
//! an `.await`. Entries live until overwritten or deleted; there is no expiry
//! and no size bound.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// Shared handle to the session map.
///
/// Cloning is cheap and every clone observes the same entries.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, String>>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the token for `subject_id` (last write wins).
    pub fn set(&self, subject_id: impl Into<String>, token: impl Into<String>) {
        self.sessions.lock().insert(subject_id.into(), token.into());
    }

    /// Current token for `subject_id`, if any.
    #[must_use]
    pub fn get(&self, subject_id: &str) -> Option<String> {
        self.sessions.lock().get(subject_id).cloned()
    }

    /// Evict the entry for `subject_id`. Returns whether one was present.
    pub fn delete(&self, subject_id: &str) -> bool {
        self.sessions.lock().remove(subject_id).is_some()
    }

    /// Number of stored sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("sessions", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let store = SessionStore::new();
        store.set("merchant-1", "token-a");

        assert_eq!(store.get("merchant-1").as_deref(), Some("token-a"));
        assert!(store.get("merchant-2").is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let store = SessionStore::new();
        store.set("merchant-1", "token-a");
        store.set("merchant-1", "token-b");

        assert_eq!(store.get("merchant-1").as_deref(), Some("token-b"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete() {
        let store = SessionStore::new();
        store.set("merchant-1", "token-a");

        assert!(store.delete("merchant-1"));
        assert!(store.get("merchant-1").is_none());

        // Second delete and never-set ids are no-ops
        assert!(!store.delete("merchant-1"));
        assert!(!store.delete("never-set"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_clones_share_entries() {
        let store = SessionStore::new();
        let handle = store.clone();
        handle.set("merchant-1", "token-a");

        assert_eq!(store.get("merchant-1").as_deref(), Some("token-a"));
    }

    #[test]
    fn test_debug_hides_tokens() {
        let store = SessionStore::new();
        store.set("merchant-1", "very-secret-token");

        let debug = format!("{store:?}");
        assert!(!debug.contains("very-secret-token"));
        assert!(debug.contains("sessions"));
    }

    #[test]
    fn test_concurrent_writers() {
        let store = SessionStore::new();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for j in 0..100 {
                        store.set(format!("merchant-{i}"), format!("token-{j}"));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 8);
        for i in 0..8 {
            assert_eq!(
                store.get(&format!("merchant-{i}")).as_deref(),
                Some("token-99")
            );
        }
    }
}
