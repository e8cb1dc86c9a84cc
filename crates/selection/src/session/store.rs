use std::sync::Arc;
use std::time::Duration;

use moka::notification::RemovalCause;
use moka::sync::Cache;
use uuid::Uuid;

use super::SessionContext;
use crate::config::SessionPreferences;

/// In-memory sessions with capacity and idle-expiry bounds.
///
/// Dropping a session drops its selection registry with it.
#[derive(Clone)]
pub struct SessionStore {
    cache: Cache<String, Arc<SessionContext>>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

impl SessionStore {
    pub fn new(preferences: &SessionPreferences) -> Self {
        let max_capacity = preferences.max_sessions.max(1);
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_idle(Duration::from_secs(preferences.ttl_seconds))
            .eviction_listener(|id: Arc<String>, _session, cause: RemovalCause| {
                if cause != RemovalCause::Replaced {
                    log::info!("selection session {id} discarded ({cause:?})");
                }
            })
            .build();
        Self { cache }
    }

    /// Starts a session under a fresh id.
    pub fn start_session(&self) -> Arc<SessionContext> {
        self.get_or_create(&Uuid::now_v7().to_string())
    }

    /// Returns the session for `id`, creating it at most once under race.
    pub fn get_or_create(&self, id: &str) -> Arc<SessionContext> {
        self.cache.get_with(id.to_string(), || {
            log::info!("selection session {id} created");
            Arc::new(SessionContext::new(id))
        })
    }

    pub fn get(&self, id: &str) -> Option<Arc<SessionContext>> {
        self.cache.get(id)
    }

    pub fn end_session(&self, id: &str) {
        self.cache.invalidate(id);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.cache.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn store() -> SessionStore {
        SessionStore::new(&SessionPreferences::default())
    }

    #[test]
    fn get_or_create_returns_same_session() {
        let store = store();
        let first = store.get_or_create("s1");
        let second = store.get_or_create("s1");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.id(), "s1");
    }

    #[test]
    fn racing_first_access_yields_one_session() {
        let store = store();
        let sessions = thread::scope(|scope| {
            let handles = (0..16)
                .map(|_| scope.spawn(|| store.get_or_create("shared")))
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("join"))
                .collect::<Vec<_>>()
        });
        for session in &sessions[1..] {
            assert!(Arc::ptr_eq(&sessions[0], session));
        }
    }

    #[test]
    fn end_session_discards_it() {
        let store = store();
        let session = store.start_session();
        let id = session.id().to_string();
        assert!(store.contains(&id));
        store.end_session(&id);
        assert!(store.get(&id).is_none());
        let fresh = store.get_or_create(&id);
        assert!(!Arc::ptr_eq(&session, &fresh));
    }
}
