//! Per-user session state and the process-wide session store.
//!
//! Sessions are created lazily on first access and owned by the
//! [`SessionStore`]; handlers receive an `Arc` and mutate state through
//! the per-session lock, never while the store's table lock is held.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug)]
struct SessionInner {
    username: Option<String>,
    current_menu: Option<String>,
    conversation_state: Option<String>,
    data: HashMap<String, Value>,
    last_activity: DateTime<Utc>,
}

/// Mutable state for a single user. Every read or write of the domain
/// state refreshes `last_activity`; the timestamp never moves backwards.
#[derive(Debug)]
pub struct UserSession {
    user_id: i64,
    created_at: DateTime<Utc>,
    inner: RwLock<SessionInner>,
}

impl UserSession {
    fn new(user_id: i64, username: Option<&str>) -> Self {
        let now = Utc::now();
        debug!(user_id, "created session");
        Self {
            user_id,
            created_at: now,
            inner: RwLock::new(SessionInner {
                username: username.map(str::to_string),
                current_menu: None,
                conversation_state: None,
                data: HashMap::new(),
                last_activity: now,
            }),
        }
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Refreshes `last_activity`. Monotonic: never moves the timestamp back.
    pub async fn touch(&self) {
        let mut inner = self.inner.write().await;
        inner.last_activity = inner.last_activity.max(Utc::now());
    }

    pub async fn last_activity(&self) -> DateTime<Utc> {
        self.inner.read().await.last_activity
    }

    pub async fn username(&self) -> Option<String> {
        let mut inner = self.inner.write().await;
        inner.last_activity = inner.last_activity.max(Utc::now());
        inner.username.clone()
    }

    pub async fn set_username(&self, username: &str) {
        let mut inner = self.inner.write().await;
        inner.username = Some(username.to_string());
        inner.last_activity = inner.last_activity.max(Utc::now());
    }

    pub async fn current_menu(&self) -> Option<String> {
        let mut inner = self.inner.write().await;
        inner.last_activity = inner.last_activity.max(Utc::now());
        inner.current_menu.clone()
    }

    pub async fn set_menu(&self, menu_name: &str) {
        let mut inner = self.inner.write().await;
        inner.current_menu = Some(menu_name.to_string());
        inner.last_activity = inner.last_activity.max(Utc::now());
        debug!(user_id = self.user_id, menu = %menu_name, "session menu set");
    }

    pub async fn conversation_state(&self) -> Option<String> {
        let mut inner = self.inner.write().await;
        inner.last_activity = inner.last_activity.max(Utc::now());
        inner.conversation_state.clone()
    }

    pub async fn set_state(&self, state: &str) {
        let mut inner = self.inner.write().await;
        inner.conversation_state = Some(state.to_string());
        inner.last_activity = inner.last_activity.max(Utc::now());
        debug!(user_id = self.user_id, state = %state, "session state set");
    }

    /// Reads a value from the user's scratch data.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let mut inner = self.inner.write().await;
        inner.last_activity = inner.last_activity.max(Utc::now());
        inner.data.get(key).cloned()
    }

    /// Stores a value in the user's scratch data.
    pub async fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        let mut inner = self.inner.write().await;
        inner.data.insert(key.into(), value.into());
        inner.last_activity = inner.last_activity.max(Utc::now());
    }

    pub async fn clear_data(&self) {
        let mut inner = self.inner.write().await;
        inner.data.clear();
        inner.last_activity = inner.last_activity.max(Utc::now());
    }

    /// Drops menu, conversation state, and scratch data; identity and
    /// timestamps stay.
    pub async fn reset(&self) {
        let mut inner = self.inner.write().await;
        inner.current_menu = None;
        inner.conversation_state = None;
        inner.data.clear();
        inner.last_activity = inner.last_activity.max(Utc::now());
        info!(user_id = self.user_id, "session reset");
    }
}

/// Process-wide table of user sessions with idle-based eviction.
/// Explicitly constructed and passed down; no global instance.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<i64, Arc<UserSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session for `user_id`, creating it on first access.
    /// Always refreshes `last_activity`. The table lock is held only for
    /// the lookup/insert, not while the session is touched.
    pub async fn get_or_create(&self, user_id: i64, username: Option<&str>) -> Arc<UserSession> {
        let session = {
            let mut sessions = self.sessions.write().await;
            sessions
                .entry(user_id)
                .or_insert_with(|| {
                    info!(user_id, "new session");
                    Arc::new(UserSession::new(user_id, username))
                })
                .clone()
        };
        session.touch().await;
        if let Some(name) = username {
            if session.username().await.as_deref() != Some(name) {
                session.set_username(name).await;
            }
        }
        session
    }

    /// Removes the session. Idempotent; returns whether one was removed.
    pub async fn remove(&self, user_id: i64) -> bool {
        let removed = self.sessions.write().await.remove(&user_id).is_some();
        if removed {
            info!(user_id, "removed session");
        }
        removed
    }

    /// Removes every session idle for longer than `max_idle` and returns
    /// the count. `last_activity` is re-read under the write lock, so a
    /// session touched after the scan started survives.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let deadline = Utc::now() - max_idle;
        let stale: Vec<i64> = {
            let sessions = self.sessions.read().await;
            let mut ids = Vec::new();
            for (user_id, session) in sessions.iter() {
                if session.last_activity().await < deadline {
                    ids.push(*user_id);
                }
            }
            ids
        };

        let mut removed = 0;
        let mut sessions = self.sessions.write().await;
        for user_id in stale {
            if let Some(session) = sessions.get(&user_id) {
                if session.last_activity().await < deadline {
                    sessions.remove(&user_id);
                    removed += 1;
                }
            }
        }
        if removed > 0 {
            info!(removed, "evicted idle sessions");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn user_ids(&self) -> Vec<i64> {
        self.sessions.read().await.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_or_create_returns_same_session() {
        let store = SessionStore::new();
        let first = store.get_or_create(42, Some("alice")).await;
        let first_activity = first.last_activity().await;
        let second = store.get_or_create(42, None).await;
        assert!(Arc::ptr_eq(&first, &second));
        assert!(second.last_activity().await >= first_activity);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_username_updated_on_access() {
        let store = SessionStore::new();
        store.get_or_create(42, None).await;
        let session = store.get_or_create(42, Some("alice")).await;
        assert_eq!(session.username().await.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let store = SessionStore::new();
        store.get_or_create(42, None).await;
        assert!(store.remove(42).await);
        assert!(!store.remove(42).await);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_scratch_data_round_trip() {
        let store = SessionStore::new();
        let session = store.get_or_create(42, None).await;
        session.set("cart", json!({"items": 3})).await;
        assert_eq!(session.get("cart").await, Some(json!({"items": 3})));
        assert_eq!(session.get("missing").await, None);
        session.clear_data().await;
        assert_eq!(session.get("cart").await, None);
    }

    #[tokio::test]
    async fn test_reset_keeps_identity() {
        let store = SessionStore::new();
        let session = store.get_or_create(42, Some("alice")).await;
        session.set_menu("main").await;
        session.set_state("awaiting_input").await;
        session.set("k", "v").await;
        session.reset().await;
        assert_eq!(session.current_menu().await, None);
        assert_eq!(session.conversation_state().await, None);
        assert_eq!(session.get("k").await, None);
        assert_eq!(session.user_id(), 42);
        assert_eq!(session.username().await.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_last_activity_refreshed_on_read() {
        let store = SessionStore::new();
        let session = store.get_or_create(42, None).await;
        let before = session.last_activity().await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        session.current_menu().await;
        assert!(session.last_activity().await > before);
    }

    #[tokio::test]
    async fn test_evict_idle_removes_stale_sessions() {
        let store = SessionStore::new();
        store.get_or_create(1, None).await;
        store.get_or_create(2, None).await;
        tokio::time::sleep(std::time::Duration::from_millis(30)).await;
        let removed = store.evict_idle(Duration::milliseconds(10)).await;
        assert_eq!(removed, 2);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_evict_idle_spares_touched_sessions() {
        let store = SessionStore::new();
        let active = store.get_or_create(1, None).await;
        store.get_or_create(2, None).await;
        tokio::time::sleep(std::time::Duration::from_millis(30)).await;
        active.touch().await;
        let removed = store.evict_idle(Duration::milliseconds(10)).await;
        assert_eq!(removed, 1);
        assert_eq!(store.user_ids().await, vec![1]);
    }

    #[tokio::test]
    async fn test_evict_idle_keeps_fresh_sessions() {
        let store = SessionStore::new();
        store.get_or_create(1, None).await;
        let removed = store.evict_idle(Duration::hours(1)).await;
        assert_eq!(removed, 0);
        assert_eq!(store.len().await, 1);
    }
}
