//! Shared context: a string-keyed store for process-wide values that
//! handlers need without threading each one through every call chain
//! (e.g. the main menu, cached client handles).
//!
//! Explicitly constructed at startup and passed down; there is no global
//! instance. Values are stored type-erased and read back with typed
//! accessors; `Arc<T>` values make sharing cheap.

use std::any::Any;
use std::collections::HashMap;
use tokio::sync::RwLock;

type AnyValue = Box<dyn Any + Send + Sync>;

#[derive(Default)]
pub struct SharedContext {
    values: RwLock<HashMap<String, AnyValue>>,
}

impl SharedContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub async fn set<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
        self.values.write().await.insert(key.into(), Box::new(value));
    }

    /// Returns a clone of the value under `key`, or `None` when the key is
    /// absent or holds a different type.
    pub async fn get<T: Any + Send + Sync + Clone>(&self, key: &str) -> Option<T> {
        self.values
            .read()
            .await
            .get(key)
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
    }

    /// Like [`SharedContext::get`] but falls back to `default`.
    pub async fn get_or<T: Any + Send + Sync + Clone>(&self, key: &str, default: T) -> T {
        self.get(key).await.unwrap_or(default)
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.values.read().await.contains_key(key)
    }

    pub async fn remove(&self, key: &str) -> bool {
        self.values.write().await.remove(key).is_some()
    }

    /// Drops every stored value. Used by tests to reset between cases.
    pub async fn clear(&self) {
        self.values.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_set_and_get_typed() {
        let ctx = SharedContext::new();
        ctx.set("user_id", 42_i64).await;
        ctx.set("app_name", "menubot".to_string()).await;
        assert_eq!(ctx.get::<i64>("user_id").await, Some(42));
        assert_eq!(
            ctx.get::<String>("app_name").await.as_deref(),
            Some("menubot")
        );
    }

    #[tokio::test]
    async fn test_get_wrong_type_is_none() {
        let ctx = SharedContext::new();
        ctx.set("user_id", 42_i64).await;
        assert_eq!(ctx.get::<String>("user_id").await, None);
    }

    #[tokio::test]
    async fn test_get_or_default() {
        let ctx = SharedContext::new();
        assert_eq!(ctx.get_or("missing", 7_i64).await, 7);
    }

    #[tokio::test]
    async fn test_shared_arc_value() {
        let ctx = SharedContext::new();
        let shared = Arc::new("handle".to_string());
        ctx.set("client", shared.clone()).await;
        let fetched = ctx.get::<Arc<String>>("client").await.unwrap();
        assert!(Arc::ptr_eq(&shared, &fetched));
    }

    #[tokio::test]
    async fn test_clear_and_remove() {
        let ctx = SharedContext::new();
        ctx.set("a", 1_i32).await;
        ctx.set("b", 2_i32).await;
        assert!(ctx.remove("a").await);
        assert!(!ctx.remove("a").await);
        ctx.clear().await;
        assert!(ctx.is_empty().await);
    }
}
