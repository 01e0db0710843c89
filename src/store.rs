//! Generic local-first collection store.
//!
//! The shipped apps repeat the same guest/authenticated branching for
//! every entity type; this is that pattern written once. Reads merge the
//! server-fetched list (populated only while a session is authenticated)
//! with the guest-local list. Writes go to the backend when
//! authenticated, and rewrite the whole collection to local storage
//! otherwise. Remote failures surface to the caller and leave in-memory
//! state untouched: no retry, no rollback beyond not applying the
//! failed mutation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::reconcile::merge_by_id;
use crate::session::{AuthMode, Session};
use crate::storage::LocalStore;
use crate::types::Record;

/// Synthesize an identifier for a locally-created item. Millisecond
/// timestamps collide when items are created back-to-back; the counter
/// disambiguates.
pub(crate) fn local_id(prefix: &str) -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{}-{n}", Utc::now().timestamp_millis())
}

/// The backend side of a domain collection. Implemented by thin adapters
/// over [`crate::api::ApiClient`]; tests substitute mocks.
#[async_trait]
pub trait RemoteCollection<T>: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<T>, ApiError>;
    async fn create(&self, item: &T) -> Result<T, ApiError>;
    async fn update(&self, id: &str, item: &T) -> Result<T, ApiError>;
    async fn delete(&self, id: &str) -> Result<(), ApiError>;
}

pub struct CollectionStore<T, R> {
    session: Arc<Session>,
    local: LocalStore,
    remote: R,
    key: String,
    id_prefix: &'static str,
    remote_items: Mutex<Vec<T>>,
    local_items: Mutex<Vec<T>>,
}

impl<T, R> CollectionStore<T, R>
where
    T: Record + Serialize + DeserializeOwned + Send + Sync,
    R: RemoteCollection<T>,
{
    /// Open a store over the collection persisted under `key`.
    /// `default_local` is the starting content when nothing has ever been
    /// written. It is not persisted until the first guest write.
    pub fn new(
        session: Arc<Session>,
        local: LocalStore,
        remote: R,
        key: impl Into<String>,
        default_local: Vec<T>,
    ) -> Self {
        let key = key.into();
        let local_items = if local.contains(&key) {
            local.read(&key)
        } else {
            default_local
        };
        Self {
            session,
            local,
            remote,
            key,
            id_prefix: "guest",
            remote_items: Mutex::new(Vec::new()),
            local_items: Mutex::new(local_items),
        }
    }

    /// Union of server and guest-local items, deduplicated by identifier.
    /// Server items are present only after an authenticated `refresh`.
    pub fn list(&self) -> Vec<T> {
        let remote = if self.session.is_authenticated() {
            self.remote_items.lock().clone()
        } else {
            Vec::new()
        };
        let local = if self.session.is_authenticated() {
            Vec::new()
        } else {
            self.local_items.lock().clone()
        };
        merge_by_id([remote, local])
    }

    /// Re-read the collection from its source of truth for the current
    /// mode. On a remote failure the previous items are kept.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        if self.session.is_authenticated() {
            let items = self.remote.fetch_all().await?;
            *self.remote_items.lock() = items;
        } else {
            *self.local_items.lock() = self.local.read(&self.key);
        }
        Ok(())
    }

    /// Create an item. Authenticated: exactly one backend call, the
    /// server-assigned result is appended. Guest: a timestamp-based id is
    /// synthesized and the whole collection is rewritten to local storage.
    pub async fn create(&self, mut item: T) -> Result<T, ApiError> {
        match self.session.mode() {
            AuthMode::Authenticated => {
                let created = self.remote.create(&item).await?;
                self.remote_items.lock().push(created.clone());
                Ok(created)
            }
            AuthMode::Guest => {
                item.set_id(local_id(self.id_prefix));
                let mut items = self.local_items.lock();
                items.push(item.clone());
                self.persist(&items);
                Ok(item)
            }
            AuthMode::Anonymous => Err(ApiError::Validation(
                "Sign in or continue as a guest to save items".to_string(),
            )),
        }
    }

    /// Apply `mutate` to the item with `id`. The patched item is sent
    /// whole to the backend when authenticated; guest mode rewrites the
    /// full collection (no partial patches on disk).
    pub async fn update<F>(&self, id: &str, mutate: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut T) + Send,
    {
        if self.session.is_authenticated() {
            let mut patched = self
                .remote_items
                .lock()
                .iter()
                .find(|i| i.id() == id)
                .cloned()
                .ok_or_else(|| ApiError::NotFound(format!("item {id}")))?;
            mutate(&mut patched);
            let updated = self.remote.update(id, &patched).await?;
            let mut items = self.remote_items.lock();
            if let Some(slot) = items.iter_mut().find(|i| i.id() == id) {
                *slot = updated.clone();
            }
            Ok(updated)
        } else {
            let mut items = self.local_items.lock();
            let item = items
                .iter_mut()
                .find(|i| i.id() == id)
                .ok_or_else(|| ApiError::NotFound(format!("item {id}")))?;
            mutate(item);
            let updated = item.clone();
            self.persist(&items);
            Ok(updated)
        }
    }

    /// Delete the item with `id`. Guest deletion of an unknown id is a
    /// no-op, as in the shipped apps.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        if self.session.is_authenticated() {
            self.remote.delete(id).await?;
            self.remote_items.lock().retain(|i| i.id() != id);
        } else {
            let mut items = self.local_items.lock();
            items.retain(|i| i.id() != id);
            self.persist(&items);
        }
        Ok(())
    }

    fn persist(&self, items: &[T]) {
        if let Err(e) = self.local.write(&self.key, items) {
            log::warn!("Failed to persist collection '{}': {e}", self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use crate::types::Recipe;

    /// Mock backend with programmable failure and call counters.
    #[derive(Default)]
    struct MockRemote {
        pub items: Mutex<Vec<Recipe>>,
        pub fail: std::sync::atomic::AtomicBool,
        pub calls: AtomicUsize,
    }

    impl MockRemote {
        /// Count the call and fail it when the switch is on.
        fn guard(&self) -> Result<(), ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                Err(ApiError::Network("connection refused".into()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl RemoteCollection<Recipe> for Arc<MockRemote> {
        async fn fetch_all(&self) -> Result<Vec<Recipe>, ApiError> {
            self.guard()?;
            Ok(self.items.lock().clone())
        }

        async fn create(&self, item: &Recipe) -> Result<Recipe, ApiError> {
            self.guard()?;
            let mut created = item.clone();
            created.id = format!("srv-{}", self.items.lock().len() + 1);
            self.items.lock().push(created.clone());
            Ok(created)
        }

        async fn update(&self, id: &str, item: &Recipe) -> Result<Recipe, ApiError> {
            self.guard()?;
            let mut items = self.items.lock();
            let slot = items
                .iter_mut()
                .find(|i| i.id == id)
                .ok_or_else(|| ApiError::NotFound(format!("recipe {id}")))?;
            *slot = item.clone();
            Ok(item.clone())
        }

        async fn delete(&self, id: &str) -> Result<(), ApiError> {
            self.guard()?;
            self.items.lock().retain(|i| i.id != id);
            Ok(())
        }
    }

    fn recipe(title: &str) -> Recipe {
        Recipe {
            title: title.to_string(),
            ingredients: vec!["3 tomatoes".to_string()],
            instructions: vec!["Simmer for 20 minutes".to_string()],
            ..Default::default()
        }
    }

    fn setup(
        mode: AuthMode,
    ) -> (
        tempfile::TempDir,
        Arc<MockRemote>,
        CollectionStore<Recipe, Arc<MockRemote>>,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::open_at(dir.path().to_path_buf()).unwrap();
        match mode {
            AuthMode::Guest => local.write(crate::storage::KEY_GUEST_MODE, &true).unwrap(),
            AuthMode::Authenticated => local.write(crate::storage::KEY_AUTH_TOKEN, "tok").unwrap(),
            AuthMode::Anonymous => {}
        }
        let session = Arc::new(Session::restore(local.clone()));
        let remote = Arc::new(MockRemote::default());
        let store = CollectionStore::new(
            session,
            local,
            Arc::clone(&remote),
            "guest_recipes",
            Vec::new(),
        );
        (dir, remote, store)
    }

    #[tokio::test]
    async fn guest_create_never_touches_the_network() {
        let (_dir, remote, store) = setup(AuthMode::Guest);

        let created = store.create(recipe("Tomato Soup")).await.unwrap();
        assert!(!created.id.is_empty());
        assert!(created.id.starts_with("guest-"));
        assert_eq!(remote.calls.load(Ordering::SeqCst), 0);

        let listed = store.list();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Tomato Soup");
        assert_eq!(listed[0].ingredients, vec!["3 tomatoes".to_string()]);
    }

    #[tokio::test]
    async fn authenticated_create_issues_exactly_one_call() {
        let (_dir, remote, store) = setup(AuthMode::Authenticated);

        let created = store.create(recipe("Tomato Soup")).await.unwrap();
        assert_eq!(created.id, "srv-1");
        assert_eq!(remote.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.list().len(), 1);
    }

    #[tokio::test]
    async fn failed_create_leaves_state_unchanged() {
        let (_dir, remote, store) = setup(AuthMode::Authenticated);
        store.create(recipe("First")).await.unwrap();

        remote.fail.store(true, Ordering::SeqCst);
        let err = store.create(recipe("Second")).await.unwrap_err();
        assert!(err.is_network());
        assert_eq!(store.list().len(), 1);
        assert_eq!(store.list()[0].title, "First");
    }

    #[tokio::test]
    async fn anonymous_create_is_rejected() {
        let (_dir, remote, store) = setup(AuthMode::Anonymous);
        let err = store.create(recipe("Nope")).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn guest_collection_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::open_at(dir.path().to_path_buf()).unwrap();
        let session = Arc::new(Session::restore(local.clone()));
        session.continue_as_guest();
        let remote = Arc::new(MockRemote::default());

        let store = CollectionStore::new(
            Arc::clone(&session),
            local.clone(),
            Arc::clone(&remote),
            "guest_recipes",
            Vec::new(),
        );
        let created = store.create(recipe("Tomato Soup")).await.unwrap();
        let before = store.list();

        // A brand-new store over the same root must see identical content.
        let reloaded = CollectionStore::new(
            session,
            local,
            remote,
            "guest_recipes",
            Vec::new(),
        );
        let after = reloaded.list();
        assert_eq!(before, after);
        assert_eq!(after[0].id, created.id);
    }

    #[tokio::test]
    async fn guest_update_rewrites_the_collection() {
        let (_dir, _remote, store) = setup(AuthMode::Guest);
        let created = store.create(recipe("Tomato Soup")).await.unwrap();

        let updated = store
            .update(&created.id, |r| r.title = "Roasted Tomato Soup".to_string())
            .await
            .unwrap();
        assert_eq!(updated.title, "Roasted Tomato Soup");

        let listed = store.list();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Roasted Tomato Soup");
    }

    #[tokio::test]
    async fn update_of_missing_item_is_not_found() {
        let (_dir, _remote, store) = setup(AuthMode::Guest);
        let err = store.update("missing", |_| {}).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_removes_from_both_modes() {
        let (_dir, _remote, store) = setup(AuthMode::Guest);
        let created = store.create(recipe("Tomato Soup")).await.unwrap();
        store.delete(&created.id).await.unwrap();
        assert!(store.list().is_empty());

        let (_dir, remote, store) = setup(AuthMode::Authenticated);
        let created = store.create(recipe("Tomato Soup")).await.unwrap();
        store.delete(&created.id).await.unwrap();
        assert!(store.list().is_empty());
        assert!(remote.items.lock().is_empty());
    }

    #[tokio::test]
    async fn authenticated_refresh_replaces_server_items() {
        let (_dir, remote, store) = setup(AuthMode::Authenticated);
        remote.items.lock().push(Recipe {
            id: "srv-9".to_string(),
            title: "Server Stew".to_string(),
            ..Default::default()
        });

        store.refresh().await.unwrap();
        let listed = store.list();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "srv-9");
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_items() {
        let (_dir, remote, store) = setup(AuthMode::Authenticated);
        store.create(recipe("Keeper")).await.unwrap();

        remote.fail.store(true, Ordering::SeqCst);
        assert!(store.refresh().await.is_err());
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn local_ids_are_unique_within_a_millisecond() {
        let a = local_id("guest");
        let b = local_id("guest");
        assert_ne!(a, b);
    }

    #[test]
    fn default_local_is_used_until_first_write() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::open_at(dir.path().to_path_buf()).unwrap();
        let session = Arc::new(Session::restore(local.clone()));
        session.continue_as_guest();
        let remote = Arc::new(MockRemote::default());

        let seeded = vec![Recipe {
            id: "starter-1".to_string(),
            title: "Starter".to_string(),
            ..Default::default()
        }];
        let store = CollectionStore::new(
            Arc::clone(&session),
            local.clone(),
            Arc::clone(&remote),
            "guest_recipes",
            seeded.clone(),
        );
        assert_eq!(store.list(), seeded);
        // Nothing persisted yet: defaults are starting content, not data.
        assert!(!local.contains("guest_recipes"));
    }
}
