//! Created and saved recipes.
//!
//! Two collections share this module: recipes the user authored (full
//! CRUD through the generic local-first store) and recipes the user
//! bookmarked from elsewhere (a flat set, persisted locally with a
//! best-effort mirror to the backend). Access tracking feeds the
//! "recent" views, which honor the recent-item tombstones.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::session::Session;
use crate::storage::{
    LocalStore, KEY_DELETED_RECENT_ITEMS, KEY_GUEST_ACCESSED, KEY_GUEST_RECIPES, KEY_SAVED_RECIPES,
};
use crate::store::{CollectionStore, RemoteCollection};
use crate::tombstone::TombstoneSet;
use crate::types::{AccessRecord, Recipe};

/// `/recipes` endpoints as a [`RemoteCollection`].
pub struct RecipesRemote {
    api: Arc<ApiClient>,
}

impl RecipesRemote {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl RemoteCollection<Recipe> for RecipesRemote {
    async fn fetch_all(&self) -> Result<Vec<Recipe>, ApiError> {
        self.api.get_recipes().await
    }

    async fn create(&self, item: &Recipe) -> Result<Recipe, ApiError> {
        self.api.create_recipe(item).await
    }

    async fn update(&self, id: &str, item: &Recipe) -> Result<Recipe, ApiError> {
        self.api.update_recipe(id, item).await
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.api.delete_recipe(id).await
    }
}

pub struct RecipeStore {
    session: Arc<Session>,
    local: LocalStore,
    api: Arc<ApiClient>,
    created: CollectionStore<Recipe, RecipesRemote>,
    saved: Mutex<Vec<Recipe>>,
    recent_tombstones: TombstoneSet,
}

impl RecipeStore {
    pub fn new(session: Arc<Session>, local: LocalStore, api: Arc<ApiClient>) -> Self {
        let created = CollectionStore::new(
            Arc::clone(&session),
            local.clone(),
            RecipesRemote::new(Arc::clone(&api)),
            KEY_GUEST_RECIPES,
            Vec::new(),
        );
        let saved = local.read(KEY_SAVED_RECIPES);
        let recent_tombstones = TombstoneSet::open(local.clone(), KEY_DELETED_RECENT_ITEMS);
        Self {
            session,
            local,
            api,
            created,
            saved: Mutex::new(saved),
            recent_tombstones,
        }
    }

    // -- created recipes ----------------------------------------------------

    /// The user's own recipes for the current mode.
    pub fn list(&self) -> Vec<Recipe> {
        self.created.list()
    }

    pub async fn refresh(&self) -> Result<(), ApiError> {
        self.created.refresh().await
    }

    /// Create a recipe. A blank title fails validation before any request
    /// or write happens.
    pub async fn create(&self, mut recipe: Recipe) -> Result<Recipe, ApiError> {
        if recipe.title.trim().is_empty() {
            return Err(ApiError::Validation("Recipe title is required".to_string()));
        }
        if recipe.created_at.is_none() {
            recipe.created_at = Some(Utc::now().to_rfc3339());
        }
        self.created.create(recipe).await
    }

    pub async fn update<F>(&self, id: &str, mutate: F) -> Result<Recipe, ApiError>
    where
        F: FnOnce(&mut Recipe) + Send,
    {
        self.created
            .update(id, |recipe| {
                mutate(recipe);
                recipe.updated_at = Some(Utc::now().to_rfc3339());
            })
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.created.delete(id).await
    }

    pub fn get(&self, id: &str) -> Option<Recipe> {
        self.list().into_iter().find(|r| r.id == id)
    }

    // -- saved recipes ------------------------------------------------------

    /// Bookmark a recipe. Always recorded locally; when authenticated the
    /// backend is mirrored best-effort (a failed mirror keeps the local
    /// bookmark, the shipped apps behave the same way).
    pub async fn save(&self, recipe: Recipe) -> Result<(), ApiError> {
        if self.session.is_authenticated() {
            if let Err(e) = self.api.save_recipe(&recipe).await {
                log::warn!("Failed to save recipe to account, keeping local copy: {e}");
            }
        }
        let mut saved = self.saved.lock();
        if !saved.iter().any(|r| r.id == recipe.id) {
            saved.push(recipe);
            self.persist_saved(&saved);
        }
        Ok(())
    }

    pub async fn unsave(&self, id: &str) -> Result<(), ApiError> {
        if self.session.is_authenticated() {
            if let Err(e) = self.api.unsave_recipe(id).await {
                log::warn!("Failed to remove saved recipe from account: {e}");
            }
        }
        let mut saved = self.saved.lock();
        saved.retain(|r| r.id != id);
        self.persist_saved(&saved);
        Ok(())
    }

    pub fn saved(&self) -> Vec<Recipe> {
        self.saved.lock().clone()
    }

    /// A recipe counts as saved if it is bookmarked or authored by the user.
    pub fn is_saved(&self, id: &str) -> bool {
        self.saved.lock().iter().any(|r| r.id == id) || self.list().iter().any(|r| r.id == id)
    }

    // -- access tracking ----------------------------------------------------

    /// Record that a recipe was opened. Tracking failures are logged and
    /// swallowed; tracking is never worth interrupting the user.
    pub async fn track_access(&self, id: &str) {
        if self.session.is_authenticated() {
            if let Err(e) = self.api.track_recipe_access(id).await {
                log::debug!("Recipe access tracking failed: {e}");
            }
        }
        let mut records: Vec<AccessRecord> = self.local.read(KEY_GUEST_ACCESSED);
        let now = Utc::now().to_rfc3339();
        match records.iter_mut().find(|r| r.recipe_id == id) {
            Some(record) => record.accessed_at = now,
            None => records.push(AccessRecord {
                recipe_id: id.to_string(),
                accessed_at: now,
            }),
        }
        if let Err(e) = self.local.write(KEY_GUEST_ACCESSED, &records) {
            log::warn!("Failed to persist access records: {e}");
        }
    }

    /// Recently-opened recipes, most recent first, with dismissed entries
    /// suppressed.
    pub fn recently_accessed(&self) -> Vec<AccessRecord> {
        let mut records: Vec<AccessRecord> = self.local.read(KEY_GUEST_ACCESSED);
        records.sort_by(|a, b| b.accessed_at.cmp(&a.accessed_at));
        self.recent_tombstones.filter(records)
    }

    /// Remove a recipe from the recent list for good (until restored).
    pub fn dismiss_recent(&self, id: &str) {
        self.recent_tombstones.mark_deleted(id);
    }

    pub fn restore_recent(&self, id: &str) {
        self.recent_tombstones.restore(id);
    }

    fn persist_saved(&self, saved: &[Recipe]) {
        if let Err(e) = self.local.write(KEY_SAVED_RECIPES, saved) {
            log::warn!("Failed to persist saved recipes: {e}");
        }
    }
}
