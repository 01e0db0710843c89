//! FreshPlate data core.
//!
//! Headless data layer for the FreshPlate meal-planning apps. Screens
//! render lists and forms over this crate; it decides where data lives:
//! the REST backend for authenticated sessions, device-local JSON storage
//! for guests, with reads reconciling server, local, and bundled sample
//! provenances into one deduplicated view. Dismissed suggestions are
//! tombstoned so refreshes cannot resurrect them, and screens keep their
//! lists fresh with a cancellable interval poller.

pub mod api;
pub mod discover;
pub mod error;
pub mod mealplan;
pub mod notifications;
pub mod people;
pub mod poller;
pub mod recipes;
pub mod reconcile;
pub mod reviews;
pub mod session;
pub mod storage;
pub mod store;
pub mod tombstone;
pub mod types;

use std::sync::Arc;

pub use api::ApiClient;
pub use error::ApiError;
pub use poller::Poller;
pub use session::{AuthMode, Session};
pub use storage::{LocalStore, StorageError};

/// Everything a screen needs, wired together once at startup.
///
/// Lifecycle: construct at app start, keep for the process lifetime, and
/// call [`App::logout`] to reset. The stores consult the shared session on
/// every operation, so a login or logout switches persistence paths
/// without rebuilding anything.
pub struct App {
    pub session: Arc<Session>,
    pub api: Arc<ApiClient>,
    pub recipes: recipes::RecipeStore,
    pub meal_plan: mealplan::MealPlanStore,
    pub people: people::PeopleStore,
    pub reviews: reviews::ReviewBook,
    pub discover: discover::DiscoverFeed,
    pub notifications: notifications::NotificationCenter,
}

impl App {
    /// Wire the app against `~/.freshplate` and the given backend.
    pub fn new(base_url: impl Into<String>) -> Result<Self, StorageError> {
        Self::with_storage(LocalStore::open()?, base_url)
    }

    /// Wire the app over an explicit local store. Useful for testing.
    pub fn with_storage(
        local: LocalStore,
        base_url: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let session = Arc::new(Session::restore(local.clone()));
        let api = Arc::new(ApiClient::new(base_url, local.clone()));
        Ok(Self {
            recipes: recipes::RecipeStore::new(
                Arc::clone(&session),
                local.clone(),
                Arc::clone(&api),
            ),
            meal_plan: mealplan::MealPlanStore::new(
                Arc::clone(&session),
                local.clone(),
                Arc::clone(&api),
            ),
            people: people::PeopleStore::new(
                Arc::clone(&session),
                local.clone(),
                Arc::clone(&api),
            ),
            reviews: reviews::ReviewBook::new(),
            discover: discover::DiscoverFeed::new(
                Arc::clone(&session),
                local.clone(),
                Arc::clone(&api),
            ),
            notifications: notifications::NotificationCenter::new(
                Arc::clone(&session),
                Arc::clone(&api),
            ),
            session,
            api,
        })
    }

    /// Clear the session. Guest data stays on disk so a returning guest
    /// finds their plan intact.
    pub fn logout(&self) {
        self.session.logout();
    }
}
