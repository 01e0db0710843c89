//! Household members and view preferences.
//!
//! Persons are a plain CRUD collection through the generic local-first
//! store; a fresh guest profile starts with two placeholder persons so
//! the planner screen has rows to edit. Preferences are a single record,
//! not a collection, so they bypass the generic store.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::session::Session;
use crate::storage::{LocalStore, KEY_GUEST_PEOPLE, KEY_GUEST_PREFERENCES};
use crate::store::{CollectionStore, RemoteCollection};
use crate::types::{Person, UserPreferences};

/// `/persons` endpoints as a [`RemoteCollection`].
pub struct PersonsRemote {
    api: Arc<ApiClient>,
}

impl PersonsRemote {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl RemoteCollection<Person> for PersonsRemote {
    async fn fetch_all(&self) -> Result<Vec<Person>, ApiError> {
        self.api.get_persons().await
    }

    async fn create(&self, item: &Person) -> Result<Person, ApiError> {
        self.api.add_person(item).await
    }

    async fn update(&self, id: &str, item: &Person) -> Result<Person, ApiError> {
        self.api.update_person(id, item).await
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.api.delete_person(id).await
    }
}

/// Placeholder persons for a fresh guest profile.
fn default_people() -> Vec<Person> {
    vec![
        Person {
            id: "guest-1".to_string(),
            name: "Person A".to_string(),
            preferences: Some(String::new()),
            allergies: Some(String::new()),
        },
        Person {
            id: "guest-2".to_string(),
            name: "Person B".to_string(),
            preferences: Some(String::new()),
            allergies: Some(String::new()),
        },
    ]
}

pub struct PeopleStore {
    session: Arc<Session>,
    local: LocalStore,
    api: Arc<ApiClient>,
    persons: CollectionStore<Person, PersonsRemote>,
    preferences: Mutex<UserPreferences>,
}

impl PeopleStore {
    pub fn new(session: Arc<Session>, local: LocalStore, api: Arc<ApiClient>) -> Self {
        let persons = CollectionStore::new(
            Arc::clone(&session),
            local.clone(),
            PersonsRemote::new(Arc::clone(&api)),
            KEY_GUEST_PEOPLE,
            default_people(),
        );
        let preferences = local.read(KEY_GUEST_PREFERENCES);
        Self {
            session,
            local,
            api,
            persons,
            preferences: Mutex::new(preferences),
        }
    }

    // -- persons ------------------------------------------------------------

    pub fn list(&self) -> Vec<Person> {
        self.persons.list()
    }

    pub async fn add(&self, person: Person) -> Result<Person, ApiError> {
        if person.name.trim().is_empty() {
            return Err(ApiError::Validation("Name is required".to_string()));
        }
        self.persons.create(person).await
    }

    pub async fn update<F>(&self, id: &str, mutate: F) -> Result<Person, ApiError>
    where
        F: FnOnce(&mut Person) + Send,
    {
        self.persons.update(id, mutate).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.persons.delete(id).await
    }

    // -- preferences --------------------------------------------------------

    pub fn preferences(&self) -> UserPreferences {
        self.preferences.lock().clone()
    }

    /// Apply preference changes. The in-memory value updates first; the
    /// backend write (when authenticated) may still fail and is reported
    /// to the caller, matching the shipped apps' optimistic ordering.
    pub async fn update_preferences(&self, prefs: UserPreferences) -> Result<(), ApiError> {
        *self.preferences.lock() = prefs.clone();
        if self.session.is_authenticated() {
            self.api.update_preferences(&prefs).await
        } else {
            if let Err(e) = self.local.write(KEY_GUEST_PREFERENCES, &prefs) {
                log::warn!("Failed to persist preferences: {e}");
            }
            Ok(())
        }
    }

    /// Re-read persons and preferences for the current mode.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        self.persons.refresh().await?;
        if self.session.is_authenticated() {
            match self.api.get_preferences().await {
                Ok(prefs) => *self.preferences.lock() = prefs,
                // Preferences endpoint missing or down: keep what we have.
                Err(e) => log::warn!("Preferences unavailable, keeping current: {e}"),
            }
        } else {
            *self.preferences.lock() = self.local.read(KEY_GUEST_PREFERENCES);
        }
        Ok(())
    }
}
