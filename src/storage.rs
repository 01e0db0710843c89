//! JSON-backed local storage for guest-mode persistence.
//!
//! The shipped apps keep guest data in browser local storage: one
//! namespaced key per domain collection, written whole on every change.
//! This module renders the same contract as one JSON file per key under
//! `~/.freshplate`. Reads are guarded (a missing file or corrupt JSON
//! yields the default value, never an error) and writes serialize the
//! entire value. There is no cross-process locking; concurrent writers
//! last-write-win, as they do in the browser.

use std::fs;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Bearer token obtained at login/register (string).
pub const KEY_AUTH_TOKEN: &str = "auth_token";
/// Flag set by "continue as guest" (bool).
pub const KEY_GUEST_MODE: &str = "guest_mode";
/// Guest-created recipes.
pub const KEY_GUEST_RECIPES: &str = "guest_recipes";
/// Saved/bookmarked recipes.
pub const KEY_SAVED_RECIPES: &str = "saved_recipes";
/// Persons and their dietary notes.
pub const KEY_GUEST_PEOPLE: &str = "guest_people";
/// View preferences (selected week, view mode).
pub const KEY_GUEST_PREFERENCES: &str = "guest_preferences";
/// Recently-accessed recipe markers.
pub const KEY_GUEST_ACCESSED: &str = "guest_accessed";
/// Tombstones for dismissed suggestion items.
pub const KEY_DELETED_SUGGESTIONS: &str = "deleted_suggestions";
/// Tombstones for dismissed recent items.
pub const KEY_DELETED_RECENT_ITEMS: &str = "deleted_recent_items";
/// Cached discover feed for guests.
pub const KEY_DISCOVER_CACHE: &str = "discover_cache";

/// Storage key for a week's guest meal plan, e.g. "Week - 1" → `guest_meal_plan_week1`.
pub fn meal_plan_key(week: &str) -> String {
    let slug: String = week
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    format!("guest_meal_plan_{slug}")
}

/// Errors specific to the write path. Reads are infallible by contract.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Failed to create storage directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Failed to serialize key '{key}': {source}")]
    Serialize {
        key: String,
        source: serde_json::Error,
    },

    #[error("Failed to write key '{key}': {source}")]
    Write {
        key: String,
        source: std::io::Error,
    },
}

/// Handle to the on-disk key/value store. Cheap to clone; every domain
/// store holds one.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Open the store at the canonical location (`~/.freshplate`).
    pub fn open() -> Result<Self, StorageError> {
        let home = dirs::home_dir().ok_or(StorageError::HomeDirNotFound)?;
        Self::open_at(home.join(".freshplate"))
    }

    /// Open a store rooted at an explicit directory. Useful for testing.
    pub fn open_at(root: PathBuf) -> Result<Self, StorageError> {
        if !root.exists() {
            fs::create_dir_all(&root).map_err(StorageError::CreateDir)?;
        }
        Ok(Self { root })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    /// Whether a value has ever been written under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.key_path(key).exists()
    }

    /// Read the value stored under `key`. A missing file or unparseable
    /// content yields `T::default()`.
    pub fn read<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let path = self.key_path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => return T::default(),
        };
        match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Discarding corrupt value for key '{key}': {e}");
                T::default()
            }
        }
    }

    /// Serialize `value` and replace whatever is stored under `key`.
    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(value).map_err(|source| {
            StorageError::Serialize {
                key: key.to_string(),
                source,
            }
        })?;
        fs::write(self.key_path(key), content).map_err(|source| StorageError::Write {
            key: key.to_string(),
            source,
        })
    }

    /// Remove the value stored under `key`, if any.
    pub fn remove(&self, key: &str) {
        let _ = fs::remove_file(self.key_path(key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, LocalStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open_at(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    #[test]
    fn round_trips_a_collection() {
        let (_dir, store) = temp_store();
        let items = vec!["carrot".to_string(), "leek".to_string()];
        store.write(KEY_GUEST_RECIPES, &items).unwrap();
        let loaded: Vec<String> = store.read(KEY_GUEST_RECIPES);
        assert_eq!(loaded, items);
    }

    #[test]
    fn missing_key_reads_as_default() {
        let (_dir, store) = temp_store();
        let loaded: Vec<String> = store.read("never_written");
        assert!(loaded.is_empty());
        assert!(!store.contains("never_written"));
    }

    #[test]
    fn corrupt_json_reads_as_default() {
        let (dir, store) = temp_store();
        fs::write(dir.path().join("guest_recipes.json"), "{not json").unwrap();
        let loaded: Vec<String> = store.read(KEY_GUEST_RECIPES);
        assert!(loaded.is_empty());
    }

    #[test]
    fn remove_clears_the_key() {
        let (_dir, store) = temp_store();
        store.write(KEY_GUEST_MODE, &true).unwrap();
        assert!(store.contains(KEY_GUEST_MODE));
        store.remove(KEY_GUEST_MODE);
        assert!(!store.contains(KEY_GUEST_MODE));
        assert!(!store.read::<bool>(KEY_GUEST_MODE));
    }

    #[test]
    fn meal_plan_keys_are_week_scoped() {
        assert_eq!(meal_plan_key("Week - 1"), "guest_meal_plan_week1");
        assert_ne!(meal_plan_key("Week - 1"), meal_plan_key("Week - 2"));
    }
}
