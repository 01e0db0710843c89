//! Deleted-item suppression.
//!
//! Suggestion and recent-item lists are rebuilt from static samples and
//! server refreshes, so removing an entry from the in-memory list is not
//! enough, because it would reappear on the next rebuild. A tombstone set
//! persists the dismissed ids and filters every rebuild until the user
//! restores the item.

use std::collections::HashSet;

use parking_lot::Mutex;

use crate::storage::LocalStore;
use crate::types::Record;

pub struct TombstoneSet {
    local: LocalStore,
    key: String,
    ids: Mutex<Vec<String>>,
}

impl TombstoneSet {
    /// Open the set persisted under `key`, loading any ids written by a
    /// previous run.
    pub fn open(local: LocalStore, key: impl Into<String>) -> Self {
        let key = key.into();
        let ids = local.read(&key);
        Self {
            local,
            key,
            ids: Mutex::new(ids),
        }
    }

    /// Record `id` as deleted. Idempotent.
    pub fn mark_deleted(&self, id: &str) {
        let mut ids = self.ids.lock();
        if !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
            self.persist(&ids);
        }
    }

    pub fn is_deleted(&self, id: &str) -> bool {
        self.ids.lock().iter().any(|existing| existing == id)
    }

    /// Drop every tombstoned item from `items`, preserving order.
    pub fn filter<T: Record>(&self, items: Vec<T>) -> Vec<T> {
        let deleted: HashSet<String> = self.ids.lock().iter().cloned().collect();
        items
            .into_iter()
            .filter(|item| !deleted.contains(item.id()))
            .collect()
    }

    /// Remove `id` from the set so the item may reappear. Idempotent.
    pub fn restore(&self, id: &str) {
        let mut ids = self.ids.lock();
        let before = ids.len();
        ids.retain(|existing| existing != id);
        if ids.len() != before {
            self.persist(&ids);
        }
    }

    /// Forget every tombstone.
    pub fn clear_all(&self) {
        self.ids.lock().clear();
        self.local.remove(&self.key);
    }

    pub fn is_empty(&self) -> bool {
        self.ids.lock().is_empty()
    }

    fn persist(&self, ids: &[String]) {
        if let Err(e) = self.local.write(&self.key, ids) {
            log::warn!("Failed to persist tombstones '{}': {e}", self.key);
        }
    }
}
