//! Discover feed.
//!
//! The browse screen shows one list assembled from several provenances:
//! backend discover picks (authenticated), the guest's cached feed,
//! recipes the user created, and the bundled samples and quick meal
//! suggestions. Provenance order decides duplicates, and dismissed
//! entries are tombstoned out of every rebuild.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::reconcile::merge_by_id;
use crate::session::Session;
use crate::storage::{LocalStore, KEY_DELETED_SUGGESTIONS, KEY_DISCOVER_CACHE};
use crate::tombstone::TombstoneSet;
use crate::types::Recipe;

pub struct DiscoverFeed {
    session: Arc<Session>,
    local: LocalStore,
    api: Arc<ApiClient>,
    tombstones: TombstoneSet,
    remote_items: Mutex<Vec<Recipe>>,
}

impl DiscoverFeed {
    pub fn new(session: Arc<Session>, local: LocalStore, api: Arc<ApiClient>) -> Self {
        let tombstones = TombstoneSet::open(local.clone(), KEY_DELETED_SUGGESTIONS);
        let remote_items = if session.is_authenticated() {
            Vec::new()
        } else {
            local.read(KEY_DISCOVER_CACHE)
        };
        Self {
            session,
            local,
            api,
            tombstones,
            remote_items: Mutex::new(remote_items),
        }
    }

    /// Refresh the server-side slice of the feed.
    ///
    /// Authenticated: fetch the personalized discover list. Guest: append
    /// whatever admin-published recipes are reachable into the cached
    /// feed; an unreachable backend is normal for guests and not an error.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        if self.session.is_authenticated() {
            let items = self.api.get_discover_recipes().await?;
            *self.remote_items.lock() = items;
            return Ok(());
        }

        let cached: Vec<Recipe> = self.local.read(KEY_DISCOVER_CACHE);
        let merged = match self.api.get_admin_recipes().await {
            Ok(admin) if !admin.is_empty() => {
                let merged = merge_by_id([cached, admin]);
                if let Err(e) = self.local.write(KEY_DISCOVER_CACHE, &merged) {
                    log::warn!("Failed to cache discover feed: {e}");
                }
                merged
            }
            Ok(_) => cached,
            Err(e) => {
                log::debug!("Admin recipes unavailable for guest feed: {e}");
                cached
            }
        };
        *self.remote_items.lock() = merged;
        Ok(())
    }

    /// The assembled feed. `user_created` comes from
    /// [`crate::recipes::RecipeStore::list`]; passing it in keeps the two
    /// stores independent.
    pub fn all(&self, user_created: &[Recipe]) -> Vec<Recipe> {
        let merged = merge_by_id([
            self.remote_items.lock().clone(),
            user_created.to_vec(),
            sample_recipes(),
            meal_suggestions(),
        ]);
        self.tombstones.filter(merged)
    }

    /// Hide an entry from the feed until restored.
    pub fn dismiss(&self, id: &str) {
        self.tombstones.mark_deleted(id);
    }

    pub fn restore(&self, id: &str) {
        self.tombstones.restore(id);
    }

    pub fn reset_dismissed(&self) {
        self.tombstones.clear_all();
    }
}

/// Sample recipes bundled with the apps so the feed is never empty.
pub fn sample_recipes() -> Vec<Recipe> {
    fn sample(id: &str, title: &str, cook_time: u32, servings: u32, image: &str) -> Recipe {
        Recipe {
            id: id.to_string(),
            title: title.to_string(),
            cook_time: Some(cook_time),
            servings: Some(servings),
            image: Some(image.to_string()),
            ..Default::default()
        }
    }
    vec![
        sample("3", "Grilled Chicken Salad", 25, 2, "🥗"),
        sample("6", "Spaghetti Carbonara", 30, 4, "🍝"),
        sample("1", "Avocado Toast", 10, 1, "🥑"),
        sample("2", "Greek Yogurt Bowl", 3, 1, "🥣"),
        sample("5", "Salmon with Vegetables", 30, 2, "🐟"),
        sample("4", "Quinoa Buddha Bowl", 25, 2, "🍲"),
    ]
}

/// Quick one-line meal ideas, grouped by meal time in the UI.
pub fn meal_suggestions() -> Vec<Recipe> {
    const SUGGESTIONS: [(&str, &[&str]); 4] = [
        ("Breakfast", &["Tea", "Coffee", "Sandwich", "Milk", "Toast", "Cereal"]),
        ("Lunch", &["Briyani", "Rice", "Onion raita", "Curry", "Salad", "Soup"]),
        ("Dinner", &["Chapati", "Dal kuruma", "Vegetable curry", "Rice", "Roti"]),
        ("Snack", &["Biscuits", "Fruits", "Nuts", "Juice", "Chips"]),
    ];

    SUGGESTIONS
        .iter()
        .flat_map(|(meal_time, names)| {
            names.iter().map(move |name| (*meal_time, *name))
        })
        .enumerate()
        .map(|(index, (meal_time, name))| Recipe {
            id: format!("meal-{index}"),
            title: name.to_string(),
            cook_time: Some(15),
            servings: Some(1),
            image: Some("🍽️".to_string()),
            tags: vec![meal_time.to_string()],
            ..Default::default()
        })
        .collect()
}
