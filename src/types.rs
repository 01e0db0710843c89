//! Shared domain records.
//!
//! Field names match the backend's JSON (snake_case), so no serde renames
//! are needed except where a field name is a Rust keyword.

use serde::{Deserialize, Serialize};

/// Anything stored in a domain collection: one unique identifier per item.
pub trait Record: Clone {
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

/// A recipe, user-created or server-provided.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    /// Emoji or URL, depending on provenance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Record for Recipe {
    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// One slot of a weekly meal plan. Guest-mode slots are keyed by
/// (day, meal_time): adding to an occupied slot replaces the prior item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealPlanItem {
    #[serde(default)]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<String>,
    pub recipe_name: String,
    pub day: String,
    pub meal_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week: Option<String>,
}

impl Record for MealPlanItem {
    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// A household member the plan is cooked for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allergies: Option<String>,
}

impl Record for Person {
    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// How the meal plan screen renders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    List,
    Calendar,
}

/// Per-user view preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub selected_week: String,
    pub view_mode: ViewMode,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            selected_week: "Week - 1".to_string(),
            view_mode: ViewMode::List,
        }
    }
}

/// A recipe review. Ratings are whole stars, 1–5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub recipe_id: String,
    pub rating: u8,
    pub comment: String,
    pub author: String,
    pub date: String,
}

impl Record for Review {
    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Marker recording that a recipe was opened, for "recent" views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessRecord {
    pub recipe_id: String,
    pub accessed_at: String,
}

impl Record for AccessRecord {
    fn id(&self) -> &str {
        &self.recipe_id
    }
    fn set_id(&mut self, id: String) {
        self.recipe_id = id;
    }
}

/// Category of a support notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Announcement,
    Maintenance,
    Update,
}

/// Announcement shown on the notifications screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportNotification {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
    pub date: String,
    #[serde(default)]
    pub read: bool,
}

impl Record for SupportNotification {
    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Opt-in/out toggles for outbound email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailSettings {
    pub newsletter: bool,
    pub support_notifications: bool,
    pub recipe_updates: bool,
    pub meal_reminders: bool,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            newsletter: true,
            support_notifications: true,
            recipe_updates: false,
            meal_reminders: true,
        }
    }
}

/// The signed-in account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// One planned meal inside an admin template slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannedMeal {
    pub recipe_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A curated weekly plan published from the admin dashboard.
/// `meals` maps day → meal time → planned meal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminMealPlan {
    pub id: String,
    pub name: String,
    pub description: String,
    pub week_start: String,
    pub meals: std::collections::BTreeMap<String, std::collections::BTreeMap<String, PlannedMeal>>,
    pub created_by: String,
    #[serde(default)]
    pub is_admin_template: bool,
    pub created_at: String,
}

/// Usage counters for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub active_users: u64,
    #[serde(default)]
    pub total_recipes: u64,
    #[serde(default)]
    pub total_meal_plans: u64,
}

/// A purchasable subscription tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    pub id: String,
    pub name: String,
    pub price: f64,
    /// Billing interval, e.g. "month" or "year".
    pub interval: String,
    #[serde(default)]
    pub features: Vec<String>,
}
