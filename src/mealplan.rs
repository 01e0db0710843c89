//! Weekly meal plan.
//!
//! The plan is a map of day → planned meals for the selected week. Guest
//! plans persist under a week-scoped key; a slot is identified by
//! (day, meal_time) and adding to an occupied slot replaces it, so a day
//! never holds two breakfasts. Authenticated plans round-trip through the
//! backend and are re-fetched after every write, as the shipped apps do.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::session::{AuthMode, Session};
use crate::storage::{meal_plan_key, LocalStore};
use crate::types::{AdminMealPlan, MealPlanItem, PlannedMeal};

type PlanByDay = BTreeMap<String, Vec<MealPlanItem>>;

pub struct MealPlanStore {
    session: Arc<Session>,
    local: LocalStore,
    api: Arc<ApiClient>,
    current_week: RwLock<String>,
    plan: Mutex<PlanByDay>,
}

impl MealPlanStore {
    pub fn new(session: Arc<Session>, local: LocalStore, api: Arc<ApiClient>) -> Self {
        let week = "Week - 1".to_string();
        let plan = if session.is_authenticated() {
            PlanByDay::new()
        } else {
            local.read(&meal_plan_key(&week))
        };
        Self {
            session,
            local,
            api,
            current_week: RwLock::new(week),
            plan: Mutex::new(plan),
        }
    }

    pub fn current_week(&self) -> String {
        self.current_week.read().clone()
    }

    /// Switch weeks and load that week's plan.
    pub async fn set_week(&self, week: &str) -> Result<(), ApiError> {
        *self.current_week.write() = week.to_string();
        self.refresh().await
    }

    /// Re-read the current week's plan from its source of truth.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let week = self.current_week();
        if self.session.is_authenticated() {
            let items = self.api.get_meal_plan(&week).await?;
            let mut by_day = PlanByDay::new();
            for item in items {
                by_day.entry(item.day.clone()).or_default().push(item);
            }
            *self.plan.lock() = by_day;
        } else {
            *self.plan.lock() = self.local.read(&meal_plan_key(&week));
        }
        Ok(())
    }

    /// Plan a meal. The incoming id is ignored; guest slots get a
    /// synthesized `<day>-<meal_time>-<millis>` id.
    pub async fn add(&self, mut item: MealPlanItem) -> Result<(), ApiError> {
        if item.recipe_name.trim().is_empty() {
            return Err(ApiError::Validation("Pick a recipe for the slot".to_string()));
        }
        let week = self.current_week();
        if item.week.is_none() {
            item.week = Some(week.clone());
        }

        match self.session.mode() {
            AuthMode::Authenticated => {
                self.api.add_to_meal_plan(&item).await?;
                self.refresh().await
            }
            AuthMode::Guest => {
                item.id = format!(
                    "{}-{}-{}",
                    item.day,
                    item.meal_time,
                    Utc::now().timestamp_millis()
                );
                let mut plan = self.plan.lock();
                upsert_slot(&mut plan, item);
                self.persist(&week, &plan);
                Ok(())
            }
            AuthMode::Anonymous => Err(ApiError::Validation(
                "Sign in or continue as a guest to plan meals".to_string(),
            )),
        }
    }

    /// Remove a planned meal by id, wherever it sits in the week.
    pub async fn remove(&self, id: &str) -> Result<(), ApiError> {
        if self.session.is_authenticated() {
            self.api.remove_from_meal_plan(id).await?;
            return self.refresh().await;
        }
        let week = self.current_week();
        let mut plan = self.plan.lock();
        for meals in plan.values_mut() {
            meals.retain(|m| m.id != id);
        }
        plan.retain(|_, meals| !meals.is_empty());
        self.persist(&week, &plan);
        Ok(())
    }

    pub fn meals_for_day(&self, day: &str) -> Vec<MealPlanItem> {
        self.plan.lock().get(day).cloned().unwrap_or_default()
    }

    /// The whole week, day → meals.
    pub fn plan(&self) -> PlanByDay {
        self.plan.lock().clone()
    }

    // -- admin templates ----------------------------------------------------

    /// Curated templates from the admin dashboard, falling back to the
    /// built-in set when the backend is unreachable.
    pub async fn admin_templates(&self) -> Vec<AdminMealPlan> {
        match self.api.get_admin_templates().await {
            Ok(templates) if !templates.is_empty() => templates,
            Ok(_) => builtin_templates(),
            Err(e) => {
                log::warn!("Failed to fetch admin templates, using built-ins: {e}");
                builtin_templates()
            }
        }
    }

    /// Fill the current week from a template, one upsert per slot.
    /// Returns the number of slots applied.
    pub async fn apply_template(&self, template: &AdminMealPlan) -> Result<usize, ApiError> {
        let mut applied = 0;
        for (day, meals) in &template.meals {
            for (meal_time, planned) in meals {
                let item = MealPlanItem {
                    recipe_name: planned.recipe_name.clone(),
                    day: day.clone(),
                    meal_time: meal_time.clone(),
                    servings: planned.servings,
                    image: planned.image.clone(),
                    ..Default::default()
                };
                self.add(item).await?;
                applied += 1;
            }
        }
        Ok(applied)
    }

    fn persist(&self, week: &str, plan: &PlanByDay) {
        if let Err(e) = self.local.write(&meal_plan_key(week), plan) {
            log::warn!("Failed to persist meal plan for '{week}': {e}");
        }
    }
}

/// Replace the item occupying (day, meal_time), or append if the slot is
/// free. Exactly one item per slot.
fn upsert_slot(plan: &mut PlanByDay, item: MealPlanItem) {
    let meals = plan.entry(item.day.clone()).or_default();
    match meals.iter_mut().find(|m| m.meal_time == item.meal_time) {
        Some(slot) => *slot = item,
        None => meals.push(item),
    }
}

/// The two fallback templates bundled with the apps.
pub fn builtin_templates() -> Vec<AdminMealPlan> {
    fn slot(name: &str, image: &str) -> PlannedMeal {
        PlannedMeal {
            recipe_name: name.to_string(),
            servings: Some(1),
            image: Some(image.to_string()),
        }
    }
    fn day(meals: [(&str, PlannedMeal); 3]) -> BTreeMap<String, PlannedMeal> {
        meals
            .into_iter()
            .map(|(time, meal)| (time.to_string(), meal))
            .collect()
    }

    vec![
        AdminMealPlan {
            id: "template_admin_mediterranean".to_string(),
            name: "7-Day Mediterranean Plan".to_string(),
            description: "Healthy Mediterranean diet with fresh ingredients".to_string(),
            week_start: "2024-01-01".to_string(),
            meals: BTreeMap::from([
                (
                    "Monday".to_string(),
                    day([
                        ("Breakfast", slot("Greek Yogurt with Berries", "🥣")),
                        ("Lunch", slot("Mediterranean Salad", "🥗")),
                        ("Dinner", slot("Grilled Fish with Vegetables", "🐟")),
                    ]),
                ),
                (
                    "Tuesday".to_string(),
                    day([
                        ("Breakfast", slot("Avocado Toast", "🥑")),
                        ("Lunch", slot("Hummus Bowl", "🍲")),
                        ("Dinner", slot("Chicken Souvlaki", "🍗")),
                    ]),
                ),
            ]),
            created_by: "Admin".to_string(),
            is_admin_template: true,
            created_at: "2024-01-01T00:00:00Z".to_string(),
        },
        AdminMealPlan {
            id: "template_admin_keto".to_string(),
            name: "Keto Weekly Plan".to_string(),
            description: "Low-carb ketogenic meal plan for weight management".to_string(),
            week_start: "2024-01-01".to_string(),
            meals: BTreeMap::from([
                (
                    "Monday".to_string(),
                    day([
                        ("Breakfast", slot("Keto Scrambled Eggs", "🍳")),
                        ("Lunch", slot("Avocado Chicken Salad", "🥗")),
                        ("Dinner", slot("Grilled Salmon with Asparagus", "🐟")),
                    ]),
                ),
                (
                    "Tuesday".to_string(),
                    day([
                        ("Breakfast", slot("Bacon and Eggs", "🥓")),
                        ("Lunch", slot("Keto Caesar Salad", "🥗")),
                        ("Dinner", slot("Beef Steak with Butter", "🥩")),
                    ]),
                ),
            ]),
            created_by: "Admin".to_string(),
            is_admin_template: true,
            created_at: "2024-01-01T00:00:00Z".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::KEY_GUEST_MODE;

    fn guest_store() -> (tempfile::TempDir, MealPlanStore) {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::open_at(dir.path().to_path_buf()).unwrap();
        local.write(KEY_GUEST_MODE, &true).unwrap();
        let session = Arc::new(Session::restore(local.clone()));
        let api = Arc::new(ApiClient::new("http://127.0.0.1:1", local.clone()));
        let store = MealPlanStore::new(session, local, api);
        (dir, store)
    }

    fn meal(day: &str, meal_time: &str, name: &str) -> MealPlanItem {
        MealPlanItem {
            recipe_name: name.to_string(),
            day: day.to_string(),
            meal_time: meal_time.to_string(),
            servings: Some(2),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn occupied_slot_is_replaced() {
        let (_dir, store) = guest_store();
        store.add(meal("Monday", "Dinner", "Tomato Soup")).await.unwrap();
        store.add(meal("Monday", "Dinner", "Paneer Curry")).await.unwrap();

        let monday = store.meals_for_day("Monday");
        assert_eq!(monday.len(), 1);
        assert_eq!(monday[0].recipe_name, "Paneer Curry");
    }

    #[tokio::test]
    async fn different_slots_coexist() {
        let (_dir, store) = guest_store();
        store.add(meal("Monday", "Breakfast", "Toast")).await.unwrap();
        store.add(meal("Monday", "Dinner", "Soup")).await.unwrap();
        store.add(meal("Tuesday", "Dinner", "Dal")).await.unwrap();

        assert_eq!(store.meals_for_day("Monday").len(), 2);
        assert_eq!(store.meals_for_day("Tuesday").len(), 1);
    }

    #[tokio::test]
    async fn guest_plan_survives_reload() {
        let (dir, store) = guest_store();
        store.add(meal("Monday", "Dinner", "Soup")).await.unwrap();
        let before = store.plan();

        let local = LocalStore::open_at(dir.path().to_path_buf()).unwrap();
        let session = Arc::new(Session::restore(local.clone()));
        let api = Arc::new(ApiClient::new("http://127.0.0.1:1", local.clone()));
        let reloaded = MealPlanStore::new(session, local, api);
        assert_eq!(reloaded.plan(), before);
    }

    #[tokio::test]
    async fn remove_clears_the_slot() {
        let (_dir, store) = guest_store();
        store.add(meal("Monday", "Dinner", "Soup")).await.unwrap();
        let id = store.meals_for_day("Monday")[0].id.clone();
        assert!(!id.is_empty());

        store.remove(&id).await.unwrap();
        assert!(store.meals_for_day("Monday").is_empty());
    }

    #[tokio::test]
    async fn weeks_are_isolated() {
        let (_dir, store) = guest_store();
        store.add(meal("Monday", "Dinner", "Soup")).await.unwrap();

        store.set_week("Week - 2").await.unwrap();
        assert!(store.meals_for_day("Monday").is_empty());

        store.add(meal("Monday", "Dinner", "Dal")).await.unwrap();
        store.set_week("Week - 1").await.unwrap();
        assert_eq!(store.meals_for_day("Monday")[0].recipe_name, "Soup");
    }

    #[tokio::test]
    async fn blank_recipe_name_fails_validation() {
        let (_dir, store) = guest_store();
        let err = store.add(meal("Monday", "Dinner", " ")).await.unwrap_err();
        assert!(err.is_validation());
        assert!(store.meals_for_day("Monday").is_empty());
    }

    #[tokio::test]
    async fn template_fills_every_slot_once() {
        let (_dir, store) = guest_store();
        let templates = builtin_templates();
        let applied = store.apply_template(&templates[0]).await.unwrap();
        assert_eq!(applied, 6);
        assert_eq!(store.meals_for_day("Monday").len(), 3);
        assert_eq!(store.meals_for_day("Tuesday").len(), 3);

        // Re-applying upserts into the same slots, never duplicates.
        store.apply_template(&templates[1]).await.unwrap();
        assert_eq!(store.meals_for_day("Monday").len(), 3);
    }
}
