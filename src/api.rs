//! REST client for the FreshPlate backend.
//!
//! Thin wrapper over reqwest: JSON in/out, bearer token read from local
//! storage on every request (so login/logout take effect immediately), no
//! retry, no backoff. Non-2xx responses map onto the [`ApiError`]
//! taxonomy; the backend reports failures as `{ "error": "..." }`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::storage::{LocalStore, KEY_AUTH_TOKEN};
use crate::types::{
    AdminMealPlan, AnalyticsSummary, MealPlanItem, Person, Recipe, SubscriptionPlan,
    SupportNotification, User, UserPreferences,
};

/// Default backend location for development builds.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/api";

/// Successful login/register response.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Deserialize)]
struct RecipesEnvelope {
    recipes: Vec<Recipe>,
}

#[derive(Deserialize)]
struct RecipeEnvelope {
    recipe: Recipe,
}

#[derive(Deserialize)]
struct MealPlanEnvelope {
    meal_plan: Vec<MealPlanItem>,
}

#[derive(Deserialize)]
struct PersonsEnvelope {
    persons: Vec<Person>,
}

#[derive(Deserialize)]
struct PersonEnvelope {
    person: Person,
}

#[derive(Deserialize)]
struct PreferencesEnvelope {
    preferences: UserPreferences,
}

#[derive(Deserialize)]
struct TemplatesEnvelope {
    templates: Vec<AdminMealPlan>,
}

#[derive(Deserialize)]
struct PlansEnvelope {
    plans: Vec<SubscriptionPlan>,
}

#[derive(Deserialize)]
struct NotificationsEnvelope {
    notifications: Vec<SupportNotification>,
}

#[derive(Deserialize)]
struct VerifyEnvelope {
    user: User,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    local: LocalStore,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, local: LocalStore) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            local,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the bearer token, if one is stored.
    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.local.read::<Option<String>>(KEY_AUTH_TOKEN) {
            Some(token) => req.header("Authorization", format!("Bearer {token}")),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let resp = self.check(req).await?;
        resp.json().await.map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Send a request, discarding the response body (delete/tracking calls).
    async fn send_unit(&self, req: reqwest::RequestBuilder) -> Result<(), ApiError> {
        self.check(req).await.map(|_| ())
    }

    async fn check(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let resp = self
            .authorize(req)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .unwrap_or_else(|| status.to_string());

        Err(match status.as_u16() {
            401 => ApiError::Auth(message),
            400 => ApiError::Validation(message),
            404 => ApiError::NotFound(message),
            s => ApiError::Server { status: s, message },
        })
    }

    // -- auth ---------------------------------------------------------------

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.send(
            self.http
                .post(self.url("/auth/login"))
                .json(&Credentials { email, password }),
        )
        .await
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.send(
            self.http
                .post(self.url("/auth/register"))
                .json(&Credentials { email, password }),
        )
        .await
    }

    pub async fn verify(&self) -> Result<User, ApiError> {
        let env: VerifyEnvelope = self.send(self.http.get(self.url("/auth/verify"))).await?;
        Ok(env.user)
    }

    // -- recipes ------------------------------------------------------------

    pub async fn get_recipes(&self) -> Result<Vec<Recipe>, ApiError> {
        let env: RecipesEnvelope = self.send(self.http.get(self.url("/recipes"))).await?;
        Ok(env.recipes)
    }

    pub async fn create_recipe(&self, recipe: &Recipe) -> Result<Recipe, ApiError> {
        let env: RecipeEnvelope = self
            .send(self.http.post(self.url("/recipes")).json(recipe))
            .await?;
        Ok(env.recipe)
    }

    pub async fn update_recipe(&self, id: &str, recipe: &Recipe) -> Result<Recipe, ApiError> {
        let env: RecipeEnvelope = self
            .send(
                self.http
                    .put(self.url(&format!("/recipes/{id}")))
                    .json(recipe),
            )
            .await?;
        Ok(env.recipe)
    }

    pub async fn delete_recipe(&self, id: &str) -> Result<(), ApiError> {
        self.send_unit(self.http.delete(self.url(&format!("/recipes/{id}"))))
            .await
    }

    /// Bookmark a server recipe for the current user.
    pub async fn save_recipe(&self, recipe: &Recipe) -> Result<(), ApiError> {
        self.send_unit(
            self.http
                .post(self.url(&format!("/recipes/{}/save", recipe.id)))
                .json(recipe),
        )
        .await
    }

    pub async fn unsave_recipe(&self, id: &str) -> Result<(), ApiError> {
        self.send_unit(self.http.delete(self.url(&format!("/recipes/{id}/save"))))
            .await
    }

    /// Record that a recipe was opened. Callers swallow failures; tracking
    /// is never worth a toast.
    pub async fn track_recipe_access(&self, id: &str) -> Result<(), ApiError> {
        self.send_unit(self.http.post(self.url(&format!("/recipes/{id}/access"))))
            .await
    }

    // -- meal plan ----------------------------------------------------------

    pub async fn get_meal_plan(&self, week: &str) -> Result<Vec<MealPlanItem>, ApiError> {
        let env: MealPlanEnvelope = self
            .send(
                self.http
                    .get(self.url("/meal-plan"))
                    .query(&[("week", week)]),
            )
            .await?;
        Ok(env.meal_plan)
    }

    pub async fn add_to_meal_plan(&self, item: &MealPlanItem) -> Result<(), ApiError> {
        self.send_unit(self.http.post(self.url("/meal-plan")).json(item))
            .await
    }

    pub async fn remove_from_meal_plan(&self, id: &str) -> Result<(), ApiError> {
        self.send_unit(self.http.delete(self.url(&format!("/meal-plan/{id}"))))
            .await
    }

    pub async fn get_admin_templates(&self) -> Result<Vec<AdminMealPlan>, ApiError> {
        let env: TemplatesEnvelope = self
            .send(self.http.get(self.url("/meal-plans/admin-templates")))
            .await?;
        Ok(env.templates)
    }

    // -- persons & preferences ----------------------------------------------

    pub async fn get_persons(&self) -> Result<Vec<Person>, ApiError> {
        let env: PersonsEnvelope = self.send(self.http.get(self.url("/persons"))).await?;
        Ok(env.persons)
    }

    pub async fn add_person(&self, person: &Person) -> Result<Person, ApiError> {
        let env: PersonEnvelope = self
            .send(self.http.post(self.url("/persons")).json(person))
            .await?;
        Ok(env.person)
    }

    pub async fn update_person(&self, id: &str, person: &Person) -> Result<Person, ApiError> {
        let env: PersonEnvelope = self
            .send(
                self.http
                    .put(self.url(&format!("/persons/{id}")))
                    .json(person),
            )
            .await?;
        Ok(env.person)
    }

    pub async fn delete_person(&self, id: &str) -> Result<(), ApiError> {
        self.send_unit(self.http.delete(self.url(&format!("/persons/{id}"))))
            .await
    }

    pub async fn get_preferences(&self) -> Result<UserPreferences, ApiError> {
        let env: PreferencesEnvelope =
            self.send(self.http.get(self.url("/preferences"))).await?;
        Ok(env.preferences)
    }

    pub async fn update_preferences(&self, prefs: &UserPreferences) -> Result<(), ApiError> {
        self.send_unit(self.http.put(self.url("/preferences")).json(prefs))
            .await
    }

    // -- discover -----------------------------------------------------------

    pub async fn get_discover_recipes(&self) -> Result<Vec<Recipe>, ApiError> {
        let env: RecipesEnvelope = self
            .send(self.http.get(self.url("/discover-recipes")))
            .await?;
        Ok(env.recipes)
    }

    /// Curated recipes published from the admin dashboard. Readable without
    /// a session so guests can populate their discover feed.
    pub async fn get_admin_recipes(&self) -> Result<Vec<Recipe>, ApiError> {
        let env: RecipesEnvelope = self.send(self.http.get(self.url("/admin-recipes"))).await?;
        Ok(env.recipes)
    }

    // -- admin & misc -------------------------------------------------------

    pub async fn get_analytics(&self) -> Result<AnalyticsSummary, ApiError> {
        self.send(self.http.get(self.url("/analytics"))).await
    }

    pub async fn get_subscription_plans(&self) -> Result<Vec<SubscriptionPlan>, ApiError> {
        let env: PlansEnvelope = self
            .send(self.http.get(self.url("/subscription-plans")))
            .await?;
        Ok(env.plans)
    }

    pub async fn get_notifications(&self) -> Result<Vec<SupportNotification>, ApiError> {
        let env: NotificationsEnvelope =
            self.send(self.http.get(self.url("/notifications"))).await?;
        Ok(env.notifications)
    }

    pub async fn create_notification(
        &self,
        notification: &SupportNotification,
    ) -> Result<(), ApiError> {
        self.send_unit(self.http.post(self.url("/notifications")).json(notification))
            .await
    }
}
