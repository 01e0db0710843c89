//! Auth state holder.
//!
//! One `Session` exists for the lifetime of the app: created at startup
//! from whatever the local store remembers, mutated by login/logout, torn
//! down never. Every domain store consults it to pick the persistence
//! path (backend vs. local storage).

use parking_lot::RwLock;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::storage::{LocalStore, KEY_AUTH_TOKEN, KEY_GUEST_MODE};
use crate::types::User;

/// Which persistence path is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// No session and no guest opt-in yet (first launch, or after logout).
    /// Reads behave like guest reads; writes are rejected.
    Anonymous,
    /// Everything persists to local storage on this device only.
    Guest,
    /// Everything persists through the backend with a bearer token.
    Authenticated,
}

pub struct Session {
    local: LocalStore,
    mode: RwLock<AuthMode>,
    user: RwLock<Option<User>>,
}

impl Session {
    /// Restore session state from the local store. The guest flag wins over
    /// a leftover token: an explicit "continue as guest" is the stronger
    /// signal, and a stale token will be cleared on the next verify.
    pub fn restore(local: LocalStore) -> Self {
        let mode = if local.read::<bool>(KEY_GUEST_MODE) {
            AuthMode::Guest
        } else if local.read::<Option<String>>(KEY_AUTH_TOKEN).is_some() {
            AuthMode::Authenticated
        } else {
            AuthMode::Anonymous
        };
        Self {
            local,
            mode: RwLock::new(mode),
            user: RwLock::new(None),
        }
    }

    pub fn mode(&self) -> AuthMode {
        *self.mode.read()
    }

    pub fn is_authenticated(&self) -> bool {
        self.mode() == AuthMode::Authenticated
    }

    pub fn is_guest(&self) -> bool {
        self.mode() == AuthMode::Guest
    }

    pub fn user(&self) -> Option<User> {
        self.user.read().clone()
    }

    /// The stored bearer token, if any.
    pub fn token(&self) -> Option<String> {
        self.local.read(KEY_AUTH_TOKEN)
    }

    /// Exchange credentials for a token. Empty fields fail validation
    /// before any request is issued.
    pub async fn login(
        &self,
        api: &ApiClient,
        email: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        check_credentials(email, password)?;
        let resp = api.login(email, password).await?;
        self.store_session(resp.token, resp.user.clone());
        Ok(resp.user)
    }

    /// Create an account and sign in. Same validation gate as `login`.
    pub async fn register(
        &self,
        api: &ApiClient,
        email: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        check_credentials(email, password)?;
        let resp = api.register(email, password).await?;
        self.store_session(resp.token, resp.user.clone());
        Ok(resp.user)
    }

    /// Check the stored token against the backend.
    ///
    /// A rejected token forces a logout and clears local session state. A
    /// network failure keeps the session as-is so the app stays usable
    /// offline; the caller decides whether to surface it.
    pub async fn verify(&self, api: &ApiClient) -> Result<User, ApiError> {
        match api.verify().await {
            Ok(user) => {
                *self.user.write() = Some(user.clone());
                *self.mode.write() = AuthMode::Authenticated;
                Ok(user)
            }
            Err(e) if e.is_network() => {
                log::warn!("Cannot verify token while offline, keeping session: {e}");
                Err(e)
            }
            Err(e) => {
                log::warn!("Token verification failed, forcing logout: {e}");
                self.logout();
                Err(e)
            }
        }
    }

    /// Opt into device-only persistence.
    pub fn continue_as_guest(&self) {
        if let Err(e) = self.local.write(KEY_GUEST_MODE, &true) {
            log::warn!("Failed to persist guest flag: {e}");
        }
        *self.user.write() = None;
        *self.mode.write() = AuthMode::Guest;
    }

    /// Clear the token, the guest flag, and the in-memory user.
    pub fn logout(&self) {
        self.local.remove(KEY_AUTH_TOKEN);
        self.local.remove(KEY_GUEST_MODE);
        *self.user.write() = None;
        *self.mode.write() = AuthMode::Anonymous;
    }

    fn store_session(&self, token: String, user: User) {
        if let Err(e) = self.local.write(KEY_AUTH_TOKEN, &token) {
            log::warn!("Failed to persist auth token: {e}");
        }
        self.local.remove(KEY_GUEST_MODE);
        *self.user.write() = Some(user);
        *self.mode.write() = AuthMode::Authenticated;
    }
}

fn check_credentials(email: &str, password: &str) -> Result<(), ApiError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ApiError::Validation(
            "Email and password are required".to_string(),
        ));
    }
    Ok(())
}
