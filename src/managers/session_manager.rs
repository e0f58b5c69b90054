use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{ConsoleError, Result};
use crate::models::User;
use crate::state::SharedStore;

/// Name of the session key inside the store namespace
pub const SESSION_KEY: &str = "session";

/// Where the UI should send someone whose account was deactivated
pub const LOGIN_INACTIVE_ROUTE: &str = "#/login?error=inactive";
pub const LOGIN_ROUTE: &str = "#/login";

/// Who is logged in
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Anonymous,
    /// A cached copy of the user record, may be stale until refreshed
    Authenticated(User),
}

impl AuthState {
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::Anonymous => None,
            AuthState::Authenticated(user) => Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }
}

/// Result of a login attempt, shaped for display
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub success: bool,
    pub error: Option<String>,
}

impl From<&Result<User>> for LoginResult {
    fn from(result: &Result<User>) -> Self {
        match result {
            Ok(_) => LoginResult {
                success: true,
                error: None,
            },
            Err(e) => LoginResult {
                success: false,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Outcome of re-checking the logged in account against the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspensionCheck {
    /// Nobody is logged in
    NotAuthenticated,
    Active,
    /// The account is blocked, the session was ended
    Suspended,
    /// The account no longer exists, the session was ended
    Removed,
}

impl SuspensionCheck {
    /// Route to redirect to when the check ended the session
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            SuspensionCheck::Suspended => Some(LOGIN_INACTIVE_ROUTE),
            SuspensionCheck::Removed => Some(LOGIN_ROUTE),
            SuspensionCheck::NotAuthenticated | SuspensionCheck::Active => None,
        }
    }
}

/// Authentication state, mirrored to the persisted session key
pub struct SessionManager {
    store: SharedStore,
    state: RwLock<AuthState>,
}

impl SessionManager {
    /// Restore the persisted session if there is a readable one
    pub fn new(store: SharedStore) -> Self {
        let state = match load_session(&store) {
            Ok(Some(user)) => {
                debug!("Restored session for {}", user.id);
                AuthState::Authenticated(user)
            }
            Ok(None) => AuthState::Anonymous,
            Err(e) => {
                warn!("Could not restore session: {}, starting logged out", e);
                AuthState::Anonymous
            }
        };

        Self {
            store,
            state: RwLock::new(state),
        }
    }

    pub fn auth_state(&self) -> AuthState {
        self.state.read().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.read().user().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_authenticated()
    }

    /// Log in with exact, case-sensitive email and password
    pub fn login(&self, email: &str, password: &str) -> Result<User> {
        let users = self.store.users()?;
        let Some(user) = users.into_iter().find(|u| u.matches_credentials(email, password)) else {
            warn!("Failed login for {}", email);
            return Err(ConsoleError::InvalidCredentials);
        };

        if user.is_blocked {
            warn!("Refused login for inactive account {}", user.id);
            return Err(ConsoleError::AccountInactive);
        }

        save_session(&self.store, &user)?;
        *self.state.write() = AuthState::Authenticated(user.clone());

        info!("User {} logged in as {}", user.id, user.role);
        Ok(user)
    }

    /// [`login`](Self::login) reduced to a success flag and message
    pub fn attempt_login(&self, email: &str, password: &str) -> LoginResult {
        LoginResult::from(&self.login(email, password))
    }

    /// End the session. The in-memory state is always cleared, even if the
    /// persisted key cannot be removed.
    pub fn logout(&self) -> Result<()> {
        let mut state = self.state.write();
        let previous = std::mem::replace(&mut *state, AuthState::Anonymous);
        if let Some(user) = previous.user() {
            info!("User {} logged out", user.id);
        }

        let key = self.store.namespaced_key(SESSION_KEY);
        self.store.storage().remove(&key)
    }

    /// Replace the cached user with the stored record.
    ///
    /// Returns the fresh record, or `None` when logged out or when the record
    /// is gone (the stale copy is kept). The state stays locked against
    /// writers until the fresh copy is in place, so a concurrent logout
    /// cannot be undone.
    pub fn refresh_user(&self) -> Result<Option<User>> {
        let state = self.state.upgradable_read();
        let Some(cached_id) = state.user().map(|u| u.id.clone()) else {
            return Ok(None);
        };

        let Some(fresh) = self.store.find_user(&cached_id)? else {
            debug!("User {} not found on refresh, keeping cached copy", cached_id);
            return Ok(None);
        };

        save_session(&self.store, &fresh)?;
        *RwLockUpgradableReadGuard::upgrade(state) = AuthState::Authenticated(fresh.clone());
        debug!("Refreshed session for {}", cached_id);
        Ok(Some(fresh))
    }

    /// Log out if the account was blocked or deleted since login
    pub fn check_suspension(&self) -> Result<SuspensionCheck> {
        let Some(cached_id) = self.cached_id() else {
            return Ok(SuspensionCheck::NotAuthenticated);
        };

        let outcome = match self.store.find_user(&cached_id)? {
            Some(user) if user.is_blocked => SuspensionCheck::Suspended,
            Some(_) => SuspensionCheck::Active,
            None => SuspensionCheck::Removed,
        };

        if outcome != SuspensionCheck::Active {
            warn!("Ending session for {}: {:?}", cached_id, outcome);
            self.logout()?;
        }

        Ok(outcome)
    }

    fn cached_id(&self) -> Option<String> {
        self.state.read().user().map(|u| u.id.clone())
    }
}

fn load_session(store: &SharedStore) -> Result<Option<User>> {
    let key = store.namespaced_key(SESSION_KEY);
    match store.storage().get(&key)? {
        Some(content) if !content.is_empty() => serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| ConsoleError::CorruptData { key, source: e }),
        _ => Ok(None),
    }
}

fn save_session(store: &SharedStore, user: &User) -> Result<()> {
    let key = store.namespaced_key(SESSION_KEY);
    let content = serde_json::to_string(user)?;
    store.storage().set(&key, &content)
}

/// Shared session manager type
pub type SharedSessionManager = Arc<SessionManager>;

pub fn create_shared_session_manager(store: SharedStore) -> SharedSessionManager {
    Arc::new(SessionManager::new(store))
}
