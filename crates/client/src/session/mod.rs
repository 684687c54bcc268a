//! Session and account state.
//!
//! Holds the logged-in [`User`], mirrors it to the store under
//! [`keys::USER`], and performs the account operations against the backend.
//!
//! ```text
//!             login / register
//! Anonymous ───────────────────▶ Authenticated ──┐
//!     ▲                               │          │ edit_profile
//!     └───────────── logout ──────────┘ ◀────────┘
//! ```
//!
//! Sessions never expire client-side; the backend decides when a session
//! ends. The backend's session cookie is stored under
//! [`keys::SESSION_COOKIE`] after login and register, and handed back to the
//! API client on the next start. Every committed change is published to
//! [`SessionManager::subscribe`] receivers.

mod error;

pub use error::SessionError;

use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiClient, LoginRequest, RegisterRequest};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::{ProfileUpdate, User, UserSession};
use crate::storage::{PersistentStore, StorageError, StoreExt, keys};

/// Hand a stored backend session cookie to `api`.
///
/// Returns `true` if a cookie was found.
///
/// # Errors
///
/// Returns `StorageError` if the stored cookie cannot be read or decoded.
pub fn resume_backend_session(
    store: &dyn PersistentStore,
    api: &dyn ApiClient,
) -> Result<bool, StorageError> {
    let Some(cookie) = store.load_json::<String>(keys::SESSION_COOKIE)? else {
        return Ok(false);
    };
    api.resume_session(&cookie);
    Ok(true)
}

/// Owns the session and keeps the stored copy in step.
pub struct SessionManager {
    store: Arc<dyn PersistentStore>,
    api: Arc<dyn ApiClient>,
    session: UserSession,
    changes: watch::Sender<Option<User>>,
}

impl SessionManager {
    /// Create a manager, rehydrating the user and the backend session
    /// cookie from the store.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the stored session cannot be read
    /// or decoded.
    pub fn new(
        store: Arc<dyn PersistentStore>,
        api: Arc<dyn ApiClient>,
    ) -> Result<Self, SessionError> {
        let session = store
            .load_json::<UserSession>(keys::USER)?
            .unwrap_or_default();
        let resumed = resume_backend_session(store.as_ref(), api.as_ref())?;
        debug!(
            authenticated = session.is_authenticated(),
            resumed,
            "rehydrated session"
        );

        let (changes, _) = watch::channel(session.user.clone());
        Ok(Self {
            store,
            api,
            session,
            changes,
        })
    }

    /// The logged-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.session.user.as_ref()
    }

    /// Returns `true` if a user is logged in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Watch the session: the receiver sees the user after every committed
    /// login, register, edit, and logout.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.changes.subscribe()
    }

    /// Log in and adopt the returned user record.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Rejected` for bad credentials,
    /// `SessionError::Api` for other request failures, and
    /// `SessionError::Storage` if the session cannot be saved.
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, username: &str, password: SecretString) -> Result<(), SessionError> {
        let request = LoginRequest {
            username: username.to_string(),
            password,
        };

        let user = self.api.login(&request).await.map_err(|e| {
            warn!(error = %e, "login failed");
            SessionError::from(e)
        })?;

        info!(username = %user.username, "logged in");
        set_sentry_user(&user.username, Some(&user.email));
        self.save_backend_session()?;
        self.commit(Some(user))
    }

    /// Create an account and adopt the returned user record.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Rejected` if the backend refuses the account
    /// (typically a taken username), `SessionError::Api` for other request
    /// failures, and `SessionError::Storage` if the session cannot be saved.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&mut self, request: RegisterRequest) -> Result<(), SessionError> {
        let user = self.api.register(&request).await.map_err(|e| {
            warn!(error = %e, "registration failed");
            SessionError::from(e)
        })?;

        info!(username = %user.username, "registered");
        set_sentry_user(&user.username, Some(&user.email));
        self.save_backend_session()?;
        self.commit(Some(user))
    }

    /// End the session on the backend, then forget the user and wipe the
    /// whole store (the stored cart included).
    ///
    /// If the backend call or the store wipe fails nothing changes in
    /// memory: the user stays logged in and the error is returned.
    ///
    /// Managers holding their own in-memory state (such as a
    /// [`crate::CartManager`]) keep it until they are reset or restored.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Api`/`SessionError::Rejected` if the backend
    /// call fails and `SessionError::Storage` if the store cannot be cleared.
    #[instrument(skip(self))]
    pub async fn logout(&mut self) -> Result<(), SessionError> {
        if let Err(e) = self.api.logout().await {
            warn!(error = %e, "logout failed, keeping local session");
            return Err(e.into());
        }

        self.store.clear()?;
        self.session.user = None;
        self.changes.send_replace(None);
        clear_sentry_user();
        info!("logged out");
        Ok(())
    }

    /// Send a profile edit and merge it into the user record.
    ///
    /// Fields are trimmed and blank ones dropped; only what remains is sent.
    /// A phone number is validated and normalized first, so a bad one fails
    /// without any request. An edit with no remaining fields is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhoneNumber` for a malformed phone
    /// number, `SessionError::NotAuthenticated` when nobody is logged in,
    /// `SessionError::Rejected`/`SessionError::Api` if the request fails, and
    /// `SessionError::Storage` if the session cannot be saved.
    #[instrument(skip(self, update))]
    pub async fn edit_profile(&mut self, update: ProfileUpdate) -> Result<(), SessionError> {
        let patch = update.into_patch()?;

        let Some(current) = self.session.user.clone() else {
            return Err(SessionError::NotAuthenticated);
        };

        if patch.is_empty() {
            debug!("empty profile edit, nothing to send");
            return Ok(());
        }

        self.api.edit_profile(&patch).await.map_err(|e| {
            warn!(error = %e, "profile edit failed");
            SessionError::from(e)
        })?;

        let mut user = current;
        user.apply_patch(&patch);
        debug!(username = %user.username, "profile updated");
        self.commit(Some(user))
    }

    /// Write the current session to the store.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the write fails.
    pub fn save_session_state(&self) -> Result<(), SessionError> {
        self.store.save_json(keys::USER, &self.session)?;
        Ok(())
    }

    fn save_backend_session(&self) -> Result<(), StorageError> {
        match self.api.session_cookie() {
            Some(cookie) => self.store.save_json(keys::SESSION_COOKIE, &cookie),
            None => self.store.remove(keys::SESSION_COOKIE),
        }
    }

    fn commit(&mut self, user: Option<User>) -> Result<(), SessionError> {
        self.session.user = user;
        let saved = self.save_session_state();
        self.changes.send_replace(self.session.user.clone());
        saved
    }
}
