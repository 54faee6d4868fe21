//! Session manager - login/logout and startup session restoration
//!
//! Owns the process-wide session state. The state lives in an explicitly
//! shared `SessionHandle` rather than a global: the manager drives the
//! transitions, the `ApiClient` only ever calls `expire()` when a
//! renewal fails, and the UI collaborator observes via `subscribe()`.

use super::http_client::ApiClient;
use super::storage::TokenStore;
use super::types::{
    AuthError, Credentials, LOGIN_FAILURE_FALLBACK, SessionEvent, SessionState, UserProfile,
};
use crate::config::ClientConfig;
use log::{info, warn};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Shared session state plus the event channel the UI subscribes to
pub struct SessionHandle {
    state: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionHandle {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Mutex::new(SessionState::Initializing),
            events,
        }
    }

    /// Snapshot of the current session state
    pub fn state(&self) -> SessionState {
        self.state.lock().unwrap().clone()
    }

    /// Current user profile, if authenticated
    pub fn current_user(&self) -> Option<UserProfile> {
        match self.state() {
            SessionState::Authenticated(profile) => Some(profile),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state(), SessionState::Authenticated(_))
    }

    /// Subscribe to session lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine; the UI may not be listening yet
        let _ = self.events.send(event);
    }

    pub(crate) fn set_authenticated(&self, profile: UserProfile) {
        let username = profile.username.clone();
        {
            let mut state = self.state.lock().unwrap();
            *state = SessionState::Authenticated(profile);
        }
        self.emit(SessionEvent::SignedIn { username });
    }

    pub(crate) fn set_anonymous(&self) {
        let was_authenticated = {
            let mut state = self.state.lock().unwrap();
            let was = matches!(*state, SessionState::Authenticated(_));
            *state = SessionState::Anonymous;
            was
        };
        if was_authenticated {
            self.emit(SessionEvent::SignedOut);
        }
    }

    /// Terminal teardown after an unrecoverable renewal failure
    ///
    /// Emits `SessionExpired` so the UI can return to the login surface;
    /// the session layer itself never navigates.
    pub(crate) fn expire(&self) {
        let was_anonymous = {
            let mut state = self.state.lock().unwrap();
            let was = matches!(*state, SessionState::Anonymous);
            *state = SessionState::Anonymous;
            was
        };
        if !was_anonymous {
            self.emit(SessionEvent::SessionExpired);
        }
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Session manager
pub struct SessionManager {
    session: Arc<SessionHandle>,
    tokens: Arc<TokenStore>,
    client: Arc<ApiClient>,
}

impl SessionManager {
    /// Create a new SessionManager
    pub fn new(config: &ClientConfig) -> Result<Self, AuthError> {
        info!("Initializing SessionManager (api: {})", config.base_url);

        let tokens = Arc::new(match &config.data_dir {
            Some(dir) => TokenStore::with_dir(dir)?,
            None => TokenStore::new()?,
        });
        let session = Arc::new(SessionHandle::new());
        let client = Arc::new(ApiClient::new(config, tokens.clone(), session.clone()));

        Ok(Self {
            session,
            tokens,
            client,
        })
    }

    /// The shared HTTP client, for the chat gateway and other consumers
    pub fn client(&self) -> Arc<ApiClient> {
        self.client.clone()
    }

    /// The shared session handle
    pub fn session(&self) -> Arc<SessionHandle> {
        self.session.clone()
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.session.current_user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Subscribe to session lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.session.subscribe()
    }

    /// Restore the session from stored credentials at startup
    ///
    /// Resolves `Initializing` exactly once. With no stored credentials
    /// the session goes straight to `Anonymous` without any network call.
    /// A profile fetch failure (including a failed renewal underneath)
    /// clears the stored pair and falls back to `Anonymous` silently.
    pub async fn bootstrap(&self) -> SessionState {
        if !matches!(self.session.state(), SessionState::Initializing) {
            warn!("bootstrap() called after initialization, ignoring");
            return self.session.state();
        }

        if self.tokens.get().is_none() {
            info!("No stored credentials, starting anonymous");
            self.session.set_anonymous();
            return self.session.state();
        }

        info!("Found stored credentials, restoring session");
        match self.client.fetch_profile().await {
            Ok(profile) => {
                info!("Session restored for {}", profile.username);
                self.session.set_authenticated(profile);
            }
            Err(e) => {
                // Fail closed to anonymous; the user just sees the login
                // surface instead of an error on first load.
                warn!("Session restore failed: {}", e);
                if let Err(clear_err) = self.tokens.clear() {
                    warn!("Failed to clear stale credentials: {}", clear_err);
                }
                self.session.set_anonymous();
            }
        }

        self.session.state()
    }

    /// Log in with username and password
    ///
    /// On success the returned pair is persisted and the profile fetched;
    /// if the profile fetch fails the pair is discarded again, so a
    /// half-authenticated session (tokens without a user) cannot occur.
    /// On failure the session state is left unchanged.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserProfile, AuthError> {
        info!("Logging in user: {}", username);

        let pair = self.client.login(username, password).await?;

        if let Err(e) = self.tokens.set(&Credentials {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }) {
            let _ = self.tokens.clear();
            return Err(e);
        }

        match self.client.fetch_profile().await {
            Ok(profile) => {
                info!("Login successful for {}", profile.username);
                self.session.set_authenticated(profile.clone());
                Ok(profile)
            }
            Err(e) => {
                warn!("Profile fetch failed after login, discarding session: {}", e);
                if let Err(clear_err) = self.tokens.clear() {
                    warn!("Failed to clear credentials: {}", clear_err);
                }
                Err(e)
            }
        }
    }

    /// Log out: clear stored credentials and reset to anonymous
    ///
    /// Synchronous and idempotent; performs no network call.
    pub fn logout(&self) {
        info!("Logging out");
        if let Err(e) = self.tokens.clear() {
            warn!("Failed to clear stored credentials: {}", e);
        }
        self.session.set_anonymous();
    }
}

/// Human-readable login failure reason for the login surface
///
/// Backend-provided reasons pass through; anything else (transport
/// failures, parse errors) collapses to the generic localized message.
pub fn login_failure_message(error: &AuthError) -> String {
    match error {
        AuthError::InvalidCredentials(reason) => reason.clone(),
        _ => LOGIN_FAILURE_FALLBACK.to_string(),
    }
}
