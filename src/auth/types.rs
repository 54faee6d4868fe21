//! Session and authentication types

use serde::{Deserialize, Serialize};

/// Generic login failure reason shown when the backend does not provide one
pub const LOGIN_FAILURE_FALLBACK: &str = "Échec de la connexion";

/// Opaque bearer credential pair persisted across restarts.
///
/// Both tokens are treated as opaque strings; expiry is discovered
/// reactively when the backend rejects a request, never by inspecting
/// the token contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
}

/// User profile as returned by the backend's directory lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    /// Contract type (CDI, CDD, Intérim, Stagiaire)
    #[serde(default)]
    pub employee_type: String,
    /// Status (Cadre, Non-Cadre)
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub department: String,
}

impl UserProfile {
    /// Name to greet the user with (full name when the directory has one)
    pub fn display_name(&self) -> &str {
        if self.full_name.is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }
}

/// Session state
///
/// Starts in `Initializing` and resolves exactly once at startup via
/// `SessionManager::bootstrap`. After that, only explicit login/logout
/// (or a failed renewal) move it between `Authenticated` and `Anonymous`;
/// there is no path back to `Initializing`.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Startup restore has not resolved yet
    Initializing,
    /// Logged in with a stored credential pair
    Authenticated(UserProfile),
    /// Not logged in
    Anonymous,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Initializing
    }
}

/// Session lifecycle events for the UI collaborator
///
/// The session layer never navigates or renders anything itself; it
/// emits these and lets subscribers react (e.g. return to the login
/// surface on `SessionExpired`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SessionEvent {
    /// A login or startup restore succeeded
    SignedIn { username: String },
    /// An explicit logout completed
    SignedOut,
    /// Credential renewal failed; the session was torn down
    SessionExpired,
}

/// Token pair response from the login and refresh endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Health check response from the backend
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub environment: String,
}

/// Error types for the session layer
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("API error: {0}")]
    ApiError(String),

    /// Credential exchange rejected; carries the display reason
    #[error("{0}")]
    InvalidCredentials(String),

    /// Renewal failed and the session was torn down
    #[error("Session expired, please sign in again")]
    SessionExpired,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_state_default_is_initializing() {
        assert_eq!(SessionState::default(), SessionState::Initializing);
    }

    #[test]
    fn test_display_name_prefers_full_name() {
        let mut profile = UserProfile {
            username: "mdupont".to_string(),
            full_name: "Marie Dupont".to_string(),
            email: "marie.dupont@example.com".to_string(),
            employee_type: "CDI".to_string(),
            title: "Cadre".to_string(),
            department: "Finance".to_string(),
        };
        assert_eq!(profile.display_name(), "Marie Dupont");
        profile.full_name.clear();
        assert_eq!(profile.display_name(), "mdupont");
    }

    #[test]
    fn test_user_profile_deserialize_tolerates_missing_fields() {
        let json = r#"{"username": "mdupont"}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.username, "mdupont");
        assert!(profile.full_name.is_empty());
        assert!(profile.department.is_empty());
    }

    #[test]
    fn test_token_response_defaults_token_type() {
        let json = r#"{"access_token": "A1", "refresh_token": "R1"}"#;
        let resp: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.access_token, "A1");
        assert_eq!(resp.refresh_token, "R1");
        assert_eq!(resp.token_type, "bearer");
    }

    #[test]
    fn test_auth_error_display() {
        assert_eq!(
            AuthError::NetworkError("timeout".to_string()).to_string(),
            "Network error: timeout"
        );
        assert_eq!(
            AuthError::InvalidCredentials("Nom d'utilisateur ou mot de passe incorrect".to_string())
                .to_string(),
            "Nom d'utilisateur ou mot de passe incorrect"
        );
        assert_eq!(
            AuthError::SessionExpired.to_string(),
            "Session expired, please sign in again"
        );
    }

    #[test]
    fn test_session_expired_is_matchable() {
        // The dispatch loop distinguishes teardown from ordinary API errors
        let err = AuthError::SessionExpired;
        assert!(matches!(err, AuthError::SessionExpired));
        let transient = AuthError::NetworkError("timeout".to_string());
        assert!(!matches!(transient, AuthError::SessionExpired));
    }
}
