//! HTTP client for the HR assistant API
//!
//! Every authenticated request goes through one pipeline: the stored
//! access token is attached as a bearer credential before dispatch, and
//! a 401 response triggers exactly one renewal attempt followed by one
//! redispatch. Renewal is single-flight: concurrent requests that all
//! observe an expired token share one refresh call.

use super::manager::SessionHandle;
use super::storage::TokenStore;
use super::types::{
    AuthError, Credentials, HealthStatus, LOGIN_FAILURE_FALLBACK, TokenResponse, UserProfile,
};
use crate::config::ClientConfig;
use log::{debug, error, info, warn};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;

const USER_AGENT: &str = concat!("HRChat-Desktop/", env!("CARGO_PKG_VERSION"));

/// HTTP client for all backend calls
pub struct ApiClient {
    client: Client,
    base_url: String,
    tokens: Arc<TokenStore>,
    session: Arc<SessionHandle>,
    /// Single-flight gate: only one renewal call runs at a time; requests
    /// that queue behind it reuse the rotated pair instead of renewing again.
    renewal_gate: tokio::sync::Mutex<()>,
}

impl ApiClient {
    /// Create a new ApiClient
    pub fn new(config: &ClientConfig, tokens: Arc<TokenStore>, session: Arc<SessionHandle>) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens,
            session,
            renewal_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Exchange username/password for a token pair
    ///
    /// Bypasses the interceptor pipeline: no bearer header, no renewal.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, AuthError> {
        let url = format!("{}/api/auth/login", self.base_url);

        debug!("Logging in user: {}", username);

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await
            .map_err(|e| AuthError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Login failed: {} - {}", status, body);

            // The backend reports the reason in a structured `detail` field
            let reason = extract_error_detail(&body)
                .unwrap_or_else(|| LOGIN_FAILURE_FALLBACK.to_string());
            return Err(AuthError::InvalidCredentials(reason));
        }

        let data: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::ApiError(format!("Failed to parse login response: {}", e)))?;

        info!("Credential exchange successful for {}", username);
        Ok(data)
    }

    /// Exchange a refresh token for a new credential pair
    ///
    /// Bypasses the interceptor pipeline so a rejected refresh can never
    /// trigger recursive renewal.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AuthError> {
        let url = format!("{}/api/auth/refresh", self.base_url);

        debug!("Renewing credential pair");

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "refresh_token": refresh_token,
            }))
            .send()
            .await
            .map_err(|e| AuthError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Refresh failed: {} - {}", status, body);
            return Err(AuthError::ApiError(format!(
                "Refresh failed: {} - {}",
                status, body
            )));
        }

        let data: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::ApiError(format!("Failed to parse refresh response: {}", e)))?;

        info!("Credential renewal successful");
        Ok(data)
    }

    /// Fetch the current user's profile (authenticated)
    pub async fn fetch_profile(&self) -> Result<UserProfile, AuthError> {
        debug!("Fetching user profile");
        let profile: UserProfile = self.get_authed("/api/profile").await?;
        info!(
            "Fetched profile for {} ({}/{})",
            profile.username, profile.employee_type, profile.title
        );
        Ok(profile)
    }

    /// Backend health probe (unauthenticated)
    pub async fn health(&self) -> Result<HealthStatus, AuthError> {
        let url = format!("{}/health", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AuthError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::ApiError(format!(
                "Health check failed: {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::ApiError(format!("Failed to parse health response: {}", e)))
    }

    /// Authenticated GET through the intercepted pipeline
    pub async fn get_authed<T: DeserializeOwned>(&self, path: &str) -> Result<T, AuthError> {
        self.dispatch_authed(Method::GET, path, None).await
    }

    /// Authenticated POST through the intercepted pipeline
    pub async fn post_authed<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, AuthError> {
        self.dispatch_authed(Method::POST, path, Some(body)).await
    }

    /// The intercepted pipeline
    ///
    /// The retry bookkeeping is an explicit local flag, never a mark on a
    /// shared request descriptor: the first 401 renews and redispatches
    /// once, a second 401 propagates as a plain API error.
    async fn dispatch_authed<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, AuthError> {
        let url = format!("{}{}", self.base_url, path);
        let mut renewal_attempted = false;

        loop {
            let credentials = self.tokens.get();

            let mut request = self.client.request(method.clone(), &url);
            if let Some(c) = &credentials {
                request = request.bearer_auth(&c.access_token);
            }
            if let Some(b) = body {
                request = request.json(b);
            }

            let response = request
                .send()
                .await
                .map_err(|e| AuthError::NetworkError(e.to_string()))?;
            let status = response.status();

            if status == StatusCode::UNAUTHORIZED && !renewal_attempted {
                renewal_attempted = true;
                debug!("{} {} rejected as unauthorized, attempting renewal", method, path);
                let stale_access = credentials.map(|c| c.access_token);
                self.renew_credentials(stale_access.as_deref()).await?;
                continue;
            }

            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                error!("{} {} failed: {} - {}", method, path, status, text);
                let detail = extract_error_detail(&text).unwrap_or(text);
                return Err(AuthError::ApiError(format!("{} - {}", status, detail)));
            }

            return response
                .json::<T>()
                .await
                .map_err(|e| AuthError::ApiError(format!("Failed to parse response: {}", e)));
        }
    }

    /// Renew the stored credential pair after an authorization failure
    ///
    /// `stale_access` is the access token the failed request carried (if
    /// any). Holding the gate, a concurrent renewal that already rotated
    /// the pair is detected by comparing it against the store, and the
    /// refresh call is skipped.
    ///
    /// Exactly one attempt: any refresh failure tears the session down
    /// and surfaces `SessionExpired`.
    async fn renew_credentials(&self, stale_access: Option<&str>) -> Result<(), AuthError> {
        let _gate = self.renewal_gate.lock().await;

        let current = match self.tokens.get() {
            Some(c) => c,
            None => {
                warn!("Unauthorized with no refresh token available, tearing session down");
                self.teardown_session();
                return Err(AuthError::SessionExpired);
            }
        };

        match stale_access {
            Some(stale) if stale != current.access_token => {
                debug!("Credentials already renewed by a concurrent request");
                return Ok(());
            }
            // Request was dispatched unauthenticated but credentials exist
            // now (e.g. a login completed meanwhile); retry with those.
            None => return Ok(()),
            _ => {}
        }

        match self.refresh(&current.refresh_token).await {
            Ok(pair) => {
                self.tokens.set(&Credentials {
                    access_token: pair.access_token,
                    refresh_token: pair.refresh_token,
                })?;
                Ok(())
            }
            Err(e) => {
                warn!("Credential renewal failed, tearing session down: {}", e);
                self.teardown_session();
                Err(AuthError::SessionExpired)
            }
        }
    }

    /// Clear stored credentials and reset the session to anonymous
    fn teardown_session(&self) {
        if let Err(e) = self.tokens.clear() {
            warn!("Failed to clear credentials during teardown: {}", e);
        }
        self.session.expire();
    }
}

/// Extract the `detail` message from a structured backend error body
pub(crate) fn extract_error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")?
        .as_str()
        .map(|s| s.to_string())
        .filter(|s| !s.is_empty())
}
