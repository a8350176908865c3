//! Bearer token acquisition for the LivePaper API
//!
//! LivePaper uses the OAuth 2.0 client-credentials grant: the client id and
//! secret are sent as HTTP Basic credentials to the auth endpoint, which
//! answers with an `access_token`. Tokens are cached by the provider and
//! reused until [`TokenProvider::invalidate`] is called.

use base64::Engine;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::sync::Mutex;

use super::error::{LivePaperError, LivePaperResult};
use crate::config::{AUTH_GRANT_TYPE, AUTH_SCOPE};
use crate::{log_debug, log_info};

/// Source of bearer tokens, shared by every resource call of a client
pub trait TokenProvider: Send + Sync {
    /// Return the cached token, acquiring one on first use
    fn access_token(&self, http: &Client) -> LivePaperResult<String>;

    /// Forget the cached token; the next call acquires a fresh one
    fn invalidate(&self);
}

/// Authentication response from the LivePaper auth endpoint
#[derive(Debug, Deserialize)]
struct AuthResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
}

/// Client id + secret exchanged for a token at `auth_url`
pub struct ClientCredentials {
    auth_url: String,
    basic_auth: String,
    token: Mutex<Option<String>>,
}

impl ClientCredentials {
    pub fn new(auth_url: impl Into<String>, client_id: &str, client_secret: &str) -> Self {
        let basic_auth = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", client_id, client_secret));

        Self {
            auth_url: auth_url.into(),
            basic_auth,
            token: Mutex::new(None),
        }
    }

    /// Check if a token is currently cached
    pub fn is_authenticated(&self) -> bool {
        self.token.lock().map(|token| token.is_some()).unwrap_or(false)
    }

    fn request_access_token(&self, http: &Client) -> LivePaperResult<String> {
        log_debug!("Requesting LivePaper access token from {}", self.auth_url);

        let form_data = [("grant_type", AUTH_GRANT_TYPE), ("scope", AUTH_SCOPE)];

        let response = http
            .post(&self.auth_url)
            .header(reqwest::header::AUTHORIZATION, format!("Basic {}", self.basic_auth))
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&form_data)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().unwrap_or_default();
            return Err(LivePaperError::Authentication(format!(
                "token request returned {}: {}",
                status, error_text
            )));
        }

        let auth: AuthResponse = response
            .json()
            .map_err(|e| LivePaperError::Authentication(format!("unreadable token response: {}", e)))?;

        log_info!(
            "Obtained LivePaper access token (type={}, expires_in={:?}, scope={})",
            auth.token_type.as_deref().unwrap_or("Bearer"),
            auth.expires_in,
            auth.scope.as_deref().unwrap_or("-")
        );

        Ok(auth.access_token)
    }
}

impl TokenProvider for ClientCredentials {
    fn access_token(&self, http: &Client) -> LivePaperResult<String> {
        // The lock is held across the request so concurrent first use
        // results in a single acquisition.
        let mut cached = self
            .token
            .lock()
            .map_err(|_| LivePaperError::Authentication("token cache poisoned".to_string()))?;

        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        let token = self.request_access_token(http)?;
        *cached = Some(token.clone());
        Ok(token)
    }

    fn invalidate(&self) {
        if let Ok(mut cached) = self.token.lock() {
            *cached = None;
        }
    }
}

/// A pre-issued token used as-is
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenProvider for StaticToken {
    fn access_token(&self, _http: &Client) -> LivePaperResult<String> {
        Ok(self.0.clone())
    }

    fn invalidate(&self) {}
}
