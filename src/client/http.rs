//! Main LivePaper API client

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::auth::{ClientCredentials, StaticToken, TokenProvider};
use super::error::{LivePaperError, LivePaperResult};
use crate::config::{Config, Credentials, Endpoints, TIMEOUT_SECONDS, USER_AGENT};
use crate::log_debug;

/// Blocking LivePaper API client
///
/// Holds the HTTP connection pool, the endpoint set and the token provider.
/// Resources borrow it for every call; cloning is cheap.
#[derive(Clone)]
pub struct LivePaperClient {
    http: Client,
    endpoints: Endpoints,
    tokens: Arc<dyn TokenProvider>,
}

impl LivePaperClient {
    pub fn new(endpoints: Endpoints, tokens: Arc<dyn TokenProvider>) -> LivePaperResult<Self> {
        Self::with_timeout(endpoints, tokens, Duration::from_secs(TIMEOUT_SECONDS))
    }

    pub fn with_timeout(
        endpoints: Endpoints,
        tokens: Arc<dyn TokenProvider>,
        timeout: Duration,
    ) -> LivePaperResult<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            endpoints,
            tokens,
        })
    }

    /// Create a client from a loaded [`Config`]
    pub fn from_config(config: Config) -> LivePaperResult<Self> {
        let tokens: Arc<dyn TokenProvider> = match &config.credentials {
            Credentials::ClientCredentials {
                client_id,
                client_secret,
            } => Arc::new(ClientCredentials::new(
                config.endpoints.auth_url.clone(),
                client_id,
                client_secret,
            )),
            Credentials::AccessToken(token) => Arc::new(StaticToken::new(token.clone())),
        };

        Self::with_timeout(config.endpoints, tokens, config.timeout)
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Current bearer token, acquiring one if none is cached
    pub fn access_token(&self) -> LivePaperResult<String> {
        self.tokens.access_token(&self.http)
    }

    /// Drop the cached token
    pub fn invalidate_token(&self) {
        self.tokens.invalidate();
    }

    /// GET `url` with bearer auth, failing on non-2xx
    pub fn get(&self, url: &str, accept: &str) -> LivePaperResult<Response> {
        log_debug!("GET {}", url);
        let request = self.http.get(url).header(header::ACCEPT, accept);
        self.send_authorized(request)
    }

    /// POST a JSON body to `url` with bearer auth, failing on non-2xx
    pub fn post_json<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> LivePaperResult<Response> {
        log_debug!("POST {} (json)", url);
        let request = self
            .http
            .post(url)
            .header(header::ACCEPT, "application/json")
            .json(body);
        self.send_authorized(request)
    }

    /// POST raw bytes to `url` with bearer auth, failing on non-2xx
    pub fn post_bytes(&self, url: &str, content_type: &str, bytes: Vec<u8>) -> LivePaperResult<Response> {
        log_debug!("POST {} ({}, {} bytes)", url, content_type, bytes.len());
        let request = self
            .http
            .post(url)
            .header(header::CONTENT_TYPE, content_type)
            .body(bytes);
        self.send_authorized(request)
    }

    fn send_authorized(&self, request: RequestBuilder) -> LivePaperResult<Response> {
        let access_token = self.access_token()?;
        let response = request.bearer_auth(access_token).send()?;
        Self::ensure_success(response)
    }

    /// Ensure the response has a success status code. Returns the response
    /// unchanged on success, or [`LivePaperError::Api`] with the status and
    /// body text on failure.
    pub fn ensure_success(response: Response) -> LivePaperResult<Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(LivePaperError::api_error(status.as_u16(), body));
        }
        Ok(response)
    }
}
