//! Session authentication.

use parking_lot::RwLock;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::{Error, Operation, Result};

/// Login endpoint, relative to the host.
pub const LOGIN_PATH: &str = "/auth/create-session";

/// Username and password used to open a session.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
}

/// Caches the bearer token of a login session.
///
/// The token is written only by [`Session::login`] and read by every
/// request through [`Session::headers`]. There is no expiry handling; a
/// session lives as long as the client that owns it.
pub struct Session {
    credentials: Credentials,
    token: RwLock<Option<String>>,
}

impl Session {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            token: RwLock::new(None),
        }
    }

    /// Returns the configured username.
    pub fn username(&self) -> &str {
        &self.credentials.username
    }

    /// Returns the cached token, if a login has succeeded.
    pub fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.read().is_some()
    }

    /// Submits the credentials and caches the returned access token.
    pub async fn login(&self, client: &reqwest::Client, host: &str) -> Result<()> {
        let url = format!("{}{}", host, LOGIN_PATH);
        debug!(%url, username = %self.credentials.username, "cosdata: login");

        let response = client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(&self.credentials)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;
        if status != 200 {
            return Err(Error::api(
                Operation::Login,
                status,
                String::from_utf8_lossy(&body),
            ));
        }

        let resp: LoginResponse = serde_json::from_slice(&body)?;
        self.set_token(resp.access_token);
        info!(username = %self.credentials.username, "cosdata: session created");
        Ok(())
    }

    /// Logs in unless a token is already cached.
    pub async fn ensure_authenticated(&self, client: &reqwest::Client, host: &str) -> Result<()> {
        if self.is_authenticated() {
            return Ok(());
        }
        self.login(client, host).await
    }

    /// Builds the headers for an API request.
    pub fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = self.token.read().as_deref() {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| Error::Other(format!("invalid access token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    pub(crate) fn set_token(&self, token: String) {
        *self.token.write() = Some(token);
    }
}
