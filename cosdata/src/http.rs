//! HTTP client implementation for the Cosdata API.

use std::time::Duration;

use bytes::Bytes;
use reqwest::{Client as ReqwestClient, Method};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use super::{
    auth::{Credentials, Session},
    error::{Error, Operation, Result},
};

/// Path prefix of all database endpoints.
pub const VECTORDB_PATH: &str = "/vectordb";

/// Accepted status codes for reads.
pub const OK: &[u16] = &[200];
/// Accepted status codes for creations.
pub const CREATED: &[u16] = &[200, 201];
/// Accepted status codes for mutations that may return no content.
pub const NO_CONTENT: &[u16] = &[200, 204];

/// HTTP client for the Cosdata API.
///
/// Owns the transport and the login [`Session`]. Every request logs in
/// first if no token is cached, then checks the response status against
/// the codes the calling operation accepts.
pub struct HttpClient {
    client: ReqwestClient,
    host: String,
    session: Session,
}

impl HttpClient {
    /// Creates a new HTTP client.
    ///
    /// With `verify_ssl` disabled, invalid and self-signed certificates
    /// are accepted.
    pub fn new(
        host: String,
        credentials: Credentials,
        verify_ssl: bool,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = ReqwestClient::builder().danger_accept_invalid_certs(!verify_ssl);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            host: host.trim_end_matches('/').to_string(),
            session: Session::new(credentials),
        })
    }

    /// Returns the server host, without trailing slash.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the login session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Logs in, replacing any cached token.
    pub async fn login(&self) -> Result<()> {
        self.session.login(&self.client, &self.host).await
    }

    /// Logs in unless a token is already cached.
    pub async fn ensure_authenticated(&self) -> Result<()> {
        self.session.ensure_authenticated(&self.client, &self.host).await
    }

    /// Sends a GET and decodes the JSON response.
    pub async fn get<R>(&self, op: Operation, path: &str, accept: &[u16]) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let body = self.send::<()>(Method::GET, op, path, None, accept).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Sends a JSON POST and decodes the JSON response.
    pub async fn post<T, R>(&self, op: Operation, path: &str, body: &T, accept: &[u16]) -> Result<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = self.send(Method::POST, op, path, Some(body), accept).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Sends a JSON POST and discards the response body.
    pub async fn post_empty<T>(&self, op: Operation, path: &str, body: &T, accept: &[u16]) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.send(Method::POST, op, path, Some(body), accept).await?;
        Ok(())
    }

    /// Sends a DELETE and discards the response body.
    pub async fn delete(&self, op: Operation, path: &str, accept: &[u16]) -> Result<()> {
        self.send::<()>(Method::DELETE, op, path, None, accept).await?;
        Ok(())
    }

    /// Performs a single authenticated request.
    ///
    /// `path` is relative to the host. Returns the raw body if the status
    /// is one of `accept`, otherwise an [`Error::Api`] for `op` carrying
    /// the body.
    async fn send<T>(
        &self,
        method: Method,
        op: Operation,
        path: &str,
        body: Option<&T>,
        accept: &[u16],
    ) -> Result<Bytes>
    where
        T: Serialize + ?Sized,
    {
        self.ensure_authenticated().await?;

        let url = format!("{}{}", self.host, path);
        debug!(%method, %url, operation = %op, "cosdata: request");

        let mut request = self
            .client
            .request(method, &url)
            .headers(self.session.headers()?);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        debug!(status, operation = %op, "cosdata: response");

        check_status(op, status, body, accept)
    }
}

/// Builds a database endpoint path, e.g. `/vectordb/collections`.
pub(crate) fn vectordb_path(suffix: &str) -> String {
    format!("{}{}", VECTORDB_PATH, suffix)
}

/// Builds a path under one collection, e.g. `/vectordb/collections/docs/transactions`.
///
/// The name is percent-encoded as a single path segment.
pub(crate) fn collection_path(collection: &str, suffix: &str) -> String {
    format!(
        "{}/collections/{}{}",
        VECTORDB_PATH,
        urlencoding::encode(collection),
        suffix
    )
}

fn check_status(op: Operation, status: u16, body: Bytes, accept: &[u16]) -> Result<Bytes> {
    if accept.contains(&status) {
        return Ok(body);
    }
    Err(Error::api(op, status, String::from_utf8_lossy(&body)))
}
