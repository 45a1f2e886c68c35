//! Cosdata API client.

use std::{sync::Arc, time::Duration};

use serde_json::Value;
use tracing::info;

use super::{
    auth::Credentials,
    collection::Collection,
    error::{Error, Operation, Result},
    http::{self, HttpClient},
    types::{CollectionInfo, CreateCollectionRequest},
};

/// Default server address.
pub const DEFAULT_HOST: &str = "http://127.0.0.1:8443";

/// Default login user.
pub const DEFAULT_USERNAME: &str = "admin";

/// Environment variables read by [`ClientBuilder::from_env`].
pub const ENV_HOST: &str = "COSDATA_HOST";
pub const ENV_USERNAME: &str = "COSDATA_USERNAME";
pub const ENV_PASSWORD: &str = "COSDATA_PASSWORD";
pub const ENV_VERIFY_SSL: &str = "COSDATA_VERIFY_SSL";

/// Cosdata API client.
///
/// The client owns the login session. Handles obtained from it
/// ([`Collection`], [`crate::Index`], [`crate::Transaction`]) share the
/// same session.
///
/// # Example
///
/// ```rust,ignore
/// use giztoy_cosdata::{Client, DistanceMetric, Vector};
///
/// let client = Client::new("http://127.0.0.1:8443", "admin", "admin")?;
///
/// let collection = client.create_collection("docs", 4, None).await?;
/// let index = collection.index(DistanceMetric::Cosine).await?;
///
/// let vectors = vec![Vector::new(1, vec![0.0, 0.0, 0.0, 1.0])];
/// index.with_transaction(async |txn| txn.upsert(&vectors).await).await?;
///
/// let results = index.query(&[0.0, 0.0, 0.0, 1.0], 1).await?;
/// ```
pub struct Client {
    http: Arc<HttpClient>,
    config: ClientConfig,
}

/// Client configuration.
#[derive(Clone)]
struct ClientConfig {
    host: String,
    verify_ssl: bool,
}

impl Client {
    /// Creates a new client with TLS verification enabled.
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        ClientBuilder::new()
            .host(host)
            .username(username)
            .password(password)
            .build()
    }

    /// Creates a new client builder for more configuration options.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates a client from the `COSDATA_*` environment variables.
    pub fn from_env() -> Result<Self> {
        ClientBuilder::from_env().build()
    }

    /// Returns the configured host.
    pub fn host(&self) -> &str {
        &self.config.host
    }

    /// Returns whether TLS certificates are verified.
    pub fn verify_ssl(&self) -> bool {
        self.config.verify_ssl
    }

    /// Returns a reference to the internal HTTP client.
    pub fn http(&self) -> &Arc<HttpClient> {
        &self.http
    }

    /// Logs in and caches the access token.
    ///
    /// Calling this is optional; every request logs in on first use.
    pub async fn login(&self) -> Result<()> {
        self.http.login().await
    }

    /// Creates a collection with a dense vector space of `dimension`.
    ///
    /// Sparse vectors are disabled and capacity is unconstrained. Returns
    /// as soon as the server accepts the request.
    pub async fn create_collection(
        &self,
        name: &str,
        dimension: usize,
        description: Option<&str>,
    ) -> Result<Collection> {
        let body = CreateCollectionRequest::new(name, dimension, description);
        self.http
            .post_empty(
                Operation::CreateCollection,
                &http::vectordb_path("/collections"),
                &body,
                http::CREATED,
            )
            .await?;

        info!(collection = name, dimension, "cosdata: collection created");
        Ok(Collection::new(
            self.http.clone(),
            name.to_string(),
            dimension,
            description.map(str::to_string),
        ))
    }

    /// Fetches an existing collection.
    ///
    /// The dimension falls back to [`crate::DEFAULT_DIMENSION`] when the
    /// server does not report one.
    pub async fn get_collection(&self, name: &str) -> Result<Collection> {
        let info = self.collection_info(name).await?;

        let name = if info.name.is_empty() {
            name.to_string()
        } else {
            info.name.clone()
        };
        Ok(Collection::new(
            self.http.clone(),
            name,
            info.dimension(),
            info.description,
        ))
    }

    /// Fetches a collection's metadata as reported by the server.
    pub async fn collection_info(&self, name: &str) -> Result<CollectionInfo> {
        let path = http::collection_path(name, "");
        self.http.get(Operation::GetCollection, &path, http::OK).await
    }

    /// Lists collections, returning the server payload as is.
    pub async fn list_collections(&self) -> Result<Value> {
        self.http
            .get(
                Operation::ListCollections,
                &http::vectordb_path("/collections"),
                http::OK,
            )
            .await
    }

    /// Lists collections as handles.
    pub async fn collections(&self) -> Result<Vec<Collection>> {
        let payload = self.list_collections().await?;
        Ok(parse_collection_list(payload)?
            .into_iter()
            .map(|info| {
                let dimension = info.dimension();
                Collection::new(self.http.clone(), info.name, dimension, info.description)
            })
            .collect())
    }

    /// Deletes a collection by name.
    pub async fn delete_collection(&self, name: &str) -> Result<()> {
        let path = http::collection_path(name, "");
        self.http
            .delete(Operation::DeleteCollection, &path, http::NO_CONTENT)
            .await?;
        info!(collection = name, "cosdata: collection deleted");
        Ok(())
    }
}

/// Accepts either a bare array or an object with a `collections` array.
fn parse_collection_list(payload: Value) -> Result<Vec<CollectionInfo>> {
    let list = match payload {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("collections") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(Error::Other(
                    "list collections: missing \"collections\" array".to_string(),
                ));
            }
        },
        other => {
            return Err(Error::Other(format!(
                "list collections: unexpected payload: {}",
                other
            )));
        }
    };

    list.into_iter()
        .map(|item| serde_json::from_value(item).map_err(Error::from))
        .collect()
}

/// Builder for creating a Cosdata API client.
pub struct ClientBuilder {
    host: String,
    username: String,
    password: String,
    verify_ssl: bool,
    timeout: Option<Duration>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    /// Creates a new client builder with the default host and user.
    pub fn new() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            password: String::new(),
            verify_ssl: true,
            timeout: None,
        }
    }

    /// Creates a builder from the `COSDATA_*` environment variables.
    ///
    /// Unset variables keep the defaults. `COSDATA_VERIFY_SSL` accepts
    /// `false`, `0` or `no` to disable certificate checks.
    pub fn from_env() -> Self {
        let mut builder = Self::new();
        if let Ok(host) = std::env::var(ENV_HOST) {
            builder = builder.host(host);
        }
        if let Ok(username) = std::env::var(ENV_USERNAME) {
            builder = builder.username(username);
        }
        if let Ok(password) = std::env::var(ENV_PASSWORD) {
            builder = builder.password(password);
        }
        if let Ok(verify) = std::env::var(ENV_VERIFY_SSL) {
            builder = builder.verify_ssl(parse_bool(&verify));
        }
        builder
    }

    /// Sets the server address, e.g. `https://db.example.com:8443`.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Enables or disables TLS certificate verification.
    pub fn verify_ssl(mut self, verify: bool) -> Self {
        self.verify_ssl = verify;
        self
    }

    /// Sets a transport-wide request timeout. There is none by default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the client.
    pub fn build(self) -> Result<Client> {
        if self.host.is_empty() {
            return Err(Error::Config("host must be non-empty".to_string()));
        }
        if self.username.is_empty() {
            return Err(Error::Config("username must be non-empty".to_string()));
        }

        let http = HttpClient::new(
            self.host.clone(),
            Credentials {
                username: self.username,
                password: self.password,
            },
            self.verify_ssl,
            self.timeout,
        )?;

        Ok(Client {
            config: ClientConfig {
                host: http.host().to_string(),
                verify_ssl: self.verify_ssl,
            },
            http: Arc::new(http),
        })
    }
}

fn parse_bool(s: &str) -> bool {
    !matches!(s.trim().to_lowercase().as_str(), "false" | "0" | "no" | "off")
}
