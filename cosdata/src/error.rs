//! Error types for the Cosdata API client.

use std::fmt;

use thiserror::Error;

/// Result type alias for Cosdata operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The API call an [`Error::Api`] originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Login,
    CreateCollection,
    GetCollection,
    ListCollections,
    DeleteCollection,
    CreateIndex,
    CreateTransaction,
    Upsert,
    Commit,
    Abort,
    Query,
    Fetch,
}

impl Operation {
    /// Returns the operation name used in error messages and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Login => "login",
            Operation::CreateCollection => "create collection",
            Operation::GetCollection => "get collection",
            Operation::ListCollections => "list collections",
            Operation::DeleteCollection => "delete collection",
            Operation::CreateIndex => "create index",
            Operation::CreateTransaction => "create transaction",
            Operation::Upsert => "upsert",
            Operation::Commit => "commit",
            Operation::Abort => "abort",
            Operation::Query => "query",
            Operation::Fetch => "fetch vector",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for Cosdata API operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The server answered with a status the operation does not accept.
    #[error("cosdata: {operation} failed (http_status={http_status}): {body}")]
    Api {
        operation: Operation,
        http_status: u16,
        body: String,
    },

    /// A transaction method was called outside its valid state.
    #[error("cosdata: illegal transaction state: {0}")]
    IllegalState(String),

    /// A vector cannot be sent as given.
    #[error("cosdata: invalid vector: {0}")]
    InvalidVector(String),

    /// A transaction callback or commit failed and the cleanup abort failed as well.
    #[error("cosdata: {source} (abort after failure also failed: {abort})")]
    RollbackFailed {
        source: Box<Error>,
        abort: Box<Error>,
    },

    /// HTTP request error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Creates a new API error.
    pub fn api(operation: Operation, http_status: u16, body: impl Into<String>) -> Self {
        Error::Api {
            operation,
            http_status,
            body: body.into(),
        }
    }

    /// Returns the originating operation of an API error.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Error::Api { operation, .. } => Some(*operation),
            Error::RollbackFailed { source, .. } => source.operation(),
            _ => None,
        }
    }

    /// Returns the HTTP status of an API error.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Error::Api { http_status, .. } => Some(*http_status),
            _ => None,
        }
    }

    /// Returns the raw response body of an API error.
    pub fn body(&self) -> Option<&str> {
        match self {
            Error::Api { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Returns true if this is an authentication error.
    pub fn is_auth(&self) -> bool {
        match self {
            Error::Api {
                operation,
                http_status,
                ..
            } => *operation == Operation::Login || *http_status == 401,
            _ => false,
        }
    }

    /// Returns true if the server reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api { http_status: 404, .. })
    }

    /// Returns true if a transaction was used outside its valid state.
    pub fn is_illegal_state(&self) -> bool {
        matches!(self, Error::IllegalState(_))
    }
}
