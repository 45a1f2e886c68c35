//! Write transactions.
//!
//! A [`Transaction`] moves through three states:
//!
//! ```text
//! Unopened --create--> Open --commit/abort--> Closed
//! ```
//!
//! `Closed` is terminal. Upserts are split into batches of [`BATCH_SIZE`]
//! vectors and sent one after another; the server-side transaction is
//! opened lazily before the first batch.

use std::sync::Arc;

use tracing::{debug, info};

use super::{
    error::{Error, Operation, Result},
    http::{self, HttpClient},
    types::{CreateTransactionResponse, IndexTypeBody, UpsertBody, Vector, INDEX_TYPE_DENSE},
};

/// Maximum number of vectors sent in one upsert request.
pub const BATCH_SIZE: usize = 200;

/// Lifecycle state of a [`Transaction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionState {
    /// No server transaction exists yet.
    Unopened,
    /// The server issued this transaction id.
    Open(String),
    /// Committed or aborted.
    Closed,
}

/// A batched write transaction on one collection.
///
/// State-changing methods take `&mut self`; a transaction is meant for one
/// caller at a time. Independent transactions on the same collection may
/// run concurrently, coordination is left to the server.
///
/// # Example
///
/// ```rust,ignore
/// let mut txn = index.transaction();
/// txn.upsert(&vectors).await?;
/// txn.commit().await?;
/// ```
pub struct Transaction {
    http: Arc<HttpClient>,
    collection: String,
    state: TransactionState,
}

impl Transaction {
    pub(crate) fn new(http: Arc<HttpClient>, collection: String) -> Self {
        Self {
            http,
            collection,
            state: TransactionState::Unopened,
        }
    }

    /// Returns the collection this transaction writes to.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Returns the current state.
    pub fn state(&self) -> &TransactionState {
        &self.state
    }

    /// Returns the server transaction id while open.
    pub fn id(&self) -> Option<&str> {
        match &self.state {
            TransactionState::Open(id) => Some(id.as_str()),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, TransactionState::Open(_))
    }

    pub fn is_closed(&self) -> bool {
        self.state == TransactionState::Closed
    }

    /// Opens the server transaction.
    ///
    /// Fails with [`Error::IllegalState`] unless the transaction is
    /// unopened; no request is sent in that case. On an API failure the
    /// transaction stays unopened.
    pub async fn create(&mut self) -> Result<()> {
        match self.state {
            TransactionState::Unopened => {}
            TransactionState::Open(_) => {
                return Err(Error::IllegalState("transaction already open".into()));
            }
            TransactionState::Closed => {
                return Err(Error::IllegalState("transaction already closed".into()));
            }
        }

        let path = http::collection_path(&self.collection, "/transactions");
        let resp: CreateTransactionResponse = self
            .http
            .post(Operation::CreateTransaction, &path, &IndexTypeBody::DENSE, http::CREATED)
            .await?;

        let id = resp.transaction_id.to_string();
        info!(collection = %self.collection, transaction_id = %id, "cosdata: transaction opened");
        self.state = TransactionState::Open(id);
        Ok(())
    }

    /// Opens the server transaction if it is not open yet and returns its id.
    pub async fn ensure_transaction(&mut self) -> Result<&str> {
        if self.state == TransactionState::Unopened {
            self.create().await?;
        }
        match &self.state {
            TransactionState::Open(id) => Ok(id.as_str()),
            _ => Err(Error::IllegalState("transaction already closed".into())),
        }
    }

    /// Upserts vectors in batches of at most [`BATCH_SIZE`], in input order.
    ///
    /// Every vector is validated before anything is sent, so invalid
    /// metadata fails with [`Error::InvalidVector`] and no request.
    /// Stops at the first failing batch. Batches sent before the failure
    /// are not undone and the transaction stays open; the caller decides
    /// whether to abort. An empty slice sends nothing.
    pub async fn upsert(&mut self, vectors: &[Vector]) -> Result<()> {
        if self.is_closed() {
            return Err(Error::IllegalState("transaction already closed".into()));
        }
        for vector in vectors {
            vector.validate()?;
        }

        for (n, batch) in vectors.chunks(BATCH_SIZE).enumerate() {
            let id = self.ensure_transaction().await?.to_string();
            let path = http::collection_path(
                &self.collection,
                &format!("/transactions/{}/upsert", urlencoding::encode(&id)),
            );
            debug!(collection = %self.collection, batch = n, size = batch.len(), "cosdata: upsert batch");

            let body = UpsertBody {
                index_type: INDEX_TYPE_DENSE,
                vectors: batch,
            };
            self.http
                .post_empty(Operation::Upsert, &path, &body, http::NO_CONTENT)
                .await?;
        }
        Ok(())
    }

    /// Commits the transaction.
    ///
    /// On failure the transaction stays open with the same id.
    pub async fn commit(&mut self) -> Result<()> {
        self.finish(Operation::Commit, "commit").await
    }

    /// Aborts the transaction.
    ///
    /// On failure the transaction stays open with the same id.
    pub async fn abort(&mut self) -> Result<()> {
        self.finish(Operation::Abort, "abort").await
    }

    async fn finish(&mut self, op: Operation, action: &str) -> Result<()> {
        let TransactionState::Open(id) = &self.state else {
            return Err(Error::IllegalState("no active transaction".into()));
        };

        let path = http::collection_path(
            &self.collection,
            &format!("/transactions/{}/{}", urlencoding::encode(id), action),
        );
        self.http
            .post_empty(op, &path, &IndexTypeBody::DENSE, http::NO_CONTENT)
            .await?;

        info!(collection = %self.collection, transaction_id = %id, "cosdata: transaction {}", action);
        self.state = TransactionState::Closed;
        Ok(())
    }
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("collection", &self.collection)
            .field("state", &self.state)
            .finish()
    }
}
