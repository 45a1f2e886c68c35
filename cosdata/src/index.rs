//! Dense index handle: transactions, search and point lookup.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use super::{
    error::{Error, Operation, Result},
    http::{self, HttpClient},
    transaction::Transaction,
    types::{DistanceMetric, FetchBody, QueryBody, VectorId},
};

/// Default number of nearest neighbors returned by a query.
pub const DEFAULT_NN_COUNT: usize = 5;

/// Handle to the dense index of a collection.
///
/// The handle carries no server identity beyond the collection name, so
/// any number of handles may point at the same index.
#[derive(Clone)]
pub struct Index {
    http: Arc<HttpClient>,
    collection: String,
    metric: Option<DistanceMetric>,
}

impl Index {
    pub(crate) fn new(http: Arc<HttpClient>, collection: String, metric: Option<DistanceMetric>) -> Self {
        Self {
            http,
            collection,
            metric,
        }
    }

    /// Returns the collection name.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Returns the distance metric, if this handle created the index.
    pub fn metric(&self) -> Option<DistanceMetric> {
        self.metric
    }

    /// Returns a new, unopened transaction on this index.
    pub fn transaction(&self) -> Transaction {
        Transaction::new(self.http.clone(), self.collection.clone())
    }

    /// Runs `f` inside a fresh transaction.
    ///
    /// The transaction is opened before `f` runs. If `f` succeeds the
    /// transaction is committed and `f`'s value returned. If `f` or that
    /// commit fails, the transaction is aborted and the failure returned
    /// unchanged; if the abort fails too, [`Error::RollbackFailed`] carries
    /// both errors. When `f` commits or aborts by itself, nothing further
    /// is sent.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// index
    ///     .with_transaction(async |txn: &mut Transaction| txn.upsert(&vectors).await)
    ///     .await?;
    /// ```
    pub async fn with_transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: AsyncFnOnce(&mut Transaction) -> Result<T>,
    {
        let mut txn = self.transaction();
        txn.create().await?;

        let err = match f(&mut txn).await {
            Ok(value) => {
                if !txn.is_open() {
                    return Ok(value);
                }
                match txn.commit().await {
                    Ok(()) => return Ok(value),
                    Err(err) => err,
                }
            }
            Err(err) => {
                if !txn.is_open() {
                    return Err(err);
                }
                err
            }
        };

        match txn.abort().await {
            Ok(()) => Err(err),
            Err(abort) => {
                warn!(collection = %self.collection, error = %abort, "cosdata: abort after failed transaction");
                Err(Error::RollbackFailed {
                    source: Box::new(err),
                    abort: Box::new(abort),
                })
            }
        }
    }

    /// Searches for the `nn_count` nearest neighbors of `vector`.
    ///
    /// Returns the server's ranked result payload as is.
    pub async fn query(&self, vector: &[f32], nn_count: usize) -> Result<Value> {
        let body = QueryBody {
            vector_db_name: &self.collection,
            vector,
            nn_count,
        };
        self.http
            .post(Operation::Query, &http::vectordb_path("/search"), &body, http::OK)
            .await
    }

    /// Fetches a stored vector by id.
    pub async fn fetch_vector(&self, id: impl Into<VectorId>) -> Result<Value> {
        let id = id.into();
        let body = FetchBody {
            vector_db_name: &self.collection,
            vector_id: &id,
        };
        self.http
            .post(Operation::Fetch, &http::vectordb_path("/fetch"), &body, http::OK)
            .await
    }
}

impl std::fmt::Debug for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Index")
            .field("collection", &self.collection)
            .field("metric", &self.metric)
            .finish()
    }
}
