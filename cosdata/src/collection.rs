//! Collection handle and index creation.

use std::sync::Arc;

use tracing::info;

use super::{
    error::{Operation, Result},
    http::{self, HttpClient},
    index::Index,
    types::{CollectionInfo, CreateIndexRequest, DistanceMetric, IndexParams},
};

/// Handle to a server-side collection.
///
/// Holds only the name, dimension and description; all other state lives
/// on the server.
#[derive(Clone)]
pub struct Collection {
    http: Arc<HttpClient>,
    name: String,
    dimension: usize,
    description: Option<String>,
}

impl Collection {
    pub(crate) fn new(
        http: Arc<HttpClient>,
        name: String,
        dimension: usize,
        description: Option<String>,
    ) -> Self {
        Self {
            http,
            name,
            dimension,
            description,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Creates the dense index of this collection.
    ///
    /// Does not wait for the index to be built.
    pub async fn create_index(&self, params: &IndexParams) -> Result<Index> {
        let path = http::collection_path(&self.name, "/indexes/dense");
        let body = CreateIndexRequest::new(&self.name, params);
        self.http
            .post_empty(Operation::CreateIndex, &path, &body, http::CREATED)
            .await?;

        info!(collection = %self.name, metric = params.distance_metric.as_str(), "cosdata: index created");
        Ok(Index::new(
            self.http.clone(),
            self.name.clone(),
            Some(params.distance_metric),
        ))
    }

    /// Creates a dense index with default parameters and `metric`.
    ///
    /// This always sends a creation request; it is not a lookup. Calling it
    /// for an existing index fails if the server rejects duplicates, and two
    /// concurrent callers may race. Use [`Collection::dense_index`] for an
    /// index that already exists.
    pub async fn index(&self, metric: DistanceMetric) -> Result<Index> {
        self.create_index(&IndexParams::with_metric(metric)).await
    }

    /// Returns a handle to the existing dense index without a request.
    pub fn dense_index(&self) -> Index {
        Index::new(self.http.clone(), self.name.clone(), None)
    }

    /// Fetches the collection metadata from the server.
    pub async fn info(&self) -> Result<CollectionInfo> {
        let path = http::collection_path(&self.name, "");
        self.http.get(Operation::GetCollection, &path, http::OK).await
    }

    /// Deletes the collection on the server.
    pub async fn delete(self) -> Result<()> {
        let path = http::collection_path(&self.name, "");
        self.http
            .delete(Operation::DeleteCollection, &path, http::NO_CONTENT)
            .await?;
        info!(collection = %self.name, "cosdata: collection deleted");
        Ok(())
    }
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .field("dimension", &self.dimension)
            .field("description", &self.description)
            .finish()
    }
}
