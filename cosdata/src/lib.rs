//! Cosdata vector database API SDK for Rust.
//!
//! This crate provides a client for the Cosdata HTTP API: collections,
//! dense indexes, batched write transactions and similarity search. All
//! indexing and storage happens on the server.
//!
//! # Example
//!
//! ```rust,no_run
//! use giztoy_cosdata::{Client, IndexParams, Transaction, Vector};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new("http://127.0.0.1:8443", "admin", "admin")?;
//!
//!     let collection = client.create_collection("docs", 4, None).await?;
//!     let index = collection.create_index(&IndexParams::default()).await?;
//!
//!     let vectors = vec![
//!         Vector::new(1, vec![0.0, 0.0, 0.0, 1.0]),
//!         Vector::new(2, vec![1.0, 0.0, 0.0, 0.0]),
//!     ];
//!     index
//!         .with_transaction(async |txn: &mut Transaction| txn.upsert(&vectors).await)
//!         .await?;
//!
//!     let results = index.query(&[0.0, 0.0, 0.0, 1.0], 1).await?;
//!     println!("{results}");
//!     Ok(())
//! }
//! ```

mod auth;
mod client;
mod collection;
mod error;
pub mod http;
mod index;
mod transaction;
mod types;

pub use auth::{Credentials, Session, LOGIN_PATH};
pub use client::{
    Client, ClientBuilder, DEFAULT_HOST, DEFAULT_USERNAME, ENV_HOST, ENV_PASSWORD, ENV_USERNAME,
    ENV_VERIFY_SSL,
};
pub use collection::Collection;
pub use error::{Error, Operation, Result};
pub use index::{Index, DEFAULT_NN_COUNT};
pub use transaction::{Transaction, TransactionState, BATCH_SIZE};
pub use types::{
    CollectionConfig, CollectionInfo, DenseVectorOptions, DistanceMetric, HnswParams,
    IndexParams, SparseVectorOptions, Vector, VectorId, DEFAULT_DIMENSION, INDEX_TYPE_DENSE,
};
