//! Request and response types for the Cosdata API.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Index type used by every transaction and index call of this SDK.
pub const INDEX_TYPE_DENSE: &str = "dense";

/// Dimension assumed when the server omits it from collection metadata.
pub const DEFAULT_DIMENSION: usize = 1024;

// ==================== Vector ====================

/// A vector identifier. The server accepts both strings and integers and
/// the original JSON type is preserved on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VectorId {
    Int(i64),
    Str(String),
}

impl From<i64> for VectorId {
    fn from(n: i64) -> Self {
        VectorId::Int(n)
    }
}

impl From<i32> for VectorId {
    fn from(n: i32) -> Self {
        VectorId::Int(n.into())
    }
}

impl From<u32> for VectorId {
    fn from(n: u32) -> Self {
        VectorId::Int(n.into())
    }
}

impl From<String> for VectorId {
    fn from(s: String) -> Self {
        VectorId::Str(s)
    }
}

impl From<&str> for VectorId {
    fn from(s: &str) -> Self {
        VectorId::Str(s.to_string())
    }
}

impl fmt::Display for VectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorId::Int(n) => write!(f, "{}", n),
            VectorId::Str(s) => f.write_str(s),
        }
    }
}

impl Serialize for VectorId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            VectorId::Int(n) => serializer.serialize_i64(*n),
            VectorId::Str(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for VectorId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct VectorIdVisitor;

        impl serde::de::Visitor<'_> for VectorIdVisitor {
            type Value = VectorId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer")
            }

            fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(VectorId::Str(v.to_string()))
            }

            fn visit_string<E>(self, v: String) -> std::result::Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(VectorId::Str(v))
            }

            fn visit_i64<E>(self, v: i64) -> std::result::Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(VectorId::Int(v))
            }

            fn visit_u64<E>(self, v: u64) -> std::result::Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                i64::try_from(v)
                    .map(VectorId::Int)
                    .map_err(|_| E::custom(format!("vector id {} out of range", v)))
            }
        }

        deserializer.deserialize_any(VectorIdVisitor)
    }
}

/// A dense vector with optional scalar metadata fields.
///
/// Metadata is flattened into the vector object, so
/// `Vector::new(1, vec![0.0, 1.0]).with_field("tag", "a")` serializes as
/// `{"id":1,"values":[0.0,1.0],"tag":"a"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub id: VectorId,
    pub values: Vec<f32>,
    #[serde(flatten, default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl Vector {
    /// Creates a vector without metadata.
    pub fn new(id: impl Into<VectorId>, values: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            values,
            metadata: Map::new(),
        }
    }

    /// Adds a scalar metadata field.
    ///
    /// `id` and `values` are reserved, and arrays or objects are not
    /// scalars; such fields are kept here but rejected by [`Vector::validate`].
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Checks that metadata holds only scalar, non-reserved fields.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in &self.metadata {
            if RESERVED_FIELDS.contains(&key.as_str()) {
                return Err(Error::InvalidVector(format!(
                    "vector {}: metadata key {:?} is reserved",
                    self.id, key
                )));
            }
            if value.is_array() || value.is_object() {
                return Err(Error::InvalidVector(format!(
                    "vector {}: metadata field {:?} is not a scalar",
                    self.id, key
                )));
            }
        }
        Ok(())
    }
}

/// Top-level vector fields that metadata may not shadow.
const RESERVED_FIELDS: &[&str] = &["id", "values"];

// ==================== Collection ====================

/// Document posted to create a collection.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreateCollectionRequest<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub dense_vector: DenseVectorOptions,
    pub sparse_vector: SparseVectorOptions,
    pub metadata_schema: Option<Value>,
    pub config: CollectionConfig,
}

impl<'a> CreateCollectionRequest<'a> {
    pub fn new(name: &'a str, dimension: usize, description: Option<&'a str>) -> Self {
        Self {
            name,
            description,
            dense_vector: DenseVectorOptions {
                enabled: true,
                auto_create_index: false,
                dimension: Some(dimension),
            },
            sparse_vector: SparseVectorOptions {
                enabled: false,
                auto_create_index: false,
            },
            metadata_schema: None,
            config: CollectionConfig::default(),
        }
    }
}

/// Dense vector settings of a collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DenseVectorOptions {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub auto_create_index: bool,
    #[serde(default)]
    pub dimension: Option<usize>,
}

/// Sparse vector settings of a collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SparseVectorOptions {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub auto_create_index: bool,
}

/// Capacity and replication limits. `None` means unconstrained.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionConfig {
    pub max_vectors: Option<u64>,
    pub replication_factor: Option<u32>,
}

/// Collection metadata as returned by the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionInfo {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dense_vector: Option<DenseVectorOptions>,

    /// Some server versions report the dimension at top level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<usize>,
}

impl CollectionInfo {
    /// Returns the dense dimension, or [`DEFAULT_DIMENSION`] if absent.
    pub fn dimension(&self) -> usize {
        self.dense_vector
            .as_ref()
            .and_then(|d| d.dimension)
            .or(self.dimension)
            .unwrap_or(DEFAULT_DIMENSION)
    }
}

// ==================== Index ====================

/// Distance metric of a dense index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Cosine,
    Euclidean,
    Dot,
}

impl DistanceMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::Dot => "dot",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cosine" => Ok(DistanceMetric::Cosine),
            "euclidean" => Ok(DistanceMetric::Euclidean),
            "dot" | "dotproduct" => Ok(DistanceMetric::Dot),
            other => Err(format!("unknown distance metric: {}", other)),
        }
    }
}

/// HNSW graph parameters of a dense index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HnswParams {
    pub num_layers: u32,
    pub max_cache_size: u32,
    pub ef_construction: u32,
    pub ef_search: u32,
    pub neighbors_count: u32,
    pub level_0_neighbors_count: u32,
}

impl Default for HnswParams {
    fn default() -> Self {
        Self {
            num_layers: 7,
            max_cache_size: 1000,
            ef_construction: 512,
            ef_search: 256,
            neighbors_count: 32,
            level_0_neighbors_count: 64,
        }
    }
}

/// Parameters for creating a dense index.
///
/// # Example
///
/// ```rust,no_run
/// use giztoy_cosdata::{DistanceMetric, IndexParams};
///
/// let params = IndexParams {
///     distance_metric: DistanceMetric::Euclidean,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexParams {
    pub distance_metric: DistanceMetric,
    pub quantization: String,
    pub sample_threshold: u32,
    pub hnsw: HnswParams,
}

impl Default for IndexParams {
    fn default() -> Self {
        Self {
            distance_metric: DistanceMetric::Cosine,
            quantization: "auto".to_string(),
            sample_threshold: 100,
            hnsw: HnswParams::default(),
        }
    }
}

impl IndexParams {
    /// Default parameters with the given distance metric.
    pub fn with_metric(metric: DistanceMetric) -> Self {
        Self {
            distance_metric: metric,
            ..Default::default()
        }
    }
}

/// Document posted to create a dense index.
#[derive(Debug, Serialize)]
pub(crate) struct CreateIndexRequest<'a> {
    pub name: &'a str,
    pub distance_metric_type: DistanceMetric,
    pub quantization: Quantization<'a>,
    pub index: IndexSpec<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Quantization<'a> {
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub properties: QuantizationProperties,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuantizationProperties {
    pub sample_threshold: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct IndexSpec<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub properties: &'a HnswParams,
}

impl<'a> CreateIndexRequest<'a> {
    pub fn new(collection: &'a str, params: &'a IndexParams) -> Self {
        Self {
            name: collection,
            distance_metric_type: params.distance_metric,
            quantization: Quantization {
                kind: &params.quantization,
                properties: QuantizationProperties {
                    sample_threshold: params.sample_threshold,
                },
            },
            index: IndexSpec {
                kind: "hnsw",
                properties: &params.hnsw,
            },
        }
    }
}

// ==================== Transaction ====================

/// Body of create, commit and abort calls.
#[derive(Debug, Serialize)]
pub(crate) struct IndexTypeBody {
    pub index_type: &'static str,
}

impl IndexTypeBody {
    pub const DENSE: IndexTypeBody = IndexTypeBody {
        index_type: INDEX_TYPE_DENSE,
    };
}

/// Body of one upsert batch.
#[derive(Debug, Serialize)]
pub(crate) struct UpsertBody<'a> {
    pub index_type: &'static str,
    pub vectors: &'a [Vector],
}

/// Response to transaction creation.
#[derive(Debug, Deserialize)]
pub(crate) struct CreateTransactionResponse {
    pub transaction_id: VectorId,
}

// ==================== Query ====================

/// Body of a similarity search.
#[derive(Debug, Serialize)]
pub(crate) struct QueryBody<'a> {
    pub vector_db_name: &'a str,
    pub vector: &'a [f32],
    pub nn_count: usize,
}

/// Body of a point lookup.
#[derive(Debug, Serialize)]
pub(crate) struct FetchBody<'a> {
    pub vector_db_name: &'a str,
    pub vector_id: &'a VectorId,
}
