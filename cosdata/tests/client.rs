mod common;

use common::{MockServer, PASSWORD, USERNAME};
use giztoy_cosdata::{
    Client, DistanceMetric, Error, HnswParams, IndexParams, Operation, Transaction, Vector,
    DEFAULT_DIMENSION, DEFAULT_NN_COUNT,
};
use serde_json::json;

#[tokio::test]
async fn test_first_request_logs_in() {
    let server = MockServer::start().await;
    let client = server.client();

    client.create_collection("docs", 4, None).await.unwrap();

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].path, "/auth/create-session");
    assert_eq!(
        requests[0].body,
        json!({"username": USERNAME, "password": PASSWORD})
    );
    assert!(requests[0].authorization.is_none());

    assert_eq!(requests[1].path, "/vectordb/collections");
    assert_eq!(requests[1].authorization.as_deref(), Some("Bearer token-1"));
    assert_eq!(requests[1].content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn test_session_token_reused_and_replaced() {
    let server = MockServer::start().await;
    let client = server.client();

    client.login().await.unwrap();
    client.list_collections().await.unwrap();
    client.list_collections().await.unwrap();
    assert_eq!(server.count("/create-session"), 1);

    client.login().await.unwrap();
    client.list_collections().await.unwrap();
    assert_eq!(server.count("/create-session"), 2);

    let auth: Vec<_> = server
        .requests_to("/vectordb/collections")
        .into_iter()
        .map(|r| r.authorization.unwrap_or_default())
        .collect();
    assert_eq!(auth, vec!["Bearer token-1", "Bearer token-1", "Bearer token-2"]);
}

#[tokio::test]
async fn test_login_failure_is_auth_error() {
    let server = MockServer::start().await;
    let client = Client::new(server.url(), USERNAME, "wrong").unwrap();

    let err = client.create_collection("docs", 4, None).await.unwrap_err();
    assert!(err.is_auth());
    assert_eq!(err.operation(), Some(Operation::Login));
    assert_eq!(err.http_status(), Some(401));
    assert_eq!(err.body(), Some("invalid credentials"));
    assert!(!client.http().session().is_authenticated());
    assert_eq!(server.count("/vectordb/collections"), 0);
}

#[tokio::test]
async fn test_create_collection_document() {
    let server = MockServer::start().await;
    let client = server.client();

    let collection = client
        .create_collection("docs", 768, Some("product embeddings"))
        .await
        .unwrap();
    assert_eq!(collection.name(), "docs");
    assert_eq!(collection.dimension(), 768);
    assert_eq!(collection.description(), Some("product embeddings"));

    let req = &server.requests_to("/vectordb/collections")[0];
    assert_eq!(req.method, "POST");
    assert_eq!(
        req.body,
        json!({
            "name": "docs",
            "description": "product embeddings",
            "dense_vector": {"enabled": true, "auto_create_index": false, "dimension": 768},
            "sparse_vector": {"enabled": false, "auto_create_index": false},
            "metadata_schema": null,
            "config": {"max_vectors": null, "replication_factor": null},
        })
    );

    let err = client.create_collection("docs", 768, None).await.unwrap_err();
    assert_eq!(err.operation(), Some(Operation::CreateCollection));
    assert_eq!(err.http_status(), Some(409));
}

#[tokio::test]
async fn test_get_collection_dimension() {
    let server = MockServer::start().await;
    let client = server.client();
    client.create_collection("docs", 4, None).await.unwrap();
    server.seed_collection("legacy", None);

    assert_eq!(client.get_collection("docs").await.unwrap().dimension(), 4);
    assert_eq!(
        client.get_collection("legacy").await.unwrap().dimension(),
        DEFAULT_DIMENSION
    );

    let err = client.get_collection("missing").await.unwrap_err();
    assert_eq!(err.operation(), Some(Operation::GetCollection));
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_collection_info_single_request() {
    let server = MockServer::start().await;
    let client = server.client();
    let collection = client
        .create_collection("docs", 4, Some("product embeddings"))
        .await
        .unwrap();

    let info = client.collection_info("docs").await.unwrap();
    assert_eq!(info.name, "docs");
    assert_eq!(info.dimension(), 4);
    let gets = server
        .requests_to("/vectordb/collections/docs")
        .into_iter()
        .filter(|r| r.method == "GET")
        .count();
    assert_eq!(gets, 1);

    assert_eq!(collection.info().await.unwrap().dimension(), 4);
}

#[tokio::test]
async fn test_list_collections_raw_and_wrapped() {
    let server = MockServer::start().await;
    let client = server.client();
    client.create_collection("a", 3, None).await.unwrap();
    client.create_collection("b", 5, None).await.unwrap();

    let raw = client.list_collections().await.unwrap();
    assert_eq!(raw["collections"].as_array().unwrap().len(), 2);

    let handles = client.collections().await.unwrap();
    let summary: Vec<_> = handles.iter().map(|c| (c.name(), c.dimension())).collect();
    assert_eq!(summary, vec![("a", 3), ("b", 5)]);
}

#[tokio::test]
async fn test_delete_collection() {
    let server = MockServer::start().await;
    let client = server.client();
    let collection = client.create_collection("docs", 4, None).await.unwrap();

    collection.delete().await.unwrap();
    assert!(client.get_collection("docs").await.unwrap_err().is_not_found());

    let err = client.delete_collection("docs").await.unwrap_err();
    assert_eq!(err.operation(), Some(Operation::DeleteCollection));
}

#[tokio::test]
async fn test_create_index_document() {
    let server = MockServer::start().await;
    let client = server.client();
    let collection = client.create_collection("docs", 4, None).await.unwrap();

    let params = IndexParams {
        distance_metric: DistanceMetric::Euclidean,
        hnsw: HnswParams {
            ef_search: 64,
            ..Default::default()
        },
        ..Default::default()
    };
    let index = collection.create_index(&params).await.unwrap();
    assert_eq!(index.collection(), "docs");
    assert_eq!(index.metric(), Some(DistanceMetric::Euclidean));

    let req = &server.requests_to("/indexes/dense")[0];
    assert_eq!(req.path, "/vectordb/collections/docs/indexes/dense");
    assert_eq!(req.body["name"], "docs");
    assert_eq!(req.body["distance_metric_type"], "euclidean");
    assert_eq!(req.body["quantization"]["type"], "auto");
    assert_eq!(req.body["index"]["type"], "hnsw");
    assert_eq!(req.body["index"]["properties"]["ef_search"], 64);
    assert_eq!(req.body["index"]["properties"]["ef_construction"], 512);
    assert_eq!(req.body["index"]["properties"]["level_0_neighbors_count"], 64);
}

#[tokio::test]
async fn test_index_convenience_is_not_idempotent() {
    let server = MockServer::start().await;
    let client = server.client();
    let collection = client.create_collection("docs", 4, None).await.unwrap();

    collection.index(DistanceMetric::Cosine).await.unwrap();
    let err = collection.index(DistanceMetric::Cosine).await.unwrap_err();
    assert_eq!(err.operation(), Some(Operation::CreateIndex));
    assert_eq!(err.body(), Some("index already exists"));

    // A plain handle needs no request.
    let before = server.requests().len();
    let _index = collection.dense_index();
    assert_eq!(server.requests().len(), before);
}

#[tokio::test]
async fn test_fetch_vector() {
    let server = MockServer::start().await;
    let client = server.client();
    let collection = client.create_collection("docs", 2, None).await.unwrap();
    let index = collection.dense_index();

    let vectors = vec![Vector::new("doc-1", vec![0.5, 0.5]).with_field("lang", "en")];
    index
        .with_transaction(async |txn: &mut Transaction| txn.upsert(&vectors).await)
        .await
        .unwrap();

    let found = index.fetch_vector("doc-1").await.unwrap();
    assert_eq!(found["id"], "doc-1");
    assert_eq!(found["lang"], "en");

    let req = &server.requests_to("/vectordb/fetch")[0];
    assert_eq!(req.body, json!({"vector_db_name": "docs", "vector_id": "doc-1"}));

    let err = index.fetch_vector(99).await.unwrap_err();
    assert_eq!(err.operation(), Some(Operation::Fetch));
    assert!(err.is_not_found());
    assert_eq!(err.body(), Some("vector not found"));
}

#[tokio::test]
async fn test_query_body() {
    let server = MockServer::start().await;
    let client = server.client();
    let collection = client.create_collection("docs", 3, None).await.unwrap();
    let index = collection.dense_index();

    index.query(&[1.0, 0.0, 0.0], DEFAULT_NN_COUNT).await.unwrap();

    let req = &server.requests_to("/vectordb/search")[0];
    assert_eq!(
        req.body,
        json!({"vector_db_name": "docs", "vector": [1.0, 0.0, 0.0], "nn_count": 5})
    );
}

#[tokio::test]
async fn test_end_to_end_scenario() {
    let server = MockServer::start().await;
    let client = server.client();

    let collection = client.create_collection("scenario", 4, None).await.unwrap();
    let index = collection.create_index(&IndexParams::default()).await.unwrap();

    let vectors = vec![
        Vector::new(1, vec![0.0, 0.0, 0.0, 1.0]),
        Vector::new(2, vec![1.0, 0.0, 0.0, 0.0]),
    ];
    index
        .with_transaction(async |txn: &mut Transaction| txn.upsert(&vectors).await)
        .await
        .unwrap();
    assert_eq!(server.count("/commit"), 1);

    let results = index.query(&[0.0, 0.0, 0.0, 1.0], 1).await.unwrap();
    let hits = results["results"].as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["id"], 1);
}

#[tokio::test]
async fn test_requests_fail_without_server() {
    // Port 9 (discard) is not expected to accept HTTP connections.
    let client = Client::new("http://127.0.0.1:9", USERNAME, PASSWORD).unwrap();
    let err = client.list_collections().await.unwrap_err();
    assert!(matches!(err, Error::Http(_)), "got {err}");
}
