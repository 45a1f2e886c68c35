//! In-process mock of the Cosdata HTTP API.
//!
//! Implements just enough of the server for the SDK tests: sessions,
//! collections, dense index creation, transactions and brute-force cosine
//! search over committed vectors. Every request is recorded.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{extract::State, Json, Router};
use serde_json::{json, Value};

use giztoy_cosdata::Client;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "secret";

/// A request as seen by the mock server.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

#[derive(Default)]
struct Txn {
    collection: String,
    pending: Vec<Value>,
}

/// Failure injection switches.
#[derive(Default)]
pub struct Faults {
    /// Reject the n-th upsert request (0-based, counted across the server).
    pub upsert_batch: Option<usize>,
    pub create_transaction: bool,
    pub commit: bool,
    pub abort: bool,
}

#[derive(Default)]
pub struct MockState {
    pub requests: Vec<Recorded>,
    pub faults: Faults,
    collections: HashMap<String, Option<usize>>,
    indexes: HashSet<String>,
    tokens: HashSet<String>,
    logins: usize,
    next_txn: usize,
    upserts: usize,
    txns: HashMap<String, Txn>,
    stored: HashMap<String, Vec<Value>>,
}

pub struct MockServer {
    pub addr: SocketAddr,
    pub state: Arc<Mutex<MockState>>,
}

impl MockServer {
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(MockState::default()));
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client(&self) -> Client {
        Client::new(self.url(), USERNAME, PASSWORD).unwrap()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Requests whose path ends with `suffix`.
    pub fn requests_to(&self, suffix: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.ends_with(suffix))
            .collect()
    }

    pub fn count(&self, suffix: &str) -> usize {
        self.requests_to(suffix).len()
    }

    pub fn faults(&self, f: impl FnOnce(&mut Faults)) {
        f(&mut self.state.lock().unwrap().faults);
    }

    /// Registers a collection directly, bypassing the API.
    pub fn seed_collection(&self, name: &str, dimension: Option<usize>) {
        self.state
            .lock()
            .unwrap()
            .collections
            .insert(name.to_string(), dimension);
    }

    /// Number of committed vectors in `collection`.
    pub fn stored(&self, collection: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .stored
            .get(collection)
            .map_or(0, Vec::len)
    }
}

fn error(status: StatusCode, msg: &str) -> Response {
    (status, msg.to_string()).into_response()
}

async fn handle(
    State(state): State<Arc<Mutex<MockState>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut st = state.lock().unwrap();
    st.requests.push(Recorded {
        method: method.to_string(),
        path: path.clone(),
        authorization: authorization.clone(),
        content_type,
        body: body.clone(),
    });

    let segs: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    if method == Method::POST && matches!(segs.as_slice(), ["auth", "create-session"]) {
        if body["username"] != USERNAME || body["password"] != PASSWORD {
            return error(StatusCode::UNAUTHORIZED, "invalid credentials");
        }
        st.logins += 1;
        let token = format!("token-{}", st.logins);
        st.tokens.insert(token.clone());
        return Json(json!({"access_token": token, "created_at": 0, "expires_at": 3600}))
            .into_response();
    }

    let authorized = authorization
        .as_deref()
        .and_then(|a| a.strip_prefix("Bearer "))
        .is_some_and(|t| st.tokens.contains(t));
    if !authorized {
        return error(StatusCode::UNAUTHORIZED, "missing or invalid token");
    }

    match (method.as_str(), segs.as_slice()) {
        ("POST", ["vectordb", "collections"]) => {
            let name = body["name"].as_str().unwrap_or_default().to_string();
            if st.collections.contains_key(&name) {
                return error(StatusCode::CONFLICT, "collection already exists");
            }
            let dim = body["dense_vector"]["dimension"].as_u64().map(|d| d as usize);
            st.collections.insert(name.clone(), dim);
            (StatusCode::CREATED, Json(json!({"id": name, "name": name}))).into_response()
        }
        ("GET", ["vectordb", "collections"]) => {
            let mut names: Vec<_> = st.collections.iter().collect();
            names.sort();
            let list: Vec<Value> = names
                .into_iter()
                .map(|(name, dim)| json!({"name": name, "dense_vector": {"dimension": dim}}))
                .collect();
            Json(json!({"collections": list})).into_response()
        }
        ("GET", ["vectordb", "collections", name]) => match st.collections.get(*name) {
            Some(Some(dim)) => {
                Json(json!({"name": name, "dense_vector": {"enabled": true, "dimension": dim}}))
                    .into_response()
            }
            Some(None) => Json(json!({"name": name})).into_response(),
            None => error(StatusCode::NOT_FOUND, "collection not found"),
        },
        ("DELETE", ["vectordb", "collections", name]) => {
            if st.collections.remove(*name).is_none() {
                return error(StatusCode::NOT_FOUND, "collection not found");
            }
            st.stored.remove(*name);
            st.indexes.remove(*name);
            StatusCode::NO_CONTENT.into_response()
        }
        ("POST", ["vectordb", "collections", name, "indexes", "dense"]) => {
            if !st.collections.contains_key(*name) {
                return error(StatusCode::NOT_FOUND, "collection not found");
            }
            if !st.indexes.insert(name.to_string()) {
                return error(StatusCode::CONFLICT, "index already exists");
            }
            (StatusCode::CREATED, Json(json!({"collection_name": name}))).into_response()
        }
        ("POST", ["vectordb", "collections", name, "transactions"]) => {
            if st.faults.create_transaction {
                return error(StatusCode::SERVICE_UNAVAILABLE, "transaction slots exhausted");
            }
            if !st.collections.contains_key(*name) {
                return error(StatusCode::NOT_FOUND, "collection not found");
            }
            st.next_txn += 1;
            let id = format!("txn-{}", st.next_txn);
            st.txns.insert(
                id.clone(),
                Txn {
                    collection: name.to_string(),
                    pending: Vec::new(),
                },
            );
            Json(json!({"transaction_id": id, "created_at": 0})).into_response()
        }
        ("POST", ["vectordb", "collections", _, "transactions", id, action]) => {
            let id = id.to_string();
            if !st.txns.contains_key(&id) {
                return error(StatusCode::NOT_FOUND, "transaction not found");
            }
            match *action {
                "upsert" => {
                    let n = st.upserts;
                    st.upserts += 1;
                    if st.faults.upsert_batch == Some(n) {
                        return error(StatusCode::INTERNAL_SERVER_ERROR, "batch rejected");
                    }
                    let vectors = body["vectors"].as_array().cloned().unwrap_or_default();
                    if let Some(txn) = st.txns.get_mut(&id) {
                        txn.pending.extend(vectors);
                    }
                    StatusCode::OK.into_response()
                }
                "commit" => {
                    if st.faults.commit {
                        return error(StatusCode::CONFLICT, "commit conflict");
                    }
                    if let Some(txn) = st.txns.remove(&id) {
                        st.stored.entry(txn.collection).or_default().extend(txn.pending);
                    }
                    StatusCode::NO_CONTENT.into_response()
                }
                "abort" => {
                    if st.faults.abort {
                        return error(StatusCode::INTERNAL_SERVER_ERROR, "abort failed");
                    }
                    st.txns.remove(&id);
                    StatusCode::NO_CONTENT.into_response()
                }
                _ => error(StatusCode::NOT_FOUND, "unknown action"),
            }
        }
        ("POST", ["vectordb", "search"]) => {
            let name = body["vector_db_name"].as_str().unwrap_or_default();
            let query = floats(&body["vector"]);
            let nn = body["nn_count"].as_u64().unwrap_or(5) as usize;

            let mut hits: Vec<(Value, f32)> = st
                .stored
                .get(name)
                .map(|vs| {
                    vs.iter()
                        .map(|v| (v["id"].clone(), cosine(&query, &floats(&v["values"]))))
                        .collect()
                })
                .unwrap_or_default();
            hits.sort_by(|a, b| b.1.total_cmp(&a.1));
            hits.truncate(nn);

            let results: Vec<Value> = hits
                .into_iter()
                .map(|(id, score)| json!({"id": id, "score": score}))
                .collect();
            Json(json!({"results": results})).into_response()
        }
        ("POST", ["vectordb", "fetch"]) => {
            let name = body["vector_db_name"].as_str().unwrap_or_default();
            let found = st
                .stored
                .get(name)
                .and_then(|vs| vs.iter().find(|v| v["id"] == body["vector_id"]))
                .cloned();
            match found {
                Some(v) => Json(v).into_response(),
                None => error(StatusCode::NOT_FOUND, "vector not found"),
            }
        }
        _ => error(StatusCode::NOT_FOUND, "no such endpoint"),
    }
}

fn floats(v: &Value) -> Vec<f32> {
    v.as_array()
        .map(|a| a.iter().filter_map(Value::as_f64).map(|f| f as f32).collect())
        .unwrap_or_default()
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na * nb)
}
