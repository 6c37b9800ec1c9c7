//! In-process stand-in for the content API, used by tests
//!
//! Serves the API root and the search endpoint over a real socket so the
//! reqwest client is exercised end to end. Supports `at` predicates on
//! `document.type`, `document.id` and `my.<type>.uid`, first-publication
//! orderings, the `after` cursor, paging with `next_page` URLs, `fetch`
//! field selection and preview refs layered over the published documents.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::CmsConfig;

pub const MASTER_REF: &str = "master-ref";

#[derive(Default)]
struct Store {
    docs: Vec<Value>,
    previews: HashMap<String, Vec<Value>>,
    searches: usize,
}

struct FakeState {
    endpoint: String,
    store: Arc<Mutex<Store>>,
}

pub struct FakeCms {
    endpoint: String,
    store: Arc<Mutex<Store>>,
}

impl FakeCms {
    /// Bind to an ephemeral port and serve `docs` under the master ref
    pub async fn start(docs: Vec<Value>) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let endpoint = format!("http://{}/api/v2", addr);

        let store = Arc::new(Mutex::new(Store {
            docs,
            ..Default::default()
        }));
        let state = Arc::new(FakeState {
            endpoint: endpoint.clone(),
            store: store.clone(),
        });

        let app = Router::new()
            .route("/api/v2", get(api_root))
            .route("/api/v2/documents/search", get(search))
            .with_state(state);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { endpoint, store }
    }

    pub fn config(&self) -> CmsConfig {
        CmsConfig {
            endpoint: self.endpoint.clone(),
            access_token: None,
        }
    }

    /// Register a preview ref whose documents override or extend the published ones
    pub fn add_preview(&mut self, reference: &str, docs: Vec<Value>) {
        self.store
            .lock()
            .unwrap()
            .previews
            .insert(reference.to_string(), docs);
    }

    /// Replace the published documents
    pub fn set_docs(&self, docs: Vec<Value>) {
        self.store.lock().unwrap().docs = docs;
    }

    /// Number of search requests served so far
    pub fn searches(&self) -> usize {
        self.store.lock().unwrap().searches
    }
}

/// A `posts` document with one content section
pub fn post_doc(id: &str, uid: &str, title: &str, published: &str) -> Value {
    json!({
        "id": id,
        "uid": uid,
        "type": "posts",
        "first_publication_date": published,
        "last_publication_date": published,
        "data": {
            "title": title,
            "subtitle": format!("All about {}", title),
            "author": "Joseph Oliveira",
            "banner": { "url": format!("https://images.test/{}.png", uid) },
            "content": [{
                "heading": "Introduction",
                "body": [{
                    "type": "paragraph",
                    "text": format!("{} body text", title),
                    "spans": []
                }]
            }]
        }
    })
}

/// `count` posts, `id1`/`post-1` oldest through `id{count}`/`post-{count}` newest
pub fn posts(count: usize) -> Vec<Value> {
    (1..=count)
        .map(|i| {
            post_doc(
                &format!("id{}", i),
                &format!("post-{}", i),
                &format!("Post {}", i),
                &format!("2021-03-{:02}T10:00:00+0000", i),
            )
        })
        .collect()
}

async fn api_root() -> Json<Value> {
    Json(json!({
        "refs": [{ "id": "master", "ref": MASTER_REF, "label": "Master", "isMasterRef": true }]
    }))
}

async fn search(
    State(state): State<Arc<FakeState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut store = state.store.lock().unwrap();
    store.searches += 1;

    let reference = params.get("ref").map(String::as_str).unwrap_or("");
    let mut docs = if reference == MASTER_REF {
        store.docs.clone()
    } else if let Some(preview) = store.previews.get(reference) {
        let mut docs = store.docs.clone();
        for doc in preview {
            match docs.iter_mut().find(|d| d["id"] == doc["id"]) {
                Some(existing) => *existing = doc.clone(),
                None => docs.push(doc.clone()),
            }
        }
        docs
    } else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": format!("Ref not found: {}", reference) })),
        )
            .into_response();
    };

    if let Some(q) = params.get("q") {
        let Some((field, value)) = parse_at(q) else {
            return (StatusCode::BAD_REQUEST, Json(json!({ "message": "bad predicate" })))
                .into_response();
        };
        docs.retain(|doc| field_matches(doc, &field, &value));
    }

    if let Some(orderings) = params.get("orderings") {
        docs.sort_by(|a, b| {
            a["first_publication_date"]
                .as_str()
                .cmp(&b["first_publication_date"].as_str())
        });
        if orderings.contains(" desc") {
            docs.reverse();
        }
    }

    if let Some(after) = params.get("after") {
        if let Some(pos) = docs
            .iter()
            .position(|d| d["id"].as_str() == Some(after.as_str()))
        {
            docs = docs.split_off(pos + 1);
        }
    }

    let page_size: usize = params
        .get("pageSize")
        .and_then(|s| s.parse().ok())
        .unwrap_or(20usize)
        .max(1);
    let page: usize = params
        .get("page")
        .and_then(|s| s.parse().ok())
        .unwrap_or(1usize)
        .max(1);
    let total = docs.len();
    let total_pages = total.div_ceil(page_size);

    let fetch: Option<Vec<&str>> = params.get("fetch").map(|f| f.split(',').collect());
    let results: Vec<Value> = docs
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .map(|doc| restrict_fields(doc, fetch.as_deref()))
        .collect();

    let next_page = if page < total_pages {
        let mut next = params.clone();
        next.insert("page".to_string(), (page + 1).to_string());
        let url = reqwest::Url::parse_with_params(
            &format!("{}/documents/search", state.endpoint),
            next.iter(),
        )
        .unwrap();
        Some(url.to_string())
    } else {
        None
    };

    Json(json!({
        "page": page,
        "results_per_page": page_size,
        "results_size": results.len(),
        "total_results_size": total,
        "total_pages": total_pages,
        "next_page": next_page,
        "prev_page": null,
        "results": results,
    }))
    .into_response()
}

/// Parse `[[at(field, "value")]]`
fn parse_at(q: &str) -> Option<(String, String)> {
    let inner = q.strip_prefix("[[at(")?.strip_suffix(")]]")?;
    let (field, value) = inner.split_once(',')?;
    let value = value.trim().strip_prefix('"')?.strip_suffix('"')?;
    Some((field.trim().to_string(), value.replace("\\\"", "\"")))
}

fn field_matches(doc: &Value, field: &str, value: &str) -> bool {
    match field {
        "document.type" => doc["type"].as_str() == Some(value),
        "document.id" => doc["id"].as_str() == Some(value),
        _ => match field
            .strip_prefix("my.")
            .and_then(|rest| rest.strip_suffix(".uid"))
        {
            Some(doc_type) => {
                doc["type"].as_str() == Some(doc_type) && doc["uid"].as_str() == Some(value)
            }
            None => false,
        },
    }
}

fn restrict_fields(mut doc: Value, fetch: Option<&[&str]>) -> Value {
    let Some(fields) = fetch else {
        return doc;
    };
    let doc_type = doc["type"].as_str().unwrap_or_default().to_string();
    if let Some(data) = doc.get_mut("data").and_then(Value::as_object_mut) {
        data.retain(|key, _| fields.contains(&format!("{}.{}", doc_type, key).as_str()));
    }
    doc
}
