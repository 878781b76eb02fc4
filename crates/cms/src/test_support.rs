//! In-process mock CMS servers for adapter tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{MethodRouter, get};
use serde_json::{Value, json};

/// Bind `router` on an ephemeral local port and return its base URL.
pub(crate) async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[derive(Clone, Default)]
pub(crate) struct PageLog {
    requested: Arc<Mutex<Vec<u32>>>,
    completed: Arc<Mutex<Vec<u32>>>,
}

impl PageLog {
    pub(crate) fn requested_pages(&self) -> Vec<u32> {
        let mut pages = self.requested.lock().unwrap().clone();
        pages.sort_unstable();
        pages
    }

    pub(crate) fn completed_pages(&self) -> Vec<u32> {
        self.completed.lock().unwrap().clone()
    }
}

#[derive(Clone)]
struct PagedState {
    list_key: &'static str,
    total: u64,
    log: PageLog,
    delay: fn(u32) -> Option<Duration>,
}

/// `GET /list?perPage&page` serving `total` rows `{ "n": index }` under
/// `list_key`, with an optional per-page response delay.
pub(crate) fn paged_router(
    list_key: &'static str,
    total: u64,
    log: PageLog,
    delay: fn(u32) -> Option<Duration>,
) -> Router {
    let state = PagedState {
        list_key,
        total,
        log,
        delay,
    };
    Router::new()
        .route("/list", get(paged_handler))
        .with_state(state)
}

async fn paged_handler(
    State(state): State<PagedState>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let page: u32 = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let per_page: u64 = query
        .get("perPage")
        .and_then(|p| p.parse().ok())
        .unwrap_or(100);
    state.log.requested.lock().unwrap().push(page);

    if let Some(delay) = (state.delay)(page) {
        tokio::time::sleep(delay).await;
    }

    let start = u64::from(page - 1) * per_page;
    let end = (start + per_page).min(state.total);
    let rows: Vec<Value> = (start..end).map(|n| json!({ "n": n })).collect();
    state.log.completed.lock().unwrap().push(page);

    let mut body = serde_json::Map::new();
    body.insert(state.list_key.to_string(), Value::Array(rows));
    body.insert("totalCount".to_string(), json!(state.total));
    Json(Value::Object(body))
}

/// Every request answers with `status`.
pub(crate) fn status_router(status: StatusCode) -> Router {
    Router::new().fallback(move || async move { status })
}

pub(crate) fn json_route(value: Value) -> MethodRouter {
    get(move || {
        let value = value.clone();
        async move { Json(value) }
    })
}

/// Like [`json_route`] but answers 401 unless `Authorization: Bearer <token>`.
pub(crate) fn bearer_json_route(token: &'static str, value: Value) -> MethodRouter {
    get(move |headers: HeaderMap| {
        let value = value.clone();
        async move {
            let expected = format!("Bearer {token}");
            let authorized = headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v == expected);
            if authorized {
                Json(value).into_response()
            } else {
                StatusCode::UNAUTHORIZED.into_response()
            }
        }
    })
}

/// Router that counts every request it receives.
pub(crate) fn counting_router(hits: Arc<AtomicUsize>) -> Router {
    Router::new().fallback(move || {
        let hits = hits.clone();
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
            Json(json!({ "items": [], "totalCount": 0 })).into_response()
        }
    })
}

pub(crate) fn status_response(status: StatusCode) -> MethodRouter {
    get(move || async move { status })
}
