//! In-process stand-in for the record database API.
//!
//! Serves the same routes and response shapes on an ephemeral port, with
//! switches to make it unhealthy, slow, or fail selected deletes.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;

use crate::core::fields;

const EDITABLE_COLUMNS: &[&str] = &[
    "durum_tipi",
    "tarih",
    "baslangic_saati",
    "bitis_saati",
    "vardiya",
    "birim",
    "lokasyon",
    "cihaz_adi",
    "muhendis_adi",
    "yapilan_is",
];

const SEARCH_COLUMNS: &[&str] = &["yapilan_is", "lokasyon", "cihaz_adi", "muhendis_adi"];

#[derive(Default)]
struct MockState {
    rows: Mutex<Vec<Map<String, Value>>>,
    next_id: AtomicI64,
    unhealthy: AtomicBool,
    status_body: Mutex<Option<String>>,
    delay_ms: AtomicU64,
    fail_deletes: Mutex<HashSet<i64>>,
    searches: Mutex<Vec<HashMap<String, String>>>,
}

impl MockState {
    async fn pause(&self) {
        let ms = self.delay_ms.load(Ordering::Relaxed);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }

    fn sorted_rows(&self) -> Vec<Map<String, Value>> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| {
            let ta = a["kayit_tarihi"].as_str().unwrap_or_default();
            let tb = b["kayit_tarihi"].as_str().unwrap_or_default();
            tb.cmp(ta)
                .then_with(|| b["id"].as_i64().cmp(&a["id"].as_i64()))
        });
        rows
    }
}

/// Running mock API. The server stops when this is dropped.
pub struct MockApi {
    pub base_url: String,
    state: Arc<MockState>,
    handle: tokio::task::JoinHandle<()>,
}

impl MockApi {
    pub async fn spawn() -> Self {
        let state = Arc::new(MockState {
            next_id: AtomicI64::new(1),
            ..MockState::default()
        });

        let app = Router::new()
            .route("/api/status", get(status))
            .route("/api/kayitlar", get(list).post(create))
            .route("/api/kayitlar/search", get(search))
            .route(
                "/api/kayitlar/{id}",
                get(fetch).put(update).delete(remove),
            )
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock api");
        let addr = listener.local_addr().expect("mock api addr");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock api");
        });

        Self {
            base_url: format!("http://{addr}/api"),
            state,
            handle,
        }
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.state.unhealthy.store(!healthy, Ordering::Relaxed);
    }

    /// Replace the status body with raw text.
    pub fn set_status_body(&self, body: &str) {
        *self.state.status_body.lock().unwrap() = Some(body.to_string());
    }

    pub fn set_delay(&self, delay: Duration) {
        self.state
            .delay_ms
            .store(delay.as_millis() as u64, Ordering::Relaxed);
    }

    /// Make `DELETE /kayitlar/:id` answer 500 for this id.
    pub fn fail_delete_of(&self, id: i64) {
        self.state.fail_deletes.lock().unwrap().insert(id);
    }

    /// The stored snake_case row for `id`.
    pub fn row(&self, id: i64) -> Option<Value> {
        self.state
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r["id"].as_i64() == Some(id))
            .cloned()
            .map(Value::Object)
    }

    pub fn row_count(&self) -> usize {
        self.state.rows.lock().unwrap().len()
    }

    /// Query strings received by the search endpoint, in order.
    pub fn search_queries(&self) -> Vec<HashMap<String, String>> {
        self.state.searches.lock().unwrap().clone()
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Kayıt bulunamadı" })),
    )
        .into_response()
}

fn parse_id(id: &str) -> Option<i64> {
    id.parse().ok()
}

async fn status(State(state): State<Arc<MockState>>) -> Response {
    state.pause().await;
    if state.unhealthy.load(Ordering::Relaxed) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "SQLITE_CANTOPEN" })),
        )
            .into_response();
    }
    if let Some(body) = state.status_body.lock().unwrap().clone() {
        return body.into_response();
    }
    Json(json!({
        "isConnected": true,
        "databaseType": "SQLite",
        "name": "ariza_durus.db",
        "path": "/srv/ariza/ariza_durus.db"
    }))
    .into_response()
}

async fn list(State(state): State<Arc<MockState>>) -> Response {
    state.pause().await;
    Json(state.sorted_rows()).into_response()
}

async fn create(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.pause().await;
    let id = state.next_id.fetch_add(1, Ordering::Relaxed);
    let kayit_tarihi = Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();

    let Value::Object(mut row) = fields::to_wire(body.clone()) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    row.insert("id".to_string(), json!(id));
    row.insert("kayit_tarihi".to_string(), json!(kayit_tarihi));
    state.rows.lock().unwrap().push(row);

    let Value::Object(mut echoed) = body else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    echoed.remove("tonaj");
    echoed.insert("id".to_string(), json!(id));
    echoed.insert("kayitTarihi".to_string(), json!(kayit_tarihi));
    Json(Value::Object(echoed)).into_response()
}

async fn fetch(State(state): State<Arc<MockState>>, Path(id): Path<String>) -> Response {
    state.pause().await;
    let wanted = parse_id(&id);
    let rows = state.rows.lock().unwrap();
    match rows.iter().find(|r| wanted.is_some() && r["id"].as_i64() == wanted) {
        Some(row) => Json(Value::Object(row.clone())).into_response(),
        None => not_found(),
    }
}

async fn update(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    state.pause().await;
    let wanted = parse_id(&id);
    let incoming = fields::to_wire(body.clone());

    {
        let mut rows = state.rows.lock().unwrap();
        let Some(row) = rows
            .iter_mut()
            .find(|r| wanted.is_some() && r["id"].as_i64() == wanted)
        else {
            return not_found();
        };
        for column in EDITABLE_COLUMNS {
            if let Some(value) = incoming.get(*column) {
                row.insert(column.to_string(), value.clone());
            }
        }
    }

    let Value::Object(mut echoed) = body else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    echoed.remove("tonaj");
    echoed.remove("kayitTarihi");
    echoed.insert("id".to_string(), json!(id));
    Json(Value::Object(echoed)).into_response()
}

async fn remove(State(state): State<Arc<MockState>>, Path(id): Path<String>) -> Response {
    state.pause().await;
    let Some(wanted) = parse_id(&id) else {
        return not_found();
    };
    if state.fail_deletes.lock().unwrap().contains(&wanted) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "SQLITE_BUSY" })),
        )
            .into_response();
    }

    let mut rows = state.rows.lock().unwrap();
    let before = rows.len();
    rows.retain(|r| r["id"].as_i64() != Some(wanted));
    if rows.len() == before {
        return not_found();
    }
    Json(json!({ "message": "Kayıt başarıyla silindi" })).into_response()
}

async fn search(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.pause().await;
    state.searches.lock().unwrap().push(params.clone());

    let non_empty = |key: &str| params.get(key).filter(|v| !v.is_empty());
    let term = non_empty("searchTerm").map(|t| t.to_ascii_lowercase());
    let durum = non_empty("filterDurum");
    let vardiya = non_empty("filterVardiya");

    let rows: Vec<_> = state
        .sorted_rows()
        .into_iter()
        .filter(|row| {
            let text = |column: &str| row[column].as_str().unwrap_or_default().to_string();
            let term_ok = term.as_ref().is_none_or(|t| {
                SEARCH_COLUMNS
                    .iter()
                    .any(|c| text(*c).to_ascii_lowercase().contains(t.as_str()))
            });
            let durum_ok = durum.is_none_or(|d| text("durum_tipi") == *d);
            let vardiya_ok = vardiya.is_none_or(|v| text("vardiya") == *v);
            term_ok && durum_ok && vardiya_ok
        })
        .collect();
    Json(rows).into_response()
}
