//! In-process mock gateway for integration tests.
//!
//! Boots an axum server on an unused port emulating the hosted service's
//! auth and table endpoints, with scriptable table state and failure
//! injection. The subject under test is the client, so the server runs
//! in-process rather than as a spawned binary.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use uuid::Uuid;

use finboard::config::SessionConfig;
use finboard::gateway::Gateway;
use finboard::records::Role;
use finboard::session::SessionManager;

pub struct Account {
    pub password: String,
    pub id: Uuid,
}

#[derive(Default)]
pub struct MockState {
    /// Rows per existing table. A table absent from this map does not exist.
    pub tables: HashMap<String, Vec<Value>>,
    /// Tables whose reads fail with a 500.
    pub failing_reads: Vec<String>,
    /// Tables whose inserts fail with a 500.
    pub failing_inserts: Vec<String>,
    pub accounts: HashMap<String, Account>,
    pub fail_logout: bool,
}

type Shared = Arc<Mutex<MockState>>;

pub struct MockGateway {
    pub base_url: String,
    state: Shared,
}

impl MockGateway {
    pub async fn start() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let state: Shared = Arc::new(Mutex::new(MockState::default()));

        let app = Router::new()
            .route("/auth/v1/token", post(token))
            .route("/auth/v1/signup", post(signup))
            .route("/auth/v1/logout", post(logout))
            .route("/rest/v1/:table", get(table_get).post(table_post))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind mock gateway")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
        })
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state lock poisoned")
    }

    pub fn add_account(&self, email: &str, password: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                id,
            },
        );
        id
    }

    /// Create (or replace) a table with the given rows.
    pub fn seed_table(&self, table: &str, rows: Vec<Value>) {
        self.lock().tables.insert(table.to_string(), rows);
    }

    pub fn fail_reads(&self, table: &str) {
        self.lock().failing_reads.push(table.to_string());
    }

    pub fn fail_inserts(&self, table: &str) {
        self.lock().failing_inserts.push(table.to_string());
    }

    pub fn set_fail_logout(&self, fail: bool) {
        self.lock().fail_logout = fail;
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock().tables.get(table).cloned().unwrap_or_default()
    }

    pub fn client(&self) -> Gateway {
        Gateway::new(&self.base_url, "test-anon-key", std::time::Duration::from_secs(5))
            .expect("mock gateway client")
    }

    pub fn session_manager(&self) -> Arc<SessionManager> {
        self.session_manager_with_default(Role::Ic)
    }

    pub fn session_manager_with_default(&self, default_role: Role) -> Arc<SessionManager> {
        let config = SessionConfig {
            default_role,
            refresh_leeway_secs: 60,
        };
        Arc::new(SessionManager::new(Arc::new(self.client()), &config))
    }
}

fn token_response(id: Uuid, email: &str) -> Value {
    json!({
        "access_token": format!("access-{}", Uuid::new_v4()),
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": format!("refresh-{}", Uuid::new_v4()),
        "user": { "id": id, "email": email }
    })
}

async fn token(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let state = state.lock().expect("mock state lock poisoned");

    match params.get("grant_type").map(String::as_str) {
        Some("password") => {
            let email = body["email"].as_str().unwrap_or_default();
            let password = body["password"].as_str().unwrap_or_default();

            match state.accounts.get(email) {
                Some(account) if account.password == password => {
                    (StatusCode::OK, Json(token_response(account.id, email)))
                }
                _ => (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_grant",
                        "error_description": "Invalid login credentials"
                    })),
                ),
            }
        }
        Some("refresh_token") => {
            let refresh = body["refresh_token"].as_str().unwrap_or_default();
            if refresh.starts_with("refresh-") {
                // Any account works for the refreshed identity in tests
                let (email, account) = state
                    .accounts
                    .iter()
                    .next()
                    .map(|(e, a)| (e.clone(), a.id))
                    .unwrap_or_else(|| ("refreshed@example.com".to_string(), Uuid::new_v4()));
                (StatusCode::OK, Json(token_response(account, &email)))
            } else {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_grant",
                        "error_description": "Invalid Refresh Token"
                    })),
                )
            }
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "unsupported_grant_type" })),
        ),
    }
}

async fn signup(State(state): State<Shared>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().expect("mock state lock poisoned");

    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();

    if state.accounts.contains_key(&email) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "msg": "User already registered" })),
        );
    }
    if password.len() < 6 {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "msg": "Password should be at least 6 characters" })),
        );
    }

    let id = Uuid::new_v4();
    state.accounts.insert(email.clone(), Account { password, id });

    // Email confirmation pending: user object, no access_token
    (
        StatusCode::OK,
        Json(json!({ "id": id, "email": email, "confirmation_sent_at": "2024-01-01T00:00:00Z" })),
    )
}

async fn logout(State(state): State<Shared>) -> axum::response::Response {
    use axum::response::IntoResponse;

    let state = state.lock().expect("mock state lock poisoned");
    if state.fail_logout {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "logout backend unavailable" })),
        )
            .into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

fn relation_missing(table: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "code": "42P01",
            "message": format!("relation \"public.{}\" does not exist", table)
        })),
    )
}

fn value_as_comparable(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn apply_filters(rows: &[Value], params: &[(String, String)]) -> Vec<Value> {
    let mut out: Vec<Value> = rows
        .iter()
        .filter(|row| {
            params.iter().all(|(key, raw)| {
                if matches!(key.as_str(), "select" | "order" | "limit" | "offset") {
                    return true;
                }
                let Some((op, expected)) = raw.split_once('.') else {
                    return true;
                };
                let actual = row.get(key).map(value_as_comparable).unwrap_or_default();
                match op {
                    "eq" => actual == expected,
                    "neq" => actual != expected,
                    "gt" => actual.as_str() > expected,
                    "gte" => actual.as_str() >= expected,
                    "lt" => actual.as_str() < expected,
                    "lte" => actual.as_str() <= expected,
                    _ => true,
                }
            })
        })
        .cloned()
        .collect();

    if let Some((_, limit)) = params.iter().find(|(k, _)| k == "limit") {
        if let Ok(limit) = limit.parse::<usize>() {
            out.truncate(limit);
        }
    }

    out
}

async fn table_get(
    State(state): State<Shared>,
    Path(table): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> (StatusCode, Json<Value>) {
    let state = state.lock().expect("mock state lock poisoned");

    if state.failing_reads.contains(&table) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "internal error" })),
        );
    }

    match state.tables.get(&table) {
        None => relation_missing(&table),
        Some(rows) => (StatusCode::OK, Json(Value::Array(apply_filters(rows, &params)))),
    }
}

async fn table_post(
    State(state): State<Shared>,
    Path(table): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().expect("mock state lock poisoned");

    if state.failing_inserts.contains(&table) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "insert rejected" })),
        );
    }
    if !state.tables.contains_key(&table) {
        return relation_missing(&table);
    }

    let incoming = match body {
        Value::Array(rows) => rows,
        single => vec![single],
    };

    let mut inserted = Vec::new();
    for mut row in incoming {
        if row.get("id").is_none() {
            row["id"] = json!(Uuid::new_v4());
        }
        inserted.push(row.clone());
        state
            .tables
            .get_mut(&table)
            .expect("table exists")
            .push(row);
    }

    (StatusCode::CREATED, Json(Value::Array(inserted)))
}
