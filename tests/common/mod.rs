//! In-process fake of the admin backend for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub const SESSION_COOKIE: &str = "session=abc123";
pub const GOOD_PASSWORD: &str = "secret1";
pub const GOOGLE_URL: &str =
    "https://accounts.google.com/o/oauth2/auth?client_id=x&state=123e4567-e89b-12d3-a456-426614174000";

/// One request as the backend saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Option<Value>,
    pub cookie: Option<String>,
}

#[derive(Clone, Default)]
pub struct Backend {
    seen: Arc<Mutex<Vec<Recorded>>>,
}

impl Backend {
    pub fn requests(&self) -> Vec<Recorded> {
        self.seen.lock().unwrap().clone()
    }

    pub fn last(&self, path: &str) -> Option<Recorded> {
        self.requests().into_iter().rev().find(|r| r.path == path)
    }

    fn record(&self, method: &str, path: &str, query: HashMap<String, String>, body: Option<Value>, headers: &HeaderMap) {
        let cookie = headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.seen.lock().unwrap().push(Recorded {
            method: method.to_string(),
            path: path.to_string(),
            query,
            body,
            cookie,
        });
    }
}

/// Serve the fake on an ephemeral port and return its base URL.
pub async fn spawn_backend() -> (String, Backend) {
    let backend = Backend::default();
    let app = Router::new()
        .route("/api/Health", get(|| async { axum::Json(json!({ "status": "ok" })) }))
        .route("/api/v1/Auth/Login", post(login))
        .route("/api/v1/Auth/Logout", post(logout))
        .route("/api/v1/Auth/Register", post(register))
        .route("/api/v1/Auth/Google", get(google))
        .route("/api/v1/Auth/Google/Callback", get(google_callback))
        .route("/api/v1/Users", get(list_users).post(create_user))
        .route("/api/v1/Users/Roles", get(roles))
        .route("/tenant/api/v1/Client", get(list_clients).put(update_client))
        .route("/tenant/api/v1/Client/GetById", get(get_client))
        .route("/tenant/api/v1/Client/Deactivate", patch(deactivate_client))
        .route("/tenant/api/v1/Client/Delete/{id}", delete(delete_client))
        .with_state(backend.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), backend)
}

fn profile() -> Value {
    json!({
        "name": "Ana Admin",
        "email": "ana@example.com",
        "modules": ["clients"],
        "roles": ["Admin"],
        "polices": ["clients.read", "clients.write"],
        "tenantId": "t-1",
        "token": "jwt-should-not-be-stored"
    })
}

async fn login(State(backend): State<Backend>, headers: HeaderMap, body: String) -> Response {
    let body: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    backend.record("POST", "/api/v1/Auth/Login", HashMap::new(), Some(body.clone()), &headers);

    if body["password"] == GOOD_PASSWORD {
        (
            [(header::SET_COOKIE, format!("{}; Path=/; HttpOnly", SESSION_COOKIE))],
            axum::Json(json!({ "data": profile(), "success": true })),
        )
            .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            axum::Json(json!({ "message": "Invalid credentials" })),
        )
            .into_response()
    }
}

async fn logout(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    backend.record("POST", "/api/v1/Auth/Logout", HashMap::new(), None, &headers);
    (
        [(header::SET_COOKIE, "session=; Path=/; Max-Age=0".to_string())],
        axum::Json(json!({ "success": true })),
    )
        .into_response()
}

async fn register(State(backend): State<Backend>, headers: HeaderMap, body: String) -> Response {
    let body: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    backend.record("POST", "/api/v1/Auth/Register", HashMap::new(), Some(body), &headers);
    axum::Json(json!({ "data": null, "success": true, "message": "Registered" })).into_response()
}

async fn google(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    backend.record("GET", "/api/v1/Auth/Google", HashMap::new(), None, &headers);
    axum::Json(json!({ "data": GOOGLE_URL, "success": true })).into_response()
}

async fn google_callback(
    State(backend): State<Backend>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    backend.record("GET", "/api/v1/Auth/Google/Callback", query.clone(), None, &headers);
    if query.get("code").map(String::as_str) == Some("good-code") {
        (
            [(header::SET_COOKIE, format!("{}; Path=/; HttpOnly", SESSION_COOKIE))],
            axum::Json(json!({ "data": profile(), "success": true })),
        )
            .into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({ "message": "Invalid code" })),
        )
            .into_response()
    }
}

async fn list_users(
    State(backend): State<Backend>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    backend.record("GET", "/api/v1/Users", query, None, &headers);
    axum::Json(json!({
        "data": [
            { "id": "u-1", "email": "ana@example.com", "fullName": "Ana Admin", "roles": ["Admin"] }
        ],
        "pageNumber": 1,
        "totalPages": 1,
        "totalItens": 1,
        "hasPagePrevious": false,
        "hasNextPage": false,
        "success": true
    }))
    .into_response()
}

async fn create_user(State(backend): State<Backend>, headers: HeaderMap, body: String) -> Response {
    let body: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    backend.record("POST", "/api/v1/Users", HashMap::new(), Some(body), &headers);
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({
            "message": "Email already in use",
            "errors": [{ "key": "email", "message": "already taken" }]
        })),
    )
        .into_response()
}

async fn roles(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    backend.record("GET", "/api/v1/Users/Roles", HashMap::new(), None, &headers);
    axum::Json(json!({
        "data": [{ "key": "admin", "value": "Admin" }, { "key": "viewer", "value": "Viewer" }],
        "success": true
    }))
    .into_response()
}

fn client(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "fullName": name,
        "email": format!("{}@example.com", id),
        "phone": "11999990000",
        "documentNumber": "123",
        "zipCode": "01000-000",
        "paid": true,
        "isActive": true,
        "createdAt": "2024-01-15T10:30:00"
    })
}

async fn list_clients(
    State(backend): State<Backend>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    backend.record("GET", "/tenant/api/v1/Client", query.clone(), None, &headers);
    let all = [("c-1", "Ana Souza"), ("c-2", "Bruno Lima"), ("c-3", "Carla Dias")];
    let data: Vec<Value> = all
        .iter()
        .filter(|(_, name)| match query.get("src") {
            Some(src) => name.to_lowercase().contains(&src.to_lowercase()),
            None => true,
        })
        .map(|(id, name)| client(id, name))
        .collect();
    let page: u32 = query.get("PageNumber").and_then(|p| p.parse().ok()).unwrap_or(1);
    axum::Json(json!({
        "totalItens": data.len(),
        "data": data,
        "pageNumber": page,
        "totalPages": 1,
        "hasPagePrevious": page > 1,
        "hasNextPage": false,
        "success": true
    }))
    .into_response()
}

async fn get_client(
    State(backend): State<Backend>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    backend.record("GET", "/tenant/api/v1/Client/GetById", query.clone(), None, &headers);
    match query.get("Id").map(String::as_str) {
        Some("c-1") => axum::Json(json!({ "data": client("c-1", "Ana Souza"), "success": true })).into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            axum::Json(json!({ "message": "Client not found" })),
        )
            .into_response(),
    }
}

async fn update_client(State(backend): State<Backend>, headers: HeaderMap, body: String) -> Response {
    let body: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    backend.record("PUT", "/tenant/api/v1/Client", HashMap::new(), Some(body), &headers);
    axum::Json(json!({ "data": null, "success": true })).into_response()
}

async fn deactivate_client(State(backend): State<Backend>, headers: HeaderMap, body: String) -> Response {
    let body: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    backend.record("PATCH", "/tenant/api/v1/Client/Deactivate", HashMap::new(), Some(body), &headers);
    axum::Json(json!({ "data": null, "success": true })).into_response()
}

async fn delete_client(State(backend): State<Backend>, Path(id): Path<String>, headers: HeaderMap) -> Response {
    let path = format!("/tenant/api/v1/Client/Delete/{}", id);
    backend.record("DELETE", &path, HashMap::new(), None, &headers);
    StatusCode::OK.into_response()
}
