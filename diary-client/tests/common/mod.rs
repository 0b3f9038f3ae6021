//! In-process stand-in for the diary backend.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const USER_TOKEN: &str = "user-token";
pub const ADMIN_TOKEN: &str = "admin-token";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: Option<Value>,
}

#[derive(Clone, Default)]
pub struct StubState {
    calls: Arc<Mutex<Vec<Recorded>>>,
}

impl StubState {
    fn record(&self, method: &Method, uri: &Uri, body: Option<Value>) {
        self.calls.lock().unwrap().push(Recorded {
            method: method.to_string(),
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            body,
        });
    }
}

/// Test backend instance
pub struct StubBackend {
    pub base_url: String,
    state: StubState,
}

impl StubBackend {
    pub async fn start() -> Self {
        let state = StubState::default();

        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/register", post(register))
            .route("/api/admin/auth/login", post(admin_login))
            .route("/api/diaries", get(list_diaries).post(publish))
            .route("/api/diaries/my", get(my_diaries))
            .route(
                "/api/diaries/{id}",
                get(get_diary).put(update_diary).delete(delete_diary),
            )
            .route("/api/users/me", get(me).put(update_me))
            .route("/api/users/me/avatar", put(upload_avatar))
            .route("/api/admin/diaries", get(admin_list))
            .route(
                "/api/admin/diaries/{id}/{action}",
                put(admin_action).delete(admin_action),
            )
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: &str, path: &str) -> Vec<Recorded> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method && c.path == path)
            .collect()
    }
}

pub fn diary_json(id: &str, status: &str, author_id: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Trip {}", id),
        "content": "Sunrise over the bay",
        "images": ["/uploads/a.jpg", "/uploads/b.jpg"],
        "author": { "id": author_id, "nickname": "Alice" },
        "authorId": author_id,
        "createdAt": "2024-05-01T08:30:00.000Z",
        "status": status,
    })
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn require(headers: &HeaderMap, token: &str) -> Result<(), Response> {
    match bearer(headers) {
        Some(t) if t == token => Ok(()),
        Some(_) if token == ADMIN_TOKEN => Err(error(StatusCode::FORBIDDEN, "Admins only")),
        _ => Err(error(StatusCode::UNAUTHORIZED, "Token expired")),
    }
}

async fn login(
    State(s): State<StubState>,
    method: Method,
    uri: Uri,
    Json(body): Json<Value>,
) -> Response {
    s.record(&method, &uri, Some(body.clone()));
    if body["username"] == "alice" && body["password"] == "secret" {
        Json(json!({
            "token": USER_TOKEN, "id": "u1", "username": "alice",
            "nickname": "Alice", "role": "user", "avatarUrl": null
        }))
        .into_response()
    } else {
        error(StatusCode::UNAUTHORIZED, "Invalid username or password")
    }
}

async fn admin_login(
    State(s): State<StubState>,
    method: Method,
    uri: Uri,
    Json(body): Json<Value>,
) -> Response {
    s.record(&method, &uri, Some(body));
    Json(json!({ "token": ADMIN_TOKEN, "id": "a1", "username": "root", "role": "admin" }))
        .into_response()
}

async fn register(
    State(s): State<StubState>,
    method: Method,
    uri: Uri,
    Json(body): Json<Value>,
) -> Response {
    s.record(&method, &uri, Some(body.clone()));
    if body["username"] == "taken" {
        return error(StatusCode::BAD_REQUEST, "Username already exists");
    }
    (StatusCode::CREATED, Json(json!({ "message": "Registered" }))).into_response()
}

async fn list_diaries(
    State(s): State<StubState>,
    method: Method,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    s.record(&method, &uri, None);
    let page: u32 = params
        .get("pageNumber")
        .and_then(|p| p.parse().ok())
        .unwrap_or(1);

    let diaries = if page == 1 {
        vec![
            diary_json("d1", "approved", "u1"),
            diary_json("d2", "approved", "u2"),
        ]
    } else {
        vec![diary_json("d3", "approved", "u3")]
    };

    Json(json!({ "diaries": diaries, "page": page, "pages": 2, "total": 3 })).into_response()
}

async fn my_diaries(
    State(s): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    s.record(&method, &uri, None);
    if let Err(resp) = require(&headers, USER_TOKEN) {
        return resp;
    }
    Json(json!([
        diary_json("pending-1", "pending", "u1"),
        diary_json("approved-1", "approved", "u1"),
    ]))
    .into_response()
}

async fn get_diary(
    State(s): State<StubState>,
    method: Method,
    uri: Uri,
    Path(id): Path<String>,
) -> Response {
    s.record(&method, &uri, None);
    match id.as_str() {
        "approved-1" => Json(diary_json(&id, "approved", "u1")).into_response(),
        "pending-1" => Json(diary_json(&id, "pending", "u1")).into_response(),
        _ => error(StatusCode::NOT_FOUND, "Diary not found"),
    }
}

async fn update_diary(
    State(s): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    s.record(&method, &uri, Some(body.clone()));
    if let Err(resp) = require(&headers, USER_TOKEN) {
        return resp;
    }
    let mut diary = diary_json(&id, "pending", "u1");
    diary["title"] = body["title"].clone();
    diary["content"] = body["content"].clone();
    Json(diary).into_response()
}

async fn delete_diary(
    State(s): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    s.record(&method, &uri, None);
    if let Err(resp) = require(&headers, USER_TOKEN) {
        return resp;
    }
    Json(json!({ "message": "Deleted" })).into_response()
}

async fn publish(
    State(s): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if let Err(resp) = require(&headers, USER_TOKEN) {
        s.record(&method, &uri, None);
        return resp;
    }

    let mut fields: HashMap<String, Vec<String>> = HashMap::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let value = match field.file_name() {
            Some(file_name) => file_name.to_string(),
            None => field.text().await.unwrap_or_default(),
        };
        fields.entry(name).or_default().push(value);
    }

    s.record(&method, &uri, Some(json!(fields)));

    let mut diary = diary_json("new-1", "pending", "u1");
    diary["title"] = json!(fields.get("title").and_then(|v| v.first()));
    diary["images"] = json!(fields.get("images").cloned().unwrap_or_default());
    (StatusCode::CREATED, Json(diary)).into_response()
}

async fn me(State(s): State<StubState>, method: Method, uri: Uri, headers: HeaderMap) -> Response {
    s.record(&method, &uri, None);
    if let Err(resp) = require(&headers, USER_TOKEN) {
        return resp;
    }
    Json(json!({
        "id": "u1", "username": "alice", "nickname": "Alice",
        "email": "alice@example.com", "avatarUrl": null, "role": "user"
    }))
    .into_response()
}

async fn update_me(
    State(s): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    s.record(&method, &uri, Some(body.clone()));
    if let Err(resp) = require(&headers, USER_TOKEN) {
        return resp;
    }
    Json(json!({ "id": "u1", "nickname": body["nickname"] })).into_response()
}

async fn upload_avatar(
    State(s): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    s.record(&method, &uri, None);
    if let Err(resp) = require(&headers, USER_TOKEN) {
        return resp;
    }

    // "broken.png" simulates a storage failure on the server
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.file_name() == Some("broken.png") {
            return error(StatusCode::INTERNAL_SERVER_ERROR, "disk full");
        }
    }
    Json(json!({ "avatarUrl": "/uploads/avatars/u1.png" })).into_response()
}

async fn admin_list(
    State(s): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    s.record(&method, &uri, None);
    if let Err(resp) = require(&headers, ADMIN_TOKEN) {
        return resp;
    }

    let all = vec![
        diary_json("p1", "pending", "u1"),
        diary_json("a1", "approved", "u2"),
        diary_json("r1", "rejected", "u3"),
    ];
    let diaries: Vec<Value> = match params.get("status") {
        Some(status) => all.into_iter().filter(|d| d["status"] == *status).collect(),
        None => all,
    };
    Json(json!({ "diaries": diaries })).into_response()
}

async fn admin_action(
    State(s): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let body = serde_json::from_str(&body).ok();
    s.record(&method, &uri, body);
    if let Err(resp) = require(&headers, ADMIN_TOKEN) {
        return resp;
    }
    Json(json!({ "message": "ok" })).into_response()
}
