#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use hrdesk_auth::{InMemoryTokenStore, LoginRequest};
use hrdesk_client::{ApiClient, ClientConfig, HttpDispatcher};

pub type TestClient = ApiClient<HttpDispatcher, Arc<InMemoryTokenStore>>;

/// One request as seen by the stub backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
}

/// In-process stand-in for the HR backend.
///
/// Issues rotating token pairs `A<n>`/`R<n>`: every successful login or
/// refresh invalidates the previous pair.
#[derive(Default)]
pub struct Backend {
    access: Mutex<Option<String>>,
    refresh: Mutex<Option<String>>,
    generation: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub leave_reads: AtomicUsize,
    hits: Mutex<Vec<Hit>>,
    leaves: Mutex<Vec<Value>>,
    refresh_delay: Mutex<Duration>,
    reject_me: AtomicBool,
}

impl Backend {
    /// Make the current access token unacceptable, as if it had expired.
    pub fn expire_access(&self) {
        *self.access.lock().unwrap() = None;
    }

    pub fn set_refresh_delay(&self, delay: Duration) {
        *self.refresh_delay.lock().unwrap() = delay;
    }

    /// Answer every `/auth/me` with 401, whatever the token.
    pub fn always_reject_me(&self) {
        self.reject_me.store(true, Ordering::SeqCst);
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn leave_reads(&self) -> usize {
        self.leave_reads.load(Ordering::SeqCst)
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.hits.lock().unwrap().clone()
    }

    pub fn hits_for(&self, method: &str, path: &str) -> Vec<Hit> {
        self.hits()
            .into_iter()
            .filter(|h| h.method == method && h.path == path)
            .collect()
    }

    fn mint(&self) -> (String, String) {
        let n = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let pair = (format!("A{n}"), format!("R{n}"));
        *self.access.lock().unwrap() = Some(pair.0.clone());
        *self.refresh.lock().unwrap() = Some(pair.1.clone());
        pair
    }

    fn authorized(&self, headers: &HeaderMap) -> Result<(), Response> {
        let presented = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        let valid = self.access.lock().unwrap().clone();
        match (presented, valid) {
            (Some(p), Some(v)) if p == v => Ok(()),
            _ => Err(failure(StatusCode::UNAUTHORIZED, "Invalid or expired token")),
        }
    }
}

pub struct TestServer {
    pub base_url: String,
    pub backend: Arc<Backend>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> Self {
        hrdesk_observability::init_with(hrdesk_observability::LogFormat::Pretty);
        let backend = Arc::new(Backend::default());
        let app = router(backend.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}/api", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            backend,
            handle,
        }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(self.base_url.clone(), "unused-session.json")
    }

    /// A client with an empty in-memory Token Store.
    pub fn client(&self) -> (TestClient, Arc<InMemoryTokenStore>) {
        self.client_with(Arc::new(InMemoryTokenStore::new()))
    }

    pub fn client_with(&self, tokens: Arc<InMemoryTokenStore>) -> (TestClient, Arc<InMemoryTokenStore>) {
        let dispatcher = HttpDispatcher::new(&self.config()).unwrap();
        (ApiClient::new(dispatcher, tokens.clone()), tokens)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn valid_login() -> LoginRequest {
    LoginRequest {
        email: "jane@example.com".into(),
        password: "secret".into(),
    }
}

fn router(backend: Arc<Backend>) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh-token", post(refresh_token))
        .route("/api/auth/me", get(me))
        .route("/api/leaves", post(apply_leave))
        .route("/api/leaves/my-leaves", get(my_leaves))
        .route("/api/users/pending", get(pending_users))
        .route("/api/salaries/statistics", get(salary_statistics))
        .layer(middleware::from_fn_with_state(backend.clone(), record))
        .with_state(backend)
}

async fn record(State(backend): State<Arc<Backend>>, req: Request, next: Next) -> Response {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    backend.hits.lock().unwrap().push(Hit {
        method: req.method().to_string(),
        path: req.uri().path().to_string(),
        authorization,
    });
    next.run(req).await
}

fn envelope(data: Value) -> Response {
    Json(json!({ "success": true, "message": "OK", "data": data })).into_response()
}

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "message": message }))).into_response()
}

fn user_json() -> Value {
    json!({
        "_id": "u-1",
        "username": "jane",
        "email": "jane@example.com",
        "displayName": "Jane Doe",
        "roles": ["employee", "hr"],
        "status": "active",
        "isEmailVerified": true
    })
}

async fn login(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    if body["password"] != "secret" {
        return failure(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }
    let (access, refresh) = backend.mint();
    envelope(json!({ "user": user_json(), "accessToken": access, "refreshToken": refresh }))
}

async fn refresh_token(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    backend.refresh_calls.fetch_add(1, Ordering::SeqCst);
    let delay = *backend.refresh_delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let presented = body["refreshToken"].as_str().map(str::to_string);
    let valid = backend.refresh.lock().unwrap().clone();
    if presented.is_none() || presented != valid {
        return failure(StatusCode::UNAUTHORIZED, "Invalid refresh token");
    }
    let (access, refresh) = backend.mint();
    envelope(json!({ "accessToken": access, "refreshToken": refresh }))
}

async fn me(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    if backend.reject_me.load(Ordering::SeqCst) {
        return failure(StatusCode::UNAUTHORIZED, "Invalid or expired token");
    }
    if let Err(resp) = backend.authorized(&headers) {
        return resp;
    }
    envelope(user_json())
}

async fn my_leaves(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    if let Err(resp) = backend.authorized(&headers) {
        return resp;
    }
    backend.leave_reads.fetch_add(1, Ordering::SeqCst);
    let leaves = backend.leaves.lock().unwrap().clone();
    let total = leaves.len();
    envelope(json!({
        "leaves": leaves,
        "pagination": { "total": total, "page": 1, "limit": 10, "pages": 1 }
    }))
}

async fn apply_leave(State(backend): State<Arc<Backend>>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(resp) = backend.authorized(&headers) {
        return resp;
    }
    if body["reason"] == "overlap" {
        return failure(StatusCode::BAD_REQUEST, "Leave overlaps with an existing request");
    }

    let mut leaves = backend.leaves.lock().unwrap();
    let leave = json!({
        "_id": format!("l-{}", leaves.len() + 1),
        "userId": { "_id": "u-1", "displayName": "Jane Doe" },
        "leaveType": body["leaveType"],
        "startDate": format!("{}T00:00:00.000Z", body["startDate"].as_str().unwrap_or_default()),
        "endDate": format!("{}T00:00:00.000Z", body["endDate"].as_str().unwrap_or_default()),
        "totalDays": 2,
        "reason": body["reason"],
        "status": "pending",
        "createdAt": "2024-03-01T09:00:00.000Z",
        "updatedAt": "2024-03-01T09:00:00.000Z"
    });
    leaves.push(leave.clone());
    drop(leaves);
    (StatusCode::CREATED, Json(json!({ "success": true, "message": "Leave applied", "data": leave }))).into_response()
}

async fn pending_users(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    if let Err(resp) = backend.authorized(&headers) {
        return resp;
    }
    failure(StatusCode::FORBIDDEN, "Access denied")
}

async fn salary_statistics() -> Response {
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}
