//! Integration tests for the Shopfront client.
//!
//! Tests drive the real [`HttpApiClient`] and [`FileStore`] against
//! [`MockBackend`], an in-process axum server that speaks the storefront
//! JSON API on a random local port.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```
//!
//! # Mock Backend Behaviour
//!
//! - `login`/`register` set a `sid` cookie; `edit-profile` and `checkout`
//!   require it (401 otherwise)
//! - `register` answers 403 for a taken username
//! - `checkout` answers 409 if any line's product was marked unavailable
//! - `logout` can be scripted to fail with 500
//! - sessions can be expired, as if the backend restarted

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Map, Value, json};
use tempfile::TempDir;
use url::Url;

use shopfront_client::api::HttpApiClient;
use shopfront_client::config::ApiConfig;
use shopfront_client::storage::FileStore;

const SESSION_COOKIE: &str = "sid";

/// In-process storefront backend.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct MockBackend {
    inner: Arc<Mutex<BackendState>>,
}

#[derive(Default)]
struct BackendState {
    /// username -> (password, user record)
    accounts: HashMap<String, (String, Map<String, Value>)>,
    /// session id -> username
    sessions: HashMap<String, String>,
    next_session: u64,
    unavailable: HashSet<String>,
    images: Vec<Value>,
    orders: Vec<Value>,
    profile_edits: Vec<Value>,
    fail_logout: bool,
    delay: Option<Duration>,
}

impl MockBackend {
    /// Start a backend on `127.0.0.1` with an OS-assigned port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> (Self, Url) {
        let backend = Self {
            inner: Arc::new(Mutex::new(BackendState::default())),
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Failed to read local address");

        let app = router(backend.clone());
        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Mock backend failed");
        });

        let url = Url::parse(&format!("http://{addr}/")).expect("Invalid backend URL");
        (backend, url)
    }

    fn state(&self) -> MutexGuard<'_, BackendState> {
        self.inner.lock().expect("Mock backend state poisoned")
    }

    /// Create an account directly, without logging in.
    pub fn seed_account(&self, username: &str, password: &str, email: &str) {
        let user = json!({
            "username": username,
            "full_name": format!("{username} Tester"),
            "email": email,
            "address": "1 Test Lane",
            "phone_number": "555-010-0000",
            "loyalty_tier": "gold"
        });
        let Value::Object(user) = user else {
            unreachable!("literal is an object")
        };
        self.state()
            .accounts
            .insert(username.to_string(), (password.to_string(), user));
    }

    /// Make checkout refuse orders containing `product_id`.
    pub fn mark_unavailable(&self, product_id: &Value) {
        self.state().unavailable.insert(product_id.to_string());
    }

    /// Images served by `/api/product-images`.
    pub fn set_images(&self, images: Vec<Value>) {
        self.state().images = images;
    }

    /// Make logout answer 500.
    pub fn fail_logout(&self, fail: bool) {
        self.state().fail_logout = fail;
    }

    /// Hold every response for `delay`.
    pub fn set_delay(&self, delay: Duration) {
        self.state().delay = Some(delay);
    }

    /// Accepted checkout bodies.
    pub fn orders(&self) -> Vec<Value> {
        self.state().orders.clone()
    }

    /// Accepted edit-profile bodies.
    pub fn profile_edits(&self) -> Vec<Value> {
        self.state().profile_edits.clone()
    }

    /// Stored record for `username`.
    pub fn account(&self, username: &str) -> Option<Map<String, Value>> {
        self.state()
            .accounts
            .get(username)
            .map(|(_, user)| user.clone())
    }

    /// Number of live backend sessions.
    pub fn session_count(&self) -> usize {
        self.state().sessions.len()
    }

    /// Forget every session, as a backend restart would.
    pub fn expire_sessions(&self) {
        self.state().sessions.clear();
    }

    fn open_session(&self, username: &str) -> String {
        let mut state = self.state();
        state.next_session += 1;
        let sid = format!("session-{}", state.next_session);
        state.sessions.insert(sid.clone(), username.to_string());
        sid
    }

    fn session_user(&self, headers: &HeaderMap) -> Option<String> {
        let sid = session_id(headers)?;
        self.state().sessions.get(&sid).cloned()
    }

    async fn pause(&self) {
        let delay = self.state().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn router(backend: MockBackend) -> Router {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/register", post(register))
        .route("/api/logout", post(logout))
        .route("/api/edit-profile", post(edit_profile))
        .route("/api/product-images", get(product_images))
        .route("/api/checkout", post(checkout))
        .with_state(backend)
}

// =============================================================================
// Handlers
// =============================================================================

async fn login(State(backend): State<MockBackend>, Json(body): Json<Value>) -> Response {
    backend.pause().await;

    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let user = {
        let state = backend.state();
        match state.accounts.get(username) {
            Some((expected, user)) if expected == password => user.clone(),
            _ => return (StatusCode::UNAUTHORIZED, "Invalid credentials").into_response(),
        }
    };

    with_session(&backend, username, user)
}

async fn register(State(backend): State<MockBackend>, Json(body): Json<Value>) -> Response {
    backend.pause().await;

    let Value::Object(mut fields) = body else {
        return (StatusCode::BAD_REQUEST, "Expected an object").into_response();
    };
    let Some(username) = fields.get("username").and_then(Value::as_str).map(String::from)
    else {
        return (StatusCode::BAD_REQUEST, "Missing username").into_response();
    };
    let password = match fields.remove("password") {
        Some(Value::String(password)) => password,
        _ => return (StatusCode::BAD_REQUEST, "Missing password").into_response(),
    };

    {
        let mut state = backend.state();
        if state.accounts.contains_key(&username) {
            return (StatusCode::FORBIDDEN, "Username already exists").into_response();
        }
        state
            .accounts
            .insert(username.clone(), (password, fields.clone()));
    }

    with_session(&backend, &username, fields)
}

async fn logout(State(backend): State<MockBackend>, headers: HeaderMap) -> Response {
    backend.pause().await;

    let mut state = backend.state();
    if state.fail_logout {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Logout unavailable").into_response();
    }
    if let Some(sid) = session_id(&headers) {
        state.sessions.remove(&sid);
    }
    (StatusCode::OK, Json(json!({}))).into_response()
}

async fn edit_profile(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    backend.pause().await;

    let Some(username) = backend.session_user(&headers) else {
        return (StatusCode::UNAUTHORIZED, "Not logged in").into_response();
    };
    let Value::Object(patch) = body.clone() else {
        return (StatusCode::BAD_REQUEST, "Expected an object").into_response();
    };

    let mut state = backend.state();
    if let Some((password, user)) = state.accounts.get_mut(&username) {
        for (key, value) in patch {
            if key == "password" {
                *password = value.as_str().unwrap_or_default().to_string();
            } else {
                user.insert(key, value);
            }
        }
    }
    state.profile_edits.push(body);
    (StatusCode::OK, Json(json!({}))).into_response()
}

async fn product_images(State(backend): State<MockBackend>) -> Response {
    backend.pause().await;
    Json(Value::Array(backend.state().images.clone())).into_response()
}

async fn checkout(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    backend.pause().await;

    if backend.session_user(&headers).is_none() {
        return (StatusCode::UNAUTHORIZED, "Not logged in").into_response();
    }

    let mut state = backend.state();
    let lines = body["cart"].as_array().cloned().unwrap_or_default();
    if let Some(line) = lines
        .iter()
        .find(|line| state.unavailable.contains(&line["productID"].to_string()))
    {
        return (
            StatusCode::CONFLICT,
            format!("Product {} is no longer available", line["productID"]),
        )
            .into_response();
    }

    state.orders.push(body);
    (StatusCode::OK, Json(json!({"status": "ok"}))).into_response()
}

// =============================================================================
// Helper Functions
// =============================================================================

fn with_session(backend: &MockBackend, username: &str, user: Map<String, Value>) -> Response {
    let sid = backend.open_session(username);
    (
        StatusCode::OK,
        [(header::SET_COOKIE, format!("{SESSION_COOKIE}={sid}; Path=/; HttpOnly"))],
        Json(Value::Object(user)),
    )
        .into_response()
}

fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

// =============================================================================
// Test Context
// =============================================================================

/// A running backend plus a client and a fresh on-disk store.
pub struct TestContext {
    pub backend: MockBackend,
    pub api: Arc<HttpApiClient>,
    pub store: Arc<FileStore>,
    pub base_url: Url,
    _dir: TempDir,
}

impl TestContext {
    /// Start a backend and point a client at it.
    ///
    /// # Panics
    ///
    /// Panics if the backend, client, or store cannot be set up.
    pub async fn new() -> Self {
        Self::with_timeout(Duration::from_secs(5)).await
    }

    /// Like [`TestContext::new`] with a custom request timeout.
    ///
    /// # Panics
    ///
    /// Panics if the backend, client, or store cannot be set up.
    pub async fn with_timeout(request_timeout: Duration) -> Self {
        let (backend, base_url) = MockBackend::start().await;
        let api = HttpApiClient::new(&ApiConfig {
            base_url: base_url.clone(),
            request_timeout,
        })
        .expect("Failed to create HTTP client");

        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileStore::new(dir.path(), "shopfront").expect("Failed to open store");

        Self {
            backend,
            api: Arc::new(api),
            store: Arc::new(store),
            base_url,
            _dir: dir,
        }
    }

    /// Open a second client against the same backend and store, as a new
    /// process would.
    ///
    /// The new client starts without the session cookie until it is handed
    /// the stored one.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    pub fn fresh_client(&self) -> Arc<HttpApiClient> {
        Arc::new(
            HttpApiClient::new(&ApiConfig {
                base_url: self.base_url.clone(),
                request_timeout: Duration::from_secs(5),
            })
            .expect("Failed to create HTTP client"),
        )
    }
}
