#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{Request, Response},
    middleware,
    response::IntoResponse,
    routing::get,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use storefront::auth::{
    Authenticated, NEW_ACCESS_TOKEN_HEADER, Principal, REFRESH_TOKEN_HEADER, UserLookup,
    UserRecord, auto_refresh, require_auth,
};
use storefront::db::UserRole;
use storefront::impl_has_auth_backend;
use storefront::jwt::{TokenConfig, TokenService};

pub const ACCESS_SECRET: &[u8] = b"test-access-secret-for-integration-tests";
pub const REFRESH_SECRET: &[u8] = b"test-refresh-secret-for-integration-tests";

pub fn token_config() -> TokenConfig {
    TokenConfig::new(ACCESS_SECRET, REFRESH_SECRET)
}

pub fn token_service() -> TokenService {
    TokenService::new(&token_config())
}

/// Token service signing with secrets the server does not know.
pub fn foreign_token_service() -> TokenService {
    TokenService::new(&TokenConfig::new(
        b"some-other-access-secret-not-known-to-server".as_slice(),
        b"some-other-refresh-secret-not-known-to-server".as_slice(),
    ))
}

pub fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

pub fn user(id: i64) -> Principal {
    Principal {
        id,
        role: UserRole::User,
    }
}

/// An access token that expired half an hour ago.
pub fn expired_access_token(tokens: &TokenService, principal: &Principal) -> String {
    tokens
        .issue_access_token_at(principal, now() - 60 * 60)
        .unwrap()
}

/// In-memory user store that counts lookups.
#[derive(Clone, Default)]
pub struct CountingUserStore {
    users: Arc<Mutex<HashMap<i64, UserRecord>>>,
    lookups: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl CountingUserStore {
    pub fn insert(&self, id: i64, role: UserRole, refresh_token: Option<&str>) {
        self.users.lock().unwrap().insert(
            id,
            UserRecord {
                id,
                role,
                refresh_token: refresh_token.map(str::to_string),
            },
        );
    }

    pub fn get(&self, id: i64) -> Option<UserRecord> {
        self.users.lock().unwrap().get(&id).cloned()
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn fail_lookups(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

impl UserLookup for CountingUserStore {
    type Error = String;

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, String> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err("store unavailable".to_string());
        }
        Ok(self.get(id))
    }
}

#[derive(Clone)]
pub struct TestState {
    pub tokens: Arc<TokenService>,
    pub users: CountingUserStore,
    pub handled: Arc<AtomicUsize>,
}

impl_has_auth_backend!(TestState, CountingUserStore);

impl TestState {
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(token_service()),
            users: CountingUserStore::default(),
            handled: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn handled(&self) -> usize {
        self.handled.load(Ordering::SeqCst)
    }
}

/// Which middlewares guard the test route.
#[derive(Clone, Copy)]
pub enum Chain {
    Auth,
    AutoRefresh,
    AutoRefreshThenAuth,
}

async fn whoami(
    State(state): State<TestState>,
    Authenticated(principal): Authenticated,
) -> impl IntoResponse {
    state.handled.fetch_add(1, Ordering::SeqCst);
    Json(principal)
}

/// Router with a single `/whoami` route behind the given middleware chain.
pub fn test_router(state: &TestState, chain: Chain) -> Router {
    let router = Router::new().route("/whoami", get(whoami));

    let router = match chain {
        Chain::Auth => router.route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth::<TestState>,
        )),
        Chain::AutoRefresh => router.route_layer(middleware::from_fn_with_state(
            state.clone(),
            auto_refresh::<TestState>,
        )),
        // Later layers wrap earlier ones, so auto-refresh is added last
        Chain::AutoRefreshThenAuth => router
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_auth::<TestState>,
            ))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                auto_refresh::<TestState>,
            )),
    };

    router.with_state(state.clone())
}

/// Build a request with optional bearer and refresh credentials.
pub fn request(method: &str, uri: &str, access: Option<&str>, refresh: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = access {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    if let Some(token) = refresh {
        builder = builder.header(REFRESH_TOKEN_HEADER, token);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub fn new_access_token(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(NEW_ACCESS_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
