//! Session API endpoints.
//!
//! Every route runs behind auto-refresh → auth.
//!
//! - GET `/` - Identity of the caller
//! - POST `/logout` - Revoke the caller's refresh token
//! - DELETE `/{user_id}` - Revoke another user's refresh token (admin only)

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;

use super::error::{ApiError, ResultExt};
use crate::auth::{Authenticated, auto_refresh, require_admin, require_auth};
use crate::db::UserStore;
use crate::impl_has_auth_backend;
use crate::jwt::TokenService;
use crate::session::end_session;

#[derive(Clone)]
pub struct SessionState {
    pub tokens: Arc<TokenService>,
    pub users: UserStore,
}

impl_has_auth_backend!(SessionState, UserStore);

pub fn router(state: SessionState) -> Router {
    let admin_router = Router::new()
        .route("/{user_id}", delete(revoke_session))
        .route_layer(middleware::from_fn(require_admin));

    Router::new()
        .route("/", get(current_session))
        .route("/logout", post(logout))
        .merge(admin_router)
        .route_layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auto_refresh::<SessionState>,
                ))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    require_auth::<SessionState>,
                )),
        )
        .with_state(state)
}

async fn current_session(Authenticated(principal): Authenticated) -> impl IntoResponse {
    Json(principal)
}

async fn logout(
    State(state): State<SessionState>,
    Authenticated(principal): Authenticated,
) -> Result<impl IntoResponse, ApiError> {
    end_session(&state.users, principal.id)
        .await
        .db_err("Failed to end session")?;

    info!(user_id = principal.id, "Logged out");
    Ok(StatusCode::NO_CONTENT)
}

async fn revoke_session(
    State(state): State<SessionState>,
    Authenticated(admin): Authenticated,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let revoked = end_session(&state.users, user_id)
        .await
        .db_err("Failed to revoke session")?;

    if !revoked {
        return Err(ApiError::not_found("Usuario no encontrado").with_code("USER_NOT_FOUND"));
    }

    info!(user_id, admin_id = admin.id, "Session revoked");
    Ok(StatusCode::NO_CONTENT)
}
