mod error;
mod session;

use axum::Router;
use std::sync::Arc;

use crate::db::Database;
use crate::jwt::TokenService;

pub use error::{ApiError, ResultExt};
pub use session::SessionState;

/// Create the API router.
pub fn create_api_router(db: Database, tokens: Arc<TokenService>) -> Router {
    let session_state = session::SessionState {
        tokens,
        users: db.users(),
    };

    Router::new().nest("/session", session::router(session_state))
}
