pub mod api;
pub mod auth;
pub mod cli;
pub mod db;
pub mod jwt;
pub mod session;

use api::create_api_router;
use axum::Router;
use db::Database;
use jwt::{TokenConfig, TokenService};
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// Signing secrets and token lifetimes
    pub tokens: TokenConfig,
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let tokens = Arc::new(TokenService::new(&config.tokens));

    Router::new().nest("/api", create_api_router(config.db.clone(), tokens))
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    axum::serve(listener, app).await
}
