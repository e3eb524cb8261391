//! Session issuance and revocation.
//!
//! A session is the refresh token stored on the user record. Starting a new
//! session overwrites it, which revokes whatever refresh token was handed
//! out before.

use serde::Serialize;

use crate::auth::Principal;
use crate::db::{User, UserStore};
use crate::jwt::{JwtError, TokenService};

/// Tokens handed to a client when a session starts.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Mint a token pair for `user` and store the refresh token.
pub async fn start_session(
    users: &UserStore,
    tokens: &TokenService,
    user: &User,
) -> Result<TokenPair, SessionError> {
    let principal = Principal {
        id: user.id,
        role: user.role,
    };

    let access_token = tokens.issue_access_token(&principal)?;
    let refresh_token = tokens.issue_refresh_token(&principal)?;

    if !users.set_refresh_token(user.id, &refresh_token).await? {
        return Err(SessionError::UserNotFound);
    }

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Drop the stored refresh token. Returns false if the user does not exist.
pub async fn end_session(users: &UserStore, user_id: i64) -> Result<bool, SessionError> {
    Ok(users.clear_refresh_token(user_id).await?)
}

/// Errors that can occur while starting or ending a session.
#[derive(Debug)]
pub enum SessionError {
    /// Token could not be signed
    Token(JwtError),
    /// Database error
    Database(sqlx::Error),
    /// User vanished between lookup and update
    UserNotFound,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Token(e) => write!(f, "{}", e),
            SessionError::Database(e) => write!(f, "Database error: {}", e),
            SessionError::UserNotFound => write!(f, "User not found"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<JwtError> for SessionError {
    fn from(e: JwtError) -> Self {
        SessionError::Token(e)
    }
}

impl From<sqlx::Error> for SessionError {
    fn from(e: sqlx::Error) -> Self {
        SessionError::Database(e)
    }
}
