//! Axum extractors for authentication.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::errors::AuthErrorKind;
use super::types::Principal;

/// Extractor for the principal attached by the auth middleware.
///
/// Rejects with `NoAccessToken` when the route is not behind an auth layer.
pub struct Authenticated(pub Principal);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AuthErrorKind;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .copied()
            .map(Authenticated)
            .ok_or(AuthErrorKind::NoAccessToken)
    }
}
