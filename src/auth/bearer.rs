//! Credential extraction from request headers.

use axum::http::{HeaderMap, header};

/// Request header carrying the refresh token on the auto-refresh path.
pub const REFRESH_TOKEN_HEADER: &str = "x-refresh-token";

/// Response header carrying a newly minted access token.
pub const NEW_ACCESS_TOKEN_HEADER: &str = "x-new-access-token";

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// Returns `None` when the header is missing, not valid UTF-8 or not of the
/// bearer scheme. Anything after a further space is ignored.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let rest = value.strip_prefix(BEARER_PREFIX)?;
    Some(rest.split(' ').next().unwrap_or_default())
}

/// Extract the refresh token header. An empty value counts as absent.
pub fn refresh_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(REFRESH_TOKEN_HEADER)?
        .to_str()
        .ok()
        .filter(|value| !value.is_empty())
}
