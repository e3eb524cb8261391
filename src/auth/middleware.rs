//! Authentication middleware.
//!
//! Routes are layered as auto-refresh → auth → handler. Both layers attach
//! the verified [`Principal`] to the request extensions; handlers read it with
//! [`super::Authenticated`].

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{debug, error, info};

use super::bearer::{NEW_ACCESS_TOKEN_HEADER, bearer_token, refresh_token};
use super::errors::AuthErrorKind;
use super::state::{HasAuthBackend, UserLookup};
use super::types::Principal;

/// Require a valid, unexpired access token.
///
/// Never attempts a refresh: an expired token fails with `TokenExpired`.
/// A principal already attached by [`auto_refresh`] is accepted as is.
pub async fn require_auth<S>(
    State(state): State<S>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthErrorKind>
where
    S: HasAuthBackend + Send + Sync,
{
    if request.extensions().get::<Principal>().is_none() {
        let token = bearer_token(request.headers())
            .ok_or_else(|| reject(AuthErrorKind::NoAccessToken))?;
        let principal = state.tokens().verify_access(token).map_err(reject)?;
        request.extensions_mut().insert(principal);
    }

    Ok(next.run(request).await)
}

/// Require a valid access token, renewing it when it has only expired.
///
/// On renewal the new access token is returned in the `x-new-access-token`
/// response header. The stored refresh token is left untouched.
pub async fn auto_refresh<S>(
    State(state): State<S>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthErrorKind>
where
    S: HasAuthBackend + Send + Sync,
{
    let (principal, renewed) = authenticate_or_renew(&state, request.headers())
        .await
        .map_err(reject)?;

    request.extensions_mut().insert(principal);
    let mut response = next.run(request).await;

    if let Some(token) = renewed {
        match HeaderValue::from_str(&token) {
            Ok(value) => {
                response.headers_mut().insert(NEW_ACCESS_TOKEN_HEADER, value);
            }
            Err(e) => error!(error = %e, "Renewed access token is not a valid header value"),
        }
    }

    Ok(response)
}

/// Require the attached principal to be an admin. Must run after an auth layer.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AuthErrorKind> {
    let principal = request
        .extensions()
        .get::<Principal>()
        .ok_or_else(|| reject(AuthErrorKind::NoAccessToken))?;

    if !principal.is_admin() {
        return Err(reject(AuthErrorKind::AdminRequired));
    }

    Ok(next.run(request).await)
}

/// Returns the principal and, when the access token had to be renewed, the new token.
async fn authenticate_or_renew<S>(
    state: &S,
    headers: &HeaderMap,
) -> Result<(Principal, Option<String>), AuthErrorKind>
where
    S: HasAuthBackend + Send + Sync,
{
    let access_token = bearer_token(headers).ok_or(AuthErrorKind::MissingAccessToken)?;

    match state.tokens().verify_access(access_token) {
        Ok(principal) => return Ok((principal, None)),
        Err(AuthErrorKind::TokenExpired) => {}
        Err(_) => return Err(AuthErrorKind::InvalidAccessToken),
    }

    let presented = refresh_token(headers).ok_or(AuthErrorKind::NoRefreshToken)?;
    let claims = state.tokens().verify_refresh(presented)?;

    let user = state
        .users()
        .find_by_id(claims.id)
        .await
        .map_err(|e| {
            error!(user_id = claims.id, error = %e, "Failed to look up user for refresh");
            AuthErrorKind::Internal
        })?
        .filter(|user| user.holds_refresh_token(presented))
        .ok_or(AuthErrorKind::InvalidRefreshToken)?;

    let principal = user.principal();
    let access_token = state.tokens().issue_access_token(&principal).map_err(|e| {
        error!(user_id = user.id, error = %e, "Failed to issue access token");
        AuthErrorKind::Internal
    })?;

    info!(user_id = user.id, "Access token renewed");
    Ok((principal, Some(access_token)))
}

fn reject(kind: AuthErrorKind) -> AuthErrorKind {
    debug!(code = kind.code(), "Request rejected");
    kind
}
