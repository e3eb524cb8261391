//! Authentication error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::ApiError;

/// Every way an authentication or authorization check can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// `Authorization` header missing or not a bearer credential
    NoAccessToken,
    /// Same as `NoAccessToken`, reported by the auto-refresh middleware
    MissingAccessToken,
    /// Access token signature is good but it has expired
    TokenExpired,
    /// Access token rejected by the plain auth middleware
    TokenInvalid,
    /// Access token rejected by the auto-refresh middleware for a reason other than expiry
    InvalidAccessToken,
    /// Access token expired and no `x-refresh-token` header was sent
    NoRefreshToken,
    /// Refresh token failed signature or expiry verification
    RefreshInvalid,
    /// Refresh token does not match the value stored for the user, or the user is gone
    InvalidRefreshToken,
    /// Authenticated, but the route needs the admin role
    AdminRequired,
    /// User store or token signing failed
    Internal,
}

impl AuthErrorKind {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NoAccessToken
            | Self::MissingAccessToken
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::InvalidAccessToken
            | Self::NoRefreshToken => StatusCode::UNAUTHORIZED,
            Self::RefreshInvalid | Self::InvalidRefreshToken | Self::AdminRequired => {
                StatusCode::FORBIDDEN
            }
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoAccessToken | Self::MissingAccessToken => "NO_ACCESS_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenInvalid => "INVALID_TOKEN",
            Self::InvalidAccessToken => "INVALID_ACCESS_TOKEN",
            Self::NoRefreshToken => "NO_REFRESH_TOKEN",
            Self::RefreshInvalid => "REFRESH_INVALID",
            Self::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            Self::AdminRequired => "ADMIN_REQUIRED",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::NoAccessToken => "Token no proporcionado",
            Self::MissingAccessToken => "Token de acceso no proporcionado",
            Self::TokenExpired => "Token expirado",
            Self::TokenInvalid => "Token inválido",
            Self::InvalidAccessToken => "Token de acceso inválido",
            Self::NoRefreshToken => "Refresh token no proporcionado",
            Self::RefreshInvalid | Self::InvalidRefreshToken => "Refresh token inválido",
            Self::AdminRequired => "Acceso denegado: se requiere rol de administrador",
            Self::Internal => "Error interno del servidor",
        }
    }
}

impl std::fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

impl std::error::Error for AuthErrorKind {}

impl IntoResponse for AuthErrorKind {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
