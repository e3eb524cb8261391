//! JWT token generation and validation.
//!
//! Access tokens carry `{id, role}` and are verified by signature and expiry
//! only. Refresh tokens carry `{id}`, are signed with a separate secret and
//! are additionally bound to the value stored on the user record (see
//! [`crate::auth::auto_refresh`]).

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::auth::{AuthErrorKind, Principal};
use crate::db::UserRole;

/// Default access token lifetime: 30 minutes
pub const ACCESS_TOKEN_DURATION: Duration = Duration::from_secs(30 * 60);

/// Default refresh token lifetime: 7 days
pub const REFRESH_TOKEN_DURATION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// JWT claims for access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User ID
    pub id: i64,
    /// User role
    pub role: UserRole,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// JWT claims for refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// User ID
    pub id: i64,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Secrets and lifetimes for both token kinds, supplied at process start.
#[derive(Clone)]
pub struct TokenConfig {
    pub access_secret: Vec<u8>,
    pub refresh_secret: Vec<u8>,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl TokenConfig {
    /// Create a configuration with the default lifetimes.
    pub fn new(access_secret: impl Into<Vec<u8>>, refresh_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl: ACCESS_TOKEN_DURATION,
            refresh_ttl: REFRESH_TOKEN_DURATION,
        }
    }

    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

/// Signs and verifies access and refresh tokens.
#[derive(Clone)]
pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(&config.access_secret),
            access_decoding: DecodingKey::from_secret(&config.access_secret),
            refresh_encoding: EncodingKey::from_secret(&config.refresh_secret),
            refresh_decoding: DecodingKey::from_secret(&config.refresh_secret),
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Sign an access token for `principal`, valid from now.
    pub fn issue_access_token(&self, principal: &Principal) -> Result<String, JwtError> {
        self.issue_access_token_at(principal, unix_now()?)
    }

    /// Sign an access token as if issued at `issued_at` (Unix seconds).
    pub fn issue_access_token_at(
        &self,
        principal: &Principal,
        issued_at: u64,
    ) -> Result<String, JwtError> {
        let claims = AccessClaims {
            id: principal.id,
            role: principal.role,
            iat: issued_at,
            exp: expiry(issued_at, self.access_ttl)?,
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.access_encoding)
            .map_err(JwtError::Encoding)
    }

    /// Sign a refresh token for `principal`, valid from now.
    pub fn issue_refresh_token(&self, principal: &Principal) -> Result<String, JwtError> {
        self.issue_refresh_token_at(principal, unix_now()?)
    }

    /// Sign a refresh token as if issued at `issued_at` (Unix seconds).
    pub fn issue_refresh_token_at(
        &self,
        principal: &Principal,
        issued_at: u64,
    ) -> Result<String, JwtError> {
        let claims = RefreshClaims {
            id: principal.id,
            iat: issued_at,
            exp: expiry(issued_at, self.refresh_ttl)?,
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.refresh_encoding)
            .map_err(JwtError::Encoding)
    }

    /// Verify an access token.
    ///
    /// Fails with [`AuthErrorKind::TokenExpired`] when the signature is good but
    /// the expiry has passed, and [`AuthErrorKind::TokenInvalid`] otherwise.
    pub fn verify_access(&self, token: &str) -> Result<Principal, AuthErrorKind> {
        match jsonwebtoken::decode::<AccessClaims>(token, &self.access_decoding, &validation()) {
            Ok(data) => Ok(Principal {
                id: data.claims.id,
                role: data.claims.role,
            }),
            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => {
                Err(AuthErrorKind::TokenExpired)
            }
            Err(_) => Err(AuthErrorKind::TokenInvalid),
        }
    }

    /// Verify a refresh token.
    ///
    /// Expired and otherwise invalid tokens both fail with
    /// [`AuthErrorKind::RefreshInvalid`].
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, AuthErrorKind> {
        jsonwebtoken::decode::<RefreshClaims>(token, &self.refresh_decoding, &validation())
            .map(|data| data.claims)
            .map_err(|_| AuthErrorKind::RefreshInvalid)
    }
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation
}

fn expiry(issued_at: u64, ttl: Duration) -> Result<u64, JwtError> {
    issued_at
        .checked_add(ttl.as_secs())
        .ok_or(JwtError::ExpiryOverflow)
}

fn unix_now() -> Result<u64, JwtError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| JwtError::TimeError)
}

/// Errors that can occur while signing tokens.
#[derive(Debug)]
pub enum JwtError {
    /// Error encoding the token
    Encoding(jsonwebtoken::errors::Error),
    /// System time error
    TimeError,
    /// Issue time plus lifetime does not fit in a timestamp
    ExpiryOverflow,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            JwtError::TimeError => write!(f, "System time error"),
            JwtError::ExpiryOverflow => write!(f, "Token expiry overflows"),
        }
    }
}

impl std::error::Error for JwtError {}
