//! JWT authentication with role-based access control.
//!
//! Dual-token system: short-lived access tokens (30 min by default,
//! stateless) and long-lived refresh tokens (7 days by default, bound to the
//! single value stored on the user record). Expired access tokens are renewed
//! transparently by the auto-refresh middleware.

mod bearer;
mod errors;
mod extractors;
mod middleware;
mod state;
mod types;

pub use bearer::{NEW_ACCESS_TOKEN_HEADER, REFRESH_TOKEN_HEADER, bearer_token, refresh_token};
pub use errors::AuthErrorKind;
pub use extractors::Authenticated;
pub use middleware::{auto_refresh, require_admin, require_auth};
pub use state::{HasAuthBackend, UserLookup};
pub use types::{Principal, UserRecord};
