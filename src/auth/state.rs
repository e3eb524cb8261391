//! Authentication state traits and macro.

use std::future::Future;

use super::types::UserRecord;
use crate::jwt::TokenService;

/// Read access to stored users, as needed by the auto-refresh middleware.
pub trait UserLookup: Send + Sync {
    type Error: std::fmt::Display + Send;

    /// Find a user by primary key. Deleted users are not returned.
    fn find_by_id(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<UserRecord>, Self::Error>> + Send;
}

/// Trait for state types that provide token verification and user lookup.
pub trait HasAuthBackend {
    type Users: UserLookup;

    fn tokens(&self) -> &TokenService;
    fn users(&self) -> &Self::Users;
}

/// Macro to implement `HasAuthBackend` for state structs with the standard fields.
///
/// The struct must have these fields:
/// - `tokens: Arc<TokenService>`
/// - `users: <a type implementing UserLookup>`
///
/// # Example
/// ```ignore
/// use storefront::impl_has_auth_backend;
///
/// #[derive(Clone)]
/// pub struct MyState {
///     pub tokens: Arc<TokenService>,
///     pub users: UserStore,
/// }
///
/// impl_has_auth_backend!(MyState, UserStore);
/// ```
#[macro_export]
macro_rules! impl_has_auth_backend {
    ($state_type:ty, $users_type:ty) => {
        impl $crate::auth::HasAuthBackend for $state_type {
            type Users = $users_type;

            fn tokens(&self) -> &$crate::jwt::TokenService {
                &self.tokens
            }
            fn users(&self) -> &Self::Users {
                &self.users
            }
        }
    };
}
