//! What the auth layer needs from application state.

use crate::db::Database;
use crate::jwt::JwtConfig;

/// Access to the signing key, the refresh token store and the cookie policy.
///
/// The resolver, the session lifecycle functions and the `authenticate`
/// middleware are generic over this so tests can use a small stand-in state.
pub trait HasAuthBackend {
    fn jwt(&self) -> &JwtConfig;
    fn db(&self) -> &Database;
    /// Cookies carry `Secure` when the site is served over https.
    fn secure_cookies(&self) -> bool;
}

/// Implement [`HasAuthBackend`] for a struct with `jwt: Arc<JwtConfig>`,
/// `db: Database` and `secure_cookies: bool` fields.
#[macro_export]
macro_rules! impl_has_auth_backend {
    ($state:ty) => {
        impl $crate::auth::HasAuthBackend for $state {
            fn jwt(&self) -> &$crate::jwt::JwtConfig {
                &self.jwt
            }

            fn db(&self) -> &$crate::db::Database {
                &self.db
            }

            fn secure_cookies(&self) -> bool {
                self.secure_cookies
            }
        }
    };
}
