//! Cookie-based authentication.
//!
//! Two tokens: a short-lived signed session token (15 min, stateless) and a
//! long-lived opaque refresh token (1 day, stored in the database). When the
//! session token is missing or no longer verifies, the `authenticate`
//! middleware mints a new one from the refresh token.

mod cookie;
mod errors;
mod extractors;
mod middleware;
mod resolver;
mod session;
mod state;
mod types;

#[cfg(test)]
mod test_support;

pub use cookie::{
    REFRESH_COOKIE_MAX_AGE_SECS, REFRESH_COOKIE_NAME, SESSION_COOKIE_NAME, clear_cookie,
    get_cookie, refresh_cookie, session_cookie,
};
pub(crate) use cookie::build_cookie;
pub use errors::{AuthRejection, SessionError};
pub use extractors::CurrentUser;
pub use middleware::{authenticate, require_auth, require_no_auth};
pub use resolver::{Resolution, resolve_session};
pub use session::{REFRESH_TOKEN_TTL_DAYS, end_session, generate_refresh_value, start_session};
pub use state::HasAuthBackend;
pub use types::{AuthContext, Identity};
