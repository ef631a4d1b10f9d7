//! Authentication user types.

use serde::{Deserialize, Serialize};

/// The authenticated principal carried inside a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Per-request authentication state, inserted into request extensions by
/// the `authenticate` middleware.
#[derive(Debug, Clone, Default)]
pub struct AuthContext(pub Option<Identity>);

impl AuthContext {
    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }
}
