//! Session-stored operator identity.

use serde::{Deserialize, Serialize};
use vitrine_core::Email;

use crate::platform::Operator;

/// The signed-in operator and the token the platform issued for them.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentOperator {
    pub id: i64,
    pub name: String,
    pub email: Email,
    /// Sent as `X-Admin-Token` on every platform call.
    pub token: String,
}

impl CurrentOperator {
    #[must_use]
    pub fn new(operator: Operator, token: String) -> Self {
        Self {
            id: operator.id,
            name: operator.name,
            email: operator.email,
            token,
        }
    }
}

impl std::fmt::Debug for CurrentOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentOperator")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Session keys for admin state.
///
/// The POS keys live in [`vitrine_core::pos`].
pub mod keys {
    /// Key for storing the current signed-in operator.
    pub const CURRENT_OPERATOR: &str = "current_operator";

    /// Key for the media picker's current selection.
    pub const MEDIA_SELECTION: &str = "media_selection";
}
