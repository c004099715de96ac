//! The authenticated caller.

use serde::{Deserialize, Serialize};

use pawgo_core::{UserId, UserRole};

/// Identity taken from a verified bearer token.
///
/// Minimal data carried by the token so handlers never need a user lookup
/// just to authorize a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// Role at the time the token was issued.
    pub role: UserRole,
}

impl CurrentUser {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }

    /// Whether this caller may act on a record owned by `owner`.
    ///
    /// Admins may act on anything.
    #[must_use]
    pub fn can_act_for(&self, owner: UserId) -> bool {
        self.is_admin() || self.id == owner
    }
}
