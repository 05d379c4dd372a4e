use super::model::AuthUser;
use crate::error::Result;

/// Registry of users plus a single "current user" slot.
pub trait UserRepository: Send + Sync {
    /// All registered users in insertion order.
    fn get_registry(&self) -> Vec<AuthUser>;

    /// Upserts by email, stamps `last_login`, and makes the user current.
    ///
    /// Returns the stored record.
    fn save_user(&self, user: AuthUser) -> Result<AuthUser>;

    /// The user set by the last `save_user`, unless logged out since.
    fn get_current_user(&self) -> Option<AuthUser>;

    /// Clears the current-user slot. The registry is left intact.
    fn logout(&self) -> Result<()>;
}
