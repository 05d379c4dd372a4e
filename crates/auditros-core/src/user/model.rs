use serde::{Deserialize, Serialize};

use crate::clock;

/// A signed-in user. The email address is the registry key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Avatar URI
    #[serde(default)]
    pub picture: String,
    /// Epoch milliseconds of the last login
    pub last_login: i64,
}

impl AuthUser {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        picture: impl Into<String>,
    ) -> Self {
        Self {
            id: clock::wall_clock_id(),
            name: name.into(),
            email: email.into(),
            picture: picture.into(),
            last_login: clock::now_millis(),
        }
    }
}
