use serde::{Deserialize, Serialize};

use crate::domain::UserRole;

/// A logged-in user as remembered by the dashboard: the bearer token and the
/// role the server reported alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub role: UserRole,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Rebuild a session from the raw stored values. Both must be present and
    /// the role must be one we know, otherwise the user is logged out.
    pub fn restore(token: Option<String>, role: Option<String>) -> Option<Self> {
        let token = token.filter(|t| !t.is_empty())?;
        let role = role?.parse().ok()?;
        Some(Self { token, role })
    }
}
