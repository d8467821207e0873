use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::storage::StorageError;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Not logged in")]
    NotLoggedIn,

    #[error("This action requires the admin role")]
    AdminRequired,

    /// Non-2xx answer from the auth server, with its `error` message
    #[error("Server rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Could not reach the server: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid value stored under '{key}': {source}")]
    CorruptEntry {
        key: &'static str,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl DashboardError {
    /// True when the server refused the stored token, meaning the session is stale.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, DashboardError::Api { status: 401, .. })
    }
}

pub type DashboardResult<T> = Result<T, DashboardError>;
