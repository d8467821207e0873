//! User DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::identity::NewUser;
use crate::domain::UserRole;

/// Create user request
///
/// Blank usernames and empty or over-72-byte passwords are refused by
/// the identity service, also with a 422.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(max = 255, message = "username must be at most 255 characters"))]
    pub username: String,
    pub password: String,
    pub role: UserRole,
}

impl From<CreateUserRequest> for NewUser {
    fn from(req: CreateUserRequest) -> Self {
        Self {
            username: req.username,
            password: req.password,
            role: req.role,
        }
    }
}
