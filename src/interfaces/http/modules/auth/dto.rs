//! Authentication DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::UserRole;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub role: UserRole,
}
