//! Authentication API handlers

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use super::dto::{LoginRequest, LoginResponse};
use crate::application::identity::UserService;
use crate::infrastructure::database::repositories::UserRepository;
use crate::interfaces::http::common::{ApiError, ErrorBody};

/// Auth state
#[derive(Clone)]
pub struct AuthHandlerState {
    pub user_service: Arc<UserService<UserRepository>>,
}

#[utoipa::path(
    post,
    path = "/api/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e.body_text())))?;

    let result = state
        .user_service
        .login(&request.username, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token: result.token,
        role: result.role,
    }))
}
