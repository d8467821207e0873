//! HTTP client for the auth server

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use tracing::debug;

use super::error::{DashboardError, DashboardResult};
use super::session::Session;
use crate::domain::UserRole;
use crate::interfaces::http::modules::auth::{LoginRequest, LoginResponse};
use crate::interfaces::http::modules::users::CreateUserRequest;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

/// The two server calls the dashboard makes.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> DashboardResult<Session>;

    /// Returns the server's confirmation message.
    async fn create_user(
        &self,
        token: &str,
        username: &str,
        password: &str,
        role: UserRole,
    ) -> DashboardResult<String>;
}

pub struct HttpAuthClient {
    http: ReqwestClient,
    base_url: String,
}

#[derive(Deserialize)]
struct ServerMessage {
    error: Option<String>,
    message: Option<String>,
}

impl HttpAuthClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: ReqwestClient::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn read_error(response: reqwest::Response, fallback: &str) -> DashboardError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ServerMessage>(&body)
            .ok()
            .and_then(|p| p.error)
            .unwrap_or_else(|| fallback.to_string());
        DashboardError::Api { status, message }
    }
}

impl Default for HttpAuthClient {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_URL)
    }
}

#[async_trait]
impl AuthApi for HttpAuthClient {
    async fn login(&self, username: &str, password: &str) -> DashboardResult<Session> {
        let url = format!("{}/api/login", self.base_url);
        debug!(%url, username, "Sending login request");

        let response = self
            .http
            .post(&url)
            .json(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::read_error(response, "Login failed").await);
        }

        let body: LoginResponse = response.json().await?;
        Ok(Session {
            token: body.token,
            role: body.role,
        })
    }

    async fn create_user(
        &self,
        token: &str,
        username: &str,
        password: &str,
        role: UserRole,
    ) -> DashboardResult<String> {
        let url = format!("{}/api/users", self.base_url);
        debug!(%url, username, %role, "Sending create-user request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&CreateUserRequest {
                username: username.to_string(),
                password: password.to_string(),
                role,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::read_error(response, "Failed to create user").await);
        }

        let body: ServerMessage = response.json().await?;
        Ok(body.message.unwrap_or_else(|| "User created".to_string()))
    }
}
