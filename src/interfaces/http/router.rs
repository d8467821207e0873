//! API Router with Swagger UI

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use super::common::{ErrorBody, MessageResponse};
use super::middleware::{admin_middleware, auth_middleware, AuthState};
use super::modules::{auth, health, users};
use super::request_id::request_id_middleware;
use crate::application::identity::UserService;
use crate::domain::UserRole;
use crate::infrastructure::database::repositories::UserRepository;

/// Everything the route table needs from the running server
pub struct RouterDeps {
    pub db: DatabaseConnection,
    pub user_service: Arc<UserService<UserRepository>>,
    pub allowed_origin: HeaderValue,
    /// Built dashboard client, served for every non-API path
    pub static_dir: Option<PathBuf>,
}

/// Unified state; each handler extracts its own slice via `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService<UserRepository>>,
    pub db: DatabaseConnection,
    pub auth: AuthState,
    pub started_at: Arc<Instant>,
}

impl FromRef<AppState> for auth::AuthHandlerState {
    fn from_ref(s: &AppState) -> Self {
        auth::AuthHandlerState {
            user_service: Arc::clone(&s.user_service),
        }
    }
}

impl FromRef<AppState> for users::UserHandlerState {
    fn from_ref(s: &AppState) -> Self {
        users::UserHandlerState {
            user_service: Arc::clone(&s.user_service),
        }
    }
}

impl FromRef<AppState> for health::HealthState {
    fn from_ref(s: &AppState) -> Self {
        health::HealthState {
            db: s.db.clone(),
            started_at: Arc::clone(&s.started_at),
        }
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(s: &AppState) -> Self {
        s.auth.clone()
    }
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by /api/login"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        users::create_user,
    ),
    components(
        schemas(
            ErrorBody,
            MessageResponse,
            UserRole,
            auth::LoginRequest,
            auth::LoginResponse,
            users::CreateUserRequest,
            health::HealthResponse,
            health::ComponentHealth,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and database reachability"),
        (name = "Authentication", description = "Credential login returning a bearer token"),
        (name = "Users", description = "Admin-only account creation"),
    ),
    info(
        title = "Service Monitor API",
        version = "1.0.0",
        description = "Authentication and user management for the service inventory dashboard",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

fn cors_layer(allowed_origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Create the API router with all routes
pub fn create_api_router(deps: RouterDeps) -> Router {
    let jwt_config = deps.user_service.jwt_config().clone();
    let state = AppState {
        user_service: deps.user_service,
        db: deps.db,
        auth: AuthState { jwt_config },
        started_at: Arc::new(Instant::now()),
    };

    // Auth routes (public)
    let auth_routes = Router::new().route("/login", post(auth::login));

    // User routes (bearer token + admin role); layers run bottom-up
    let user_routes = Router::new()
        .route("/users", post(users::create_user))
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ));

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let mut router = Router::new()
        .merge(swagger_routes)
        .route("/health", get(health::health_check))
        .nest("/api", auth_routes.merge(user_routes))
        .with_state(state);

    if let Some(dir) = deps.static_dir {
        info!(dir = %dir.display(), "Serving dashboard client");
        let index = dir.join("index.html");
        router = router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
    }

    router
        .layer(cors_layer(deps.allowed_origin))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
}
