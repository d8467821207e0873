//! Reusable server runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: database init, migrations,
//! account seeding, the REST API and graceful shutdown. The CLI `serve`
//! command is a thin wrapper around it.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use crate::application::identity::{NewUser, UserService};
use crate::config::{AppConfig, SeedConfig};
use crate::domain::{DomainResult, UserRole};
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::database::repositories::UserRepository;
use crate::infrastructure::database::{init_database, DatabaseConfig};
use crate::interfaces::http::{create_api_router, RouterDeps};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// ── Options ────────────────────────────────────────────────────────

/// Options for starting the server.
pub struct ServerOptions {
    /// Application configuration.
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
    /// Seed the default accounts when no admin exists (default: true).
    /// `config.seed.enabled = false` also disables it.
    pub seed: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            seed: true,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running server.
///
/// ```rust,no_run
/// use service_monitor::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), service_monitor::server::BoxError> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Address the API is listening on (resolves port 0).
    pub local_addr: SocketAddr,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Start the server with the given options.
    ///
    /// This will:
    /// 1. Validate the configuration
    /// 2. Connect to the database and run migrations
    /// 3. Seed the default accounts (if enabled)
    /// 4. Start the REST API (with Swagger UI and the static client)
    pub async fn start(opts: ServerOptions) -> Result<Self, BoxError> {
        let app_cfg = opts.config;
        app_cfg.validate()?;

        info!("Starting service monitor...");
        if app_cfg.uses_default_secret() {
            warn!("Using the built-in development JWT secret; set SERVICE_MONITOR_JWT_SECRET in production");
        }

        // ── Database ───────────────────────────────────────────
        let db = init_database(&DatabaseConfig::from(app_cfg.database.clone())).await?;

        if opts.auto_migrate {
            info!("Running database migrations...");
            Migrator::up(&db, None).await?;
            info!("Migrations completed");
        }

        // ── Services ───────────────────────────────────────────
        let jwt_config = JwtConfig::from(&app_cfg);
        info!(
            "JWT configured with {}h token expiration",
            jwt_config.expiration_hours
        );
        let repo = Arc::new(UserRepository::new(db.clone()));
        let user_service = Arc::new(UserService::new(
            repo,
            jwt_config,
            app_cfg.security.bcrypt_cost,
        ));

        if opts.seed && app_cfg.seed.enabled {
            seed_default_accounts(&user_service, &app_cfg.seed).await?;
        }

        // ── REST API server ────────────────────────────────────
        let allowed_origin = HeaderValue::from_str(&app_cfg.server.allowed_origin)?;
        let static_dir = if app_cfg.server.static_dir.is_dir() {
            Some(app_cfg.server.static_dir.clone())
        } else {
            warn!(
                dir = %app_cfg.server.static_dir.display(),
                "Static directory not found; dashboard client will not be served"
            );
            None
        };

        let api_router = create_api_router(RouterDeps {
            db: db.clone(),
            user_service,
            allowed_origin,
            static_dir,
        });

        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        let listener = tokio::net::TcpListener::bind(app_cfg.server.address()).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API server listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let api_server = axum::serve(listener, api_router).with_graceful_shutdown(async move {
            shutdown_signal.wait().await;
            info!("REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            config: app_cfg,
            local_addr,
            db,
            shutdown,
            api_task,
        })
    }

    /// Get a cloneable shutdown signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Trigger graceful shutdown without waiting.
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the server to stop, then close the database.
    ///
    /// In-flight requests get `server.shutdown_timeout` seconds once
    /// shutdown has been triggered.
    pub async fn wait(self) {
        let signal = self.shutdown.signal();
        let timeout = self.shutdown.timeout();
        let mut api_task = self.api_task;

        tokio::select! {
            result = &mut api_task => report_api_exit(result),
            _ = signal.wait() => {
                match tokio::time::timeout(timeout, &mut api_task).await {
                    Ok(result) => report_api_exit(result),
                    Err(_) => {
                        warn!("Shutdown timeout reached, aborting in-flight requests");
                        api_task.abort();
                    }
                }
            }
        }

        if let Err(e) = self.db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("Database connection closed");
        }

        info!("Service monitor shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("Shutting down service monitor...");
        self.trigger_shutdown();
        self.wait().await;
    }

    /// Check if the server is still running.
    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

fn report_api_exit(result: Result<(), tokio::task::JoinError>) {
    match result {
        Ok(()) => info!("REST API server stopped"),
        Err(e) => error!("REST API server task panicked: {}", e),
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// What `serve --check` found
#[derive(Debug)]
pub struct PreflightReport {
    pub database_url: String,
    pub pending_migrations: usize,
}

/// Validate the configuration and confirm the database is reachable,
/// without binding a port or changing anything.
pub async fn preflight(config: &AppConfig) -> Result<PreflightReport, BoxError> {
    config.validate()?;
    HeaderValue::from_str(&config.server.allowed_origin)?;

    let db = init_database(&DatabaseConfig::from(config.database.clone())).await?;
    let pending = Migrator::get_pending_migrations(&db).await?.len();
    db.close().await?;

    Ok(PreflightReport {
        database_url: config.database.url.clone(),
        pending_migrations: pending,
    })
}

/// Insert the configured admin and reader accounts when no admin exists.
pub async fn seed_default_accounts(
    service: &UserService<UserRepository>,
    seed: &SeedConfig,
) -> DomainResult<usize> {
    let accounts = vec![
        NewUser {
            username: seed.admin_username.clone(),
            password: seed.admin_password.clone(),
            role: UserRole::Admin,
        },
        NewUser {
            username: seed.reader_username.clone(),
            password: seed.reader_password.clone(),
            role: UserRole::Reader,
        },
    ];

    let created = service.seed_if_no_admin(accounts).await?;
    if created > 0 {
        info!(
            created,
            admin = %seed.admin_username,
            reader = %seed.reader_username,
            "Seeded default accounts"
        );
        if seed.uses_default_passwords() {
            warn!("Default accounts use the built-in development passwords; change them before exposing this server");
        }
    }
    Ok(created)
}

/// Initialize tracing (logging) from the application config.
///
/// Call this once at process startup (before [`ServerHandle::start`]).
/// `RUST_LOG` takes precedence over `logging.level`.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.server.host = "127.0.0.1".into();
        cfg.server.port = 0;
        cfg.server.static_dir = "does-not-exist".into();
        cfg.database.url = "sqlite::memory:".into();
        cfg.database.max_connections = 1;
        cfg.security.jwt_secret = "server-test-secret".into();
        cfg.security.bcrypt_cost = 4;
        cfg
    }

    #[tokio::test]
    async fn serves_login_over_tcp_and_shuts_down() {
        let handle = ServerHandle::start(ServerOptions {
            config: test_config(),
            ..ServerOptions::default()
        })
        .await
        .unwrap();
        assert!(handle.is_running());

        let base = format!("http://{}", handle.local_addr);
        let client = reqwest::Client::new();

        let resp = client
            .post(format!("{base}/api/login"))
            .json(&serde_json::json!({"username": "admin", "password": "admin123"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["role"], "admin");

        let health = client.get(format!("{base}/health")).send().await.unwrap();
        assert_eq!(health.status(), 200);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn no_seed_leaves_database_empty() {
        let handle = ServerHandle::start(ServerOptions {
            config: test_config(),
            seed: false,
            ..ServerOptions::default()
        })
        .await
        .unwrap();

        let resp = reqwest::Client::new()
            .post(format!("http://{}/api/login", handle.local_addr))
            .json(&serde_json::json!({"username": "admin", "password": "admin123"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 401);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn invalid_config_refuses_to_start() {
        let mut cfg = test_config();
        cfg.security.jwt_secret = String::new();
        let result = ServerHandle::start(ServerOptions {
            config: cfg,
            ..ServerOptions::default()
        })
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn preflight_reports_pending_migrations() {
        let report = preflight(&test_config()).await.unwrap();
        assert_eq!(report.pending_migrations, 1);
    }
}
