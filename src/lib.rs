//! # Service Monitor
//!
//! Service-inventory dashboard backend and client.
//!
//! ## Architecture
//!
//! - **domain**: users, roles and the service inventory
//! - **application**: identity use-cases (login, user creation, seeding)
//! - **infrastructure**: SQLite via SeaORM, JWT and bcrypt, local key/value stores
//! - **interfaces**: REST API with Swagger documentation
//! - **dashboard**: client state persisted to a local store, talking to the API
//! - **server**: runtime that wires everything together

pub mod application;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig};

// Re-export API router
pub use interfaces::http::create_api_router;

pub use dashboard::{Dashboard, DashboardError, HttpAuthClient};
pub use server::{ServerHandle, ServerOptions};
