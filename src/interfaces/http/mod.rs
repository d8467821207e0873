//! HTTP REST API
//!
//! - `common`: error/message bodies and the validating JSON extractor
//! - `middleware`: bearer JWT authentication and the admin gate
//! - `modules`: auth, users and health endpoints
//! - `request_id`: per-request correlation IDs in logs and responses
//! - `router`: route table, CORS, static client and Swagger UI

pub mod common;
pub mod middleware;
pub mod modules;
pub mod request_id;
pub mod router;

pub use router::{create_api_router, ApiDoc, RouterDeps};
