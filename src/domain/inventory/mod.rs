//! Service inventory aggregate
//!
//! Client-local service records. Nothing here is ever sent to the server.

pub mod collection;
pub mod model;

pub use collection::ServiceInventory;
pub use model::{sample_services, Service, ServiceDraft, CLOUD_PROVIDERS, DEFAULT_CLOUD_PROVIDER};
