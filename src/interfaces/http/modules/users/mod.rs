//! Users module: admin-only account creation

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
