//! Identity: authentication and user management

pub mod service;

pub use service::{AuthResult, NewUser, UserService};
