pub mod inventory;
pub mod user;

// Re-export commonly used types
pub use inventory::{Service, ServiceDraft, ServiceInventory, CLOUD_PROVIDERS};
pub use user::{CreateUserDto, UnknownRole, User, UserRepositoryInterface, UserRole};

pub use crate::shared::errors::{DomainError, DomainResult};
