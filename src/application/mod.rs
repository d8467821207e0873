pub mod identity;

pub use identity::{AuthResult, NewUser, UserService};
