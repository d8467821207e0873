//! Local key/value storage used by the dashboard client

mod file;
mod memory;
mod traits;

pub use file::FileStorage;
pub use memory::InMemoryStorage;
pub use traits::{KeyValueStorage, StorageError, StorageResult};
