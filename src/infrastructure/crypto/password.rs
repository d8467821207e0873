//! Password hashing utilities

use bcrypt::{hash, verify};

/// bcrypt only reads this many bytes of input; anything longer is ignored.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hash a password using bcrypt with the given cost (4..=31)
pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    hash(password, cost)
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password, hash)
}
