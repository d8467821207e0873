use super::UserRole;

/// New user as handed to the repository. The password is already hashed.
#[derive(Debug, Clone)]
pub struct CreateUserDto {
    pub username: String,
    pub password_hash: String,
    pub role: UserRole,
}
