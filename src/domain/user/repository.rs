use async_trait::async_trait;

use super::{CreateUserDto, User, UserRole};
use crate::shared::DomainResult;

#[async_trait]
pub trait UserRepositoryInterface: Send + Sync {
    /// Insert a user. A taken username yields `DomainError::Conflict` and
    /// leaves the existing row untouched.
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User>;

    async fn get_user_by_username(&self, username: &str) -> DomainResult<Option<User>>;

    async fn count_by_role(&self, role: UserRole) -> DomainResult<u64>;
}
