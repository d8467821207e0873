use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, SqlErr,
};

use crate::domain::{CreateUserDto, DomainError, DomainResult, User, UserRepositoryInterface, UserRole};
use crate::infrastructure::database::entities::user;

pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn user_model_to_domain(model: user::Model) -> User {
    User {
        id: model.id,
        username: model.username,
        password_hash: model.password_hash,
        role: model.role.into(),
        created_at: model.created_at,
    }
}

#[async_trait]
impl UserRepositoryInterface for UserRepository {
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User> {
        let new_user = user::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            username: Set(dto.username),
            password_hash: Set(dto.password_hash),
            role: Set(dto.role.into()),
            created_at: Set(Utc::now()),
        };

        let model = new_user.insert(&self.db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
                || e.to_string().contains("UNIQUE")
            {
                DomainError::Conflict("Username already exists".to_string())
            } else {
                e.into()
            }
        })?;

        Ok(user_model_to_domain(model))
    }

    async fn get_user_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?;

        Ok(model.map(user_model_to_domain))
    }

    async fn count_by_role(&self, role: UserRole) -> DomainResult<u64> {
        let count = user::Entity::find()
            .filter(user::Column::Role.eq(user::UserRole::from(role)))
            .count(&self.db)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm_migration::MigratorTrait;

    use super::*;
    use crate::infrastructure::database::migrator::Migrator;
    use crate::infrastructure::database::{init_database, DatabaseConfig};

    async fn repo() -> UserRepository {
        let db = init_database(&DatabaseConfig::in_memory()).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        UserRepository::new(db)
    }

    fn dto(username: &str, hash: &str, role: UserRole) -> CreateUserDto {
        CreateUserDto {
            username: username.into(),
            password_hash: hash.into(),
            role,
        }
    }

    #[tokio::test]
    async fn create_and_find() {
        let repo = repo().await;
        let created = repo
            .create_user(dto("alice", "hash-a", UserRole::Admin))
            .await
            .unwrap();

        let by_name = repo.get_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, created.id);
        assert_eq!(by_name.role, UserRole::Admin);

        assert_eq!(by_name.username, "alice");
        assert_ne!(by_name.created_at.timestamp(), 0);

        assert!(repo.get_user_by_username("ALICE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_is_conflict_and_keeps_original() {
        let repo = repo().await;
        repo.create_user(dto("bob", "original", UserRole::Reader))
            .await
            .unwrap();

        let err = repo
            .create_user(dto("bob", "replacement", UserRole::Admin))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let stored = repo.get_user_by_username("bob").await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "original");
        assert_eq!(stored.role, UserRole::Reader);
    }

    #[tokio::test]
    async fn counts_by_role() {
        let repo = repo().await;
        assert_eq!(repo.count_by_role(UserRole::Admin).await.unwrap(), 0);

        repo.create_user(dto("a1", "h", UserRole::Admin)).await.unwrap();
        repo.create_user(dto("r1", "h", UserRole::Reader)).await.unwrap();
        repo.create_user(dto("r2", "h", UserRole::Reader)).await.unwrap();

        assert_eq!(repo.count_by_role(UserRole::Admin).await.unwrap(), 1);
        assert_eq!(repo.count_by_role(UserRole::Reader).await.unwrap(), 2);
    }
}
