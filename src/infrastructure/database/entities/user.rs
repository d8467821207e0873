//! User entity for database

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User role as stored in the `role` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum UserRole {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "reader")]
    Reader,
}

impl From<crate::domain::UserRole> for UserRole {
    fn from(role: crate::domain::UserRole) -> Self {
        match role {
            crate::domain::UserRole::Admin => UserRole::Admin,
            crate::domain::UserRole::Reader => UserRole::Reader,
        }
    }
}

impl From<UserRole> for crate::domain::UserRole {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Admin => crate::domain::UserRole::Admin,
            UserRole::Reader => crate::domain::UserRole::Reader,
        }
    }
}

/// User model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub username: String,
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
