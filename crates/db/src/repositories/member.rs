//! Member repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use kasku_shared::types::MemberId;

use crate::entities::members;

/// Member repository.
#[derive(Debug, Clone)]
pub struct MemberRepository {
    db: DatabaseConnection,
}

impl MemberRepository {
    /// Creates a new member repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a member by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<members::Model>, DbErr> {
        members::Entity::find()
            .filter(members::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await
    }

    /// Finds a member by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<members::Model>, DbErr> {
        members::Entity::find_by_id(id).one(&self.db).await
    }

    /// Creates a new member. Emails are stored lowercased.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails, including a duplicate
    /// email.
    pub async fn create(
        &self,
        display_name: &str,
        email: &str,
        avatar_url: Option<String>,
    ) -> Result<members::Model, DbErr> {
        let now = chrono::Utc::now().into();
        members::ActiveModel {
            id: Set(MemberId::new().into_inner()),
            display_name: Set(display_name.trim().to_string()),
            email: Set(email.trim().to_lowercase()),
            avatar_url: Set(avatar_url),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
    }
}
