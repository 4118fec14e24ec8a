//! # User Repository
//!
//! Database operations for user accounts.

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use openlot_core::User;

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a new user.
    ///
    /// A duplicate email surfaces as [`crate::DbError::UniqueViolation`].
    pub async fn insert(&self, user: &User) -> DbResult<()> {
        debug!(id = %user.id, "Inserting user");

        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email (login path).
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

/// Generates a new user ID.
pub fn generate_user_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;

    fn sample_user(email: &str) -> User {
        User {
            id: generate_user_id(),
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: "argon2-hash".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = sample_user("buyer@example.com");

        db.users().insert(&user).await.unwrap();

        let found = db
            .users()
            .find_by_email("buyer@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.name, "Test User");
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.users()
            .insert(&sample_user("dup@example.com"))
            .await
            .unwrap();

        let err = db
            .users()
            .insert(&sample_user("dup@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }
}
