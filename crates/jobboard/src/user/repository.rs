//! User repository for database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::models::{NewUser, User};
use crate::auth::Role;

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn generate_id() -> String {
        format!("usr_{}", nanoid::nanoid!(12))
    }

    /// Insert a new user.
    ///
    /// Relies on the `UNIQUE(email)` constraint for duplicate detection; a
    /// violation surfaces as a `sqlx::Error::Database` in the error chain.
    #[instrument(skip(self, user), fields(email = %user.email, role = %user.role))]
    pub async fn create(&self, user: NewUser) -> Result<User> {
        let id = Self::generate_id();
        debug!("Creating user: {} ({})", user.email, id);

        sqlx::query(
            r#"
            INSERT INTO users (user_id, name, email, password_hash, role)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .execute(&self.pool)
        .await
        .context("Failed to insert user")?;

        self.get(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found after creation"))
    }

    /// Get a user by ID.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, name, email, password_hash, role, created_at
            FROM users
            WHERE user_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user")?;

        Ok(user)
    }

    /// Get a user by (already normalized) email.
    #[instrument(skip(self))]
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, name, email, password_hash, role, created_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user by email")?;

        Ok(user)
    }

    /// Count all users.
    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count users")?;

        Ok(count.0)
    }

    /// Count users with a given role.
    #[instrument(skip(self))]
    pub async fn count_by_role(&self, role: Role) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = ?")
            .bind(role)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count users by role")?;

        Ok(count.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, is_unique_violation};

    fn new_user(email: &str, role: Role) -> NewUser {
        NewUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: "hashed_password".to_string(),
            role,
        }
    }

    async fn repo() -> UserRepository {
        let db = Database::in_memory().await.unwrap();
        UserRepository::new(db.pool().clone())
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let repo = repo().await;

        let user = repo
            .create(new_user("test@example.com", Role::Candidate))
            .await
            .unwrap();
        assert!(user.user_id.starts_with("usr_"));
        assert_eq!(user.email, "test@example.com");
        assert_eq!(user.role, Role::Candidate);
        assert!(!user.created_at.is_empty());

        let fetched = repo.get(&user.user_id).await.unwrap().unwrap();
        assert_eq!(fetched.user_id, user.user_id);

        let by_email = repo
            .get_by_email("test@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.user_id, user.user_id);
        assert_eq!(by_email.password_hash, "hashed_password");

        assert!(repo.get("usr_missing").await.unwrap().is_none());
        assert!(repo.get_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let repo = repo().await;

        repo.create(new_user("dup@example.com", Role::Admin))
            .await
            .unwrap();
        let err = repo
            .create(new_user("dup@example.com", Role::Candidate))
            .await
            .unwrap_err();

        assert!(is_unique_violation(&err));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_counts() {
        let repo = repo().await;

        repo.create(new_user("a@example.com", Role::Admin))
            .await
            .unwrap();
        repo.create(new_user("b@example.com", Role::Candidate))
            .await
            .unwrap();
        repo.create(new_user("c@example.com", Role::Candidate))
            .await
            .unwrap();

        assert_eq!(repo.count().await.unwrap(), 3);
        assert_eq!(repo.count_by_role(Role::Candidate).await.unwrap(), 2);
        assert_eq!(repo.count_by_role(Role::Admin).await.unwrap(), 1);
    }
}
