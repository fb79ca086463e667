//! Favourite repository for database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::instrument;

use super::models::{Favourite, FavouriteWithJob};

/// Repository for favourite database operations.
#[derive(Debug, Clone)]
pub struct FavouriteRepository {
    pool: SqlitePool,
}

impl FavouriteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn generate_id() -> String {
        format!("fav_{}", nanoid::nanoid!(12))
    }

    /// Save a job for a user. A repeat fails with a UNIQUE violation.
    #[instrument(skip(self))]
    pub async fn create(&self, user_id: &str, job_id: &str) -> Result<Favourite> {
        let favourite = sqlx::query_as::<_, Favourite>(
            r#"
            INSERT INTO favourites (favourite_id, user_id, job_id)
            VALUES (?, ?, ?)
            RETURNING favourite_id, user_id, job_id, saved_at
            "#,
        )
        .bind(Self::generate_id())
        .bind(user_id)
        .bind(job_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert favourite")?;

        Ok(favourite)
    }

    /// Remove a saved job. Returns `false` if it wasn't saved.
    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: &str, job_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM favourites WHERE user_id = ? AND job_id = ?")
            .bind(user_id)
            .bind(job_id)
            .execute(&self.pool)
            .await
            .context("Failed to delete favourite")?;

        Ok(result.rows_affected() > 0)
    }

    /// Saved jobs for `user_id`, newest first.
    #[instrument(skip(self))]
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<FavouriteWithJob>> {
        let favourites = sqlx::query_as::<_, FavouriteWithJob>(
            r#"
            SELECT f.favourite_id, f.user_id, f.job_id, f.saved_at,
                   j.title, j.description, j.location, j.job_type,
                   j.created_at AS job_created_at
            FROM favourites f
            JOIN jobs j ON f.job_id = j.job_id
            WHERE f.user_id = ?
            ORDER BY f.saved_at DESC, f.rowid DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list favourites")?;

        Ok(favourites)
    }
}
