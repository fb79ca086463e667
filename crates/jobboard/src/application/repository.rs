//! Application repository for database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::models::{Application, ApplicationWithApplicant, ApplicationWithJob};

/// Repository for application database operations.
#[derive(Debug, Clone)]
pub struct ApplicationRepository {
    pool: SqlitePool,
}

impl ApplicationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn generate_id() -> String {
        format!("app_{}", nanoid::nanoid!(12))
    }

    /// Insert an application. A repeat for the same `(user_id, job_id)`
    /// fails with a UNIQUE violation in the error chain.
    #[instrument(skip(self))]
    pub async fn create(&self, user_id: &str, job_id: &str) -> Result<Application> {
        let id = Self::generate_id();
        debug!("Creating application {} for job {}", id, job_id);

        let application = sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (application_id, user_id, job_id)
            VALUES (?, ?, ?)
            RETURNING application_id, user_id, job_id, status, applied_at
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(job_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert application")?;

        Ok(application)
    }

    /// Applications made by `user_id`, with job details, newest first.
    #[instrument(skip(self))]
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<ApplicationWithJob>> {
        let applications = sqlx::query_as::<_, ApplicationWithJob>(
            r#"
            SELECT a.application_id, a.user_id, a.job_id, a.status, a.applied_at,
                   j.title, j.description, j.location, j.job_type,
                   j.created_at AS job_created_at
            FROM applications a
            JOIN jobs j ON a.job_id = j.job_id
            WHERE a.user_id = ?
            ORDER BY a.applied_at DESC, a.rowid DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list applications for user")?;

        Ok(applications)
    }

    /// Applications to `job_id`, with applicant details, newest first.
    #[instrument(skip(self))]
    pub async fn list_for_job(&self, job_id: &str) -> Result<Vec<ApplicationWithApplicant>> {
        let applications = sqlx::query_as::<_, ApplicationWithApplicant>(
            r#"
            SELECT a.application_id, a.user_id, a.job_id, a.status, a.applied_at,
                   u.name, u.email
            FROM applications a
            JOIN users u ON a.user_id = u.user_id
            WHERE a.job_id = ?
            ORDER BY a.applied_at DESC, a.rowid DESC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list applications for job")?;

        Ok(applications)
    }

    /// Count applications to jobs created by `created_by`.
    #[instrument(skip(self))]
    pub async fn count_for_creator(&self, created_by: &str) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM applications a
            JOIN jobs j ON a.job_id = j.job_id
            WHERE j.created_by = ?
            "#,
        )
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
        .context("Failed to count applications")?;

        Ok(count.0)
    }
}
