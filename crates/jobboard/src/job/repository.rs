//! Job repository for database operations.

use anyhow::{Context, Result};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, instrument};

use super::models::{Job, JobInput, JobListQuery, JobWithApplicants};

/// Repository for job database operations.
#[derive(Debug, Clone)]
pub struct JobRepository {
    pool: SqlitePool,
}

impl JobRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn generate_id() -> String {
        format!("job_{}", nanoid::nanoid!(12))
    }

    /// Insert a job owned by `created_by`.
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create(&self, created_by: &str, input: &JobInput) -> Result<Job> {
        let id = Self::generate_id();
        debug!("Creating job: {} ({})", input.title, id);

        sqlx::query(
            r#"
            INSERT INTO jobs (job_id, title, description, location, job_type, created_by)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.location)
        .bind(&input.job_type)
        .bind(created_by)
        .execute(&self.pool)
        .await
        .context("Failed to insert job")?;

        self.get(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Job not found after creation"))
    }

    /// Get a job by ID.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Option<Job>> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            SELECT job_id, title, description, location, job_type, created_by, created_at
            FROM jobs
            WHERE job_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch job")?;

        Ok(job)
    }

    /// Check whether a job exists.
    #[instrument(skip(self))]
    pub async fn exists(&self, id: &str) -> Result<bool> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs WHERE job_id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check job")?;

        Ok(count.0 > 0)
    }

    /// List jobs matching the query, newest first.
    #[instrument(skip(self))]
    pub async fn list(&self, query: &JobListQuery) -> Result<Vec<Job>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT job_id, title, description, location, job_type, created_by, created_at FROM jobs WHERE 1=1",
        );

        // instr() rather than LIKE so that % and _ in user input match literally.
        if let Some(search) = query.search() {
            let needle = search.to_lowercase();
            qb.push(" AND (instr(lower(title), ")
                .push_bind(needle.clone())
                .push(") > 0 OR instr(lower(description), ")
                .push_bind(needle)
                .push(") > 0)");
        }

        if let Some(location) = query.location() {
            qb.push(" AND instr(lower(location), ")
                .push_bind(location.to_lowercase())
                .push(") > 0");
        }

        if let Some(job_type) = query.job_type() {
            qb.push(" AND job_type = ").push_bind(job_type.to_string());
        }

        qb.push(" ORDER BY created_at DESC, rowid DESC");

        let jobs = qb
            .build_query_as::<Job>()
            .fetch_all(&self.pool)
            .await
            .context("Failed to list jobs")?;

        Ok(jobs)
    }

    /// Replace a job's editable fields. Returns `None` if it doesn't exist.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: &str, input: &JobInput) -> Result<Option<Job>> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET title = ?, description = ?, location = ?, job_type = ?
            WHERE job_id = ?
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.location)
        .bind(&input.job_type)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update job")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(id).await
    }

    /// Delete a job; its applications and favourites cascade.
    /// Returns `false` if it didn't exist.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM jobs WHERE job_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete job")?;

        Ok(result.rows_affected() > 0)
    }

    /// Jobs created by `created_by` with their applicant counts, newest first.
    #[instrument(skip(self))]
    pub async fn list_by_creator(&self, created_by: &str) -> Result<Vec<JobWithApplicants>> {
        let jobs = sqlx::query_as::<_, JobWithApplicants>(
            r#"
            SELECT j.job_id, j.title, j.description, j.location, j.job_type,
                   j.created_by, j.created_at,
                   COUNT(a.application_id) AS applicant_count
            FROM jobs j
            LEFT JOIN applications a ON a.job_id = j.job_id
            WHERE j.created_by = ?
            GROUP BY j.job_id
            ORDER BY j.created_at DESC, j.rowid DESC
            "#,
        )
        .bind(created_by)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list jobs by creator")?;

        Ok(jobs)
    }

    /// Count jobs created by `created_by`.
    #[instrument(skip(self))]
    pub async fn count_by_creator(&self, created_by: &str) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs WHERE created_by = ?")
            .bind(created_by)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count jobs")?;

        Ok(count.0)
    }
}
