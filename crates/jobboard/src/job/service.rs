//! Job service for business logic.

use anyhow::Result;
use tracing::{info, instrument};

use super::models::{Job, JobInput, JobListQuery, JobWithApplicants};
use super::repository::JobRepository;

/// Service for job management operations.
#[derive(Debug, Clone)]
pub struct JobService {
    repo: JobRepository,
}

impl JobService {
    pub fn new(repo: JobRepository) -> Self {
        Self { repo }
    }

    /// Create a job after validating its fields.
    #[instrument(skip(self, input))]
    pub async fn create_job(&self, created_by: &str, input: &JobInput) -> Result<Job> {
        let input = input.normalized()?;
        let job = self.repo.create(created_by, &input).await?;
        info!(job_id = %job.job_id, created_by = %created_by, "Created job");
        Ok(job)
    }

    #[instrument(skip(self))]
    pub async fn get_job(&self, id: &str) -> Result<Option<Job>> {
        self.repo.get(id).await
    }

    #[instrument(skip(self))]
    pub async fn list_jobs(&self, query: &JobListQuery) -> Result<Vec<Job>> {
        self.repo.list(query).await
    }

    /// Replace a job's fields. Returns `None` if the job doesn't exist.
    #[instrument(skip(self, input))]
    pub async fn update_job(&self, id: &str, input: &JobInput) -> Result<Option<Job>> {
        let input = input.normalized()?;
        let job = self.repo.update(id, &input).await?;
        if job.is_some() {
            info!(job_id = %id, "Updated job");
        }
        Ok(job)
    }

    /// Delete a job. Returns `false` if it didn't exist.
    #[instrument(skip(self))]
    pub async fn delete_job(&self, id: &str) -> Result<bool> {
        let deleted = self.repo.delete(id).await?;
        if deleted {
            info!(job_id = %id, "Deleted job");
        }
        Ok(deleted)
    }

    #[instrument(skip(self))]
    pub async fn jobs_created_by(&self, created_by: &str) -> Result<Vec<JobWithApplicants>> {
        self.repo.list_by_creator(created_by).await
    }

    #[instrument(skip(self))]
    pub async fn count_created_by(&self, created_by: &str) -> Result<i64> {
        self.repo.count_by_creator(created_by).await
    }
}
