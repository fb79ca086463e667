//! Application service for business logic.

use anyhow::{Result, bail};
use tracing::{info, instrument};

use super::models::{Application, ApplicationWithApplicant, ApplicationWithJob};
use super::repository::ApplicationRepository;
use crate::db::is_unique_violation;
use crate::job::JobRepository;

/// Service for job applications.
#[derive(Debug, Clone)]
pub struct ApplicationService {
    repo: ApplicationRepository,
    jobs: JobRepository,
}

impl ApplicationService {
    pub fn new(repo: ApplicationRepository, jobs: JobRepository) -> Self {
        Self { repo, jobs }
    }

    /// Apply `user_id` to `job_id`. At most one application per pair.
    #[instrument(skip(self))]
    pub async fn apply(&self, user_id: &str, job_id: &str) -> Result<Application> {
        if !self.jobs.exists(job_id).await? {
            bail!("Job not found");
        }

        let application = match self.repo.create(user_id, job_id).await {
            Ok(application) => application,
            Err(e) if is_unique_violation(&e) => bail!("You have already applied to this job"),
            Err(e) => return Err(e),
        };

        info!(
            application_id = %application.application_id,
            user_id = %user_id,
            job_id = %job_id,
            "Application submitted"
        );
        Ok(application)
    }

    #[instrument(skip(self))]
    pub async fn applications_by(&self, user_id: &str) -> Result<Vec<ApplicationWithJob>> {
        self.repo.list_for_user(user_id).await
    }

    /// Applications to a job. Errors with "Job not found" for an unknown job.
    #[instrument(skip(self))]
    pub async fn applications_for(&self, job_id: &str) -> Result<Vec<ApplicationWithApplicant>> {
        if !self.jobs.exists(job_id).await? {
            bail!("Job not found");
        }
        self.repo.list_for_job(job_id).await
    }

    #[instrument(skip(self))]
    pub async fn count_for_creator(&self, created_by: &str) -> Result<i64> {
        self.repo.count_for_creator(created_by).await
    }
}
