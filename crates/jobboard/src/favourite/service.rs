//! Favourite service for business logic.

use anyhow::{Result, bail};
use tracing::{info, instrument};

use super::models::{Favourite, FavouriteWithJob};
use super::repository::FavouriteRepository;
use crate::db::is_unique_violation;
use crate::job::JobRepository;

/// Service for saved jobs.
#[derive(Debug, Clone)]
pub struct FavouriteService {
    repo: FavouriteRepository,
    jobs: JobRepository,
}

impl FavouriteService {
    pub fn new(repo: FavouriteRepository, jobs: JobRepository) -> Self {
        Self { repo, jobs }
    }

    #[instrument(skip(self))]
    pub async fn save(&self, user_id: &str, job_id: &str) -> Result<Favourite> {
        if !self.jobs.exists(job_id).await? {
            bail!("Job not found");
        }

        let favourite = match self.repo.create(user_id, job_id).await {
            Ok(favourite) => favourite,
            Err(e) if is_unique_violation(&e) => bail!("Job already saved to favourites"),
            Err(e) => return Err(e),
        };

        info!(user_id = %user_id, job_id = %job_id, "Saved favourite");
        Ok(favourite)
    }

    /// Errors with "Favourite not found" when nothing was saved.
    #[instrument(skip(self))]
    pub async fn remove(&self, user_id: &str, job_id: &str) -> Result<()> {
        if !self.repo.delete(user_id, job_id).await? {
            bail!("Favourite not found");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn favourites_of(&self, user_id: &str) -> Result<Vec<FavouriteWithJob>> {
        self.repo.list_for_user(user_id).await
    }
}
