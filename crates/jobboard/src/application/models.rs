//! Application data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Application entity from database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub application_id: String,
    pub user_id: String,
    pub job_id: String,
    pub status: String,
    pub applied_at: String,
}

/// An application joined with the job it targets, for the candidate's view.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationWithJob {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub application: Application,
    pub title: String,
    pub description: String,
    pub location: String,
    pub job_type: String,
    pub job_created_at: String,
}

/// An application joined with the applicant, for the job owner's view.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationWithApplicant {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub application: Application,
    pub name: String,
    pub email: String,
}
