//! Job data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Job entity from database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub job_id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub job_type: String,
    pub created_by: String,
    pub created_at: String,
}

/// A job as seen by its creator, with the number of applications received.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobWithApplicants {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub job: Job,
    pub applicant_count: i64,
}

/// Body for creating or replacing a job.
///
/// Missing fields deserialize as empty and are rejected by validation, so
/// the client gets a field-specific message rather than a parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobInput {
    pub title: String,
    pub description: String,
    pub location: String,
    pub job_type: String,
}

impl JobInput {
    /// Trim every field and reject any that end up empty.
    pub fn normalized(&self) -> anyhow::Result<JobInput> {
        let field = |value: &str, name: &str| -> anyhow::Result<String> {
            let value = value.trim();
            if value.is_empty() {
                anyhow::bail!("{} is required", name);
            }
            Ok(value.to_string())
        };

        Ok(JobInput {
            title: field(&self.title, "Title")?,
            description: field(&self.description, "Description")?,
            location: field(&self.location, "Location")?,
            job_type: field(&self.job_type, "Job type")?,
        })
    }
}

/// Query parameters for listing jobs. Empty values are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobListQuery {
    /// Case-insensitive substring of title or description.
    pub search: Option<String>,
    /// Case-insensitive substring of location.
    pub location: Option<String>,
    /// Exact job type.
    pub job_type: Option<String>,
}

impl JobListQuery {
    pub(crate) fn search(&self) -> Option<&str> {
        non_empty(&self.search)
    }

    pub(crate) fn location(&self) -> Option<&str> {
        non_empty(&self.location)
    }

    pub(crate) fn job_type(&self) -> Option<&str> {
        non_empty(&self.job_type)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
