//! Admin views over the caller's own postings.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use crate::api::{ApiResult, AppState};
use crate::application::ApplicationWithApplicant;
use crate::auth::{CurrentUser, Role};
use crate::job::JobWithApplicants;

#[derive(Debug, Serialize)]
pub struct MyJobsResponse {
    pub count: usize,
    pub jobs: Vec<JobWithApplicants>,
}

#[derive(Debug, Serialize)]
pub struct JobApplicationsResponse {
    pub count: usize,
    pub applications: Vec<ApplicationWithApplicant>,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_jobs: i64,
    pub total_applications: i64,
    pub total_users: i64,
    pub total_candidates: i64,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub dashboard: DashboardStats,
}

/// Jobs posted by the caller, with applicant counts.
pub async fn my_jobs(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<MyJobsResponse>> {
    let jobs = state.jobs.jobs_created_by(user.id()).await?;
    Ok(Json(MyJobsResponse {
        count: jobs.len(),
        jobs,
    }))
}

pub async fn job_applications(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobApplicationsResponse>> {
    let applications = state.applications.applications_for(&job_id).await?;
    Ok(Json(JobApplicationsResponse {
        count: applications.len(),
        applications,
    }))
}

/// Totals for the caller's jobs plus site-wide user counts.
pub async fn dashboard(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<DashboardResponse>> {
    let dashboard = DashboardStats {
        total_jobs: state.jobs.count_created_by(user.id()).await?,
        total_applications: state.applications.count_for_creator(user.id()).await?,
        total_users: state.users.count().await?,
        total_candidates: state.users.count_by_role(Role::Candidate).await?,
    };
    Ok(Json(DashboardResponse { dashboard }))
}
