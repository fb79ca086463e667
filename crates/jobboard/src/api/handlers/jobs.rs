//! Job listing and management handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Serialize;

use super::MessageResponse;
use crate::api::{ApiError, ApiResult, AppState, JsonBody};
use crate::auth::CurrentUser;
use crate::job::{Job, JobInput, JobListQuery};

#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub count: usize,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub job: Job,
}

#[derive(Debug, Serialize)]
pub struct JobMutationResponse {
    pub message: &'static str,
    pub job: Job,
}

/// List jobs, optionally filtered.
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> ApiResult<Json<JobListResponse>> {
    let jobs = state.jobs.list_jobs(&query).await?;
    Ok(Json(JobListResponse {
        count: jobs.len(),
        jobs,
    }))
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobResponse>> {
    let job = state
        .jobs
        .get_job(&job_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    Ok(Json(JobResponse { job }))
}

/// Post a job owned by the calling admin.
pub async fn create_job(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(input): JsonBody<JobInput>,
) -> ApiResult<(StatusCode, Json<JobMutationResponse>)> {
    let job = state.jobs.create_job(user.id(), &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(JobMutationResponse {
            message: "Job created successfully",
            job,
        }),
    ))
}

pub async fn update_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    JsonBody(input): JsonBody<JobInput>,
) -> ApiResult<Json<JobMutationResponse>> {
    let job = state
        .jobs
        .update_job(&job_id, &input)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    Ok(Json(JobMutationResponse {
        message: "Job updated successfully",
        job,
    }))
}

/// Delete a job together with its applications and favourites.
pub async fn delete_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    if !state.jobs.delete_job(&job_id).await? {
        return Err(ApiError::not_found("Job not found"));
    }
    Ok(Json(MessageResponse {
        message: "Job deleted successfully",
    }))
}
