//! Candidate application handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use crate::api::{ApiResult, AppState};
use crate::application::{Application, ApplicationWithJob};
use crate::auth::CurrentUser;

#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    pub message: &'static str,
    pub application: Application,
}

#[derive(Debug, Serialize)]
pub struct MyApplicationsResponse {
    pub count: usize,
    pub applications: Vec<ApplicationWithJob>,
}

/// Apply to a job. One application per candidate and job.
pub async fn apply(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(job_id): Path<String>,
) -> ApiResult<(StatusCode, Json<ApplyResponse>)> {
    let application = state.applications.apply(user.id(), &job_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApplyResponse {
            message: "Application submitted successfully",
            application,
        }),
    ))
}

pub async fn my_applications(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<MyApplicationsResponse>> {
    let applications = state.applications.applications_by(user.id()).await?;
    Ok(Json(MyApplicationsResponse {
        count: applications.len(),
        applications,
    }))
}
