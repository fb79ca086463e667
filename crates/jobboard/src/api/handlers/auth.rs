//! Registration, login and current-identity handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::api::{ApiResult, AppState, JsonBody};
use crate::auth::{AuthError, CurrentUser, LoginResponse};
use crate::user::UserInfo;

/// Registration body. Missing fields are empty and fail validation.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserInfo,
}

/// Register a new account. Does not log the user in.
pub async fn register(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AuthError> {
    let user = state
        .auth
        .register(
            &request.name,
            &request.email,
            &request.password,
            &request.role,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully",
            user,
        }),
    ))
}

/// Exchange credentials for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let response = state.auth.login(&request.email, &request.password).await?;
    Ok(Json(response))
}

/// Current user's public profile.
pub async fn me(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Json<MeResponse>> {
    let user = state.auth.me(user.id()).await?;
    Ok(Json(MeResponse { user }))
}
