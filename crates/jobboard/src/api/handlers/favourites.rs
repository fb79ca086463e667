//! Saved-job handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use super::MessageResponse;
use crate::api::{ApiResult, AppState};
use crate::auth::CurrentUser;
use crate::favourite::{Favourite, FavouriteWithJob};

#[derive(Debug, Serialize)]
pub struct SaveFavouriteResponse {
    pub message: &'static str,
    pub favourite: Favourite,
}

#[derive(Debug, Serialize)]
pub struct MyFavouritesResponse {
    pub count: usize,
    pub favourites: Vec<FavouriteWithJob>,
}

pub async fn save(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(job_id): Path<String>,
) -> ApiResult<(StatusCode, Json<SaveFavouriteResponse>)> {
    let favourite = state.favourites.save(user.id(), &job_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(SaveFavouriteResponse {
            message: "Job saved to favourites",
            favourite,
        }),
    ))
}

pub async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(job_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.favourites.remove(user.id(), &job_id).await?;
    Ok(Json(MessageResponse {
        message: "Job removed from favourites",
    }))
}

pub async fn my_favourites(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<MyFavouritesResponse>> {
    let favourites = state.favourites.favourites_of(user.id()).await?;
    Ok(Json(MyFavouritesResponse {
        count: favourites.len(),
        favourites,
    }))
}
