//! Favourite data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Favourite entity from database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Favourite {
    pub favourite_id: String,
    pub user_id: String,
    pub job_id: String,
    pub saved_at: String,
}

/// A favourite joined with the saved job.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FavouriteWithJob {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub favourite: Favourite,
    pub title: String,
    pub description: String,
    pub location: String,
    pub job_type: String,
    pub job_created_at: String,
}
