//! Application state shared across handlers.

use std::sync::Arc;

use crate::application::{ApplicationRepository, ApplicationService};
use crate::auth::{AuthService, PasswordHasher, TokenIssuer};
use crate::db::Database;
use crate::favourite::{FavouriteRepository, FavouriteService};
use crate::job::{JobRepository, JobService};
use crate::user::UserRepository;

/// Application state.
///
/// Built once per process from a single [`Database`] and handed to every
/// handler by reference.
#[derive(Clone)]
pub struct AppState {
    /// Registration and login.
    pub auth: Arc<AuthService>,
    /// Token verification for the access middleware.
    pub tokens: TokenIssuer,
    /// User counts for the admin dashboard.
    pub users: UserRepository,
    pub jobs: Arc<JobService>,
    pub applications: Arc<ApplicationService>,
    pub favourites: Arc<FavouriteService>,
    /// Allowed CORS origins.
    pub allowed_origins: Vec<String>,
}

impl AppState {
    pub fn new(
        db: &Database,
        hasher: PasswordHasher,
        tokens: TokenIssuer,
        allowed_origins: Vec<String>,
    ) -> Self {
        let pool = db.pool().clone();
        let users = UserRepository::new(pool.clone());
        let jobs = JobRepository::new(pool.clone());

        Self {
            auth: Arc::new(AuthService::new(users.clone(), hasher, tokens.clone())),
            tokens,
            users,
            jobs: Arc::new(JobService::new(jobs.clone())),
            applications: Arc::new(ApplicationService::new(
                ApplicationRepository::new(pool.clone()),
                jobs.clone(),
            )),
            favourites: Arc::new(FavouriteService::new(FavouriteRepository::new(pool), jobs)),
            allowed_origins,
        }
    }
}
