//! Candidate applications to jobs.

mod models;
mod repository;
mod service;

pub use models::{Application, ApplicationWithApplicant, ApplicationWithJob};
pub use repository::ApplicationRepository;
pub use service::ApplicationService;
