//! Job postings.

mod models;
mod repository;
mod service;

pub use models::{Job, JobInput, JobListQuery, JobWithApplicants};
pub use repository::JobRepository;
pub use service::JobService;
