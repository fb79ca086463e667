//! User records: the credential store behind authentication.

mod models;
mod repository;

pub use models::{NewUser, User, UserInfo};
pub use repository::UserRepository;
