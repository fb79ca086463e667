//! Job board backend.
//!
//! Public job listings, admin-managed postings, candidate applications and
//! favourites, behind bcrypt passwords and HS256 bearer tokens.

pub mod api;
pub mod application;
pub mod auth;
pub mod db;
pub mod favourite;
pub mod job;
pub mod user;
