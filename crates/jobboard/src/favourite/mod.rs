//! Jobs a candidate has saved for later.

mod models;
mod repository;
mod service;

pub use models::{Favourite, FavouriteWithJob};
pub use repository::FavouriteRepository;
pub use service::FavouriteService;
