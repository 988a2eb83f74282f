pub mod repository;

pub use repository::{DriverStats, RatingRepository};
