pub mod cache;

pub use cache::RouteCache;
