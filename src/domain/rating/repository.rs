//! Driver rating lookup
//!
//! The ratings store is read-only in this system: trip listings are
//! enriched with the aggregate, but the write paths live elsewhere.

use async_trait::async_trait;

use crate::domain::DomainResult;

/// Aggregate rating of a driver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverStats {
    pub average_score: f64,
    pub rating_count: u64,
}

impl DriverStats {
    pub fn empty() -> Self {
        Self {
            average_score: 0.0,
            rating_count: 0,
        }
    }
}

#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Average score and count for one driver; zeroes when unrated
    async fn driver_stats(&self, driver_id: &str) -> DomainResult<DriverStats>;
}
