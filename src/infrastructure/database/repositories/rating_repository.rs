//! SeaORM implementation of RatingRepository (read-only aggregate)

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::domain::rating::{DriverStats, RatingRepository};
use crate::domain::DomainResult;
use crate::infrastructure::database::entities::rating;

pub struct SeaOrmRatingRepository {
    db: DatabaseConnection,
}

impl SeaOrmRatingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RatingRepository for SeaOrmRatingRepository {
    async fn driver_stats(&self, driver_id: &str) -> DomainResult<DriverStats> {
        let scores: Vec<i32> = rating::Entity::find()
            .filter(rating::Column::DriverId.eq(driver_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|r| r.score)
            .collect();

        if scores.is_empty() {
            return Ok(DriverStats::empty());
        }
        let count = scores.len() as u64;
        let average = scores.iter().sum::<i32>() as f64 / count as f64;
        Ok(DriverStats {
            average_score: (average * 10.0).round() / 10.0,
            rating_count: count,
        })
    }
}
