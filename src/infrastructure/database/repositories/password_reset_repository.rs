//! SeaORM implementation of PasswordResetRepository
//!
//! Issuing a token retires every prior unused token of the same user;
//! consuming one flips it to used and rewrites the user's password hash
//! in the same transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

use crate::domain::user::{PasswordReset, PasswordResetRepository};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{password_reset, user};

pub struct SeaOrmPasswordResetRepository {
    db: DatabaseConnection,
}

impl SeaOrmPasswordResetRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: password_reset::Model) -> PasswordReset {
    PasswordReset {
        id: m.id,
        user_id: m.user_id,
        token_hash: m.token_hash,
        expires_at: m.expires_at,
        used: m.used,
        created_at: m.created_at,
    }
}

#[async_trait]
impl PasswordResetRepository for SeaOrmPasswordResetRepository {
    async fn issue(&self, reset: PasswordReset) -> DomainResult<()> {
        debug!("Issuing password-reset token for user {}", reset.user_id);
        let txn = self.db.begin().await?;

        // Retire prior unused tokens so at most one is redeemable
        password_reset::Entity::update_many()
            .col_expr(password_reset::Column::Used, Expr::value(true))
            .filter(password_reset::Column::UserId.eq(&reset.user_id))
            .filter(password_reset::Column::Used.eq(false))
            .exec(&txn)
            .await?;

        password_reset::ActiveModel {
            id: Set(reset.id),
            user_id: Set(reset.user_id),
            token_hash: Set(reset.token_hash),
            expires_at: Set(reset.expires_at),
            used: Set(reset.used),
            created_at: Set(reset.created_at),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> DomainResult<Option<PasswordReset>> {
        let model = password_reset::Entity::find()
            .filter(password_reset::Column::TokenHash.eq(token_hash))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_domain))
    }

    async fn consume(
        &self,
        token_hash: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let txn = self.db.begin().await?;

        // Guarded flip: only an unused, unexpired token passes
        let result = password_reset::Entity::update_many()
            .col_expr(password_reset::Column::Used, Expr::value(true))
            .filter(password_reset::Column::TokenHash.eq(token_hash))
            .filter(password_reset::Column::Used.eq(false))
            .filter(password_reset::Column::ExpiresAt.gt(now))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(DomainError::TokenInvalidOrExpired);
        }

        let record = password_reset::Entity::find()
            .filter(password_reset::Column::TokenHash.eq(token_hash))
            .one(&txn)
            .await?
            .ok_or(DomainError::TokenInvalidOrExpired)?;

        user::Entity::update_many()
            .col_expr(
                user::Column::PasswordHash,
                Expr::value(new_password_hash.to_string()),
            )
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::Id.eq(&record.user_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(())
    }
}
