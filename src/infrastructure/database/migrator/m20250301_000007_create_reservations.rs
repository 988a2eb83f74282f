//! Create reservations table
//!
//! Seat accounting depends on the conditional update in the trip
//! repository; the schema only has to make the lookups cheap.

use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_users::Users;
use super::m20250301_000005_create_trips::Trips;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reservations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reservations::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reservations::TripId).string().not_null())
                    .col(
                        ColumnDef::new(Reservations::PassengerId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Reservations::Seats).integer().not_null())
                    .col(
                        ColumnDef::new(Reservations::PickupPoints)
                            .string()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Reservations::PaymentMethod)
                            .string()
                            .not_null()
                            .default("cash"),
                    )
                    .col(
                        ColumnDef::new(Reservations::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Reservations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Reservations::DecisionAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservations_trip")
                            .from(Reservations::Table, Reservations::TripId)
                            .to(Trips::Table, Trips::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservations_passenger")
                            .from(Reservations::Table, Reservations::PassengerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_trip_passenger")
                    .table(Reservations::Table)
                    .col(Reservations::TripId)
                    .col(Reservations::PassengerId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reservations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Reservations {
    Table,
    Id,
    TripId,
    PassengerId,
    Seats,
    PickupPoints,
    PaymentMethod,
    Status,
    CreatedAt,
    DecisionAt,
}
