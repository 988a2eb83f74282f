//! Create trip_pickup_suggestions table

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
                    .table(TripPickupSuggestions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TripPickupSuggestions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TripPickupSuggestions::TripId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TripPickupSuggestions::PassengerId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TripPickupSuggestions::Name)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TripPickupSuggestions::Description).string())
                    .col(
                        ColumnDef::new(TripPickupSuggestions::Lat)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TripPickupSuggestions::Lng)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TripPickupSuggestions::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(TripPickupSuggestions::MirrorPointId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TripPickupSuggestions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trip_pickup_suggestions_trip")
                            .from(TripPickupSuggestions::Table, TripPickupSuggestions::TripId)
                            .to(Trips::Table, Trips::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trip_pickup_suggestions_passenger")
                            .from(
                                TripPickupSuggestions::Table,
                                TripPickupSuggestions::PassengerId,
                            )
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(TripPickupSuggestions::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum TripPickupSuggestions {
    Table,
    Id,
    TripId,
    PassengerId,
    Name,
    Description,
    Lat,
    Lng,
    Status,
    MirrorPointId,
    CreatedAt,
}
