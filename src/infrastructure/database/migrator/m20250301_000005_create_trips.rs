//! Create trips table

use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_users::Users;
use super::m20250301_000003_create_vehicles::Vehicles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Trips::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Trips::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Trips::DriverId).string().not_null())
                    .col(ColumnDef::new(Trips::VehicleId).string().not_null())
                    .col(ColumnDef::new(Trips::Origin).string().not_null())
                    .col(ColumnDef::new(Trips::Destination).string().not_null())
                    .col(ColumnDef::new(Trips::RouteDescription).string())
                    .col(
                        ColumnDef::new(Trips::DepartureAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Trips::SeatsTotal).integer().not_null())
                    .col(ColumnDef::new(Trips::SeatsAvailable).integer().not_null())
                    .col(ColumnDef::new(Trips::PricePerSeat).double().not_null())
                    .col(ColumnDef::new(Trips::DistanceKm).double())
                    .col(ColumnDef::new(Trips::DurationMinutes).double())
                    .col(
                        ColumnDef::new(Trips::Status)
                            .string()
                            .not_null()
                            .default("scheduled"),
                    )
                    .col(
                        ColumnDef::new(Trips::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Trips::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trips_driver")
                            .from(Trips::Table, Trips::DriverId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trips_vehicle")
                            .from(Trips::Table, Trips::VehicleId)
                            .to(Vehicles::Table, Vehicles::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_trips_status_departure")
                    .table(Trips::Table)
                    .col(Trips::Status)
                    .col(Trips::DepartureAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Trips::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Trips {
    Table,
    Id,
    DriverId,
    VehicleId,
    Origin,
    Destination,
    RouteDescription,
    DepartureAt,
    SeatsTotal,
    SeatsAvailable,
    PricePerSeat,
    DistanceKm,
    DurationMinutes,
    Status,
    CreatedAt,
    UpdatedAt,
}
