//! Create vehicle_pickup_points table

use sea_orm_migration::prelude::*;

use super::m20250301_000003_create_vehicles::Vehicles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VehiclePickupPoints::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VehiclePickupPoints::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(VehiclePickupPoints::VehicleId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(VehiclePickupPoints::Name).string().not_null())
                    .col(ColumnDef::new(VehiclePickupPoints::Description).string())
                    .col(ColumnDef::new(VehiclePickupPoints::Lat).double().not_null())
                    .col(ColumnDef::new(VehiclePickupPoints::Lng).double().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_pickup_points_vehicle")
                            .from(VehiclePickupPoints::Table, VehiclePickupPoints::VehicleId)
                            .to(Vehicles::Table, Vehicles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VehiclePickupPoints::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum VehiclePickupPoints {
    Table,
    Id,
    VehicleId,
    Name,
    Description,
    Lat,
    Lng,
}
