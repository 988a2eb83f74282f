//! Create vehicles table

use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vehicles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vehicles::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Vehicles::OwnerId).string().not_null())
                    .col(
                        ColumnDef::new(Vehicles::Plate)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Vehicles::Brand).string().not_null())
                    .col(ColumnDef::new(Vehicles::Model).string().not_null())
                    .col(ColumnDef::new(Vehicles::Capacity).integer().not_null())
                    .col(ColumnDef::new(Vehicles::Year).integer())
                    .col(ColumnDef::new(Vehicles::Color).string())
                    .col(ColumnDef::new(Vehicles::VehiclePhotoUrl).string())
                    .col(ColumnDef::new(Vehicles::SoatPhotoUrl).string())
                    .col(ColumnDef::new(Vehicles::LicensePhotoUrl).string())
                    .col(
                        ColumnDef::new(Vehicles::SoatExpiration)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Vehicles::LicenseNumber).string().not_null())
                    .col(
                        ColumnDef::new(Vehicles::LicenseExpiration)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Vehicles::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Vehicles::StatusUpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Vehicles::RequestedReviewAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Vehicles::ReviewedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Vehicles::ReviewedBy).string())
                    .col(ColumnDef::new(Vehicles::VerificationNotes).string())
                    .col(
                        ColumnDef::new(Vehicles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Vehicles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicles_owner")
                            .from(Vehicles::Table, Vehicles::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vehicles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Vehicles {
    Table,
    Id,
    OwnerId,
    Plate,
    Brand,
    Model,
    Capacity,
    Year,
    Color,
    VehiclePhotoUrl,
    SoatPhotoUrl,
    LicensePhotoUrl,
    SoatExpiration,
    LicenseNumber,
    LicenseExpiration,
    Status,
    StatusUpdatedAt,
    RequestedReviewAt,
    ReviewedAt,
    ReviewedBy,
    VerificationNotes,
    CreatedAt,
    UpdatedAt,
}
