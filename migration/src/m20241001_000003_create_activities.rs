use sea_orm_migration::prelude::*;

use crate::m20241001_000001_create_accounts::{Users, id_col, timestamp_col};

#[derive(DeriveIden)]
enum ActivityDates {
    Table,
    Id,
    Date,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ActivityLocals {
    Table,
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Activities {
    Table,
    Id,
    Name,
    DateId,
    LocalId,
    Capacity,
    StartsAt,
    EndsAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ActivityBookings {
    Table,
    Id,
    UserId,
    ActivityId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ActivityDates::Table)
                    .if_not_exists()
                    .col(&mut id_col(ActivityDates::Id))
                    .col(
                        ColumnDef::new(ActivityDates::Date)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(&mut timestamp_col(ActivityDates::CreatedAt))
                    .col(&mut timestamp_col(ActivityDates::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ActivityLocals::Table)
                    .if_not_exists()
                    .col(&mut id_col(ActivityLocals::Id))
                    .col(ColumnDef::new(ActivityLocals::Name).string().not_null())
                    .col(&mut timestamp_col(ActivityLocals::CreatedAt))
                    .col(&mut timestamp_col(ActivityLocals::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Activities::Table)
                    .if_not_exists()
                    .col(&mut id_col(Activities::Id))
                    .col(ColumnDef::new(Activities::Name).string().not_null())
                    .col(ColumnDef::new(Activities::DateId).big_integer().not_null())
                    .col(ColumnDef::new(Activities::LocalId).big_integer().not_null())
                    .col(ColumnDef::new(Activities::Capacity).integer().not_null())
                    .col(
                        ColumnDef::new(Activities::StartsAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Activities::EndsAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(&mut timestamp_col(Activities::CreatedAt))
                    .col(&mut timestamp_col(Activities::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activities_date")
                            .from(Activities::Table, Activities::DateId)
                            .to(ActivityDates::Table, ActivityDates::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activities_local")
                            .from(Activities::Table, Activities::LocalId)
                            .to(ActivityLocals::Table, ActivityLocals::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ActivityBookings::Table)
                    .if_not_exists()
                    .col(&mut id_col(ActivityBookings::Id))
                    .col(
                        ColumnDef::new(ActivityBookings::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ActivityBookings::ActivityId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(&mut timestamp_col(ActivityBookings::CreatedAt))
                    .col(&mut timestamp_col(ActivityBookings::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activity_bookings_user")
                            .from(ActivityBookings::Table, ActivityBookings::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activity_bookings_activity")
                            .from(ActivityBookings::Table, ActivityBookings::ActivityId)
                            .to(Activities::Table, Activities::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 不加唯一约束: 同一用户可以重复预订同一活动
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_activity_bookings_activity")
                    .table(ActivityBookings::Table)
                    .col(ActivityBookings::ActivityId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ActivityBookings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Activities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ActivityLocals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ActivityDates::Table).to_owned())
            .await?;
        Ok(())
    }
}
