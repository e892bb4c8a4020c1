use sea_orm_migration::prelude::*;

use crate::m20241001_000001_create_accounts::{Users, id_col, timestamp_col};

#[derive(DeriveIden)]
enum Hotels {
    Table,
    Id,
    Name,
    Image,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Rooms {
    Table,
    Id,
    Name,
    Capacity,
    HotelId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Bookings {
    Table,
    Id,
    UserId,
    RoomId,
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
                    .table(Hotels::Table)
                    .if_not_exists()
                    .col(&mut id_col(Hotels::Id))
                    .col(ColumnDef::new(Hotels::Name).string().not_null())
                    .col(ColumnDef::new(Hotels::Image).text().not_null())
                    .col(&mut timestamp_col(Hotels::CreatedAt))
                    .col(&mut timestamp_col(Hotels::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Rooms::Table)
                    .if_not_exists()
                    .col(&mut id_col(Rooms::Id))
                    .col(ColumnDef::new(Rooms::Name).string().not_null())
                    .col(ColumnDef::new(Rooms::Capacity).integer().not_null())
                    .col(ColumnDef::new(Rooms::HotelId).big_integer().not_null())
                    .col(&mut timestamp_col(Rooms::CreatedAt))
                    .col(&mut timestamp_col(Rooms::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rooms_hotel")
                            .from(Rooms::Table, Rooms::HotelId)
                            .to(Hotels::Table, Hotels::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(&mut id_col(Bookings::Id))
                    .col(ColumnDef::new(Bookings::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Bookings::RoomId).big_integer().not_null())
                    .col(&mut timestamp_col(Bookings::CreatedAt))
                    .col(&mut timestamp_col(Bookings::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_user")
                            .from(Bookings::Table, Bookings::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_room")
                            .from(Bookings::Table, Bookings::RoomId)
                            .to(Rooms::Table, Rooms::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 每个用户同一时间只能持有一个酒店预订
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_bookings_user_unique")
                    .table(Bookings::Table)
                    .col(Bookings::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_bookings_room")
                    .table(Bookings::Table)
                    .col(Bookings::RoomId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Rooms::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Hotels::Table).to_owned())
            .await?;
        Ok(())
    }
}
