use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    Email,
    Password,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Sessions {
    Table,
    Id,
    UserId,
    Token,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TicketTypes {
    Table,
    Id,
    Name,
    Price,
    IsRemote,
    IncludesHotel,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Enrollments {
    Table,
    Id,
    UserId,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tickets {
    Table,
    Id,
    EnrollmentId,
    TicketTypeId,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// created_at / updated_at columns shared by every table
pub(crate) fn timestamp_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::cust("NOW()"))
        .to_owned()
}

pub(crate) fn id_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("ticket_status"))
                    .values(vec![Alias::new("RESERVED"), Alias::new("PAID")])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(&mut id_col(Users::Id))
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(&mut timestamp_col(Users::CreatedAt))
                    .col(&mut timestamp_col(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Sessions::Table)
                    .if_not_exists()
                    .col(&mut id_col(Sessions::Id))
                    .col(ColumnDef::new(Sessions::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Sessions::Token).text().not_null())
                    .col(&mut timestamp_col(Sessions::CreatedAt))
                    .col(&mut timestamp_col(Sessions::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sessions_user")
                            .from(Sessions::Table, Sessions::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_sessions_token")
                    .table(Sessions::Table)
                    .col(Sessions::Token)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TicketTypes::Table)
                    .if_not_exists()
                    .col(&mut id_col(TicketTypes::Id))
                    .col(ColumnDef::new(TicketTypes::Name).string().not_null())
                    .col(ColumnDef::new(TicketTypes::Price).integer().not_null())
                    .col(ColumnDef::new(TicketTypes::IsRemote).boolean().not_null())
                    .col(
                        ColumnDef::new(TicketTypes::IncludesHotel)
                            .boolean()
                            .not_null(),
                    )
                    .col(&mut timestamp_col(TicketTypes::CreatedAt))
                    .col(&mut timestamp_col(TicketTypes::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Enrollments::Table)
                    .if_not_exists()
                    .col(&mut id_col(Enrollments::Id))
                    .col(
                        ColumnDef::new(Enrollments::UserId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Enrollments::Name).string().not_null())
                    .col(&mut timestamp_col(Enrollments::CreatedAt))
                    .col(&mut timestamp_col(Enrollments::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrollments_user")
                            .from(Enrollments::Table, Enrollments::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tickets::Table)
                    .if_not_exists()
                    .col(&mut id_col(Tickets::Id))
                    .col(
                        ColumnDef::new(Tickets::EnrollmentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tickets::TicketTypeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tickets::Status)
                            .custom(Alias::new("ticket_status"))
                            .not_null(),
                    )
                    .col(&mut timestamp_col(Tickets::CreatedAt))
                    .col(&mut timestamp_col(Tickets::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_enrollment")
                            .from(Tickets::Table, Tickets::EnrollmentId)
                            .to(Enrollments::Table, Enrollments::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_ticket_type")
                            .from(Tickets::Table, Tickets::TicketTypeId)
                            .to(TicketTypes::Table, TicketTypes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tickets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Enrollments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TicketTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(Alias::new("ticket_status")).to_owned())
            .await?;
        Ok(())
    }
}
