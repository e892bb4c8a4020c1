use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "activities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub date_id: i64,
    pub local_id: i64,
    pub capacity: i32,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::activity_locals::Entity",
        from = "Column::LocalId",
        to = "super::activity_locals::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Local,
    #[sea_orm(has_many = "super::activity_bookings::Entity")]
    ActivityBookings,
}

impl Related<super::activity_locals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Local.def()
    }
}

impl Related<super::activity_bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ActivityBookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
