pub use sea_orm_migration::prelude::*;

mod m20241001_000001_create_accounts;
mod m20241001_000002_create_hotels;
mod m20241001_000003_create_activities;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241001_000001_create_accounts::Migration),
            Box::new(m20241001_000002_create_hotels::Migration),
            Box::new(m20241001_000003_create_activities::Migration),
        ]
    }
}
