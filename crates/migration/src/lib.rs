pub use sea_orm_migration::prelude::*;

mod m20260810_090000_settings;
mod m20260810_091500_settlements;
mod m20260810_093000_records;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260810_090000_settings::Migration),
            Box::new(m20260810_091500_settlements::Migration),
            Box::new(m20260810_093000_records::Migration),
        ]
    }
}
