pub use sea_orm_migration::prelude::*;

mod m20250722_000001_create_store_tables;
mod m20250725_000002_add_currency_and_transactions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250722_000001_create_store_tables::Migration),
            Box::new(m20250725_000002_add_currency_and_transactions::Migration),
        ]
    }
}
