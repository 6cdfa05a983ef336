pub use sea_orm_migration::prelude::*;

mod m20260218_000001_create_wallets;
mod m20260218_000002_create_wallet_transactions;
mod m20260218_000003_create_wallet_pins;
mod m20260218_000004_create_exchange_rates;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260218_000001_create_wallets::Migration),
            Box::new(m20260218_000002_create_wallet_transactions::Migration),
            Box::new(m20260218_000003_create_wallet_pins::Migration),
            Box::new(m20260218_000004_create_exchange_rates::Migration),
        ]
    }
}
