#![allow(dead_code)]

use chrono::{DateTime, Utc};
use migration::{Migrator, MigratorTrait};
use pin_wallet_backend::config::WalletConfig;
use pin_wallet_backend::entities::{
    ReferenceKind, wallet_entity as wallets, wallet_pin_entity as wallet_pins,
    wallet_transaction_entity as wallet_transactions,
};
use pin_wallet_backend::services::{
    DbRedemptionTargets, ExchangeRateService, PinService, RedemptionTargets, WalletService,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
    EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;

/// 内存 SQLite，单连接，保证同一时刻只有一个事务在执行
///
/// SQLite 下 sea-query 不生成 `FOR UPDATE`，这里的并发用例只验证事务串行时的结果，
/// 行锁本身需要在 Postgres 上验证。
pub async fn setup_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:".to_string());
    opts.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(opts)
        .await
        .expect("Failed to open in-memory database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    // 订单与注册表由其它模块维护，这里只建核销需要的列
    db.execute_unprepared(
        "CREATE TABLE orders (id INTEGER PRIMARY KEY, wallet_pin_id BIGINT NULL)",
    )
    .await
    .expect("Failed to create orders table");
    db.execute_unprepared(
        "CREATE TABLE registrations (\
            id INTEGER PRIMARY KEY, \
            payment_status VARCHAR(20) NOT NULL DEFAULT 'pending', \
            wallet_pin_id BIGINT NULL)",
    )
    .await
    .expect("Failed to create registrations table");

    db
}

pub fn wallet_config() -> WalletConfig {
    WalletConfig::default()
}

pub fn wallet_service(db: &DatabaseConnection) -> WalletService {
    WalletService::new(db.clone(), wallet_config())
}

pub fn pin_service(db: &DatabaseConnection) -> PinService {
    pin_service_with_targets(db, Arc::new(DbRedemptionTargets))
}

pub fn pin_service_with_targets(
    db: &DatabaseConnection,
    targets: Arc<dyn RedemptionTargets>,
) -> PinService {
    PinService::new(db.clone(), targets, wallet_config())
}

pub fn exchange_rate_service(db: &DatabaseConnection) -> ExchangeRateService {
    ExchangeRateService::new(db.clone())
}

/// 创建用户钱包并充值到指定余额
pub async fn funded_wallet(
    service: &WalletService,
    owner_id: i64,
    balance: i64,
) -> wallets::Model {
    let mut wallet = service
        .get_or_create_wallet(owner_id)
        .await
        .expect("Failed to create wallet");
    if balance > 0 {
        service
            .credit(&mut wallet, balance, ReferenceKind::Recharge, None, None)
            .await
            .expect("Failed to fund wallet");
    }
    wallet
}

pub async fn insert_order(db: &DatabaseConnection, id: i64) {
    db.execute_unprepared(&format!("INSERT INTO orders (id) VALUES ({id})"))
        .await
        .expect("Failed to insert order");
}

pub async fn insert_registration(db: &DatabaseConnection, id: i64) {
    db.execute_unprepared(&format!("INSERT INTO registrations (id) VALUES ({id})"))
        .await
        .expect("Failed to insert registration");
}

pub async fn reload_wallet(db: &DatabaseConnection, wallet_id: i64) -> wallets::Model {
    wallets::Entity::find_by_id(wallet_id)
        .one(db)
        .await
        .expect("query failed")
        .expect("wallet missing")
}

pub async fn reload_pin(db: &DatabaseConnection, pin_id: i64) -> wallet_pins::Model {
    wallet_pins::Entity::find_by_id(pin_id)
        .one(db)
        .await
        .expect("query failed")
        .expect("pin missing")
}

/// 直接改写钱包余额，不记流水
pub async fn set_balance(db: &DatabaseConnection, wallet_id: i64, balance: i64) {
    let wallet = reload_wallet(db, wallet_id).await;
    let mut am = wallet.into_active_model();
    am.balance = Set(balance);
    am.update(db).await.expect("Failed to set balance");
}

/// 把 PIN 的到期时间改到过去，模拟已超时
pub async fn backdate_pin(db: &DatabaseConnection, pin_id: i64, expires_at: DateTime<Utc>) {
    let pin = reload_pin(db, pin_id).await;
    let mut am = pin.into_active_model();
    am.expires_at = Set(expires_at);
    am.update(db).await.expect("Failed to backdate pin");
}

/// 钱包的全部流水，按写入顺序
pub async fn transactions_of(
    db: &DatabaseConnection,
    wallet_id: i64,
) -> Vec<wallet_transactions::Model> {
    wallet_transactions::Entity::find()
        .filter(wallet_transactions::Column::WalletId.eq(wallet_id))
        .order_by_asc(wallet_transactions::Column::Id)
        .all(db)
        .await
        .expect("query failed")
}

/// 按流水重新计算余额：credit + refund - debit
pub fn ledger_sum(transactions: &[wallet_transactions::Model]) -> i64 {
    transactions.iter().map(|t| t.signed_amount()).sum()
}
