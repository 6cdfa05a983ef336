mod common;

use common::*;
use pin_wallet_backend::entities::{OwnerType, ReferenceKind, TransactionType};
use pin_wallet_backend::error::AppError;
use pin_wallet_backend::models::WalletListQuery;

fn first_page() -> WalletListQuery {
    WalletListQuery {
        page: Some(1),
        per_page: Some(50),
    }
}

#[tokio::test]
async fn test_get_or_create_wallet_is_idempotent() {
    let db = setup_db().await;
    let service = wallet_service(&db);

    let first = service.get_or_create_wallet(7).await.unwrap();
    let second = service.get_or_create_wallet(7).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.owner_type, OwnerType::User);
    assert_eq!(first.balance, 0);
    assert_eq!(first.currency, "USD");

    let other = service.get_or_create_wallet(8).await.unwrap();
    assert_ne!(first.id, other.id);
}

#[tokio::test]
async fn test_debit_records_snapshots_and_refreshes_handle() {
    let db = setup_db().await;
    let service = wallet_service(&db);
    let mut wallet = funded_wallet(&service, 1, 10_000).await;

    let tx = service
        .debit(
            &mut wallet,
            2_500,
            ReferenceKind::PinGeneration,
            Some(99),
            Some("test debit".to_string()),
        )
        .await
        .unwrap();

    assert_eq!(tx.transaction_type, TransactionType::Debit);
    assert_eq!(tx.amount, 2_500);
    assert_eq!(tx.balance_before, 10_000);
    assert_eq!(tx.balance_after, 7_500);
    assert_eq!(tx.reference_id, Some(99));
    assert_eq!(wallet.balance, 7_500);
    assert_eq!(reload_wallet(&db, wallet.id).await.balance, 7_500);
}

#[tokio::test]
async fn test_debit_with_non_positive_amount_changes_nothing() {
    let db = setup_db().await;
    let service = wallet_service(&db);
    let mut wallet = funded_wallet(&service, 1, 100).await;

    for amount in [-5, 0] {
        let err = service
            .debit(&mut wallet, amount, ReferenceKind::PinGeneration, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidAmount(a) if a == amount));
    }

    assert_eq!(wallet.balance, 100);
    assert_eq!(reload_wallet(&db, wallet.id).await.balance, 100);
    // 只有充值那一条
    assert_eq!(transactions_of(&db, wallet.id).await.len(), 1);
}

#[tokio::test]
async fn test_debit_beyond_balance_is_rejected() {
    let db = setup_db().await;
    let service = wallet_service(&db);
    let mut wallet = funded_wallet(&service, 1, 1_000).await;

    let err = service
        .debit(&mut wallet, 1_001, ReferenceKind::PinGeneration, None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InsufficientBalance { requested: 1_001 }));
    assert_eq!(reload_wallet(&db, wallet.id).await.balance, 1_000);
    assert_eq!(transactions_of(&db, wallet.id).await.len(), 1);

    // 恰好等于余额可以扣
    service
        .debit(&mut wallet, 1_000, ReferenceKind::PinGeneration, None, None)
        .await
        .unwrap();
    assert_eq!(wallet.balance, 0);
}

#[tokio::test]
async fn test_debit_uses_locked_balance_not_stale_handle() {
    let db = setup_db().await;
    let service = wallet_service(&db);
    let mut wallet = funded_wallet(&service, 1, 1_000).await;
    let mut stale = wallet.clone();

    service
        .debit(&mut wallet, 800, ReferenceKind::PinGeneration, None, None)
        .await
        .unwrap();

    // 旧句柄仍显示 1000，但扣款以数据库余额为准
    assert_eq!(stale.balance, 1_000);
    let err = service
        .debit(&mut stale, 500, ReferenceKind::PinGeneration, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientBalance { .. }));
    assert_eq!(reload_wallet(&db, wallet.id).await.balance, 200);
}

#[tokio::test]
async fn test_refund_is_recorded_as_refund() {
    let db = setup_db().await;
    let service = wallet_service(&db);
    let mut wallet = funded_wallet(&service, 1, 0).await;

    let tx = service
        .refund(&mut wallet, 300, ReferenceKind::PinExpiry, Some(5), None)
        .await
        .unwrap();

    assert_eq!(tx.transaction_type, TransactionType::Refund);
    assert_eq!(tx.balance_before, 0);
    assert_eq!(tx.balance_after, 300);
    assert_eq!(wallet.balance, 300);
}

#[tokio::test]
async fn test_balance_equals_ledger_sum() {
    let db = setup_db().await;
    let service = wallet_service(&db);
    let mut wallet = funded_wallet(&service, 1, 5_000).await;

    service
        .debit(&mut wallet, 1_200, ReferenceKind::PinGeneration, None, None)
        .await
        .unwrap();
    service
        .refund(&mut wallet, 200, ReferenceKind::PinRemainder, None, None)
        .await
        .unwrap();
    service
        .credit(&mut wallet, 50, ReferenceKind::Recharge, None, None)
        .await
        .unwrap();

    let txs = transactions_of(&db, wallet.id).await;
    assert_eq!(txs.len(), 4);
    assert_eq!(ledger_sum(&txs), wallet.balance);
    assert_eq!(wallet.balance, 4_050);

    // 每一条的 before/after 首尾相接
    for pair in txs.windows(2) {
        assert_eq!(pair[0].balance_after, pair[1].balance_before);
    }
    for tx in &txs {
        assert_eq!(tx.balance_after - tx.balance_before, tx.signed_amount());
    }
}

#[tokio::test]
async fn test_recharge_wallet() {
    let db = setup_db().await;
    let service = wallet_service(&db);
    let wallet = service.get_or_create_wallet(3).await.unwrap();

    let updated = service.recharge_wallet(wallet.id, 10_000, 1).await.unwrap();
    assert_eq!(updated.balance, 10_000);

    let txs = transactions_of(&db, wallet.id).await;
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].transaction_type, TransactionType::Credit);
    assert_eq!(txs[0].reference_type, ReferenceKind::Recharge);
    assert!(txs[0].description.as_deref().unwrap().contains("admin #1"));

    let err = service.recharge_wallet(wallet.id, 0, 1).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidAmount(0)));

    let err = service.recharge_wallet(9_999, 100, 1).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_recharge_user_creates_wallet() {
    let db = setup_db().await;
    let service = wallet_service(&db);

    let wallet = service.recharge_user(42, 700, 1).await.unwrap();
    assert_eq!(wallet.owner_id, 42);
    assert_eq!(wallet.balance, 700);
}

#[tokio::test]
async fn test_generate_treasury_credits_target_owner() {
    let db = setup_db().await;
    let service = wallet_service(&db);

    let wallet = service.generate_treasury(1_000_000, 1, 2).await.unwrap();
    assert_eq!(wallet.owner_id, 2);
    assert_eq!(wallet.balance, 1_000_000);

    let txs = transactions_of(&db, wallet.id).await;
    assert_eq!(txs[0].reference_type, ReferenceKind::Treasury);
    assert!(txs[0].description.as_deref().unwrap().contains("dev #1"));

    let err = service.generate_treasury(-1, 1, 2).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidAmount(-1)));
}

#[tokio::test]
async fn test_listings_are_paginated_and_ordered() {
    let db = setup_db().await;
    let service = wallet_service(&db);
    let mut rich = funded_wallet(&service, 1, 9_000).await;
    funded_wallet(&service, 2, 100).await;
    funded_wallet(&service, 3, 4_000).await;

    service
        .debit(&mut rich, 10, ReferenceKind::PinGeneration, None, None)
        .await
        .unwrap();

    let wallets = service.list_all_wallets(&first_page()).await.unwrap();
    assert_eq!(wallets.total, 3);
    let balances: Vec<i64> = wallets.data.iter().map(|w| w.balance).collect();
    assert_eq!(balances, vec![8_990, 4_000, 100]);

    let history = service
        .list_transactions(rich.id, &first_page())
        .await
        .unwrap();
    assert_eq!(history.total, 2);
    // 最新在前
    assert_eq!(history.data[0].transaction_type, TransactionType::Debit);

    let all = service
        .list_all_transactions(&WalletListQuery {
            page: Some(2),
            per_page: Some(3),
        })
        .await
        .unwrap();
    assert_eq!(all.total, 4);
    assert_eq!(all.total_pages, 2);
    assert_eq!(all.data.len(), 1);
}
