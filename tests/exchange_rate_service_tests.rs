mod common;

use common::*;
use pin_wallet_backend::entities::exchange_rate_entity as exchange_rates;
use pin_wallet_backend::error::AppError;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

#[tokio::test]
async fn test_set_rate_replaces_active_pair() {
    let db = setup_db().await;
    let service = exchange_rate_service(&db);

    service.set_rate("htg", "usd", 0.0076, 1).await.unwrap();
    let latest = service.set_rate("HTG", "USD", 0.0075, 2).await.unwrap();

    assert_eq!(latest.from_currency, "HTG");
    assert_eq!(latest.to_currency, "USD");
    assert_eq!(latest.set_by, 2);

    let current = service.get_rate("HTG", "USD").await.unwrap();
    assert_eq!(current.id, latest.id);
    assert!((current.rate - 0.0075).abs() < f64::EPSILON);

    // 旧记录保留但已停用
    let history = exchange_rates::Entity::find()
        .filter(exchange_rates::Column::FromCurrency.eq("HTG"))
        .all(&db)
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history.iter().filter(|r| r.is_active).count(), 1);
}

#[tokio::test]
async fn test_list_active_rates() {
    let db = setup_db().await;
    let service = exchange_rate_service(&db);

    service.set_rate("HTG", "USD", 0.0076, 1).await.unwrap();
    service.set_rate("EUR", "USD", 1.08, 1).await.unwrap();
    service.set_rate("EUR", "USD", 1.09, 1).await.unwrap();

    let active = service.list_active().await.unwrap();
    let pairs: Vec<_> = active
        .iter()
        .map(|r| (r.from_currency.as_str(), r.to_currency.as_str()))
        .collect();
    assert_eq!(pairs, vec![("EUR", "USD"), ("HTG", "USD")]);
    assert!((active[0].rate - 1.09).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_invalid_rates_are_rejected() {
    let db = setup_db().await;
    let service = exchange_rate_service(&db);

    for rate in [0.0, -1.0, f64::NAN] {
        let err = service.set_rate("HTG", "USD", rate, 1).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
    let err = service.set_rate("HT", "USD", 1.0, 1).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let err = service.get_rate("HTG", "USD").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
