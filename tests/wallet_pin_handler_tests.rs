mod common;

use actix_web::{App, http::StatusCode, test, web};
use common::*;
use pin_wallet_backend::entities::{PinStatus, ReferenceKind, order_entity as orders};
use pin_wallet_backend::handlers;
use pin_wallet_backend::middlewares::AuthMiddleware;
use pin_wallet_backend::utils::{JwtService, Role};
use sea_orm::EntityTrait;
use serde_json::{Value, json};

const JWT_SECRET: &str = "wallet-pin-handler-secret";

fn jwt_service() -> JwtService {
    JwtService::new(JWT_SECRET, 3600)
}

fn bearer(user_id: i64, role: Role) -> (&'static str, String) {
    let token = jwt_service()
        .generate_access_token(user_id, role)
        .expect("Failed to sign token");
    ("Authorization", format!("Bearer {token}"))
}

#[actix_web::test]
async fn test_buyer_redeems_pin_issued_by_seller() {
    let db = setup_db().await;
    let wallets = wallet_service(&db);
    let pins = pin_service(&db);
    insert_order(&db, 77).await;
    let mut seller_wallet = funded_wallet(&wallets, 1, 10_000).await;
    let pin = pins.generate_pin(&mut seller_wallet, 5_000).await.unwrap();

    let app = test::init_service(
        App::new()
            .wrap(AuthMiddleware::new(jwt_service()))
            .app_data(web::Data::new(wallets.clone()))
            .app_data(web::Data::new(pins.clone()))
            .service(web::scope("/api/v1").configure(handlers::wallet_config)),
    )
    .await;

    // 买家 #2 从卖家处拿到码，用卖家 id + 码校验
    let req = test::TestRequest::post()
        .uri("/api/v1/wallet/pins/validate")
        .insert_header(bearer(2, Role::Customer))
        .set_json(json!({ "seller_id": 1, "code": pin.code.to_lowercase() }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["valid"], true);

    // 卖家 id 不匹配时视为无效
    let req = test::TestRequest::post()
        .uri("/api/v1/wallet/pins/validate")
        .insert_header(bearer(2, Role::Customer))
        .set_json(json!({ "seller_id": 2, "code": pin.code }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["valid"], false);

    let req = test::TestRequest::post()
        .uri("/api/v1/wallet/pins/redeem")
        .insert_header(bearer(2, Role::Customer))
        .set_json(json!({
            "seller_id": 1,
            "code": pin.code,
            "order_id": 77,
            "total": 3_000
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["amount_used"], 3_000);

    let redeemed = reload_pin(&db, pin.id).await;
    assert_eq!(redeemed.status, PinStatus::Used);
    assert_eq!(redeemed.used_by_order_id, Some(77));

    let order = orders::Entity::find_by_id(77)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.wallet_pin_id, Some(pin.id));

    // 剩余 2000 退回卖家，买家钱包不受影响
    assert_eq!(reload_wallet(&db, seller_wallet.id).await.balance, 7_000);
    let txs = transactions_of(&db, seller_wallet.id).await;
    assert_eq!(
        txs.iter()
            .filter(|t| t.reference_type == ReferenceKind::PinRemainder)
            .count(),
        1
    );
}

#[actix_web::test]
async fn test_redeem_with_wrong_seller_is_rejected() {
    let db = setup_db().await;
    let wallets = wallet_service(&db);
    let pins = pin_service(&db);
    insert_order(&db, 77).await;
    let mut seller_wallet = funded_wallet(&wallets, 1, 10_000).await;
    let pin = pins.generate_pin(&mut seller_wallet, 5_000).await.unwrap();

    let app = test::init_service(
        App::new()
            .wrap(AuthMiddleware::new(jwt_service()))
            .app_data(web::Data::new(wallets.clone()))
            .app_data(web::Data::new(pins.clone()))
            .service(web::scope("/api/v1").configure(handlers::wallet_config)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/wallet/pins/redeem")
        .insert_header(bearer(2, Role::Customer))
        .set_json(json!({
            "seller_id": 3,
            "code": pin.code,
            "order_id": 77,
            "total": 3_000
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "INVALID_OR_EXPIRED_PIN");

    assert_eq!(reload_pin(&db, pin.id).await.status, PinStatus::Active);
    assert_eq!(reload_wallet(&db, seller_wallet.id).await.balance, 5_000);
}
