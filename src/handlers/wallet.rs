use crate::handlers::wallet_pin;
use crate::middlewares::current_user;
use crate::models::*;
use crate::services::WalletService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/wallet/balance",
    tag = "wallet",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取钱包余额成功", body = WalletResponse),
        (status = 401, description = "未授权")
    )
)]
/// 当前用户钱包，首次访问时自动创建
pub async fn get_balance(
    wallet_service: web::Data<WalletService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };

    match wallet_service.get_or_create_wallet(user.id).await {
        Ok(wallet) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": WalletResponse::from(wallet)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/wallet/transactions",
    tag = "wallet",
    params(WalletListQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取钱包流水成功", body = PaginatedResponse<WalletTransactionResponse>),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_transactions(
    wallet_service: web::Data<WalletService>,
    req: HttpRequest,
    query: web::Query<WalletListQuery>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };

    let wallet = match wallet_service.get_or_create_wallet(user.id).await {
        Ok(w) => w,
        Err(e) => return Ok(e.error_response()),
    };

    match wallet_service.list_transactions(wallet.id, &query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/wallet/admin/recharge",
    tag = "wallet_admin",
    request_body = RechargeWalletRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "充值成功", body = WalletResponse),
        (status = 400, description = "请求参数错误"),
        (status = 403, description = "无权限"),
        (status = 404, description = "钱包不存在")
    )
)]
/// 管理员充值，可指定 wallet_id 或 user_id
pub async fn recharge(
    wallet_service: web::Data<WalletService>,
    req: HttpRequest,
    request: web::Json<RechargeWalletRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    if let Err(e) = user.require_admin() {
        return Ok(e.error_response());
    }

    let request = request.into_inner();
    let result = match (request.wallet_id, request.user_id) {
        (Some(wallet_id), None) => {
            wallet_service
                .recharge_wallet(wallet_id, request.amount, user.id)
                .await
        }
        (None, Some(user_id)) => {
            wallet_service
                .recharge_user(user_id, request.amount, user.id)
                .await
        }
        _ => Err(crate::error::AppError::ValidationError(
            "Exactly one of wallet_id or user_id is required".to_string(),
        )),
    };

    match result {
        Ok(wallet) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": WalletResponse::from(wallet),
            "message": "Wallet recharged"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/wallet/admin/treasury",
    tag = "wallet_admin",
    request_body = TreasuryRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "发行成功", body = WalletResponse),
        (status = 400, description = "请求参数错误"),
        (status = 403, description = "仅开发者可用")
    )
)]
pub async fn treasury(
    wallet_service: web::Data<WalletService>,
    req: HttpRequest,
    request: web::Json<TreasuryRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    if let Err(e) = user.require_dev() {
        return Ok(e.error_response());
    }

    match wallet_service
        .generate_treasury(request.amount, user.id, request.target_user_id)
        .await
    {
        Ok(wallet) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": WalletResponse::from(wallet),
            "message": "Treasury issued"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/wallet/admin/wallets",
    tag = "wallet_admin",
    params(WalletListQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取钱包列表成功", body = PaginatedResponse<WalletResponse>),
        (status = 403, description = "无权限")
    )
)]
pub async fn list_wallets(
    wallet_service: web::Data<WalletService>,
    req: HttpRequest,
    query: web::Query<WalletListQuery>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    if let Err(e) = user.require_admin() {
        return Ok(e.error_response());
    }

    match wallet_service.list_all_wallets(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/wallet/admin/transactions",
    tag = "wallet_admin",
    params(WalletListQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取全部流水成功", body = PaginatedResponse<WalletTransactionResponse>),
        (status = 403, description = "无权限")
    )
)]
pub async fn list_all_transactions(
    wallet_service: web::Data<WalletService>,
    req: HttpRequest,
    query: web::Query<WalletListQuery>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    if let Err(e) = user.require_admin() {
        return Ok(e.error_response());
    }

    match wallet_service.list_all_transactions(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn wallet_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/wallet")
            .route("/balance", web::get().to(get_balance))
            .route("/transactions", web::get().to(get_transactions))
            .route("/pins", web::post().to(wallet_pin::generate_pin))
            .route("/pins", web::get().to(wallet_pin::get_pin_history))
            .route("/pins/validate", web::post().to(wallet_pin::validate_pin))
            .route("/pins/redeem", web::post().to(wallet_pin::redeem_pin))
            .route("/admin/recharge", web::post().to(recharge))
            .route("/admin/treasury", web::post().to(treasury))
            .route("/admin/wallets", web::get().to(list_wallets))
            .route("/admin/transactions", web::get().to(list_all_transactions))
            .route("/admin/pins", web::get().to(wallet_pin::list_all_pins))
            .route("/admin/pins/expire", web::post().to(wallet_pin::expire_pins))
            .route(
                "/admin/pins/{pin_id}/refund",
                web::post().to(wallet_pin::refund_pin),
            ),
    );
}
