use crate::middlewares::current_user;
use crate::models::*;
use crate::services::{PinService, WalletService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/wallet/pins",
    tag = "wallet_pin",
    request_body = GeneratePinRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "生成 PIN 成功", body = WalletPinResponse),
        (status = 400, description = "金额无效"),
        (status = 403, description = "当前角色不能生成 PIN"),
        (status = 422, description = "余额不足")
    )
)]
/// 从当前用户钱包扣款生成 PIN（15 分钟内有效）
pub async fn generate_pin(
    wallet_service: web::Data<WalletService>,
    pin_service: web::Data<PinService>,
    req: HttpRequest,
    request: web::Json<GeneratePinRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    if let Err(e) = user.require_seller() {
        return Ok(e.error_response());
    }

    let mut wallet = match wallet_service.get_or_create_wallet(user.id).await {
        Ok(w) => w,
        Err(e) => return Ok(e.error_response()),
    };

    match pin_service.generate_pin(&mut wallet, request.amount).await {
        Ok(pin) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": {
                "pin": WalletPinResponse::from(pin),
                "balance": wallet.balance
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/wallet/pins",
    tag = "wallet_pin",
    params(WalletListQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取 PIN 记录成功", body = PaginatedResponse<WalletPinResponse>),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_pin_history(
    pin_service: web::Data<PinService>,
    req: HttpRequest,
    query: web::Query<WalletListQuery>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };

    match pin_service
        .list_pin_history(user.id, query.page, query.per_page)
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/wallet/pins/validate",
    tag = "wallet_pin",
    request_body = ValidatePinRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "校验结果", body = ValidatePinResponse),
        (status = 401, description = "未授权")
    )
)]
/// 只读校验 (seller_id, code)，不会消耗；持码人不必是卖家本人
pub async fn validate_pin(
    pin_service: web::Data<PinService>,
    req: HttpRequest,
    request: web::Json<ValidatePinRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = current_user(&req) {
        return Ok(e.error_response());
    }

    match pin_service
        .validate_pin(request.seller_id, &request.code)
        .await
    {
        Ok(pin) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": ValidatePinResponse {
                valid: pin.is_some(),
                pin: pin.map(Into::into),
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/wallet/pins/redeem",
    tag = "wallet_pin",
    request_body = RedeemPinRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "核销成功", body = WalletPinResponse),
        (status = 400, description = "请求参数错误"),
        (status = 404, description = "PIN 无效或已过期"),
        (status = 422, description = "金额超过 PIN 面额")
    )
)]
/// 持码人用 (seller_id, code) 支付订单或注册，剩余金额自动退回卖家
pub async fn redeem_pin(
    pin_service: web::Data<PinService>,
    req: HttpRequest,
    request: web::Json<RedeemPinRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };

    let target = match request.target() {
        Ok(t) => t,
        Err(e) => return Ok(e.error_response()),
    };

    match pin_service
        .redeem_pin(request.seller_id, &request.code, target, request.total)
        .await
    {
        Ok(pin) => {
            log::info!(
                "PIN {} of seller #{} redeemed by user #{}",
                pin.masked_code(),
                pin.seller_id,
                user.id
            );
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": WalletPinResponse::from(pin),
                "message": "PIN redeemed"
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/wallet/admin/pins/{pin_id}/refund",
    tag = "wallet_admin",
    params(
        ("pin_id" = i64, Path, description = "PIN ID")
    ),
    request_body = RefundPinRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "退款成功", body = WalletPinResponse),
        (status = 403, description = "无权限"),
        (status = 404, description = "PIN 不存在"),
        (status = 409, description = "PIN 已使用、已退款或已过期")
    )
)]
pub async fn refund_pin(
    pin_service: web::Data<PinService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<RefundPinRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    if let Err(e) = user.require_admin() {
        return Ok(e.error_response());
    }

    match pin_service
        .refund_pin(path.into_inner(), user.id, &request.reason)
        .await
    {
        Ok(pin) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": WalletPinResponse::from(pin),
            "message": "PIN refunded"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/wallet/admin/pins",
    tag = "wallet_admin",
    params(PinListQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取 PIN 列表成功", body = PaginatedResponse<WalletPinResponse>),
        (status = 403, description = "无权限")
    )
)]
pub async fn list_all_pins(
    pin_service: web::Data<PinService>,
    req: HttpRequest,
    query: web::Query<PinListQuery>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    if let Err(e) = user.require_admin() {
        return Ok(e.error_response());
    }

    match pin_service.list_all_pins(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/wallet/admin/pins/expire",
    tag = "wallet_admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "过期扫描完成", body = ExpirePinsResponse),
        (status = 403, description = "无权限")
    )
)]
/// 立即执行一次过期扫描（与定时任务相同，可重复调用）
pub async fn expire_pins(
    pin_service: web::Data<PinService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    if let Err(e) = user.require_admin() {
        return Ok(e.error_response());
    }

    match pin_service.expire_stale_pins().await {
        Ok(expired_count) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": ExpirePinsResponse { expired_count }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}
