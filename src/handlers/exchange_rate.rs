use crate::middlewares::current_user;
use crate::models::*;
use crate::services::ExchangeRateService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/exchange-rates",
    tag = "exchange_rate",
    responses(
        (status = 200, description = "当前生效的汇率", body = [ExchangeRateResponse])
    )
)]
pub async fn list_rates(service: web::Data<ExchangeRateService>) -> Result<HttpResponse> {
    match service.list_active().await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/exchange-rates/lookup",
    tag = "exchange_rate",
    params(ExchangeRateQuery),
    responses(
        (status = 200, description = "查询成功", body = ExchangeRateResponse),
        (status = 404, description = "未配置该币种对")
    )
)]
pub async fn get_rate(
    service: web::Data<ExchangeRateService>,
    query: web::Query<ExchangeRateQuery>,
) -> Result<HttpResponse> {
    let to = query.to.as_deref().unwrap_or("USD");
    match service.get_rate(&query.from, to).await {
        Ok(rate) => Ok(HttpResponse::Ok().json(ApiResponse::success(rate))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/exchange-rates",
    tag = "exchange_rate",
    request_body = SetExchangeRateRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "设置成功", body = ExchangeRateResponse),
        (status = 400, description = "参数错误"),
        (status = 403, description = "无权限")
    )
)]
pub async fn set_rate(
    service: web::Data<ExchangeRateService>,
    req: HttpRequest,
    request: web::Json<SetExchangeRateRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    if let Err(e) = user.require_admin() {
        return Ok(e.error_response());
    }

    let to = request.to_currency.as_deref().unwrap_or("USD");
    match service
        .set_rate(&request.from_currency, to, request.rate, user.id)
        .await
    {
        Ok(rate) => Ok(HttpResponse::Ok().json(ApiResponse::success(rate))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn exchange_rate_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/exchange-rates")
            .route("", web::get().to(list_rates))
            .route("", web::post().to(set_rate))
            .route("/lookup", web::get().to(get_rate)),
    );
}
