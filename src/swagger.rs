use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{OwnerType, PinStatus, ReferenceKind, TransactionType};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::wallet::get_balance,
        handlers::wallet::get_transactions,
        handlers::wallet::recharge,
        handlers::wallet::treasury,
        handlers::wallet::list_wallets,
        handlers::wallet::list_all_transactions,
        handlers::wallet_pin::generate_pin,
        handlers::wallet_pin::get_pin_history,
        handlers::wallet_pin::validate_pin,
        handlers::wallet_pin::redeem_pin,
        handlers::wallet_pin::refund_pin,
        handlers::wallet_pin::list_all_pins,
        handlers::wallet_pin::expire_pins,
        handlers::exchange_rate::list_rates,
        handlers::exchange_rate::get_rate,
        handlers::exchange_rate::set_rate,
    ),
    components(
        schemas(
            OwnerType,
            TransactionType,
            ReferenceKind,
            PinStatus,
            WalletResponse,
            WalletTransactionResponse,
            RechargeWalletRequest,
            TreasuryRequest,
            WalletPinResponse,
            GeneratePinRequest,
            ValidatePinRequest,
            ValidatePinResponse,
            RedeemPinRequest,
            RefundPinRequest,
            ExpirePinsResponse,
            ExchangeRateResponse,
            SetExchangeRateRequest,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "wallet", description = "Wallet balance and ledger API"),
        (name = "wallet_pin", description = "Wallet PIN API"),
        (name = "wallet_admin", description = "Wallet administration API"),
        (name = "exchange_rate", description = "Exchange rate lookup API"),
    ),
    info(
        title = "PIN Wallet Backend API",
        version = "1.0.0",
        description = "Wallet ledger and PIN REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
