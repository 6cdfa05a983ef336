use crate::entities::{PinStatus, RedemptionTarget, wallet_pin_entity as wallet_pins};
use crate::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WalletPinResponse {
    pub id: i64,
    pub code: String,
    pub seller_wallet_id: i64,
    pub seller_id: i64,
    /// PIN 面额（美分）
    pub amount: i64,
    pub amount_used: i64,
    pub status: PinStatus,
    pub used_by_order_id: Option<i64>,
    pub used_by_registration_id: Option<i64>,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<wallet_pins::Model> for WalletPinResponse {
    fn from(m: wallet_pins::Model) -> Self {
        Self {
            id: m.id,
            code: m.code,
            seller_wallet_id: m.seller_wallet_id,
            seller_id: m.seller_id,
            amount: m.amount,
            amount_used: m.amount_used,
            status: m.status,
            used_by_order_id: m.used_by_order_id,
            used_by_registration_id: m.used_by_registration_id,
            expires_at: m.expires_at,
            used_at: m.used_at,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GeneratePinRequest {
    /// 金额（美分）
    pub amount: i64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ValidatePinRequest {
    /// 发行该 PIN 的卖家
    pub seller_id: i64,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ValidatePinResponse {
    pub valid: bool,
    pub pin: Option<WalletPinResponse>,
}

/// 核销 PIN：order_id 与 registration_id 必须且只能提供一个
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RedeemPinRequest {
    /// 发行该 PIN 的卖家，持码人从卖家处获得
    pub seller_id: i64,
    pub code: String,
    pub order_id: Option<i64>,
    pub registration_id: Option<i64>,
    /// 订单/注册应付金额（美分）
    pub total: i64,
}

impl RedeemPinRequest {
    pub fn target(&self) -> AppResult<RedemptionTarget> {
        match (self.order_id, self.registration_id) {
            (Some(id), None) => Ok(RedemptionTarget::Order(id)),
            (None, Some(id)) => Ok(RedemptionTarget::Registration(id)),
            _ => Err(AppError::ValidationError(
                "Exactly one of order_id or registration_id is required".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RefundPinRequest {
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PinListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub seller_id: Option<i64>,
    pub status: Option<PinStatus>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExpirePinsResponse {
    pub expired_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(order_id: Option<i64>, registration_id: Option<i64>) -> RedeemPinRequest {
        RedeemPinRequest {
            seller_id: 1,
            code: "AB12CD".to_string(),
            order_id,
            registration_id,
            total: 100,
        }
    }

    #[test]
    fn test_redeem_request_requires_exactly_one_target() {
        assert_eq!(
            request(Some(1), None).target().unwrap(),
            RedemptionTarget::Order(1)
        );
        assert_eq!(
            request(None, Some(2)).target().unwrap(),
            RedemptionTarget::Registration(2)
        );
        assert!(request(None, None).target().is_err());
        assert!(request(Some(1), Some(2)).target().is_err());
    }
}
