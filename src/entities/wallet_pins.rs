use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// PIN 状态机：active -> used | expired | refunded，后三者均为终态
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum PinStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "used")]
    Used,
    #[sea_orm(string_value = "expired")]
    Expired,
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

impl PinStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PinStatus::Active)
    }
}

impl std::fmt::Display for PinStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PinStatus::Active => write!(f, "active"),
            PinStatus::Used => write!(f, "used"),
            PinStatus::Expired => write!(f, "expired"),
            PinStatus::Refunded => write!(f, "refunded"),
        }
    }
}

/// PIN 的核销对象：订单或注册，二者互斥
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedemptionTarget {
    Order(i64),
    Registration(i64),
}

impl std::fmt::Display for RedemptionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RedemptionTarget::Order(id) => write!(f, "order #{id}"),
            RedemptionTarget::Registration(id) => write!(f, "registration #{id}"),
        }
    }
}

/// 钱包 PIN 实体
/// - code: 6 位大写字母数字，全局唯一
/// - amount: 生成时从卖家钱包冻结（扣除）的金额（美分）
/// - amount_used: 核销金额，核销前为 0
/// - used_by_order_id / used_by_registration_id: 最多一个有值，见 `redemption_target`
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "wallet_pins")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub code: String,
    pub seller_wallet_id: i64,
    pub seller_id: i64,
    pub amount: i64,
    pub amount_used: i64,
    pub status: PinStatus,
    pub used_by_order_id: Option<i64>,
    pub used_by_registration_id: Option<i64>,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// 仅 active 且未到期的 PIN 可校验/核销（未被扫描的过期 PIN 同样视为无效）
    pub fn is_redeemable_at(&self, now: DateTime<Utc>) -> bool {
        self.status == PinStatus::Active && !self.is_expired_at(now)
    }

    /// 核销后未使用的剩余金额
    pub fn remainder(&self) -> i64 {
        self.amount - self.amount_used
    }

    pub fn redemption_target(&self) -> Option<RedemptionTarget> {
        match (self.used_by_order_id, self.used_by_registration_id) {
            (Some(id), _) => Some(RedemptionTarget::Order(id)),
            (None, Some(id)) => Some(RedemptionTarget::Registration(id)),
            (None, None) => None,
        }
    }

    /// 日志和错误信息里只暴露前两位
    pub fn masked_code(&self) -> String {
        crate::utils::mask_pin_code(&self.code)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
