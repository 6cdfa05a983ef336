use crate::entities::{
    OwnerType, ReferenceKind, TransactionType, wallet_entity as wallets,
    wallet_transaction_entity as wallet_transactions,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WalletResponse {
    pub id: i64,
    pub owner_type: OwnerType,
    pub owner_id: i64,
    /// 余额（美分）
    pub balance: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<wallets::Model> for WalletResponse {
    fn from(m: wallets::Model) -> Self {
        Self {
            id: m.id,
            owner_type: m.owner_type,
            owner_id: m.owner_id,
            balance: m.balance,
            currency: m.currency,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WalletTransactionResponse {
    pub id: i64,
    pub wallet_id: i64,
    pub transaction_type: TransactionType,
    /// 金额（美分，正数），方向由 transaction_type 决定
    pub amount: i64,
    pub description: Option<String>,
    pub reference_type: ReferenceKind,
    pub reference_id: Option<i64>,
    pub balance_before: i64,
    pub balance_after: i64,
    pub created_at: DateTime<Utc>,
}

impl From<wallet_transactions::Model> for WalletTransactionResponse {
    fn from(m: wallet_transactions::Model) -> Self {
        Self {
            id: m.id,
            wallet_id: m.wallet_id,
            transaction_type: m.transaction_type,
            amount: m.amount,
            description: m.description,
            reference_type: m.reference_type,
            reference_id: m.reference_id,
            balance_before: m.balance_before,
            balance_after: m.balance_after,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct WalletListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// 管理员充值，wallet_id 与 user_id 二选一
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RechargeWalletRequest {
    pub wallet_id: Option<i64>,
    pub user_id: Option<i64>,
    /// 金额（美分）
    pub amount: i64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TreasuryRequest {
    /// 金额（美分）
    pub amount: i64,
    /// 接收资金的用户
    pub target_user_id: i64,
}
