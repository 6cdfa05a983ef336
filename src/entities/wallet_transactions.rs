use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(10))")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    #[sea_orm(string_value = "credit")]
    Credit,
    #[sea_orm(string_value = "debit")]
    Debit,
    /// 语义上等同 credit，单独记录便于审计
    #[sea_orm(string_value = "refund")]
    Refund,
}

impl TransactionType {
    /// 对余额的影响方向：debit 为负，credit/refund 为正
    pub fn sign(&self) -> i64 {
        match self {
            TransactionType::Debit => -1,
            TransactionType::Credit | TransactionType::Refund => 1,
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Credit => write!(f, "credit"),
            TransactionType::Debit => write!(f, "debit"),
            TransactionType::Refund => write!(f, "refund"),
        }
    }
}

/// 流水关联的业务来源
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    #[sea_orm(string_value = "pin_generation")]
    PinGeneration,
    /// 历史数据中存在，当前流程不再写入
    #[sea_orm(string_value = "pin_usage")]
    PinUsage,
    #[sea_orm(string_value = "pin_remainder")]
    PinRemainder,
    #[sea_orm(string_value = "pin_expiry")]
    PinExpiry,
    #[sea_orm(string_value = "pin_manual_refund")]
    PinManualRefund,
    #[sea_orm(string_value = "recharge")]
    Recharge,
    #[sea_orm(string_value = "treasury")]
    Treasury,
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReferenceKind::PinGeneration => "pin_generation",
            ReferenceKind::PinUsage => "pin_usage",
            ReferenceKind::PinRemainder => "pin_remainder",
            ReferenceKind::PinExpiry => "pin_expiry",
            ReferenceKind::PinManualRefund => "pin_manual_refund",
            ReferenceKind::Recharge => "recharge",
            ReferenceKind::Treasury => "treasury",
        };
        write!(f, "{s}")
    }
}

/// 钱包流水（只追加，不修改不删除）
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "wallet_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub wallet_id: i64,
    pub transaction_type: TransactionType,
    /// 金额（美分，正数）
    pub amount: i64,
    pub description: Option<String>,
    pub reference_type: ReferenceKind,
    pub reference_id: Option<i64>,
    pub balance_before: i64,
    pub balance_after: i64,
    pub created_at: DateTime<Utc>,
}

impl Model {
    /// 带方向的金额，累加即为钱包余额
    pub fn signed_amount(&self) -> i64 {
        self.transaction_type.sign() * self.amount
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
