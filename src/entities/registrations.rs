use sea_orm::entity::prelude::*;

pub const PAYMENT_STATUS_PAID: &str = "paid";

/// 注册表由会员注册模块维护，这里只映射 PIN 核销时需要写入的列
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "registrations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub payment_status: String,
    pub wallet_pin_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
