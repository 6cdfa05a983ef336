use crate::entities::{
    RedemptionTarget, order_entity as orders, registration_entity as registrations,
    registrations::PAYMENT_STATUS_PAID,
};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter};

/// 核销 PIN 时回写订单/注册记录
///
/// 在核销事务内调用，返回错误会让整个核销回滚。
#[async_trait]
pub trait RedemptionTargets: Send + Sync {
    async fn mark_paid(
        &self,
        txn: &DatabaseTransaction,
        target: RedemptionTarget,
        pin_id: i64,
    ) -> AppResult<()>;
}

/// 直接更新 orders / registrations 表
#[derive(Clone, Default)]
pub struct DbRedemptionTargets;

#[async_trait]
impl RedemptionTargets for DbRedemptionTargets {
    async fn mark_paid(
        &self,
        txn: &DatabaseTransaction,
        target: RedemptionTarget,
        pin_id: i64,
    ) -> AppResult<()> {
        let result = match target {
            RedemptionTarget::Order(order_id) => {
                orders::Entity::update_many()
                    .col_expr(orders::Column::WalletPinId, Expr::value(pin_id))
                    .filter(orders::Column::Id.eq(order_id))
                    .exec(txn)
                    .await?
            }
            // 注册额外标记为已支付
            RedemptionTarget::Registration(registration_id) => {
                registrations::Entity::update_many()
                    .col_expr(registrations::Column::WalletPinId, Expr::value(pin_id))
                    .col_expr(
                        registrations::Column::PaymentStatus,
                        Expr::value(PAYMENT_STATUS_PAID),
                    )
                    .filter(registrations::Column::Id.eq(registration_id))
                    .exec(txn)
                    .await?
            }
        };

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("{target} not found")));
        }
        Ok(())
    }
}
