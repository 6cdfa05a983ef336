use crate::config::WalletConfig;
use crate::entities::{
    PinStatus, RedemptionTarget, ReferenceKind, TransactionType, wallet_entity as wallets,
    wallet_pin_entity as wallet_pins,
};
use crate::error::{AppError, AppResult};
use crate::models::{PaginatedResponse, PaginationParams, PinListQuery, WalletPinResponse};
use crate::services::redemption_targets::RedemptionTargets;
use crate::services::wallet_service::{LedgerEntry, WalletService};
use crate::utils::{generate_pin_code, mask_pin_code, normalize_pin_code};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
    TransactionTrait,
};
use std::sync::Arc;

/// PIN 生命周期：生成 / 校验 / 核销 / 过期 / 人工退款
///
/// 每次状态变化都在单独的数据库事务中完成，并先对 PIN 行（或钱包行）加排他锁。
#[derive(Clone)]
pub struct PinService {
    pool: DatabaseConnection,
    targets: Arc<dyn RedemptionTargets>,
    config: WalletConfig,
}

impl PinService {
    pub fn new(
        pool: DatabaseConnection,
        targets: Arc<dyn RedemptionTargets>,
        config: WalletConfig,
    ) -> Self {
        Self {
            pool,
            targets,
            config,
        }
    }

    /// 从钱包扣款生成 PIN，成功后刷新 `wallet` 的余额
    pub async fn generate_pin(
        &self,
        wallet: &mut wallets::Model,
        amount: i64,
    ) -> AppResult<wallet_pins::Model> {
        self.generate_pin_with(wallet, amount, generate_pin_code)
            .await
    }

    /// 同 `generate_pin`，PIN 码由 `next_code` 提供
    ///
    /// 码冲突时回滚到保存点并换一个码重试，最多 `pin_code_max_attempts` 次。
    pub async fn generate_pin_with<F>(
        &self,
        wallet: &mut wallets::Model,
        amount: i64,
        mut next_code: F,
    ) -> AppResult<wallet_pins::Model>
    where
        F: FnMut() -> String,
    {
        if amount <= 0 {
            return Err(AppError::InvalidAmount(amount));
        }

        let txn = self.pool.begin().await?;

        let (updated_wallet, debit_tx) = WalletService::post_entry(
            &txn,
            LedgerEntry {
                wallet_id: wallet.id,
                transaction_type: TransactionType::Debit,
                amount,
                reference_type: ReferenceKind::PinGeneration,
                reference_id: None,
                description: None,
            },
        )
        .await?;

        let max_attempts = self.config.pin_code_max_attempts;
        let mut inserted = None;
        for _ in 0..max_attempts {
            let code = next_code();
            let now = Utc::now();
            let candidate = wallet_pins::ActiveModel {
                code: Set(code.clone()),
                seller_wallet_id: Set(updated_wallet.id),
                seller_id: Set(updated_wallet.owner_id),
                amount: Set(amount),
                amount_used: Set(0),
                status: Set(PinStatus::Active),
                used_by_order_id: Set(None),
                used_by_registration_id: Set(None),
                expires_at: Set(now + Duration::minutes(self.config.pin_ttl_minutes)),
                used_at: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };

            // 唯一索引冲突会使 Postgres 事务失效，所以放在保存点里
            let savepoint = txn.begin().await?;
            match candidate.insert(&savepoint).await {
                Ok(pin) => {
                    savepoint.commit().await?;
                    inserted = Some(pin);
                    break;
                }
                Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                    savepoint.rollback().await?;
                    log::warn!("PIN code collision on {}, regenerating", mask_pin_code(&code));
                }
                Err(e) => return Err(e.into()),
            }
        }

        let Some(pin) = inserted else {
            return Err(AppError::InternalError(format!(
                "Failed to generate a unique PIN code after {max_attempts} attempts"
            )));
        };

        // PIN 生成后回填扣款流水
        let mut debit_am = debit_tx.into_active_model();
        debit_am.reference_id = Set(Some(pin.id));
        debit_am.description = Set(Some(format!("PIN {} generated", pin.code)));
        debit_am.update(&txn).await?;

        txn.commit().await?;
        *wallet = updated_wallet;

        log::info!(
            "PIN {} generated for wallet #{}, amount: {}",
            pin.masked_code(),
            pin.seller_wallet_id,
            pin.amount
        );
        Ok(pin)
    }

    /// 只读校验：仅当 PIN 属于该卖家、状态 active 且未到期时返回
    pub async fn validate_pin(
        &self,
        seller_id: i64,
        code: &str,
    ) -> AppResult<Option<wallet_pins::Model>> {
        let code = normalize_pin_code(code);
        let pin = wallet_pins::Entity::find()
            .filter(wallet_pins::Column::Code.eq(code))
            .filter(wallet_pins::Column::SellerId.eq(seller_id))
            .one(&self.pool)
            .await?;

        let now = Utc::now();
        Ok(pin.filter(|p| p.is_redeemable_at(now)))
    }

    /// 核销 PIN
    ///
    /// 1. 锁定 PIN 行并重新校验状态与有效期
    /// 2. 记录核销金额和核销对象，状态置为 used
    /// 3. 回写订单/注册记录
    /// 4. 剩余金额退回卖家钱包（无剩余则不记流水）
    ///
    /// 任一步失败整体回滚；已核销的 PIN 不可重试。
    pub async fn redeem_pin(
        &self,
        seller_id: i64,
        code: &str,
        target: RedemptionTarget,
        total: i64,
    ) -> AppResult<wallet_pins::Model> {
        if total <= 0 {
            return Err(AppError::InvalidAmount(total));
        }

        let code = normalize_pin_code(code);
        let txn = self.pool.begin().await?;

        let locked = wallet_pins::Entity::find()
            .filter(wallet_pins::Column::Code.eq(code.as_str()))
            .filter(wallet_pins::Column::SellerId.eq(seller_id))
            .lock_exclusive()
            .one(&txn)
            .await?;

        let now = Utc::now();
        let pin = match locked {
            Some(p) if p.is_redeemable_at(now) => p,
            _ => {
                log::warn!(
                    "Redemption of PIN {} by seller #{seller_id} rejected: invalid or expired",
                    mask_pin_code(&code)
                );
                return Err(AppError::InvalidOrExpiredPin {
                    code_prefix: mask_pin_code(&code),
                });
            }
        };

        if total > pin.amount {
            log::warn!(
                "Redemption of PIN {} rejected: total {total} exceeds {}",
                pin.masked_code(),
                pin.amount
            );
            return Err(AppError::AmountExceedsPin {
                requested: total,
                available: pin.amount,
            });
        }

        let (order_id, registration_id) = match target {
            RedemptionTarget::Order(id) => (Some(id), None),
            RedemptionTarget::Registration(id) => (None, Some(id)),
        };

        let mut am = pin.into_active_model();
        am.amount_used = Set(total);
        am.status = Set(PinStatus::Used);
        am.used_at = Set(Some(now));
        am.used_by_order_id = Set(order_id);
        am.used_by_registration_id = Set(registration_id);
        am.updated_at = Set(now);
        let pin = am.update(&txn).await?;

        self.targets.mark_paid(&txn, target, pin.id).await?;

        let remainder = pin.remainder();
        if remainder > 0 {
            WalletService::post_entry(
                &txn,
                LedgerEntry {
                    wallet_id: pin.seller_wallet_id,
                    transaction_type: TransactionType::Refund,
                    amount: remainder,
                    reference_type: ReferenceKind::PinRemainder,
                    reference_id: Some(pin.id),
                    description: Some(format!("PIN {} remainder refund ({target})", pin.code)),
                },
            )
            .await?;
        }

        txn.commit().await?;

        log::info!(
            "PIN {} redeemed for {target}, used: {}, refunded: {remainder}",
            pin.masked_code(),
            pin.amount_used
        );
        Ok(pin)
    }

    /// 扫描到期仍为 active 的 PIN，逐个置为 expired 并全额退款
    ///
    /// 单个 PIN 失败只记录日志，不影响其它 PIN；返回本次实际过期的数量。
    pub async fn expire_stale_pins(&self) -> AppResult<u64> {
        let now = Utc::now();
        let stale = wallet_pins::Entity::find()
            .filter(wallet_pins::Column::Status.eq(PinStatus::Active))
            .filter(wallet_pins::Column::ExpiresAt.lte(now))
            .order_by_asc(wallet_pins::Column::Id)
            .all(&self.pool)
            .await?;

        let mut count = 0u64;
        for pin in stale {
            match self.expire_one(pin.id, now).await {
                Ok(true) => count += 1,
                Ok(false) => {}
                Err(e) => log::error!("Failed to expire PIN #{}: {e}", pin.id),
            }
        }
        Ok(count)
    }

    async fn expire_one(&self, pin_id: i64, now: DateTime<Utc>) -> AppResult<bool> {
        let txn = self.pool.begin().await?;

        let Some(pin) = wallet_pins::Entity::find_by_id(pin_id)
            .lock_exclusive()
            .one(&txn)
            .await?
        else {
            return Ok(false);
        };

        // 加锁后可能已被核销或退款
        if pin.status != PinStatus::Active || !pin.is_expired_at(now) {
            return Ok(false);
        }

        let mut am = pin.into_active_model();
        am.status = Set(PinStatus::Expired);
        am.updated_at = Set(Utc::now());
        let pin = am.update(&txn).await?;

        WalletService::post_entry(
            &txn,
            LedgerEntry {
                wallet_id: pin.seller_wallet_id,
                transaction_type: TransactionType::Refund,
                amount: pin.amount,
                reference_type: ReferenceKind::PinExpiry,
                reference_id: Some(pin.id),
                description: Some(format!("Expired PIN {} refund", pin.code)),
            },
        )
        .await?;

        txn.commit().await?;

        log::info!(
            "PIN {} expired, refunded {} to wallet #{}",
            pin.masked_code(),
            pin.amount,
            pin.seller_wallet_id
        );
        Ok(true)
    }

    /// 管理员人工退款，只允许尚未使用且未过期处理的 active PIN
    pub async fn refund_pin(
        &self,
        pin_id: i64,
        admin_id: i64,
        reason: &str,
    ) -> AppResult<wallet_pins::Model> {
        let txn = self.pool.begin().await?;

        let pin = wallet_pins::Entity::find_by_id(pin_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("PIN #{pin_id} not found")))?;

        match pin.status {
            PinStatus::Active => {}
            PinStatus::Refunded => {
                return Err(AppError::AlreadyRefunded {
                    code_prefix: pin.masked_code(),
                });
            }
            PinStatus::Used => {
                return Err(AppError::AlreadyUsed {
                    code_prefix: pin.masked_code(),
                });
            }
            // 过期扫描已经全额退回
            PinStatus::Expired => {
                return Err(AppError::NotEligible {
                    status: pin.status.to_string(),
                });
            }
        }

        let reason = reason.trim();
        let mut description = format!("Manual refund of PIN {} by admin #{admin_id}", pin.code);
        if !reason.is_empty() {
            description.push_str(" - ");
            description.push_str(reason);
        }

        WalletService::post_entry(
            &txn,
            LedgerEntry {
                wallet_id: pin.seller_wallet_id,
                transaction_type: TransactionType::Refund,
                amount: pin.amount,
                reference_type: ReferenceKind::PinManualRefund,
                reference_id: Some(pin.id),
                description: Some(description),
            },
        )
        .await?;

        let mut am = pin.into_active_model();
        am.status = Set(PinStatus::Refunded);
        am.updated_at = Set(Utc::now());
        let pin = am.update(&txn).await?;

        txn.commit().await?;

        log::info!(
            "PIN {} manually refunded {} to wallet #{} by admin #{admin_id}",
            pin.masked_code(),
            pin.amount,
            pin.seller_wallet_id
        );
        Ok(pin)
    }

    pub async fn find_pin(&self, pin_id: i64) -> AppResult<wallet_pins::Model> {
        wallet_pins::Entity::find_by_id(pin_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("PIN #{pin_id} not found")))
    }

    /// 卖家的 PIN 记录（分页，最新在前）
    pub async fn list_pin_history(
        &self,
        seller_id: i64,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> AppResult<PaginatedResponse<WalletPinResponse>> {
        self.list_pins(Some(seller_id), None, page, per_page).await
    }

    /// 管理员查看全部 PIN，可按卖家和状态过滤
    pub async fn list_all_pins(
        &self,
        query: &PinListQuery,
    ) -> AppResult<PaginatedResponse<WalletPinResponse>> {
        self.list_pins(query.seller_id, query.status, query.page, query.per_page)
            .await
    }

    async fn list_pins(
        &self,
        seller_id: Option<i64>,
        status: Option<PinStatus>,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> AppResult<PaginatedResponse<WalletPinResponse>> {
        let params = PaginationParams::new(page, per_page);

        let mut base_query = wallet_pins::Entity::find();
        if let Some(seller_id) = seller_id {
            base_query = base_query.filter(wallet_pins::Column::SellerId.eq(seller_id));
        }
        if let Some(status) = status {
            base_query = base_query.filter(wallet_pins::Column::Status.eq(status));
        }

        let total = base_query.clone().count(&self.pool).await? as i64;
        let items = base_query
            .order_by_desc(wallet_pins::Column::CreatedAt)
            .order_by_desc(wallet_pins::Column::Id)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(
            items.into_iter().map(Into::into).collect(),
            &params,
            total,
        ))
    }
}
