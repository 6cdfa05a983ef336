use crate::config::WalletConfig;
use crate::entities::{
    OwnerType, ReferenceKind, TransactionType, wallet_entity as wallets,
    wallet_transaction_entity as wallet_transactions,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    PaginatedResponse, PaginationParams, WalletListQuery, WalletResponse,
    WalletTransactionResponse,
};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};

// wallet_transactions.description 列宽
const MAX_DESCRIPTION_LEN: usize = 255;

/// 一笔待记账的余额变动
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub wallet_id: i64,
    pub transaction_type: TransactionType,
    /// 金额（美分），必须大于 0
    pub amount: i64,
    pub reference_type: ReferenceKind,
    pub reference_id: Option<i64>,
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct WalletService {
    pool: DatabaseConnection,
    config: WalletConfig,
}

impl WalletService {
    pub fn new(pool: DatabaseConnection, config: WalletConfig) -> Self {
        Self { pool, config }
    }

    /// 获取用户钱包（不存在则创建）
    pub async fn get_or_create_wallet(&self, owner_id: i64) -> AppResult<wallets::Model> {
        if let Some(w) = self.find_wallet_by_owner(owner_id).await? {
            return Ok(w);
        }

        let now = Utc::now();
        // 并发创建时依赖唯一索引，冲突即忽略后重新读取
        wallets::Entity::insert(wallets::ActiveModel {
            owner_type: Set(OwnerType::User),
            owner_id: Set(owner_id),
            balance: Set(0),
            currency: Set(self.config.default_currency.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::columns([wallets::Column::OwnerType, wallets::Column::OwnerId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&self.pool)
        .await?;

        self.find_wallet_by_owner(owner_id).await?.ok_or_else(|| {
            AppError::InternalError(format!("Wallet for user #{owner_id} missing after insert"))
        })
    }

    pub async fn find_wallet_by_owner(&self, owner_id: i64) -> AppResult<Option<wallets::Model>> {
        let wallet = wallets::Entity::find()
            .filter(wallets::Column::OwnerType.eq(OwnerType::User))
            .filter(wallets::Column::OwnerId.eq(owner_id))
            .one(&self.pool)
            .await?;
        Ok(wallet)
    }

    pub async fn find_wallet(&self, wallet_id: i64) -> AppResult<wallets::Model> {
        wallets::Entity::find_by_id(wallet_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Wallet #{wallet_id} not found")))
    }

    /// 扣款，成功后刷新 `wallet` 的余额
    pub async fn debit(
        &self,
        wallet: &mut wallets::Model,
        amount: i64,
        reference_type: ReferenceKind,
        reference_id: Option<i64>,
        description: Option<String>,
    ) -> AppResult<wallet_transactions::Model> {
        self.apply(
            wallet,
            TransactionType::Debit,
            amount,
            reference_type,
            reference_id,
            description,
        )
        .await
    }

    pub async fn credit(
        &self,
        wallet: &mut wallets::Model,
        amount: i64,
        reference_type: ReferenceKind,
        reference_id: Option<i64>,
        description: Option<String>,
    ) -> AppResult<wallet_transactions::Model> {
        self.apply(
            wallet,
            TransactionType::Credit,
            amount,
            reference_type,
            reference_id,
            description,
        )
        .await
    }

    /// 退款入账，效果同 credit，流水类型为 refund
    pub async fn refund(
        &self,
        wallet: &mut wallets::Model,
        amount: i64,
        reference_type: ReferenceKind,
        reference_id: Option<i64>,
        description: Option<String>,
    ) -> AppResult<wallet_transactions::Model> {
        self.apply(
            wallet,
            TransactionType::Refund,
            amount,
            reference_type,
            reference_id,
            description,
        )
        .await
    }

    async fn apply(
        &self,
        wallet: &mut wallets::Model,
        transaction_type: TransactionType,
        amount: i64,
        reference_type: ReferenceKind,
        reference_id: Option<i64>,
        description: Option<String>,
    ) -> AppResult<wallet_transactions::Model> {
        let txn = self.pool.begin().await?;
        let (updated, tx) = Self::post_entry(
            &txn,
            LedgerEntry {
                wallet_id: wallet.id,
                transaction_type,
                amount,
                reference_type,
                reference_id,
                description,
            },
        )
        .await?;
        txn.commit().await?;

        *wallet = updated;
        Ok(tx)
    }

    /// 在调用方的事务（或连接）内记账：
    /// 1. 加行锁读取钱包最新余额
    /// 2. debit 时校验余额
    /// 3. 更新余额并写入带前后余额快照的流水
    ///
    /// 调用方负责提交；出错时不做任何部分写入的清理，由事务回滚。
    pub async fn post_entry<C>(
        conn: &C,
        entry: LedgerEntry,
    ) -> AppResult<(wallets::Model, wallet_transactions::Model)>
    where
        C: ConnectionTrait,
    {
        if entry.amount <= 0 {
            return Err(AppError::InvalidAmount(entry.amount));
        }

        let wallet = wallets::Entity::find_by_id(entry.wallet_id)
            .lock_exclusive()
            .one(conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Wallet #{} not found", entry.wallet_id)))?;

        let balance_before = wallet.balance;
        let balance_after = match entry.transaction_type {
            TransactionType::Debit => {
                if !wallet.has_sufficient_balance(entry.amount) {
                    log::warn!(
                        "Debit of {} rejected for wallet #{}: insufficient balance",
                        entry.amount,
                        wallet.id
                    );
                    return Err(AppError::InsufficientBalance {
                        requested: entry.amount,
                    });
                }
                balance_before - entry.amount
            }
            TransactionType::Credit | TransactionType::Refund => balance_before
                .checked_add(entry.amount)
                .ok_or_else(|| {
                    AppError::InternalError(format!("Balance overflow on wallet #{}", wallet.id))
                })?,
        };

        let now = Utc::now();
        let mut am = wallet.into_active_model();
        am.balance = Set(balance_after);
        am.updated_at = Set(now);
        let wallet = am.update(conn).await?;

        let tx = wallet_transactions::ActiveModel {
            wallet_id: Set(wallet.id),
            transaction_type: Set(entry.transaction_type),
            amount: Set(entry.amount),
            description: Set(entry
                .description
                .map(|d| d.chars().take(MAX_DESCRIPTION_LEN).collect())),
            reference_type: Set(entry.reference_type),
            reference_id: Set(entry.reference_id),
            balance_before: Set(balance_before),
            balance_after: Set(balance_after),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        log::info!(
            "Wallet #{} {} {} ({}), balance {} -> {}",
            wallet.id,
            tx.transaction_type,
            tx.amount,
            tx.reference_type,
            balance_before,
            balance_after
        );

        Ok((wallet, tx))
    }

    /// 管理员充值
    pub async fn recharge_wallet(
        &self,
        wallet_id: i64,
        amount: i64,
        admin_id: i64,
    ) -> AppResult<wallets::Model> {
        if amount <= 0 {
            return Err(AppError::InvalidAmount(amount));
        }
        let mut wallet = self.find_wallet(wallet_id).await?;
        self.credit(
            &mut wallet,
            amount,
            ReferenceKind::Recharge,
            None,
            Some(format!("Recharge by admin #{admin_id}")),
        )
        .await?;

        log::info!("Wallet #{wallet_id} recharged with {amount} by admin #{admin_id}");
        Ok(wallet)
    }

    /// 按用户充值，钱包不存在时先创建
    pub async fn recharge_user(
        &self,
        user_id: i64,
        amount: i64,
        admin_id: i64,
    ) -> AppResult<wallets::Model> {
        if amount <= 0 {
            return Err(AppError::InvalidAmount(amount));
        }
        let wallet = self.get_or_create_wallet(user_id).await?;
        self.recharge_wallet(wallet.id, amount, admin_id).await
    }

    /// 开发者发行资金到目标用户钱包
    pub async fn generate_treasury(
        &self,
        amount: i64,
        issuer_id: i64,
        target_owner_id: i64,
    ) -> AppResult<wallets::Model> {
        if amount <= 0 {
            return Err(AppError::InvalidAmount(amount));
        }
        let mut wallet = self.get_or_create_wallet(target_owner_id).await?;
        self.credit(
            &mut wallet,
            amount,
            ReferenceKind::Treasury,
            None,
            Some(format!("Treasury issued by dev #{issuer_id}")),
        )
        .await?;

        log::info!("Treasury {amount} issued by dev #{issuer_id} for user #{target_owner_id}");
        Ok(wallet)
    }

    /// 钱包流水（分页，最新在前）
    pub async fn list_transactions(
        &self,
        wallet_id: i64,
        query: &WalletListQuery,
    ) -> AppResult<PaginatedResponse<WalletTransactionResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let base_query = wallet_transactions::Entity::find()
            .filter(wallet_transactions::Column::WalletId.eq(wallet_id));

        let total = base_query.clone().count(&self.pool).await? as i64;
        let items = base_query
            .order_by_desc(wallet_transactions::Column::CreatedAt)
            .order_by_desc(wallet_transactions::Column::Id)
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

    /// 所有钱包（余额从高到低）
    pub async fn list_all_wallets(
        &self,
        query: &WalletListQuery,
    ) -> AppResult<PaginatedResponse<WalletResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let base_query = wallets::Entity::find();

        let total = base_query.clone().count(&self.pool).await? as i64;
        let items = base_query
            .order_by_desc(wallets::Column::Balance)
            .order_by_asc(wallets::Column::Id)
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

    /// 全局流水审计
    pub async fn list_all_transactions(
        &self,
        query: &WalletListQuery,
    ) -> AppResult<PaginatedResponse<WalletTransactionResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let base_query = wallet_transactions::Entity::find();

        let total = base_query.clone().count(&self.pool).await? as i64;
        let items = base_query
            .order_by_desc(wallet_transactions::Column::CreatedAt)
            .order_by_desc(wallet_transactions::Column::Id)
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
