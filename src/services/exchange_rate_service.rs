use crate::entities::exchange_rate_entity as exchange_rates;
use crate::error::{AppError, AppResult};
use crate::models::ExchangeRateResponse;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

/// 汇率配置查询，仅保存管理员设置的固定汇率，不做换算
#[derive(Clone)]
pub struct ExchangeRateService {
    pool: DatabaseConnection,
}

impl ExchangeRateService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 设置汇率：停用同币种对的旧汇率并写入新汇率
    pub async fn set_rate(
        &self,
        from_currency: &str,
        to_currency: &str,
        rate: f64,
        admin_id: i64,
    ) -> AppResult<ExchangeRateResponse> {
        let from = normalize_currency(from_currency)?;
        let to = normalize_currency(to_currency)?;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(AppError::ValidationError(
                "Exchange rate must be a positive number".to_string(),
            ));
        }

        let txn = self.pool.begin().await?;

        exchange_rates::Entity::update_many()
            .col_expr(exchange_rates::Column::IsActive, Expr::value(false))
            .col_expr(exchange_rates::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(exchange_rates::Column::FromCurrency.eq(from.as_str()))
            .filter(exchange_rates::Column::ToCurrency.eq(to.as_str()))
            .filter(exchange_rates::Column::IsActive.eq(true))
            .exec(&txn)
            .await?;

        let now = Utc::now();
        let model = exchange_rates::ActiveModel {
            from_currency: Set(from.clone()),
            to_currency: Set(to.clone()),
            rate: Set(rate),
            set_by: Set(admin_id),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        log::info!("Exchange rate {from}/{to} set to {rate} by admin #{admin_id}");
        Ok(model.into())
    }

    /// 当前生效的汇率
    pub async fn get_rate(
        &self,
        from_currency: &str,
        to_currency: &str,
    ) -> AppResult<ExchangeRateResponse> {
        let from = normalize_currency(from_currency)?;
        let to = normalize_currency(to_currency)?;

        exchange_rates::Entity::find()
            .filter(exchange_rates::Column::FromCurrency.eq(from.as_str()))
            .filter(exchange_rates::Column::ToCurrency.eq(to.as_str()))
            .filter(exchange_rates::Column::IsActive.eq(true))
            .order_by_desc(exchange_rates::Column::Id)
            .one(&self.pool)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("No exchange rate for {from}/{to}")))
    }

    pub async fn list_active(&self) -> AppResult<Vec<ExchangeRateResponse>> {
        let list = exchange_rates::Entity::find()
            .filter(exchange_rates::Column::IsActive.eq(true))
            .order_by_asc(exchange_rates::Column::FromCurrency)
            .order_by_asc(exchange_rates::Column::ToCurrency)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }
}

fn normalize_currency(code: &str) -> AppResult<String> {
    let code = code.trim().to_ascii_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(AppError::ValidationError(format!(
            "Invalid currency code: {code}"
        )));
    }
    Ok(code)
}
