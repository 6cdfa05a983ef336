use crate::entities::exchange_rate_entity as exchange_rates;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExchangeRateResponse {
    pub id: i64,
    pub from_currency: String,
    pub to_currency: String,
    pub rate: f64,
    pub set_by: i64,
    pub updated_at: DateTime<Utc>,
}

impl From<exchange_rates::Model> for ExchangeRateResponse {
    fn from(m: exchange_rates::Model) -> Self {
        Self {
            id: m.id,
            from_currency: m.from_currency,
            to_currency: m.to_currency,
            rate: m.rate,
            set_by: m.set_by,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetExchangeRateRequest {
    pub from_currency: String,
    /// 默认 USD
    pub to_currency: Option<String>,
    pub rate: f64,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ExchangeRateQuery {
    pub from: String,
    pub to: Option<String>,
}
