use crate::models::ApiResponse;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Amount must be greater than zero, got {0}")]
    InvalidAmount(i64),

    // 不带余额，避免把钱包余额泄露给调用方
    #[error("Insufficient wallet balance for amount {requested}")]
    InsufficientBalance { requested: i64 },

    #[error("Invalid or expired PIN {code_prefix}")]
    InvalidOrExpiredPin { code_prefix: String },

    #[error("Amount {requested} exceeds PIN amount {available}")]
    AmountExceedsPin { requested: i64, available: i64 },

    #[error("PIN {code_prefix} has already been used")]
    AlreadyUsed { code_prefix: String },

    #[error("PIN {code_prefix} has already been refunded")]
    AlreadyRefunded { code_prefix: String },

    #[error("PIN is not eligible for refund (status: {status})")]
    NotEligible { status: String },

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl AppError {
    /// 对外暴露的稳定错误码
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::AuthError(_) | AppError::JwtError(_) => "AUTH_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Forbidden => "FORBIDDEN",
            AppError::InvalidAmount(_) => "INVALID_AMOUNT",
            AppError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            AppError::InvalidOrExpiredPin { .. } => "INVALID_OR_EXPIRED_PIN",
            AppError::AmountExceedsPin { .. } => "AMOUNT_EXCEEDS_PIN",
            AppError::AlreadyUsed { .. } => "PIN_ALREADY_USED",
            AppError::AlreadyRefunded { .. } => "PIN_ALREADY_REFUNDED",
            AppError::NotEligible { .. } => "PIN_NOT_ELIGIBLE",
            AppError::ConfigError(_)
            | AppError::InternalError(_)
            | AppError::SerdeJsonError(_) => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) | AppError::InvalidOrExpiredPin { .. } => StatusCode::NOT_FOUND,
            AppError::InsufficientBalance { .. } | AppError::AmountExceedsPin { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::AlreadyUsed { .. }
            | AppError::AlreadyRefunded { .. }
            | AppError::NotEligible { .. } => StatusCode::CONFLICT,
            AppError::DatabaseError(_)
            | AppError::ConfigError(_)
            | AppError::InternalError(_)
            | AppError::SerdeJsonError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let message = match self {
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                "Database error".to_string()
            }
            AppError::ConfigError(_) | AppError::InternalError(_) | AppError::SerdeJsonError(_) => {
                log::error!("Internal error: {self}");
                "Internal server error".to_string()
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                msg.clone()
            }
            AppError::JwtError(err) => {
                log::warn!("Authentication error: {err}");
                "Invalid token".to_string()
            }
            AppError::Forbidden => {
                log::warn!("Forbidden access");
                "Forbidden".to_string()
            }
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                msg.clone()
            }
            AppError::NotFound(msg) => msg.clone(),
            _ => {
                log::warn!("Wallet operation rejected: {self}");
                self.to_string()
            }
        };

        HttpResponse::build(status_code).json(ApiResponse::<()>::error(self.error_code(), message))
    }
}
