use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 统一响应包装：`{ success, data?, message?, error? }`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// 稳定错误码，如 INSUFFICIENT_BALANCE
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::<()>::error("PIN_ALREADY_USED", "used")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "success": false,
                "error": { "code": "PIN_ALREADY_USED", "message": "used" }
            })
        );
    }

    #[test]
    fn test_success_envelope_omits_error() {
        let body = serde_json::to_value(ApiResponse::success(42)).unwrap();
        assert_eq!(body, serde_json::json!({ "success": true, "data": 42 }));
    }
}
