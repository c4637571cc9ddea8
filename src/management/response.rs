//! # API 响应结构
//!
//! 所有接口统一输出 `{success, message, data?}`。认证拒绝同样使用该格式：
//! 未认证返回 401，已认证但被策略拒绝返回 200 且 `success=false`。
//! API 密钥守卫额外附带兼容 OpenAI 客户端的 `error` 对象。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AuthError, ErrorCategory, GatewayError};
use crate::lerror;
use crate::logging::{LogComponent, LogStage};

/// 对外隐藏存储故障细节
const INTERNAL_MESSAGE: &str = "internal server error";

/// # 标准成功响应
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: DateTime<Utc>,
}

/// # OpenAI 兼容的错误对象
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
    pub code: String,
}

/// # 标准错误响应
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    pub timestamp: DateTime<Utc>,
}

/// # API响应枚举
///
/// 统一所有API出口，方便转换为 `axum::response::Response`
#[derive(Debug)]
pub enum ApiResponse<T: Serialize> {
    Success(T),
    SuccessWithoutData(String),
    /// 状态码与提示信息
    Rejected(StatusCode, String),
    /// 状态码、错误码与提示信息
    TokenRejected(StatusCode, String, String),
    AppError(GatewayError),
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self {
            Self::Success(data) => (
                StatusCode::OK,
                Json(SuccessResponse {
                    success: true,
                    message: String::new(),
                    data: Some(data),
                    timestamp: Utc::now(),
                }),
            )
                .into_response(),
            Self::SuccessWithoutData(message) => (
                StatusCode::OK,
                Json(SuccessResponse::<()> {
                    success: true,
                    message,
                    data: None,
                    timestamp: Utc::now(),
                }),
            )
                .into_response(),
            Self::Rejected(status, message) => (
                status,
                Json(ErrorResponse {
                    success: false,
                    message,
                    error: None,
                    timestamp: Utc::now(),
                }),
            )
                .into_response(),
            Self::TokenRejected(status, code, message) => (
                status,
                Json(ErrorResponse {
                    success: false,
                    message: message.clone(),
                    error: Some(ErrorInfo {
                        message,
                        error_type: "gateway_error".to_string(),
                        code,
                    }),
                    timestamp: Utc::now(),
                }),
            )
                .into_response(),
            Self::AppError(error) => {
                let (status, code) = error.to_http_response_parts();
                let message = if error.category() == ErrorCategory::Server {
                    lerror!(
                        "system",
                        LogStage::Db,
                        LogComponent::Handler,
                        "request_failed",
                        &format!("请求处理失败: {error:?}"),
                        code = code
                    );
                    INTERNAL_MESSAGE.to_string()
                } else {
                    error.to_string()
                };
                (
                    status,
                    Json(ErrorResponse {
                        success: false,
                        message,
                        error: None,
                        timestamp: Utc::now(),
                    }),
                )
                    .into_response()
            }
        }
    }
}

fn public_message(error: &AuthError) -> String {
    match error {
        AuthError::Store(_) => INTERNAL_MESSAGE.to_string(),
        other => other.to_string(),
    }
}

/// # 便捷函数：成功响应
pub fn success<T: Serialize>(data: T) -> Response {
    ApiResponse::Success(data).into_response()
}

/// # 便捷函数：无数据体的成功响应
pub fn success_without_data(message: &str) -> Response {
    ApiResponse::<()>::SuccessWithoutData(message.to_string()).into_response()
}

/// # 便捷函数：业务失败（200 + success=false）
pub fn failure(message: &str) -> Response {
    ApiResponse::<()>::Rejected(StatusCode::OK, message.to_string()).into_response()
}

/// # 便捷函数：应用错误
pub fn app_error(error: GatewayError) -> Response {
    ApiResponse::<()>::AppError(error).into_response()
}

/// # 会话 / 访问令牌守卫拒绝
pub fn session_rejection(error: &AuthError) -> Response {
    ApiResponse::<()>::Rejected(error.session_status(), public_message(error)).into_response()
}

/// # API 密钥守卫拒绝
pub fn token_rejection(error: &AuthError) -> Response {
    ApiResponse::<()>::TokenRejected(
        error.token_status(),
        error.kind().to_string(),
        public_message(error),
    )
    .into_response()
}

/// # 外部身份流程拒绝
///
/// 除存储故障外都以 200 返回，由前端直接展示提示。
pub fn linking_rejection(error: &AuthError) -> Response {
    let status = if matches!(error, AuthError::Store(_)) {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };
    ApiResponse::<()>::Rejected(status, public_message(error)).into_response()
}
