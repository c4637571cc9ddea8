//! # 认证错误分类
//!
//! 身份解析、授权闸门与外部身份绑定共用的错误类型。
//! 每个变体在检测处即被转换为终结响应，不会继续向下游传播。

use axum::http::StatusCode;
use thiserror::Error;

use super::GatewayError;

/// 认证结果
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// 认证错误
#[derive(Debug, Error)]
pub enum AuthError {
    /// 未提供任何身份凭证
    #[error("{0}")]
    MissingCredential(String),

    /// 提供了凭证但校验失败
    #[error("{0}")]
    InvalidCredential(String),

    /// 两处身份提示不一致
    #[error("{0}")]
    IdentityMismatch(String),

    #[error("user has been banned")]
    AccountDisabled,

    /// 外部身份指向已注销的账户
    #[error("user account has been logged out")]
    AccountLoggedOut,

    #[error("{0}")]
    InsufficientRole(String),

    /// 功能被配置关闭
    #[error("{0}")]
    FeatureDisabled(String),

    #[error("this external account has already been bound")]
    AlreadyBound,

    #[error("administrator has turned off new user registration")]
    RegistrationClosed,

    /// 外部校验服务超时或不可达
    #[error("identity verifier unavailable: {0}")]
    VerifierUnavailable(String),

    /// 外部校验服务明确拒绝
    #[error("{0}")]
    VerifierRejected(String),

    /// 凭证存储自身故障
    #[error(transparent)]
    Store(#[from] GatewayError),
}

impl AuthError {
    /// 稳定的错误类别码
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential(_) => "missing_credential",
            Self::InvalidCredential(_) => "invalid_credential",
            Self::IdentityMismatch(_) => "identity_mismatch",
            Self::AccountDisabled => "account_disabled",
            Self::AccountLoggedOut => "account_logged_out",
            Self::InsufficientRole(_) => "insufficient_role",
            Self::FeatureDisabled(_) => "feature_disabled",
            Self::AlreadyBound => "already_bound",
            Self::RegistrationClosed => "registration_closed",
            Self::VerifierUnavailable(_) => "verifier_unavailable",
            Self::VerifierRejected(_) => "verifier_rejected",
            Self::Store(_) => "store_error",
        }
    }

    /// 会话 / 访问令牌守卫使用的状态码
    ///
    /// 未认证返回 401；已认证但被策略拒绝时返回 200 并在响应体中标记失败，
    /// 浏览器端据此统一展示提示信息。
    #[must_use]
    pub const fn session_status(&self) -> StatusCode {
        match self {
            Self::MissingCredential(_) | Self::IdentityMismatch(_) => StatusCode::UNAUTHORIZED,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::OK,
        }
    }

    /// API 密钥守卫使用的状态码
    #[must_use]
    pub const fn token_status(&self) -> StatusCode {
        match self {
            Self::MissingCredential(_) | Self::InvalidCredential(_) | Self::IdentityMismatch(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::VerifierUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::FORBIDDEN,
        }
    }

    /// 是否为服务端故障（而非凭证问题）
    #[must_use]
    pub const fn is_server_fault(&self) -> bool {
        matches!(self, Self::Store(_) | Self::VerifierUnavailable(_))
    }
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Store(err.into())
    }
}
