//! # 状态接口

use axum::Extension;
use axum::extract::State;
use axum::response::Response;
use serde::Serialize;

use crate::auth::OptionalUser;
use crate::management::response;
use crate::management::server::AppState;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub external_identity_login: bool,
    pub register_enabled: bool,
    /// 请求携带有效会话时的用户 ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i32>,
}

/// 公开的功能开关状态
pub async fn get_status(
    State(state): State<AppState>,
    user: Option<Extension<OptionalUser>>,
) -> Response {
    response::success(StatusResponse {
        external_identity_login: state.linking.enabled(),
        register_enabled: state.linking.register_enabled(),
        user_id: user.map(|Extension(user)| user.id),
    })
}

pub async fn ping_handler() -> &'static str {
    "pong"
}

/// 认证相关配置摘要（不含密钥）
#[derive(Debug, Serialize)]
pub struct AuthOptions {
    pub register_enabled: bool,
    pub external_identity_enabled: bool,
    pub external_identity_server: String,
    pub verifier_timeout_secs: u64,
    pub session_ttl_secs: u64,
    pub user_status_ttl_secs: u64,
}

/// 仅超级管理员可见
pub async fn get_options(State(state): State<AppState>) -> Response {
    let config = &state.config;
    response::success(AuthOptions {
        register_enabled: config.auth.register_enabled,
        external_identity_enabled: state.linking.enabled(),
        external_identity_server: config.auth.external_identity.server_address.clone(),
        verifier_timeout_secs: config.auth.external_identity.timeout_secs,
        session_ttl_secs: config.session.ttl_secs,
        user_status_ttl_secs: config.cache.user_status_ttl_secs,
    })
}
