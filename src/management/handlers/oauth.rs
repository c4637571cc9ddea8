//! # 外部身份接口
//!
//! `GET /api/oauth/wechat?code=`：登录或注册；`GET /api/oauth/wechat/bind?code=`：绑定到当前账户。

use axum::Extension;
use axum::extract::{Query, State};
use axum::response::Response;

use super::CodeQuery;
use super::users::setup_login;
use crate::auth::Principal;
use crate::error::AuthError;
use crate::logging::{LogComponent, LogStage};
use crate::{lerror, lwarn};
use crate::management::response;
use crate::management::server::AppState;

pub async fn wechat_auth(State(state): State<AppState>, Query(query): Query<CodeQuery>) -> Response {
    match state.linking.login_or_register(&query.code).await {
        Ok(user) => setup_login(&state, user).await,
        Err(err) => {
            log_rejection("wechat_login_rejected", &err, None);
            response::linking_rejection(&err)
        }
    }
}

pub async fn wechat_bind(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<CodeQuery>,
) -> Response {
    match state.linking.bind(&query.code, principal.id).await {
        Ok(()) => response::success_without_data(""),
        Err(err) => {
            log_rejection("wechat_bind_rejected", &err, Some(principal.id));
            response::linking_rejection(&err)
        }
    }
}

/// 存储或校验服务故障记为 ERROR，凭证类拒绝记为 WARN
fn log_rejection(operation: &str, err: &AuthError, user_id: Option<i32>) {
    if err.is_server_fault() {
        lerror!(
            "system",
            LogStage::Linking,
            LogComponent::Handler,
            operation,
            &format!("外部身份流程故障: {err:?}"),
            kind = err.kind(),
            user_id = ?user_id
        );
    } else {
        lwarn!(
            "system",
            LogStage::Linking,
            LogComponent::Handler,
            operation,
            &format!("外部身份流程拒绝: {err}"),
            kind = err.kind(),
            user_id = ?user_id
        );
    }
}
