//! # 认证中间件
//!
//! axum 守卫：`user_auth` / `admin_auth` / `root_auth` 走会话与访问令牌，
//! `token_auth` 走 API 密钥，`try_user_auth` 只附加可选身份。
//! 通过时把上下文放入请求扩展；拒绝时直接返回终结响应，下游处理器不会执行。

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use super::guard;
use super::permissions::Role;
use super::types::{Principal, TokenContext};
use super::utils::{AuthUtils, CALLER_ID_HEADER};
use crate::error::AuthResult;
use crate::logging::{LogComponent, LogStage};
use crate::management::middleware::RequestId;
use crate::management::response;
use crate::management::server::AppState;
use crate::{ldebug, lwarn};

/// 普通用户及以上
pub async fn user_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    session_guard(&state, Role::Common, request, next).await
}

/// 管理员及以上
pub async fn admin_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    session_guard(&state, Role::Admin, request, next).await
}

/// 仅超级管理员
pub async fn root_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    session_guard(&state, Role::Root, request, next).await
}

/// 不拒绝请求，会话中有用户 ID 时附加 [`OptionalUser`](super::types::OptionalUser)
pub async fn try_user_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let user = state.resolver.resolve_optional(request.headers()).await;
    if let Some(user) = user {
        request.extensions_mut().insert(user);
    }
    next.run(request).await
}

/// API 密钥守卫
pub async fn token_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let request_id = RequestId::of(&request);
    let outcome = authorize_token(&state, request.headers()).await;
    match outcome {
        Ok(context) => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        Err(err) => {
            lwarn!(
                request_id,
                LogStage::Authorization,
                LogComponent::ApiKey,
                "token_auth_rejected",
                &format!("API 密钥守卫拒绝: {err}"),
                kind = err.kind(),
                path = %request.uri().path()
            );
            response::token_rejection(&err)
        }
    }
}

async fn session_guard(state: &AppState, min_role: Role, mut request: Request, next: Next) -> Response {
    let request_id = RequestId::of(&request);
    let outcome = authorize_session_request(state, request.headers(), min_role).await;
    match outcome {
        Ok(principal) => {
            ldebug!(
                request_id,
                LogStage::Authorization,
                LogComponent::Gate,
                "session_guard_pass",
                "会话守卫通过",
                user_id = principal.id,
                min_role = %min_role
            );
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(err) => {
            lwarn!(
                request_id,
                LogStage::Authorization,
                LogComponent::Gate,
                "session_guard_rejected",
                &format!("会话守卫拒绝: {err}"),
                kind = err.kind(),
                min_role = %min_role,
                path = %request.uri().path()
            );
            response::session_rejection(&err)
        }
    }
}

async fn authorize_session_request(
    state: &AppState,
    headers: &HeaderMap,
    min_role: Role,
) -> AuthResult<Principal> {
    let claim = state.resolver.resolve_session(headers).await?;
    guard::authorize_session(
        claim,
        AuthUtils::header_str(headers, CALLER_ID_HEADER),
        min_role,
    )
}

async fn authorize_token(state: &AppState, headers: &HeaderMap) -> AuthResult<TokenContext> {
    let (credential, token) = state.resolver.resolve_api_key(headers).await?;
    guard::authorize_api_key(state.store.as_ref(), &credential, token).await
}
