//! # 路由配置
//!
//! 按守卫分组：公开接口只附加可选身份，其余接口由对应角色守卫把关。

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::get;

use super::handlers::{oauth, status, token, users};
use crate::auth::middleware::{admin_auth, root_auth, token_auth, try_user_auth, user_auth};
use crate::management::server::AppState;

/// `/api` 下的全部路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .merge(public_routes(&state))
        .merge(user_routes(&state))
        .merge(admin_routes(&state))
        .merge(root_routes(&state))
        .with_state(state)
}

/// `/v1` 下由 API 密钥守卫保护的路由
pub fn create_relay_routes(state: AppState) -> Router {
    Router::new()
        .route("/token/context", get(token::token_context))
        .route_layer(from_fn_with_state(state.clone(), token_auth))
        .with_state(state)
}

fn public_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/status", get(status::get_status))
        .route("/oauth/wechat", get(oauth::wechat_auth))
        .route("/user/logout", get(users::logout).post(users::logout))
        .route_layer(from_fn_with_state(state.clone(), try_user_auth))
}

fn user_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/oauth/wechat/bind", get(oauth::wechat_bind))
        .route("/user/self", get(users::get_self))
        .route_layer(from_fn_with_state(state.clone(), user_auth))
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/user/{id}", get(users::get_user))
        .route_layer(from_fn_with_state(state.clone(), admin_auth))
}

fn root_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/option", get(status::get_options))
        .route_layer(from_fn_with_state(state.clone(), root_auth))
}
