//! # 用户接口
//!
//! 登录建立、注销、查询当前用户与管理员查询用户

use axum::Extension;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, header};
use axum::response::Response;
use entity::users;
use serde::Serialize;

use crate::auth::linking::MSG_USER_NOT_FOUND;
use crate::auth::session::{
    SessionData, clear_session_cookie, session_cookie, session_fingerprint,
};
use crate::auth::{AuthUtils, Principal};
use crate::logging::{LogComponent, LogStage};
use crate::management::response;
use crate::management::server::AppState;
use crate::{ldebug, linfo};

/// 对外展示的账户信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: i32,
    pub username: String,
    pub display_name: String,
    pub role: i32,
    pub status: i32,
    pub group: String,
}

impl From<users::Model> for UserProfile {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            display_name: user.display_name,
            role: user.role,
            status: user.status,
            group: user.group,
        }
    }
}

/// 建立登录会话并返回账户信息
pub async fn setup_login(state: &AppState, user: users::Model) -> Response {
    let session_id = match state.sessions.create(SessionData::for_user(&user)).await {
        Ok(id) => id,
        Err(e) => return response::app_error(e),
    };
    let cookie = match session_cookie(&state.config.session, &session_id) {
        Ok(cookie) => cookie,
        Err(e) => return response::app_error(e),
    };

    linfo!(
        "system",
        LogStage::Authentication,
        LogComponent::Session,
        "session_created",
        "登录会话已建立",
        user_id = user.id,
        session = %session_fingerprint(&session_id)
    );

    let mut resp = response::success(UserProfile::from(user));
    resp.headers_mut().insert(header::SET_COOKIE, cookie);
    resp
}

/// 注销：删除会话并让 Cookie 立即过期
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(session_id) = AuthUtils::parse_cookie(&headers, &state.config.session.cookie_name) {
        if let Err(e) = state.sessions.remove(&session_id).await {
            return response::app_error(e);
        }
        ldebug!(
            "system",
            LogStage::Authentication,
            LogComponent::Session,
            "session_removed",
            "会话已删除",
            session = %session_fingerprint(&session_id)
        );
    }

    let cookie = match clear_session_cookie(&state.config.session) {
        Ok(cookie) => cookie,
        Err(e) => return response::app_error(e),
    };
    let mut resp = response::success_without_data("");
    resp.headers_mut().insert(header::SET_COOKIE, cookie);
    resp
}

/// 当前登录用户
pub async fn get_self(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Response {
    find_profile(&state, principal.id).await
}

/// 管理员按 ID 查询用户
pub async fn get_user(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    find_profile(&state, id).await
}

async fn find_profile(state: &AppState, id: i32) -> Response {
    match state.store.find_user_by_id(id).await {
        Ok(Some(user)) => response::success(UserProfile::from(user)),
        Ok(None) => response::failure(MSG_USER_NOT_FOUND),
        Err(e) => response::app_error(e.into()),
    }
}
