//! # 身份解析
//!
//! 按优先级尝试：浏览器会话 → 长期访问令牌 → API 密钥（独立守卫）。
//! 一旦出示了凭证但校验失败立即拒绝，不会退回到更弱的策略。

use axum::http::HeaderMap;
use entity::tokens;
use std::sync::Arc;

use super::api_key::ApiKeyCredential;
use super::guard::{MSG_ACCESS_TOKEN_INVALID, MSG_NOT_LOGGED_IN, MSG_USER_INFO_INVALID};
use super::permissions::Role;
use super::session::{SessionData, SessionStore};
use super::store::CredentialStore;
use super::types::{IdentityClaim, OptionalUser};
use super::utils::AuthUtils;
use crate::error::{AuthError, AuthResult};
use crate::logging::{LogComponent, LogStage};
use crate::{ldebug, lwarn};

/// 身份解析器
pub struct IdentityResolver {
    store: Arc<dyn CredentialStore>,
    sessions: Arc<dyn SessionStore>,
    cookie_name: String,
}

impl IdentityResolver {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionStore>,
        cookie_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            sessions,
            cookie_name: cookie_name.into(),
        }
    }

    /// 读取请求携带的会话
    pub async fn load_session(&self, headers: &HeaderMap) -> AuthResult<Option<SessionData>> {
        let Some(session_id) = AuthUtils::parse_cookie(headers, &self.cookie_name) else {
            return Ok(None);
        };
        Ok(self.sessions.load(&session_id).await?)
    }

    /// 会话 / 访问令牌解析
    ///
    /// 有用户名的会话直接作为身份；否则必须提供访问令牌。
    pub async fn resolve_session(&self, headers: &HeaderMap) -> AuthResult<IdentityClaim> {
        if let Some(session) = self.load_session(headers).await? {
            if session.has_username() {
                return Ok(Self::claim_from_session(session));
            }
        }

        let token = AuthUtils::extract_authorization_header(headers)
            .map(AuthUtils::strip_bearer)
            .unwrap_or_default();
        if token.is_empty() {
            return Err(AuthError::MissingCredential(MSG_NOT_LOGGED_IN.to_string()));
        }

        let Some(claim) = self.store.find_access_token(token).await? else {
            lwarn!(
                "system",
                LogStage::Authentication,
                LogComponent::AccessToken,
                "access_token_invalid",
                "访问令牌无效",
                token = %AuthUtils::sanitize_api_key(token)
            );
            return Err(AuthError::InvalidCredential(
                MSG_ACCESS_TOKEN_INVALID.to_string(),
            ));
        };

        if claim.username.trim().is_empty() {
            return Err(AuthError::InvalidCredential(
                MSG_ACCESS_TOKEN_INVALID.to_string(),
            ));
        }
        if Role::from_i32(claim.role).is_none() {
            return Err(AuthError::InvalidCredential(MSG_USER_INFO_INVALID.to_string()));
        }

        ldebug!(
            "system",
            LogStage::Authentication,
            LogComponent::AccessToken,
            "access_token_resolved",
            "访问令牌解析成功",
            user_id = claim.id
        );
        Ok(claim)
    }

    /// 可选身份：会话中带有用户 ID 时返回
    pub async fn resolve_optional(&self, headers: &HeaderMap) -> Option<OptionalUser> {
        match self.load_session(headers).await {
            Ok(session) => session.and_then(|s| s.id).map(|id| OptionalUser { id }),
            Err(e) => {
                lwarn!(
                    "system",
                    LogStage::Authentication,
                    LogComponent::Session,
                    "session_load_failed",
                    "读取会话失败",
                    error = %e
                );
                None
            }
        }
    }

    /// API 密钥解析：返回解析后的凭证与通过校验的令牌
    pub async fn resolve_api_key(
        &self,
        headers: &HeaderMap,
    ) -> AuthResult<(ApiKeyCredential, tokens::Model)> {
        let credential = ApiKeyCredential::from_headers(headers);
        let secret = credential.secret().unwrap_or_default();

        match self.store.find_api_token(secret).await {
            Ok(token) => {
                ldebug!(
                    "system",
                    LogStage::Authentication,
                    LogComponent::ApiKey,
                    "api_key_resolved",
                    "API 密钥解析成功",
                    api_key = %credential.sanitized(),
                    token_id = token.id
                );
                Ok((credential, token))
            }
            Err(e) => {
                lwarn!(
                    "system",
                    LogStage::Authentication,
                    LogComponent::ApiKey,
                    "api_key_rejected",
                    &format!("API 密钥校验失败: {e}"),
                    api_key = %credential.sanitized()
                );
                Err(e)
            }
        }
    }

    fn claim_from_session(session: SessionData) -> IdentityClaim {
        IdentityClaim {
            id: session.id.unwrap_or_default(),
            username: session.username.unwrap_or_default(),
            role: session.role.unwrap_or_default(),
            status: session.status.unwrap_or_default(),
            group: session.group.unwrap_or_default(),
            use_access_token: false,
        }
    }
}
