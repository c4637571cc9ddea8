//! # 浏览器会话
//!
//! 会话存储只按 Cookie 中的会话 ID 存取一份身份快照；核心流程只读它，
//! 写入只发生在登录建立与注销时。

use async_trait::async_trait;
use axum::http::HeaderValue;
use entity::users;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::error::{GatewayError, Result};

/// 会话中保存的身份字段，字段均可缺失
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub id: Option<i32>,
    pub username: Option<String>,
    pub role: Option<i32>,
    pub status: Option<i32>,
    pub group: Option<String>,
}

impl SessionData {
    /// 登录成功后写入的完整会话
    #[must_use]
    pub fn for_user(user: &users::Model) -> Self {
        Self {
            id: Some(user.id),
            username: Some(user.username.clone()),
            role: Some(user.role),
            status: Some(user.status),
            group: Some(user.group.clone()),
        }
    }

    /// 写入过用户名（即便为空）的会话才具有权威性
    #[must_use]
    pub const fn has_username(&self) -> bool {
        self.username.is_some()
    }
}

/// 会话存储
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, session_id: &str) -> Result<Option<SessionData>>;

    /// 保存新会话并返回会话 ID
    async fn create(&self, data: SessionData) -> Result<String>;

    async fn remove(&self, session_id: &str) -> Result<()>;
}

/// 进程内会话存储
pub struct MemorySessionStore {
    sessions: Cache<String, SessionData>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(config.max_entries)
                .time_to_live(config.ttl())
                .build(),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, session_id: &str) -> Result<Option<SessionData>> {
        Ok(self.sessions.get(session_id).await)
    }

    async fn create(&self, data: SessionData) -> Result<String> {
        let session_id = Uuid::new_v4().simple().to_string();
        self.sessions.insert(session_id.clone(), data).await;
        Ok(session_id)
    }

    async fn remove(&self, session_id: &str) -> Result<()> {
        self.sessions.invalidate(session_id).await;
        Ok(())
    }
}

/// 会话 ID 的短指纹，日志中代替原值
#[must_use]
pub fn session_fingerprint(session_id: &str) -> String {
    let digest = Sha256::digest(session_id.as_bytes());
    hex::encode(&digest[..6])
}

/// 设置会话 Cookie
pub fn session_cookie(config: &SessionConfig, session_id: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{}={session_id}; Max-Age={}; HttpOnly; SameSite=Strict; Path=/",
        config.cookie_name, config.ttl_secs
    ))
    .map_err(|e| GatewayError::internal_with_source("构造会话 Cookie 失败", e))
}

/// 清除会话 Cookie
pub fn clear_session_cookie(config: &SessionConfig) -> Result<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{}=; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Strict; Path=/",
        config.cookie_name
    ))
    .map_err(|e| GatewayError::internal_with_source("构造会话 Cookie 失败", e))
}
