//! # 应用配置结构

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::DatabaseConfig;

/// 应用主配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub session: SessionConfig,
    pub auth: AuthConfig,
}

/// HTTP 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// 监听地址字符串
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 用户状态缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// 用户启用状态 / 角色快照的缓存时间（秒）
    pub user_status_ttl_secs: u64,
    pub user_status_max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            user_status_ttl_secs: 30,
            user_status_max_entries: 10_000,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub const fn user_status_ttl(&self) -> Duration {
        Duration::from_secs(self.user_status_ttl_secs)
    }
}

/// 浏览器会话配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub cookie_name: String,
    /// 会话有效期（秒）
    pub ttl_secs: u64,
    pub max_entries: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "session".to_string(),
            ttl_secs: 30 * 24 * 3600,
            max_entries: 100_000,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// 认证相关开关
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// 是否允许新用户自助注册
    pub register_enabled: bool,
    pub external_identity: ExternalIdentityConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            register_enabled: true,
            external_identity: ExternalIdentityConfig::default(),
        }
    }
}

/// 外部身份（微信）登录配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalIdentityConfig {
    pub enabled: bool,
    /// 校验服务基础地址
    pub server_address: String,
    /// 原样放入 `Authorization` 请求头的静态凭证
    pub server_token: String,
    pub timeout_secs: u64,
    pub user_path: String,
    /// 自动注册用户名前缀
    pub username_prefix: String,
    pub display_name: String,
}

impl Default for ExternalIdentityConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            server_address: String::new(),
            server_token: String::new(),
            timeout_secs: 5,
            user_path: "/api/wechat/user".to_string(),
            username_prefix: "wechat_".to_string(),
            display_name: "WeChat User".to_string(),
        }
    }
}

impl ExternalIdentityConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
