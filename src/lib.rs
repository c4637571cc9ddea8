//! # API Gateway Auth
//!
//! 多租户 API 网关的请求认证与授权层：
//! 会话 / 访问令牌 / API 密钥三种身份解析、角色与状态闸门，
//! 以及外部身份（微信）登录注册与绑定。

pub mod app;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod management;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export commonly used types
pub use app::AppContext;
pub use config::AppConfig;
pub use error::{AuthError, GatewayError, Result};
