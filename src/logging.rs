//! # 日志配置模块
//!
//! 结构化日志初始化，以及按阶段 / 组件打标签的日志宏。
//! 所有认证相关日志都经过脱敏，密钥与令牌不会以明文出现。

use std::env;
use std::fmt;
use tracing_subscriber::{EnvFilter, fmt as tracing_fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// 请求处理阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogStage {
    Startup,
    Shutdown,
    /// 身份解析
    Authentication,
    /// 角色 / 状态校验
    Authorization,
    /// 外部身份绑定
    Linking,
    Cache,
    Db,
    /// 外部身份校验服务调用
    Verifier,
}

impl LogStage {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Shutdown => "shutdown",
            Self::Authentication => "authentication",
            Self::Authorization => "authorization",
            Self::Linking => "linking",
            Self::Cache => "cache",
            Self::Db => "db",
            Self::Verifier => "verifier",
        }
    }
}

impl fmt::Display for LogStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 产生日志的组件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogComponent {
    Main,
    Config,
    Database,
    Session,
    AccessToken,
    ApiKey,
    Gate,
    Verifier,
    Linking,
    Cache,
    Handler,
}

impl LogComponent {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Config => "config",
            Self::Database => "database",
            Self::Session => "session",
            Self::AccessToken => "access_token",
            Self::ApiKey => "api_key",
            Self::Gate => "gate",
            Self::Verifier => "verifier",
            Self::Linking => "linking",
            Self::Cache => "cache",
            Self::Handler => "handler",
        }
    }
}

impl fmt::Display for LogComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __gateway_log {
    ($level:ident, $request_id:expr, $stage:expr, $component:expr, $operation:expr, $message:expr $(, $($fields:tt)*)?) => {
        ::tracing::$level!(
            request_id = %$request_id,
            stage = %$stage,
            component = %$component,
            operation = %$operation,
            $($($fields)*,)?
            "{}",
            $message
        )
    };
}

/// INFO 级别结构化日志
#[macro_export]
macro_rules! linfo {
    ($($args:tt)*) => { $crate::__gateway_log!(info, $($args)*) };
}

/// WARN 级别结构化日志
#[macro_export]
macro_rules! lwarn {
    ($($args:tt)*) => { $crate::__gateway_log!(warn, $($args)*) };
}

/// ERROR 级别结构化日志
#[macro_export]
macro_rules! lerror {
    ($($args:tt)*) => { $crate::__gateway_log!(error, $($args)*) };
}

/// DEBUG 级别结构化日志
#[macro_export]
macro_rules! ldebug {
    ($($args:tt)*) => { $crate::__gateway_log!(debug, $($args)*) };
}

/// 初始化日志系统
///
/// `RUST_LOG` 优先；否则使用给定级别并屏蔽数据库查询明细。
pub fn init_optimized_logging(log_level: Option<&String>) {
    let level = log_level.map_or("info", String::as_str);

    // 默认配置：完全禁止数据库查询的详细日志
    let default_filter = format!(
        "{level},api_gateway_auth=debug,sqlx::query=off,sea_orm::query=warn,sqlx=warn"
    );

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let initialised = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init()
        .is_ok();

    if initialised
        && env::var("RUST_LOG").is_ok_and(|v| v.contains("sqlx::query=info") || v.contains("sqlx::query=debug"))
    {
        tracing::info!("🔍 SQLx database query logging enabled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_and_component_labels() {
        assert_eq!(LogStage::Authentication.to_string(), "authentication");
        assert_eq!(LogComponent::AccessToken.to_string(), "access_token");
        assert_eq!(LogComponent::ApiKey.as_str(), "api_key");
    }

    #[test]
    fn test_log_macros_expand_with_fields() {
        let user_id = 7;
        crate::linfo!("req-1", LogStage::Authorization, LogComponent::Gate, "allow", "放行", user_id = user_id);
        crate::lwarn!("req-1", LogStage::Cache, LogComponent::Cache, "miss", &format!("缓存未命中: {user_id}"));
        crate::ldebug!("req-1", LogStage::Db, LogComponent::Database, "query", "查询");
        crate::lerror!("req-1", LogStage::Verifier, LogComponent::Verifier, "timeout", "超时", error = %"elapsed");
    }

    #[test]
    #[serial_test::serial]
    fn test_repeated_init_is_harmless() {
        let level = "debug".to_string();
        init_optimized_logging(Some(&level));
        init_optimized_logging(None);
    }
}
