//! # 配置管理模块
//!
//! 处理应用配置加载、验证和环境变量覆盖

mod app_config;
mod database;
mod manager;

pub use app_config::{
    AppConfig, AuthConfig, CacheConfig, ExternalIdentityConfig, ServerConfig, SessionConfig,
};
pub use database::DatabaseConfig;
pub use manager::ConfigManager;

use crate::ensure;

/// 验证配置有效性
pub fn validate_config(config: &AppConfig) -> crate::error::Result<()> {
    ensure!(
        config.server.port != 0,
        Config,
        format!("无效的服务器端口: {}", config.server.port)
    );
    ensure!(!config.database.url.is_empty(), Config, "数据库URL不能为空");
    ensure!(config.database.max_connections > 0, Config, "数据库最大连接数必须大于0");
    ensure!(
        !config.session.cookie_name.trim().is_empty(),
        Config,
        "会话 Cookie 名称不能为空"
    );

    let external = &config.auth.external_identity;
    ensure!(
        !external.enabled || !external.server_address.trim().is_empty(),
        Config,
        "启用外部身份登录时必须配置 server_address"
    );
    ensure!(external.timeout_secs > 0, Config, "外部身份校验超时时间必须大于0");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_rejects_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, crate::error::GatewayError::Config { .. }));
        assert_eq!(err.to_string(), "配置错误: 无效的服务器端口: 0");
    }

    #[test]
    fn test_rejects_enabled_external_identity_without_address() {
        let mut config = AppConfig::default();
        config.auth.external_identity.enabled = true;
        config.auth.external_identity.server_address = String::new();
        assert!(validate_config(&config).is_err());

        config.auth.external_identity.server_address = "http://verifier".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_rejects_zero_verifier_timeout() {
        let mut config = AppConfig::default();
        config.auth.external_identity.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }
}
