//! # 配置管理器
//!
//! 统一的配置加载接口，支持 `GATEWAY_` 前缀的环境变量覆盖

use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::AppConfig;
use crate::error::{Context, GatewayError, Result};

/// 环境变量前缀
const ENV_PREFIX: &str = "GATEWAY_";

/// 配置管理器
pub struct ConfigManager {
    /// 当前配置
    config: Arc<RwLock<AppConfig>>,
    /// 生效的环境变量覆盖
    env_overrides: HashMap<String, String>,
}

impl ConfigManager {
    /// 创建配置管理器
    pub async fn new() -> Result<Self> {
        // 优先使用环境变量指定的配置文件路径
        let config_file = if let Ok(path) = env::var("GATEWAY_CONFIG_PATH") {
            path
        } else {
            let env = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
            format!("config/config.{env}.toml")
        };

        Self::from_file(&config_file).await
    }

    /// 从指定文件创建配置管理器
    pub async fn from_file(config_path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::load_config_file(config_path.as_ref())?;
        Self::from_config(config, Self::build_env_overrides())
    }

    /// 以给定配置和覆盖项构建（测试中绕过进程环境）
    pub fn from_config(
        mut config: AppConfig,
        env_overrides: HashMap<String, String>,
    ) -> Result<Self> {
        Self::apply_env_overrides(&mut config, &env_overrides)?;
        super::validate_config(&config)?;

        info!("配置管理器初始化完成");
        info!("- 环境变量覆盖: {} 个", env_overrides.len());
        info!(
            "- 外部身份登录: {}",
            if config.auth.external_identity.enabled { "启用" } else { "禁用" }
        );

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            env_overrides,
        })
    }

    /// 获取当前配置
    pub async fn get_config(&self) -> AppConfig {
        (*self.config.read().await).clone()
    }

    /// 生效的环境变量覆盖数量
    #[must_use]
    pub fn override_count(&self) -> usize {
        self.env_overrides.len()
    }

    /// 加载配置文件
    fn load_config_file(path: &Path) -> Result<AppConfig> {
        if !path.exists() {
            return Err(GatewayError::config(format!("配置文件不存在: {}", path.display())));
        }

        let config_content = std::fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;

        toml::from_str::<AppConfig>(&config_content)
            .with_context(|| format!("TOML解析失败 - 配置文件: {}", path.display()))
    }

    /// 构建环境变量覆盖映射
    fn build_env_overrides() -> HashMap<String, String> {
        let mut overrides = HashMap::new();

        for (key, value) in env::vars() {
            // GATEWAY_CONFIG_PATH 只用于定位配置文件
            if key == "GATEWAY_CONFIG_PATH" {
                continue;
            }
            if let Some(config_key) = key.strip_prefix(ENV_PREFIX) {
                // 例如: GATEWAY_SERVER_PORT -> server.port
                let config_path = config_key.to_lowercase().replace('_', ".");
                overrides.insert(config_path, value);
            }
        }

        debug!("发现 {} 个环境变量覆盖", overrides.len());
        overrides
    }

    /// 应用环境变量覆盖
    fn apply_env_overrides(
        config: &mut AppConfig,
        overrides: &HashMap<String, String>,
    ) -> Result<()> {
        for (path, value) in overrides {
            debug!(
                "应用环境变量覆盖: {} = {}",
                path,
                if path.contains("token") || path.contains("secret") {
                    "***"
                } else {
                    value.as_str()
                }
            );

            Self::apply_override_to_config(config, path, value)?;
        }
        Ok(())
    }

    fn parse_value<T>(path: &str, value: &str) -> Result<T>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        value.parse().map_err(|e| {
            GatewayError::config_with_source(format!("无效的配置值 {path}: {value}"), e)
        })
    }

    /// 将环境变量覆盖应用到配置对象
    fn apply_override_to_config(config: &mut AppConfig, path: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = path.split('.').collect();

        match parts.as_slice() {
            ["server", "host"] => config.server.host = value.to_string(),
            ["server", "port"] => config.server.port = Self::parse_value(path, value)?,
            ["database", "url"] => config.database.url = value.to_string(),
            ["database", "max", "connections"] => {
                config.database.max_connections = Self::parse_value(path, value)?;
            }
            ["cache", "user", "status", "ttl", "secs"] => {
                config.cache.user_status_ttl_secs = Self::parse_value(path, value)?;
            }
            ["session", "cookie", "name"] => config.session.cookie_name = value.to_string(),
            ["session", "ttl", "secs"] => config.session.ttl_secs = Self::parse_value(path, value)?,
            ["auth", "register", "enabled"] => {
                config.auth.register_enabled = Self::parse_value(path, value)?;
            }
            ["auth", "external", "identity", "enabled"] => {
                config.auth.external_identity.enabled = Self::parse_value(path, value)?;
            }
            ["auth", "external", "identity", "server", "address"] => {
                config.auth.external_identity.server_address = value.to_string();
            }
            ["auth", "external", "identity", "server", "token"] => {
                config.auth.external_identity.server_token = value.to_string();
            }
            ["auth", "external", "identity", "timeout", "secs"] => {
                config.auth.external_identity.timeout_secs = Self::parse_value(path, value)?;
            }
            _ => {
                warn!("未知的配置路径，忽略环境变量覆盖: {}", path);
            }
        }

        Ok(())
    }
}
