//! # `AppContext`
//!
//! 进程内共享的认证组件。守卫与处理器都从这里取依赖。

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::auth::{
    CredentialStore, DatabaseCredentialStore, ExternalIdentityLinkService, HttpIdentityVerifier,
    IdentityResolver, IdentityVerifier, LinkSettings, MemorySessionStore, SessionStore,
    UserStatusCache,
};
use crate::config::AppConfig;
use crate::error::Result;
use crate::linfo;
use crate::logging::{LogComponent, LogStage};

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn CredentialStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub resolver: Arc<IdentityResolver>,
    pub linking: Arc<ExternalIdentityLinkService>,
}

impl AppContext {
    /// 用给定组件组装上下文，`verifier` 为 `None` 时外部身份功能关闭
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionStore>,
        verifier: Option<Arc<dyn IdentityVerifier>>,
    ) -> Self {
        let resolver = Arc::new(IdentityResolver::new(
            store.clone(),
            sessions.clone(),
            config.session.cookie_name.clone(),
        ));
        let linking = Arc::new(ExternalIdentityLinkService::new(
            store.clone(),
            verifier,
            LinkSettings::from_config(&config.auth),
        ));

        Self {
            config,
            store,
            sessions,
            resolver,
            linking,
        }
    }

    /// 按配置构造默认实现：数据库凭证存储、内存会话、HTTP 校验服务
    pub fn from_config(config: Arc<AppConfig>, db: Arc<DatabaseConnection>) -> Result<Self> {
        let store: Arc<dyn CredentialStore> = Arc::new(DatabaseCredentialStore::new(
            db,
            UserStatusCache::from_config(&config.cache),
        ));
        let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new(&config.session));

        let identity = &config.auth.external_identity;
        let verifier = identity
            .enabled
            .then(|| HttpIdentityVerifier::new(identity))
            .transpose()?
            .map(|v| Arc::new(v) as Arc<dyn IdentityVerifier>);

        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::Main,
            "context_ready",
            "认证组件初始化完成",
            external_identity = verifier.is_some(),
            register_enabled = config.auth.register_enabled
        );

        Ok(Self::new(config, store, sessions, verifier))
    }
}
