//! # 外部身份绑定流程
//!
//! 两个入口：用授权码登录（必要时自动注册），以及把外部身份绑定到已登录账户。
//! 功能关闭时立即拒绝，不会发起外部调用。

use entity::users;
use std::sync::Arc;

use super::external_identity::IdentityVerifier;
use super::permissions::{Role, UserStatus};
use super::store::{CredentialStore, NewUser};
use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::logging::{LogComponent, LogStage};
use crate::{ldebug, linfo, lwarn};

pub const MSG_FEATURE_DISABLED: &str =
    "administrator has not enabled login and registration via WeChat";
pub const MSG_EMPTY_CODE: &str = "invalid parameter";
pub const MSG_USER_NOT_FOUND: &str = "user does not exist";

/// 自动注册参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSettings {
    pub register_enabled: bool,
    pub username_prefix: String,
    pub display_name: String,
    pub default_group: String,
}

impl LinkSettings {
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            register_enabled: config.register_enabled,
            username_prefix: config.external_identity.username_prefix.clone(),
            display_name: config.external_identity.display_name.clone(),
            default_group: "default".to_string(),
        }
    }
}

/// 外部身份绑定服务
pub struct ExternalIdentityLinkService {
    store: Arc<dyn CredentialStore>,
    /// `None` 表示功能关闭
    verifier: Option<Arc<dyn IdentityVerifier>>,
    settings: LinkSettings,
}

impl ExternalIdentityLinkService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        verifier: Option<Arc<dyn IdentityVerifier>>,
        settings: LinkSettings,
    ) -> Self {
        Self {
            store,
            verifier,
            settings,
        }
    }

    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.verifier.is_some()
    }

    #[must_use]
    pub const fn register_enabled(&self) -> bool {
        self.settings.register_enabled
    }

    /// 登录或注册
    ///
    /// 成功时返回已启用的账户，由调用方建立会话。
    pub async fn login_or_register(&self, code: &str) -> AuthResult<users::Model> {
        let external_id = self.exchange(code).await?;

        let user = if self.store.external_identity_taken(&external_id).await? {
            match self.store.find_user_by_external_identity(&external_id).await? {
                Some(user) if user.id != 0 => user,
                _ => {
                    lwarn!(
                        "system",
                        LogStage::Linking,
                        LogComponent::Linking,
                        "account_logged_out",
                        "外部身份对应的账户已注销"
                    );
                    return Err(AuthError::AccountLoggedOut);
                }
            }
        } else {
            if !self.settings.register_enabled {
                return Err(AuthError::RegistrationClosed);
            }
            self.register(external_id).await?
        };

        if !UserStatus::from_i32(user.status).is_enabled() {
            return Err(AuthError::AccountDisabled);
        }

        ldebug!(
            "system",
            LogStage::Linking,
            LogComponent::Linking,
            "external_login",
            "外部身份登录成功",
            user_id = user.id
        );
        Ok(user)
    }

    /// 把外部身份绑定到当前登录用户
    ///
    /// 外部身份已被任何账户占用时拒绝，账户记录保持不变。
    pub async fn bind(&self, code: &str, caller_id: i32) -> AuthResult<()> {
        let external_id = self.exchange(code).await?;

        if self.store.external_identity_taken(&external_id).await? {
            return Err(AuthError::AlreadyBound);
        }

        let mut user = self
            .store
            .find_user_by_id(caller_id)
            .await?
            .ok_or_else(|| AuthError::InvalidCredential(MSG_USER_NOT_FOUND.to_string()))?;
        user.external_id = Some(external_id);
        self.store.update_user(&user).await?;

        linfo!(
            "system",
            LogStage::Linking,
            LogComponent::Linking,
            "external_bind",
            "外部身份绑定成功",
            user_id = caller_id
        );
        Ok(())
    }

    async fn exchange(&self, code: &str) -> AuthResult<String> {
        let Some(verifier) = &self.verifier else {
            return Err(AuthError::FeatureDisabled(MSG_FEATURE_DISABLED.to_string()));
        };
        if code.is_empty() {
            return Err(AuthError::MissingCredential(MSG_EMPTY_CODE.to_string()));
        }
        verifier.exchange_code(code).await
    }

    async fn register(&self, external_id: String) -> AuthResult<users::Model> {
        let next_id = self.store.next_user_id().await?;
        let user = self
            .store
            .create_user(NewUser {
                username: format!("{}{next_id}", self.settings.username_prefix),
                display_name: self.settings.display_name.clone(),
                role: Role::Common,
                status: UserStatus::Enabled,
                group: self.settings.default_group.clone(),
                external_id: Some(external_id),
            })
            .await?;

        linfo!(
            "system",
            LogStage::Linking,
            LogComponent::Linking,
            "external_register",
            "外部身份自动注册新用户",
            user_id = user.id,
            username = %user.username
        );
        Ok(user)
    }
}
