//! # 测试数据 Fixtures
//!
//! 用户与 API 令牌的构建器，直接写库或生成内存模型

use chrono::Utc;
use entity::{tokens, users};
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, NotSet, Set};

use crate::auth::permissions::{Role, TokenStatus, UserStatus};

/// 用户测试数据构建器
#[derive(Debug, Clone)]
pub struct UserFixture {
    pub username: String,
    pub role: Role,
    pub status: UserStatus,
    pub group: String,
    pub external_id: Option<String>,
    pub access_token: Option<String>,
    pub deleted: bool,
}

impl UserFixture {
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            role: Role::Common,
            status: UserStatus::Enabled,
            group: "default".to_string(),
            external_id: None,
            access_token: None,
            deleted: false,
        }
    }

    #[must_use]
    pub const fn role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.status = UserStatus::Disabled;
        self
    }

    #[must_use]
    pub fn group(mut self, group: &str) -> Self {
        self.group = group.to_string();
        self
    }

    #[must_use]
    pub fn external_id(mut self, external_id: &str) -> Self {
        self.external_id = Some(external_id.to_string());
        self
    }

    #[must_use]
    pub fn access_token(mut self, token: &str) -> Self {
        self.access_token = Some(token.to_string());
        self
    }

    /// 标记为已注销（软删除）
    #[must_use]
    pub const fn deleted(mut self) -> Self {
        self.deleted = true;
        self
    }

    pub async fn insert(self, db: &DatabaseConnection) -> Result<users::Model, DbErr> {
        let now = Utc::now().naive_utc();
        users::ActiveModel {
            id: NotSet,
            username: Set(self.username.clone()),
            display_name: Set(self.username),
            role: Set(self.role.as_i32()),
            status: Set(self.status.as_i32()),
            group: Set(self.group),
            external_id: Set(self.external_id),
            access_token: Set(self.access_token),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(self.deleted.then_some(now)),
        }
        .insert(db)
        .await
    }
}

/// API 令牌测试数据构建器
#[derive(Debug, Clone)]
pub struct TokenFixture {
    pub user_id: i32,
    pub key: String,
    pub name: String,
    pub status: TokenStatus,
    pub expired_time: i64,
    pub remain_quota: i64,
    pub unlimited_quota: bool,
    pub model_limits: Option<String>,
    pub allow_ips: Option<String>,
    pub group: String,
}

impl TokenFixture {
    pub fn new(user_id: i32, key: &str) -> Self {
        Self {
            user_id,
            key: key.to_string(),
            name: format!("token-{key}"),
            status: TokenStatus::Enabled,
            expired_time: -1,
            remain_quota: 500_000,
            unlimited_quota: false,
            model_limits: None,
            allow_ips: None,
            group: String::new(),
        }
    }

    #[must_use]
    pub const fn status(mut self, status: TokenStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub const fn expired_time(mut self, expired_time: i64) -> Self {
        self.expired_time = expired_time;
        self
    }

    #[must_use]
    pub const fn unlimited(mut self) -> Self {
        self.unlimited_quota = true;
        self
    }

    /// 启用模型白名单（逗号分隔）
    #[must_use]
    pub fn model_limits(mut self, models: &str) -> Self {
        self.model_limits = Some(models.to_string());
        self
    }

    #[must_use]
    pub fn allow_ips(mut self, allow_ips: &str) -> Self {
        self.allow_ips = Some(allow_ips.to_string());
        self
    }

    #[must_use]
    pub fn group(mut self, group: &str) -> Self {
        self.group = group.to_string();
        self
    }

    pub async fn insert(self, db: &DatabaseConnection) -> Result<tokens::Model, DbErr> {
        tokens::ActiveModel {
            id: NotSet,
            user_id: Set(self.user_id),
            key: Set(self.key),
            name: Set(self.name),
            status: Set(self.status.as_i32()),
            expired_time: Set(self.expired_time),
            remain_quota: Set(self.remain_quota),
            unlimited_quota: Set(self.unlimited_quota),
            model_limits_enabled: Set(self.model_limits.is_some()),
            model_limits: Set(self.model_limits.unwrap_or_default()),
            allow_ips: Set(self.allow_ips),
            group: Set(self.group),
            created_at: Set(Utc::now().naive_utc()),
        }
        .insert(db)
        .await
    }
}

/// 不落库的用户模型，供 mock 返回
pub fn user_model(id: i32, username: &str, status: i32) -> users::Model {
    let now = Utc::now().naive_utc();
    users::Model {
        id,
        username: username.to_string(),
        display_name: username.to_string(),
        role: Role::Common.as_i32(),
        status,
        group: "default".to_string(),
        external_id: None,
        access_token: None,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}
