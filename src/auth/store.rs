//! # 凭证存储适配器
//!
//! 用户与 API 令牌的查询抽象，以及基于 Sea-ORM 的实现。
//! 启用状态 / 角色查询经由 [`UserStatusCache`]，其余查询直接访问数据库。

use async_trait::async_trait;
use chrono::Utc;
use entity::{tokens, users};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QuerySelect, Set, SqlErr, Unchanged,
};
use std::sync::Arc;

use super::cache_strategy::{UserSnapshot, UserStatusCache};
use super::permissions::{Role, TokenStatus, UserStatus};
use super::types::IdentityClaim;
use crate::error::{AuthError, AuthResult, GatewayError};
use crate::logging::{LogComponent, LogStage};
use crate::{ldebug, lwarn};

/// 新账户
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub status: UserStatus,
    pub group: String,
    pub external_id: Option<String>,
}

/// 凭证存储
///
/// 所有实现都必须支持并发访问。
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// 按外部身份查找未注销的账户
    async fn find_user_by_external_identity(&self, key: &str) -> AuthResult<Option<users::Model>>;

    /// 外部身份是否已被任意账户（含已注销）占用
    async fn external_identity_taken(&self, key: &str) -> AuthResult<bool>;

    async fn find_user_by_id(&self, id: i32) -> AuthResult<Option<users::Model>>;

    async fn create_user(&self, user: NewUser) -> AuthResult<users::Model>;

    async fn update_user(&self, user: &users::Model) -> AuthResult<()>;

    /// 校验长期访问令牌，返回其所属用户的身份声明
    async fn find_access_token(&self, token: &str) -> AuthResult<Option<IdentityClaim>>;

    /// 校验 API 令牌本身的状态与有效期
    async fn find_api_token(&self, secret: &str) -> AuthResult<tokens::Model>;

    /// 用户快照（可缓存）
    async fn user_snapshot(&self, id: i32) -> AuthResult<Option<UserSnapshot>>;

    /// 用户是否启用（可缓存）；不存在的用户视为未启用
    async fn is_user_enabled(&self, id: i32) -> AuthResult<bool>;

    async fn is_admin(&self, id: i32) -> AuthResult<bool>;

    /// 下一个可用的用户 ID
    async fn next_user_id(&self) -> AuthResult<i32>;
}

/// Sea-ORM 凭证存储
pub struct DatabaseCredentialStore {
    db: Arc<DatabaseConnection>,
    status_cache: UserStatusCache,
}

impl DatabaseCredentialStore {
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>, status_cache: UserStatusCache) -> Self {
        Self { db, status_cache }
    }

    /// 唯一约束冲突单独识别，其余归为存储故障
    fn map_write_error(err: DbErr, on_conflict: AuthError) -> AuthError {
        if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
            on_conflict
        } else {
            AuthError::Store(GatewayError::database_with_source("写入用户失败", err))
        }
    }
}

#[async_trait]
impl CredentialStore for DatabaseCredentialStore {
    async fn find_user_by_external_identity(&self, key: &str) -> AuthResult<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::ExternalId.eq(key))
            .filter(users::Column::DeletedAt.is_null())
            .one(self.db.as_ref())
            .await?)
    }

    async fn external_identity_taken(&self, key: &str) -> AuthResult<bool> {
        if key.is_empty() {
            return Ok(false);
        }
        let count = users::Entity::find()
            .filter(users::Column::ExternalId.eq(key))
            .count(self.db.as_ref())
            .await?;
        Ok(count > 0)
    }

    async fn find_user_by_id(&self, id: i32) -> AuthResult<Option<users::Model>> {
        Ok(users::Entity::find_by_id(id)
            .filter(users::Column::DeletedAt.is_null())
            .one(self.db.as_ref())
            .await?)
    }

    async fn create_user(&self, user: NewUser) -> AuthResult<users::Model> {
        let now = Utc::now().naive_utc();
        let active = users::ActiveModel {
            username: Set(user.username),
            display_name: Set(user.display_name),
            role: Set(user.role.as_i32()),
            status: Set(user.status.as_i32()),
            group: Set(user.group),
            external_id: Set(user.external_id),
            access_token: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        };

        let model = active.insert(self.db.as_ref()).await.map_err(|e| {
            Self::map_write_error(
                e,
                AuthError::Store(GatewayError::database("用户名或外部身份已存在")),
            )
        })?;

        ldebug!(
            "system",
            LogStage::Db,
            LogComponent::Database,
            "create_user",
            "创建用户成功",
            user_id = model.id
        );
        Ok(model)
    }

    async fn update_user(&self, user: &users::Model) -> AuthResult<()> {
        let active = users::ActiveModel {
            id: Unchanged(user.id),
            username: Set(user.username.clone()),
            display_name: Set(user.display_name.clone()),
            role: Set(user.role),
            status: Set(user.status),
            group: Set(user.group.clone()),
            external_id: Set(user.external_id.clone()),
            access_token: Set(user.access_token.clone()),
            created_at: Unchanged(user.created_at),
            updated_at: Set(Utc::now().naive_utc()),
            deleted_at: Set(user.deleted_at),
        };

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| Self::map_write_error(e, AuthError::AlreadyBound))?;

        self.status_cache.invalidate(user.id).await;
        Ok(())
    }

    async fn find_access_token(&self, token: &str) -> AuthResult<Option<IdentityClaim>> {
        if token.is_empty() {
            return Ok(None);
        }
        let user = users::Entity::find()
            .filter(users::Column::AccessToken.eq(token))
            .filter(users::Column::DeletedAt.is_null())
            .one(self.db.as_ref())
            .await?;

        Ok(user.map(|user| IdentityClaim {
            id: user.id,
            username: user.username,
            role: user.role,
            status: user.status,
            group: user.group,
            use_access_token: true,
        }))
    }

    async fn find_api_token(&self, secret: &str) -> AuthResult<tokens::Model> {
        if secret.is_empty() {
            return Err(AuthError::InvalidCredential("no token provided".to_string()));
        }

        let token = tokens::Entity::find()
            .filter(tokens::Column::Key.eq(secret))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AuthError::InvalidCredential("invalid token".to_string()))?;

        match TokenStatus::from_i32(token.status) {
            TokenStatus::Exhausted => Err(AuthError::InvalidCredential(
                "token quota exhausted".to_string(),
            )),
            TokenStatus::Expired => Err(AuthError::InvalidCredential("token expired".to_string())),
            TokenStatus::Disabled => Err(AuthError::InvalidCredential(
                "token unavailable".to_string(),
            )),
            TokenStatus::Enabled => {
                if token.expired_time != -1 && token.expired_time < Utc::now().timestamp() {
                    lwarn!(
                        "system",
                        LogStage::Authentication,
                        LogComponent::ApiKey,
                        "token_expired",
                        "令牌已过期",
                        token_id = token.id
                    );
                    return Err(AuthError::InvalidCredential("token expired".to_string()));
                }
                Ok(token)
            }
        }
    }

    async fn user_snapshot(&self, id: i32) -> AuthResult<Option<UserSnapshot>> {
        if let Some(snapshot) = self.status_cache.get(id).await {
            return Ok(Some(snapshot));
        }

        let Some(user) = self.find_user_by_id(id).await? else {
            return Ok(None);
        };
        let snapshot = UserSnapshot::from(&user);
        self.status_cache.insert(snapshot.clone()).await;
        Ok(Some(snapshot))
    }

    async fn is_user_enabled(&self, id: i32) -> AuthResult<bool> {
        Ok(self
            .user_snapshot(id)
            .await?
            .is_some_and(|snapshot| snapshot.is_enabled()))
    }

    async fn is_admin(&self, id: i32) -> AuthResult<bool> {
        Ok(self
            .user_snapshot(id)
            .await?
            .and_then(|snapshot| snapshot.role())
            .is_some_and(Role::is_admin))
    }

    async fn next_user_id(&self) -> AuthResult<i32> {
        // 含已注销账户，保证生成的用户名不与历史账户重复
        let max_id: Option<i32> = users::Entity::find()
            .select_only()
            .column_as(users::Column::Id.max(), "max_id")
            .into_tuple::<Option<i32>>()
            .one(self.db.as_ref())
            .await?
            .flatten();
        Ok(max_id.unwrap_or(0) + 1)
    }
}
