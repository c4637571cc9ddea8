//! # API 令牌实体定义
//!
//! 程序化访问使用的 API 令牌表（`sk-` 前缀之后的部分存入 `key`）

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// API 令牌实体
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "tokens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    #[sea_orm(unique)]
    pub key: String,
    pub name: String,
    /// 1 启用 / 2 禁用 / 3 已过期 / 4 额度耗尽
    pub status: i32,
    /// 过期时间戳（秒），-1 表示永不过期
    pub expired_time: i64,
    pub remain_quota: i64,
    pub unlimited_quota: bool,
    pub model_limits_enabled: bool,
    /// 逗号分隔的模型白名单
    pub model_limits: String,
    /// 换行或逗号分隔的来源 IP / CIDR 白名单
    pub allow_ips: Option<String>,
    pub group: String,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
