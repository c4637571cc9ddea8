//! # 用户实体定义
//!
//! 账户表的 Sea-ORM 实体模型。`role` / `status` 以整数存储，
//! 由上层映射为封闭枚举。

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 用户实体
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub display_name: String,
    /// 0 访客 / 1 普通用户 / 10 管理员 / 100 超级管理员
    pub role: i32,
    /// 1 启用 / 2 禁用
    pub status: i32,
    pub group: String,
    /// 外部身份标识（例如微信 openid），全表唯一
    #[sea_orm(unique)]
    pub external_id: Option<String>,
    /// 长期访问令牌，管理端 API 使用
    #[sea_orm(unique)]
    pub access_token: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    /// 软删除时间；非空表示账户已注销
    pub deleted_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tokens::Entity")]
    Tokens,
}

impl Related<super::tokens::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tokens.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
