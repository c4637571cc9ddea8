//! # 角色与状态定义
//!
//! 角色与状态都是封闭枚举，全序关系只在这里定义一次。
//! 数据库中以整数存储，超出集合的值视为无效。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 用户角色，按权限从低到高排序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum Role {
    /// 访客
    Guest,
    /// 普通用户
    Common,
    /// 管理员
    Admin,
    /// 超级管理员
    Root,
}

impl Role {
    /// 数据库存储值
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        match self {
            Self::Guest => 0,
            Self::Common => 1,
            Self::Admin => 10,
            Self::Root => 100,
        }
    }

    /// 从数据库存储值解析，未知值返回 `None`
    #[must_use]
    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Guest),
            1 => Some(Self::Common),
            10 => Some(Self::Admin),
            100 => Some(Self::Root),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Common => "common",
            Self::Admin => "admin",
            Self::Root => "root",
        }
    }

    /// 管理员及以上
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin | Self::Root)
    }

    /// 是否满足最低角色要求
    #[must_use]
    pub fn satisfies(self, min_role: Self) -> bool {
        self >= min_role
    }
}

impl From<Role> for i32 {
    fn from(role: Role) -> Self {
        role.as_i32()
    }
}

impl TryFrom<i32> for Role {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::from_i32(value).ok_or_else(|| format!("Invalid user role: {value}"))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 用户账户状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum UserStatus {
    Enabled,
    Disabled,
}

impl UserStatus {
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        match self {
            Self::Enabled => 1,
            Self::Disabled => 2,
        }
    }

    /// 只有明确的启用值才算启用，其余一律视为禁用
    #[must_use]
    pub const fn from_i32(value: i32) -> Self {
        if value == 1 { Self::Enabled } else { Self::Disabled }
    }

    #[must_use]
    pub const fn is_enabled(self) -> bool {
        matches!(self, Self::Enabled)
    }
}

impl From<UserStatus> for i32 {
    fn from(status: UserStatus) -> Self {
        status.as_i32()
    }
}

impl TryFrom<i32> for UserStatus {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Enabled),
            2 => Ok(Self::Disabled),
            other => Err(format!("Invalid user status: {other}")),
        }
    }
}

/// API 令牌状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenStatus {
    Enabled,
    Disabled,
    Expired,
    Exhausted,
}

impl TokenStatus {
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        match self {
            Self::Enabled => 1,
            Self::Disabled => 2,
            Self::Expired => 3,
            Self::Exhausted => 4,
        }
    }

    /// 未知值按禁用处理
    #[must_use]
    pub const fn from_i32(value: i32) -> Self {
        match value {
            1 => Self::Enabled,
            3 => Self::Expired,
            4 => Self::Exhausted,
            _ => Self::Disabled,
        }
    }
}
