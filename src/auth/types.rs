//! # 认证上下文类型
//!
//! 授权闸门通过后附加到请求扩展中的强类型上下文。
//! 下游处理器只会看到这些完整授权过的结构。

use ipnetwork::IpNetwork;
use serde::Serialize;
use std::collections::BTreeSet;
use std::net::IpAddr;

use super::permissions::{Role, UserStatus};

/// 身份解析得到、尚未经过策略校验的声明
///
/// 角色与状态保留存储中的原始整数，由授权闸门负责判定是否有效。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaim {
    pub id: i32,
    pub username: String,
    pub role: i32,
    pub status: i32,
    pub group: String,
    /// 是否通过长期访问令牌解析
    pub use_access_token: bool,
}

/// 已通过所有校验的调用者身份
///
/// 只由授权闸门构造，整个请求生命周期内不可变。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: i32,
    pub username: String,
    pub role: Role,
    pub status: UserStatus,
    pub group: String,
    pub use_access_token: bool,
}

/// API 密钥守卫通过后的令牌上下文
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenContext {
    pub user_id: i32,
    pub role: Role,
    /// 令牌所属用户的分组
    pub user_group: String,
    pub token_id: i32,
    pub token_name: String,
    /// 令牌指定的下游分组
    pub token_group: String,
    pub unlimited_quota: bool,
    /// 剩余额度提示，仅在非无限额度时存在
    pub remain_quota: Option<i64>,
    /// 模型白名单，仅在令牌启用了模型限制时存在
    pub model_limits: Option<BTreeSet<String>>,
    #[serde(serialize_with = "serialize_networks")]
    pub allow_ips: Option<Vec<IpNetwork>>,
    /// 管理员指定的下游渠道
    pub specific_channel_id: Option<String>,
}

impl TokenContext {
    /// 来源 IP 是否在白名单内；未配置白名单时放行
    #[must_use]
    pub fn allows_ip(&self, ip: IpAddr) -> bool {
        self.allow_ips
            .as_ref()
            .is_none_or(|networks| networks.iter().any(|net| net.contains(ip)))
    }

    /// 模型是否在白名单内；未启用模型限制时放行
    #[must_use]
    pub fn allows_model(&self, model: &str) -> bool {
        self.model_limits
            .as_ref()
            .is_none_or(|models| models.contains(model))
    }
}

fn serialize_networks<S>(value: &Option<Vec<IpNetwork>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match value {
        Some(networks) => serializer.collect_seq(networks.iter().map(ToString::to_string)),
        None => serializer.serialize_none(),
    }
}

/// 非强制登录的可选身份
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionalUser {
    pub id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> TokenContext {
        TokenContext {
            user_id: 1,
            role: Role::Common,
            user_group: "default".into(),
            token_id: 3,
            token_name: "ci".into(),
            token_group: String::new(),
            unlimited_quota: true,
            remain_quota: None,
            model_limits: None,
            allow_ips: None,
            specific_channel_id: None,
        }
    }

    #[test]
    fn test_unrestricted_token_allows_everything() {
        let ctx = context();
        assert!(ctx.allows_ip("10.1.2.3".parse().unwrap()));
        assert!(ctx.allows_model("gpt-4o"));
    }

    #[test]
    fn test_restricted_token() {
        let mut ctx = context();
        ctx.allow_ips = Some(vec!["10.0.0.0/8".parse().unwrap()]);
        ctx.model_limits = Some(BTreeSet::from(["gpt-4o".to_string()]));

        assert!(ctx.allows_ip("10.1.2.3".parse().unwrap()));
        assert!(!ctx.allows_ip("192.168.1.1".parse().unwrap()));
        assert!(ctx.allows_model("gpt-4o"));
        assert!(!ctx.allows_model("claude-3"));
    }

    #[test]
    fn test_serializes_networks_as_strings() {
        let mut ctx = context();
        ctx.allow_ips = Some(vec!["10.0.0.0/8".parse().unwrap()]);
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["allow_ips"][0], "10.0.0.0/8");
        assert_eq!(json["role"], 1);
    }
}
