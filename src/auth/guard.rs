//! # 授权闸门
//!
//! 会话 / 访问令牌守卫与 API 密钥守卫共用的策略核心。
//! 只有全部检查通过才会构造 [`Principal`] 或 [`TokenContext`]。

use entity::tokens;
use ipnetwork::IpNetwork;
use std::collections::BTreeSet;

use super::api_key::ApiKeyCredential;
use super::permissions::{Role, UserStatus};
use super::store::CredentialStore;
use super::types::{IdentityClaim, Principal, TokenContext};
use crate::error::{AuthError, AuthResult};
use crate::logging::{LogComponent, LogStage};
use crate::{ldebug, lwarn};

pub const MSG_NOT_LOGGED_IN: &str = "unauthorized: not logged in and no access token provided";
pub const MSG_ACCESS_TOKEN_INVALID: &str = "unauthorized: access token is invalid";
pub const MSG_CALLER_ID_MISSING: &str = "unauthorized: not logged in, New-Api-User header missing";
pub const MSG_CALLER_ID_INVALID: &str = "unauthorized: New-Api-User header is invalid";
pub const MSG_CALLER_ID_MISMATCH: &str =
    "unauthorized: New-Api-User does not match the logged in user";
pub const MSG_INSUFFICIENT_ROLE: &str = "unauthorized: insufficient permissions";
pub const MSG_USER_INFO_INVALID: &str = "unauthorized: user info invalid";
pub const MSG_CHANNEL_FORBIDDEN: &str = "ordinary users are not permitted to specify a channel";

/// 会话 / 访问令牌守卫
///
/// 检查顺序固定：调用方 ID 头（非访问令牌时）→ 封禁 → 角色阈值 → 用户信息有效性。
pub fn authorize_session(
    claim: IdentityClaim,
    caller_id_header: Option<&str>,
    min_role: Role,
) -> AuthResult<Principal> {
    if !claim.use_access_token {
        let Some(raw) = caller_id_header.filter(|value| !value.is_empty()) else {
            return Err(AuthError::MissingCredential(MSG_CALLER_ID_MISSING.to_string()));
        };
        let caller_id: i32 = raw
            .trim()
            .parse()
            .map_err(|_| AuthError::IdentityMismatch(MSG_CALLER_ID_INVALID.to_string()))?;
        if caller_id != claim.id {
            lwarn!(
                "system",
                LogStage::Authorization,
                LogComponent::Gate,
                "caller_id_mismatch",
                "New-Api-User 与会话用户不一致",
                session_user = claim.id,
                header_user = caller_id
            );
            return Err(AuthError::IdentityMismatch(MSG_CALLER_ID_MISMATCH.to_string()));
        }
    }

    let status = UserStatus::from_i32(claim.status);
    if !status.is_enabled() {
        return Err(AuthError::AccountDisabled);
    }

    let role = Role::from_i32(claim.role);
    if role.is_some_and(|role| !role.satisfies(min_role)) {
        return Err(AuthError::InsufficientRole(MSG_INSUFFICIENT_ROLE.to_string()));
    }

    let Some(role) = role.filter(|_| !claim.username.trim().is_empty()) else {
        return Err(AuthError::InvalidCredential(MSG_USER_INFO_INVALID.to_string()));
    };

    ldebug!(
        "system",
        LogStage::Authorization,
        LogComponent::Gate,
        "session_authorized",
        "会话授权通过",
        user_id = claim.id,
        role = %role
    );

    Ok(Principal {
        id: claim.id,
        username: claim.username,
        role,
        status,
        group: claim.group,
        use_access_token: claim.use_access_token,
    })
}

/// API 密钥守卫
///
/// 所有者必须启用；凭证带渠道段时所有者必须是管理员及以上。
pub async fn authorize_api_key(
    store: &dyn CredentialStore,
    credential: &ApiKeyCredential,
    token: tokens::Model,
) -> AuthResult<TokenContext> {
    if !store.is_user_enabled(token.user_id).await? {
        return Err(AuthError::AccountDisabled);
    }

    let specific_channel_id = match credential.channel() {
        Some(channel) => {
            if !store.is_admin(token.user_id).await? {
                lwarn!(
                    "system",
                    LogStage::Authorization,
                    LogComponent::Gate,
                    "channel_override_forbidden",
                    "普通用户不允许指定渠道",
                    user_id = token.user_id
                );
                return Err(AuthError::InsufficientRole(MSG_CHANNEL_FORBIDDEN.to_string()));
            }
            Some(channel.to_string())
        }
        None => None,
    };

    let owner = store.user_snapshot(token.user_id).await?;
    let (role, user_group) = owner
        .map(|snapshot| (snapshot.role(), snapshot.group))
        .unwrap_or_default();
    let role = role.unwrap_or(Role::Guest);

    let context = TokenContext {
        user_id: token.user_id,
        role,
        user_group,
        token_id: token.id,
        remain_quota: (!token.unlimited_quota).then_some(token.remain_quota),
        unlimited_quota: token.unlimited_quota,
        model_limits: token
            .model_limits_enabled
            .then(|| parse_model_limits(&token.model_limits)),
        allow_ips: token.allow_ips.as_deref().and_then(parse_allow_ips),
        token_name: token.name,
        token_group: token.group,
        specific_channel_id,
    };

    ldebug!(
        "system",
        LogStage::Authorization,
        LogComponent::Gate,
        "api_key_authorized",
        "API 密钥授权通过",
        user_id = context.user_id,
        token_id = context.token_id
    );
    Ok(context)
}

/// 逗号分隔的模型列表
fn parse_model_limits(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|model| !model.is_empty())
        .map(str::to_string)
        .collect()
}

/// 换行或逗号分隔的 IP / CIDR 列表；空白配置视为不限制
///
/// 无法解析的条目跳过，若全部无效则得到空白名单（拒绝所有来源）。
fn parse_allow_ips(raw: &str) -> Option<Vec<IpNetwork>> {
    let entries: Vec<&str> = raw
        .split(['\n', ','])
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect();
    if entries.is_empty() {
        return None;
    }

    Some(
        entries
            .into_iter()
            .filter_map(|entry| match entry.parse::<IpNetwork>() {
                Ok(network) => Some(network),
                Err(e) => {
                    lwarn!(
                        "system",
                        LogStage::Authorization,
                        LogComponent::Gate,
                        "allow_ip_invalid",
                        &format!("忽略无效的 IP 白名单条目: {entry}"),
                        error = %e
                    );
                    None
                }
            })
            .collect(),
    )
}
