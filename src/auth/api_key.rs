//! # API 密钥语法解析
//!
//! 凭证形如 `sk-<secret>[-<channel>]`，可带 `Bearer ` 前缀。
//! 第二段是调用方请求的下游渠道；解析永不失败，空结果只是在下游查不到。

use axum::http::HeaderMap;

use super::utils::{AUTHORIZATION_HEADER, AuthUtils};

/// 某第三方客户端使用的遗留别名，出现时改读 [`FALLBACK_HEADER`]
pub const LEGACY_ALIAS: &str = "midjourney-proxy";
/// 遗留客户端实际携带凭证的请求头
pub const FALLBACK_HEADER: &str = "mj-api-secret";
/// 密钥前缀
pub const SECRET_KEY_PREFIX: &str = "sk-";
const SEGMENT_DELIMITER: char = '-';

/// 解析后的 API 密钥凭证
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApiKeyCredential {
    secret: String,
    channel: Option<String>,
}

impl ApiKeyCredential {
    /// 解析原始凭证字符串
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let key = AuthUtils::strip_bearer(raw);
        let key = key.strip_prefix(SECRET_KEY_PREFIX).unwrap_or(key);

        let mut segments = key.split(SEGMENT_DELIMITER);
        let secret = segments.next().unwrap_or_default().to_string();
        // 分隔符后即使为空也算指定了渠道
        let channel = segments.next().map(str::to_string);

        Self { secret, channel }
    }

    /// 从请求头解析
    ///
    /// 主认证头为空或等于 [`LEGACY_ALIAS`] 时改用 [`FALLBACK_HEADER`]。
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let primary = AuthUtils::header_str(headers, AUTHORIZATION_HEADER).unwrap_or_default();
        let primary = AuthUtils::strip_bearer(primary);

        if primary.is_empty() || primary == LEGACY_ALIAS {
            let fallback = AuthUtils::header_str(headers, FALLBACK_HEADER).unwrap_or_default();
            Self::parse(fallback)
        } else {
            Self::parse(primary)
        }
    }

    /// 查询用的密钥，空串返回 `None`
    #[must_use]
    pub fn secret(&self) -> Option<&str> {
        (!self.secret.is_empty()).then_some(self.secret.as_str())
    }

    /// 请求的下游渠道
    #[must_use]
    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    /// 日志用的脱敏表示
    #[must_use]
    pub fn sanitized(&self) -> String {
        AuthUtils::sanitize_api_key(&format!("{SECRET_KEY_PREFIX}{}", self.secret))
    }

    /// 还原为规范形式
    #[must_use]
    pub fn to_raw(&self) -> String {
        match &self.channel {
            Some(channel) => format!("{SECRET_KEY_PREFIX}{}-{channel}", self.secret),
            None => format!("{SECRET_KEY_PREFIX}{}", self.secret),
        }
    }
}
