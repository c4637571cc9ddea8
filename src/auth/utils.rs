//! # 认证工具函数
//!
//! 请求头读取、Bearer 前缀处理、Cookie 解析与日志脱敏

use axum::http::HeaderMap;

/// 主认证头
pub const AUTHORIZATION_HEADER: &str = "authorization";
/// 调用方自报的用户 ID 请求头
pub const CALLER_ID_HEADER: &str = "new-api-user";

/// 认证工具类
pub struct AuthUtils;

impl AuthUtils {
    /// 净化API密钥用于日志记录
    ///
    /// 返回格式: "sk-1***2345"；过短的值整体打码。
    #[must_use]
    pub fn sanitize_api_key(api_key: &str) -> String {
        let chars: Vec<char> = api_key.chars().collect();
        if chars.len() > 10 {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{head}***{tail}")
        } else {
            "***".to_string()
        }
    }

    /// 读取请求头的字符串值，非 ASCII 值视为缺失
    #[must_use]
    pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
        headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// `从HTTP头中提取Authorization头的值`
    #[must_use]
    pub fn extract_authorization_header(headers: &HeaderMap) -> Option<&str> {
        Self::header_str(headers, AUTHORIZATION_HEADER)
    }

    /// 去掉 "Bearer " 前缀；没有前缀时原样返回
    #[must_use]
    pub fn strip_bearer(value: &str) -> &str {
        value.strip_prefix("Bearer ").unwrap_or(value)
    }

    /// 从 Cookie 头中取出指定名称的值
    #[must_use]
    pub fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
        headers
            .get_all(axum::http::header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|raw| raw.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_sanitize_api_key() {
        assert_eq!(AuthUtils::sanitize_api_key("sk-1234567890abcdef"), "sk-1***cdef");
        assert_eq!(AuthUtils::sanitize_api_key("short"), "***");
        assert_eq!(AuthUtils::sanitize_api_key("密钥密钥密钥密钥密钥密钥"), "密钥密钥***密钥密钥");
    }

    #[test]
    fn test_strip_bearer() {
        assert_eq!(AuthUtils::strip_bearer("Bearer abc"), "abc");
        assert_eq!(AuthUtils::strip_bearer("abc"), "abc");
        assert_eq!(AuthUtils::strip_bearer("Bearer "), "");
    }

    #[test]
    fn test_parse_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            HeaderValue::from_static("theme=dark; session=abc-123; lang=zh"),
        );
        assert_eq!(AuthUtils::parse_cookie(&headers, "session").as_deref(), Some("abc-123"));
        assert_eq!(AuthUtils::parse_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("New-Api-User", HeaderValue::from_static("42"));
        assert_eq!(AuthUtils::header_str(&headers, CALLER_ID_HEADER), Some("42"));
    }
}
