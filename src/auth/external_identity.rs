//! # 外部身份校验
//!
//! 用一次性授权码向远端服务换取稳定的外部身份标识（例如微信 openid）。
//! 调用受固定超时约束：超时与传输失败归为 `VerifierUnavailable`，
//! 远端明确拒绝归为 `VerifierRejected`，调用方可以区分两者。

use async_trait::async_trait;
use axum::http::header::AUTHORIZATION;
use serde::Deserialize;
use std::time::Duration;

use crate::config::ExternalIdentityConfig;
use crate::error::{AuthError, AuthResult, GatewayError};
use crate::logging::{LogComponent, LogStage};
use crate::{ldebug, lwarn};

/// 授权码无效或过期
pub const CODE_INVALID_MESSAGE: &str = "verification code invalid or expired";

/// 外部身份校验能力
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// 用授权码换取外部身份标识
    async fn exchange_code(&self, code: &str) -> AuthResult<String>;
}

/// 远端响应 `{success, message, data}`
#[derive(Debug, Deserialize)]
struct VerifierResponse {
    success: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: String,
}

/// 基于 HTTP 的校验实现
pub struct HttpIdentityVerifier {
    client: reqwest::Client,
    endpoint: url::Url,
    server_token: String,
    timeout: Duration,
}

impl HttpIdentityVerifier {
    pub fn new(config: &ExternalIdentityConfig) -> crate::error::Result<Self> {
        let address = format!(
            "{}{}",
            config.server_address.trim_end_matches('/'),
            config.user_path
        );
        let endpoint = url::Url::parse(&address).map_err(|e| {
            GatewayError::config_with_source(
                format!("无效的外部身份服务地址: {}", config.server_address),
                e,
            )
        })?;

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            server_token: config.server_token.clone(),
            timeout: config.timeout(),
        })
    }

    fn request_url(&self, code: &str) -> String {
        format!("{}?code={}", self.endpoint, urlencoding::encode(code))
    }

    async fn fetch(&self, code: &str) -> Result<VerifierResponse, reqwest::Error> {
        self.client
            .get(self.request_url(code))
            .header(AUTHORIZATION, &self.server_token)
            .send()
            .await?
            .json::<VerifierResponse>()
            .await
    }
}

#[async_trait]
impl IdentityVerifier for HttpIdentityVerifier {
    async fn exchange_code(&self, code: &str) -> AuthResult<String> {
        if code.is_empty() {
            return Err(AuthError::MissingCredential("invalid parameter".to_string()));
        }

        // 超时后丢弃请求 future，连接随之取消
        let response = match tokio::time::timeout(self.timeout, self.fetch(code)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                lwarn!(
                    "system",
                    LogStage::Verifier,
                    LogComponent::Verifier,
                    "verifier_request_failed",
                    "外部身份服务请求失败",
                    error = %e
                );
                return Err(AuthError::VerifierUnavailable(
                    "unable to connect to the identity server".to_string(),
                ));
            }
            Err(_) => {
                lwarn!(
                    "system",
                    LogStage::Verifier,
                    LogComponent::Verifier,
                    "verifier_timeout",
                    &format!("外部身份服务超时 ({}s)", self.timeout.as_secs())
                );
                return Err(AuthError::VerifierUnavailable(format!(
                    "identity server did not respond within {}s",
                    self.timeout.as_secs()
                )));
            }
        };

        if !response.success {
            let message = if response.message.is_empty() {
                CODE_INVALID_MESSAGE.to_string()
            } else {
                response.message
            };
            return Err(AuthError::VerifierRejected(message));
        }
        if response.data.is_empty() {
            return Err(AuthError::VerifierRejected(CODE_INVALID_MESSAGE.to_string()));
        }

        ldebug!(
            "system",
            LogStage::Verifier,
            LogComponent::Verifier,
            "code_exchanged",
            "授权码换取外部身份成功"
        );
        Ok(response.data)
    }
}
