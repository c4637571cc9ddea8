//! # Mock 实现
//!
//! 存储、会话与外部校验服务的 `mockall` 替身

pub use crate::auth::external_identity::MockIdentityVerifier;
pub use crate::auth::session::MockSessionStore;
pub use crate::auth::store::MockCredentialStore;

/// 对任意授权码都返回同一外部身份的校验服务
pub fn verifier_returning(external_id: &str) -> MockIdentityVerifier {
    let external_id = external_id.to_string();
    let mut verifier = MockIdentityVerifier::new();
    verifier
        .expect_exchange_code()
        .returning(move |_| Ok(external_id.clone()));
    verifier
}
