//! # 认证授权模块
//!
//! 每个受保护请求依次经过身份解析与授权闸门，再进入下游处理器：
//!
//! - [`resolver`]：会话 → 访问令牌 → API 密钥的分层身份解析
//! - [`guard`]：角色 / 状态校验，构造强类型上下文
//! - [`middleware`]：axum 守卫
//! - [`linking`]：外部身份登录与绑定

pub mod api_key;
pub mod cache_strategy;
pub mod external_identity;
pub mod guard;
pub mod linking;
pub mod middleware;
pub mod permissions;
pub mod resolver;
pub mod session;
pub mod store;
pub mod types;
pub mod utils;

pub use api_key::ApiKeyCredential;
pub use cache_strategy::{UserSnapshot, UserStatusCache};
pub use external_identity::{HttpIdentityVerifier, IdentityVerifier};
pub use linking::{ExternalIdentityLinkService, LinkSettings};
pub use permissions::{Role, TokenStatus, UserStatus};
pub use resolver::IdentityResolver;
pub use session::{MemorySessionStore, SessionData, SessionStore};
pub use store::{CredentialStore, DatabaseCredentialStore, NewUser};
pub use types::{IdentityClaim, OptionalUser, Principal, TokenContext};
pub use utils::AuthUtils;

pub use crate::error::{AuthError, AuthResult};
