//! # Entity 模块
//!
//! 网关认证层消费的 Sea-ORM 实体定义：账户与 API 令牌

pub mod tokens;
pub mod users;

pub use tokens::Entity as Tokens;
pub use users::Entity as Users;
