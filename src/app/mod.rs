//! # 应用上下文
//!
//! 组装存储、会话、身份解析与外部身份服务

pub mod context;

pub use context::AppContext;
