//! # 接口处理器

pub mod oauth;
pub mod status;
pub mod token;
pub mod users;

use serde::Deserialize;

/// `?code=` 查询参数，缺失时视为空串
#[derive(Debug, Default, Deserialize)]
pub struct CodeQuery {
    #[serde(default)]
    pub code: String,
}
