//! # 令牌上下文接口
//!
//! 回显 API 密钥守卫解析出的上下文，供下游转发层与排查使用。

use axum::Extension;
use axum::response::Response;

use crate::auth::TokenContext;
use crate::management::response;

pub async fn token_context(Extension(context): Extension<TokenContext>) -> Response {
    response::success(context)
}
