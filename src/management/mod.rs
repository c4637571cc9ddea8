//! # HTTP 接口模块
//!
//! 路由、响应封装、请求 ID 中间件与服务器启动

pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;

pub use server::{AppState, GatewayServer};
