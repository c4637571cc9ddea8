//! # 网关服务器
//!
//! 组装路由与通用中间件（请求 ID、访问日志、CORS），并负责监听与优雅关闭。

use axum::Router;
use axum::http::{HeaderName, Method, header};
use axum::routing::get;
use std::ops::Deref;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::middleware::request_id_middleware;
use crate::app::AppContext;
use crate::auth::api_key::FALLBACK_HEADER;
use crate::auth::utils::CALLER_ID_HEADER;
use crate::error::Result;
use crate::logging::{LogComponent, LogStage};
use crate::{linfo, lwarn};

/// 路由共享状态
#[derive(Clone)]
pub struct AppState {
    context: Arc<AppContext>,
}

impl AppState {
    #[must_use]
    pub const fn new(context: Arc<AppContext>) -> Self {
        Self { context }
    }

    #[must_use]
    pub const fn context_arc(&self) -> &Arc<AppContext> {
        &self.context
    }
}

impl Deref for AppState {
    type Target = AppContext;

    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

/// 网关 HTTP 服务器
pub struct GatewayServer {
    bind_address: String,
    router: Router,
}

impl GatewayServer {
    #[must_use]
    pub fn new(context: Arc<AppContext>) -> Self {
        let bind_address = context.config.server.bind_address();
        let router = Self::create_router(AppState::new(context));
        Self {
            bind_address,
            router,
        }
    }

    /// 创建完整路由
    ///
    /// 测试直接对返回的 `Router` 调用 `oneshot`。
    pub fn create_router(state: AppState) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
                header::ACCEPT,
                HeaderName::from_static(CALLER_ID_HEADER),
                HeaderName::from_static(FALLBACK_HEADER),
            ]);

        Router::new()
            .nest("/api", super::routes::create_routes(state.clone()))
            .nest("/v1", super::routes::create_relay_routes(state))
            .route("/ping", get(super::handlers::status::ping_handler))
            .layer(
                ServiceBuilder::new()
                    .layer(axum::middleware::from_fn(request_id_middleware))
                    .layer(TraceLayer::new_for_http())
                    .layer(cors),
            )
    }

    #[must_use]
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// 启动服务器，收到 Ctrl-C 后优雅退出
    pub async fn serve(self) -> Result<()> {
        let listener = TcpListener::bind(self.bind_address.as_str()).await?;

        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::Main,
            "server_start",
            &format!("Gateway listening on {}", self.bind_address)
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| crate::error!(Network, format!("Gateway server error: {e}")))?;

        linfo!(
            "system",
            LogStage::Shutdown,
            LogComponent::Main,
            "server_stopped",
            "Gateway stopped"
        );
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        lwarn!(
            "system",
            LogStage::Shutdown,
            LogComponent::Main,
            "signal_handler_failed",
            &format!("无法监听关闭信号: {e}")
        );
    }
}
