//! 集成测试公共工具：内存数据库、行构建与路由驱动

#![allow(dead_code)]

use api_gateway_auth::AppContext;
use api_gateway_auth::auth::session::SessionData;
use api_gateway_auth::auth::{
    CredentialStore, DatabaseCredentialStore, IdentityVerifier, MemorySessionStore, SessionStore,
    UserStatusCache,
};
use api_gateway_auth::config::AppConfig;
use api_gateway_auth::management::{AppState, GatewayServer};
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use chrono::Utc;
use entity::{tokens, users};
use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, NotSet, Set};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

/// 用户行
pub struct UserRow {
    pub username: &'static str,
    pub role: i32,
    pub status: i32,
    pub access_token: Option<&'static str>,
    pub external_id: Option<&'static str>,
    pub deleted: bool,
}

impl UserRow {
    pub const fn common(username: &'static str) -> Self {
        Self {
            username,
            role: 1,
            status: 1,
            access_token: None,
            external_id: None,
            deleted: false,
        }
    }

    pub async fn insert(self, db: &DatabaseConnection) -> users::Model {
        let now = Utc::now().naive_utc();
        users::ActiveModel {
            id: NotSet,
            username: Set(self.username.to_string()),
            display_name: Set(self.username.to_string()),
            role: Set(self.role),
            status: Set(self.status),
            group: Set("default".to_string()),
            external_id: Set(self.external_id.map(str::to_string)),
            access_token: Set(self.access_token.map(str::to_string)),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(self.deleted.then_some(now)),
        }
        .insert(db)
        .await
        .unwrap()
    }
}

/// 令牌行
pub struct TokenRow {
    pub user_id: i32,
    pub key: &'static str,
    pub status: i32,
    pub expired_time: i64,
    pub model_limits: Option<&'static str>,
    pub allow_ips: Option<&'static str>,
    pub group: &'static str,
}

impl TokenRow {
    pub const fn new(user_id: i32, key: &'static str) -> Self {
        Self {
            user_id,
            key,
            status: 1,
            expired_time: -1,
            model_limits: None,
            allow_ips: None,
            group: "",
        }
    }

    pub async fn insert(self, db: &DatabaseConnection) -> tokens::Model {
        tokens::ActiveModel {
            id: NotSet,
            user_id: Set(self.user_id),
            key: Set(self.key.to_string()),
            name: Set(format!("token-{}", self.key)),
            status: Set(self.status),
            expired_time: Set(self.expired_time),
            remain_quota: Set(1000),
            unlimited_quota: Set(false),
            model_limits_enabled: Set(self.model_limits.is_some()),
            model_limits: Set(self.model_limits.unwrap_or_default().to_string()),
            allow_ips: Set(self.allow_ips.map(str::to_string)),
            group: Set(self.group.to_string()),
            created_at: Set(Utc::now().naive_utc()),
        }
        .insert(db)
        .await
        .unwrap()
    }
}

/// 测试应用：路由与共享上下文
pub struct TestApp {
    pub router: Router,
    pub context: Arc<AppContext>,
}

impl TestApp {
    pub fn new(
        db: DatabaseConnection,
        config: AppConfig,
        verifier: Option<Arc<dyn IdentityVerifier>>,
    ) -> Self {
        let db = Arc::new(db);
        let store: Arc<dyn CredentialStore> = Arc::new(DatabaseCredentialStore::new(
            db,
            UserStatusCache::from_config(&config.cache),
        ));
        let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new(&config.session));
        let context = Arc::new(AppContext::new(
            Arc::new(config),
            store,
            sessions,
            verifier,
        ));
        let router = GatewayServer::create_router(AppState::new(context.clone()));
        Self { router, context }
    }

    /// 直接写入会话并返回 Cookie 头
    pub async fn login(&self, user: &users::Model) -> String {
        self.login_with(SessionData::for_user(user)).await
    }

    /// 写入任意会话内容
    pub async fn login_with(&self, data: SessionData) -> String {
        let session_id = self.context.sessions.create(data).await.unwrap();
        format!("session={session_id}")
    }

    pub async fn get(&self, uri: &str, headers: &[(&str, &str)]) -> TestResponse {
        let mut builder = Request::builder().method("GET").uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let response = self
            .router
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        TestResponse {
            status,
            headers,
            body,
        }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn success(&self) -> bool {
        self.body["success"].as_bool().unwrap_or(false)
    }

    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }

    /// `Set-Cookie` 中的 `name=value` 部分
    pub fn cookie(&self) -> Option<String> {
        self.headers
            .get("set-cookie")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }
}
