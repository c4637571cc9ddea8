//! API 密钥守卫的端到端测试

mod common;

use api_gateway_auth::auth::guard::MSG_CHANNEL_FORBIDDEN;
use api_gateway_auth::config::AppConfig;
use axum::http::StatusCode;
use chrono::Utc;
use common::{TestApp, TokenRow, UserRow, setup_db};
use pretty_assertions::assert_eq;
use rstest::rstest;

const CONTEXT: &str = "/v1/token/context";

/// 普通用户 owner（ID 1）与管理员 admin（ID 2），各有一个启用的令牌
async fn app() -> (TestApp, i32, i32) {
    let db = setup_db().await;
    let owner = UserRow::common("owner").insert(&db).await;
    let mut admin = UserRow::common("admin");
    admin.role = 10;
    let admin = admin.insert(&db).await;

    TokenRow::new(owner.id, "ownerkey").insert(&db).await;
    TokenRow::new(admin.id, "adminkey").insert(&db).await;
    (TestApp::new(db, AppConfig::default(), None), owner.id, admin.id)
}

#[tokio::test]
async fn valid_key_attaches_context() {
    let (app, owner_id, _) = app().await;
    let resp = app
        .get(CONTEXT, &[("authorization", "Bearer sk-ownerkey")])
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.success());
    let data = &resp.body["data"];
    assert_eq!(data["user_id"], owner_id);
    assert_eq!(data["token_name"], "token-ownerkey");
    assert_eq!(data["remain_quota"], 1000);
    assert!(data["specific_channel_id"].is_null());
    assert!(data["model_limits"].is_null());
}

#[tokio::test]
async fn legacy_alias_reads_fallback_header() {
    let (app, owner_id, _) = app().await;
    let resp = app
        .get(
            CONTEXT,
            &[
                ("authorization", "midjourney-proxy"),
                ("mj-api-secret", "sk-ownerkey"),
            ],
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["data"]["user_id"], owner_id);
}

#[rstest]
#[case::no_key(None, "no token provided")]
#[case::unknown(Some("Bearer sk-doesnotexist"), "invalid token")]
#[case::alias_without_fallback(Some("midjourney-proxy"), "no token provided")]
#[tokio::test]
async fn bad_credentials_are_unauthorized(#[case] header: Option<&str>, #[case] message: &str) {
    let (app, _, _) = app().await;
    let headers: Vec<(&str, &str)> = header.map(|h| ("authorization", h)).into_iter().collect();
    let resp = app.get(CONTEXT, &headers).await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert!(!resp.success());
    assert_eq!(resp.message(), message);
    assert_eq!(resp.body["error"]["message"], message);
    assert_eq!(resp.body["error"]["code"], "invalid_credential");
}

#[tokio::test]
async fn channel_override_requires_admin() {
    let (app, _, admin_id) = app().await;

    let resp = app.get(CONTEXT, &[("authorization", "sk-ownerkey-7")]).await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(resp.message(), MSG_CHANNEL_FORBIDDEN);

    let resp = app.get(CONTEXT, &[("authorization", "sk-adminkey-7")]).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["data"]["user_id"], admin_id);
    assert_eq!(resp.body["data"]["specific_channel_id"], "7");
}

#[tokio::test]
async fn trailing_delimiter_still_counts_as_channel_override() {
    let (app, _, admin_id) = app().await;

    let resp = app.get(CONTEXT, &[("authorization", "sk-ownerkey-")]).await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(resp.message(), MSG_CHANNEL_FORBIDDEN);

    let resp = app.get(CONTEXT, &[("authorization", "Bearer sk-adminkey-")]).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["data"]["user_id"], admin_id);
    assert_eq!(resp.body["data"]["specific_channel_id"], "");
}

#[tokio::test]
async fn disabled_owner_is_forbidden() {
    let db = setup_db().await;
    let mut banned = UserRow::common("banned");
    banned.status = 2;
    let banned = banned.insert(&db).await;
    TokenRow::new(banned.id, "bannedkey").insert(&db).await;
    let app = TestApp::new(db, AppConfig::default(), None);

    let resp = app.get(CONTEXT, &[("authorization", "sk-bannedkey")]).await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(resp.message(), "user has been banned");
    assert_eq!(resp.body["error"]["code"], "account_disabled");
}

#[tokio::test]
async fn token_state_is_validated() {
    let db = setup_db().await;
    let owner = UserRow::common("owner").insert(&db).await;
    let mut exhausted = TokenRow::new(owner.id, "exhausted");
    exhausted.status = 4;
    exhausted.insert(&db).await;
    let mut stale = TokenRow::new(owner.id, "stale");
    stale.expired_time = Utc::now().timestamp() - 3600;
    stale.insert(&db).await;
    let app = TestApp::new(db, AppConfig::default(), None);

    let resp = app.get(CONTEXT, &[("authorization", "sk-exhausted")]).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.message(), "token quota exhausted");

    let resp = app.get(CONTEXT, &[("authorization", "sk-stale")]).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.message(), "token expired");
}

#[tokio::test]
async fn limits_are_carried_in_context() {
    let db = setup_db().await;
    let owner = UserRow::common("owner").insert(&db).await;
    let mut limited = TokenRow::new(owner.id, "limited");
    limited.model_limits = Some("gpt-4o, claude-3-5-sonnet");
    limited.allow_ips = Some("10.0.0.0/8\nnot-an-ip,192.168.1.7");
    limited.group = "vip";
    limited.insert(&db).await;
    let app = TestApp::new(db, AppConfig::default(), None);

    let resp = app.get(CONTEXT, &[("authorization", "sk-limited")]).await;
    assert_eq!(resp.status, StatusCode::OK);
    let data = &resp.body["data"];
    assert_eq!(data["token_group"], "vip");
    assert_eq!(data["user_group"], "default");
    assert_eq!(
        data["model_limits"],
        serde_json::json!(["claude-3-5-sonnet", "gpt-4o"])
    );
    assert_eq!(
        data["allow_ips"],
        serde_json::json!(["10.0.0.0/8", "192.168.1.7/32"])
    );
}
