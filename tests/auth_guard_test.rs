//! 会话 / 访问令牌守卫的端到端测试

mod common;

use api_gateway_auth::auth::guard::{
    MSG_ACCESS_TOKEN_INVALID, MSG_CALLER_ID_INVALID, MSG_CALLER_ID_MISMATCH,
    MSG_CALLER_ID_MISSING, MSG_INSUFFICIENT_ROLE, MSG_NOT_LOGGED_IN, MSG_USER_INFO_INVALID,
};
use api_gateway_auth::auth::SessionData;
use api_gateway_auth::config::AppConfig;
use axum::http::StatusCode;
use common::{TestApp, UserRow, setup_db};
use pretty_assertions::assert_eq;

async fn app_with(rows: Vec<UserRow>) -> (TestApp, Vec<entity::users::Model>) {
    let db = setup_db().await;
    let mut users = Vec::new();
    for row in rows {
        users.push(row.insert(&db).await);
    }
    (TestApp::new(db, AppConfig::default(), None), users)
}

#[tokio::test]
async fn ping_needs_no_credentials() {
    let (app, _) = app_with(vec![]).await;
    let resp = app.get("/ping", &[]).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, "pong");
    assert!(resp.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn no_credentials_is_unauthorized() {
    let (app, _) = app_with(vec![]).await;
    let resp = app.get("/api/user/self", &[]).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert!(!resp.success());
    assert_eq!(resp.message(), MSG_NOT_LOGGED_IN);
}

#[tokio::test]
async fn session_requires_matching_caller_header() {
    let (app, users) = app_with(vec![UserRow::common("alice")]).await;
    let alice = &users[0];
    let cookie = app.login(alice).await;
    let own_id = alice.id.to_string();

    let resp = app.get("/api/user/self", &[("cookie", cookie.as_str())]).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.message(), MSG_CALLER_ID_MISSING);

    let resp = app
        .get("/api/user/self", &[("cookie", cookie.as_str()), ("New-Api-User", "abc")])
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.message(), MSG_CALLER_ID_INVALID);

    let resp = app
        .get("/api/user/self", &[("cookie", cookie.as_str()), ("New-Api-User", "999")])
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.message(), MSG_CALLER_ID_MISMATCH);

    let resp = app
        .get("/api/user/self", &[("cookie", cookie.as_str()), ("New-Api-User", own_id.as_str())])
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.success());
    assert_eq!(resp.body["data"]["username"], "alice");
}

#[tokio::test]
async fn access_token_skips_caller_header() {
    let mut root = UserRow::common("root");
    root.role = 100;
    root.access_token = Some("root-access-token");
    let (app, users) = app_with(vec![root, UserRow::common("bob")]).await;
    let bob_id = users[1].id;

    let resp = app
        .get(
            &format!("/api/user/{bob_id}"),
            &[("authorization", "Bearer root-access-token")],
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["data"]["username"], "bob");

    // 不带 Bearer 前缀同样有效
    let resp = app
        .get("/api/user/self", &[("authorization", "root-access-token")])
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["data"]["username"], "root");
}

#[tokio::test]
async fn unknown_access_token_is_rejected() {
    let (app, _) = app_with(vec![]).await;
    let resp = app
        .get("/api/user/self", &[("authorization", "Bearer nope")])
        .await;
    // 出示了凭证即视为认证阶段已完成，按策略拒绝返回 200
    assert_eq!(resp.status, StatusCode::OK);
    assert!(!resp.success());
    assert_eq!(resp.message(), MSG_ACCESS_TOKEN_INVALID);
}

#[tokio::test]
async fn common_user_cannot_reach_admin_route() {
    let mut carol = UserRow::common("carol");
    carol.access_token = Some("carol-token");
    let (app, users) = app_with(vec![carol]).await;

    let resp = app
        .get(
            &format!("/api/user/{}", users[0].id),
            &[("authorization", "carol-token")],
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(!resp.success());
    assert_eq!(resp.message(), MSG_INSUFFICIENT_ROLE);
}

#[tokio::test]
async fn disabled_user_is_banned_before_role_check() {
    let mut dave = UserRow::common("dave");
    dave.status = 2;
    dave.access_token = Some("dave-token");
    let (app, _) = app_with(vec![dave]).await;

    // 管理员路由：封禁检查先于角色阈值
    let resp = app.get("/api/user/1", &[("authorization", "dave-token")]).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(!resp.success());
    assert_eq!(resp.message(), "user has been banned");
}

#[tokio::test]
async fn invalid_stored_role_is_user_info_invalid() {
    let mut eve = UserRow::common("eve");
    eve.role = 42;
    eve.access_token = Some("eve-token");
    let (app, _) = app_with(vec![eve]).await;

    let resp = app.get("/api/user/self", &[("authorization", "eve-token")]).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(!resp.success());
    assert_eq!(resp.message(), MSG_USER_INFO_INVALID);
}

#[tokio::test]
async fn blank_session_username_is_user_info_invalid() {
    let (app, users) = app_with(vec![UserRow::common("hank")]).await;
    let mut data = SessionData::for_user(&users[0]);
    data.username = Some(String::new());
    let cookie = app.login_with(data).await;
    let own_id = users[0].id.to_string();

    let resp = app
        .get("/api/user/self", &[("cookie", cookie.as_str()), ("New-Api-User", own_id.as_str())])
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(!resp.success());
    assert_eq!(resp.message(), MSG_USER_INFO_INVALID);
}

#[tokio::test]
async fn status_reports_optional_user() {
    let (app, users) = app_with(vec![UserRow::common("frank")]).await;

    let resp = app.get("/api/status", &[]).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["data"]["external_identity_login"], false);
    assert_eq!(resp.body["data"]["register_enabled"], true);
    assert!(resp.body["data"].get("user_id").is_none());

    let cookie = app.login(&users[0]).await;
    let resp = app.get("/api/status", &[("cookie", cookie.as_str())]).await;
    assert_eq!(resp.body["data"]["user_id"], users[0].id);
}

#[tokio::test]
async fn logout_invalidates_session() {
    let (app, users) = app_with(vec![UserRow::common("gina")]).await;
    let cookie = app.login(&users[0]).await;
    let own_id = users[0].id.to_string();

    let resp = app.get("/api/user/logout", &[("cookie", cookie.as_str())]).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.success());
    let cleared = resp.headers["set-cookie"].to_str().unwrap();
    assert!(cleared.contains("Max-Age=0"));

    let resp = app
        .get("/api/user/self", &[("cookie", cookie.as_str()), ("New-Api-User", own_id.as_str())])
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}
