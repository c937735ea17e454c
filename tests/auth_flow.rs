mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::json;

use common::{error_message, TestApp, ADMIN, PASSWORD};

#[tokio::test]
async fn register_validates_and_rejects_duplicates() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({ "username": "alice", "email": "not-an-email", "password": "123" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(&body),
        "email is invalid; password must be at least 6 characters"
    );

    let user = app.register("alice").await;
    assert_eq!(user["role"], "user");
    assert_eq!(user["status"], "active");
    assert!(user.get("password_hash").is_none());

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "username": "alice",
                "email": "other@example.com",
                "password": "secret123",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_message(&body), "user already exists");
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let app = TestApp::new().await;
    app.register("bob").await;

    for username in ["bob", "nobody"] {
        let (status, body) = app
            .request(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(json!({ "username": username, "password": "wrong-password" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_message(&body), "invalid username or password");
    }
}

#[tokio::test]
async fn change_password_checks_old_password() {
    let app = TestApp::new().await;
    let (_, token) = app.sign_up("dana").await;

    let (status, body) = app
        .put(
            "/api/v1/auth/password",
            &token,
            json!({ "old_password": "not-it", "new_password": "brand-new" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(&body), "invalid old password");

    let (status, body) = app
        .put(
            "/api/v1/auth/password",
            &token,
            json!({ "old_password": PASSWORD, "new_password": "123" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(&body),
        "new_password must be at least 6 characters"
    );

    let (status, body) = app
        .put(
            "/api/v1/auth/password",
            &token,
            json!({ "old_password": PASSWORD, "new_password": "brand-new" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "password changed successfully");

    let login = |password: &'static str| {
        json!({ "username": "dana", "password": password })
    };
    let (status, _) = app
        .request(Method::POST, "/api/v1/auth/login", None, Some(login(PASSWORD)))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, body) = app
        .request(Method::POST, "/api/v1/auth/login", None, Some(login("brand-new")))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["access_token"].is_string());

    let (status, _) = app
        .request(
            Method::PUT,
            "/api/v1/auth/password",
            None,
            Some(json!({ "old_password": "brand-new", "new_password": "another-one" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_routes_require_bearer_token() {
    let app = TestApp::new().await;

    let (status, body) = app.request(Method::GET, "/api/v1/apps?team_id=t", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(&body), "authorization header is required");

    let request = Request::builder()
        .uri("/api/v1/apps?team_id=t")
        .header(header::AUTHORIZATION, "Token abc")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        error_message(&body),
        "authorization header must start with Bearer"
    );

    let (status, body) = app.get("/api/v1/apps?team_id=t", "garbage").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(&body), "invalid token");

    let (status, _) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn logout_blacklists_the_token() {
    let app = TestApp::new().await;
    let (user_id, token) = app.sign_up("carol").await;

    let (status, body) = app.get(&format!("/api/v1/auth/user/{user_id}"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "carol");

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/auth/logout",
            None,
            Some(json!({ "token": token })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get(&format!("/api/v1/auth/user/{user_id}"), &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(&body), "token is invalid");
}

#[tokio::test]
async fn refresh_rotates_tokens() {
    let app = TestApp::new().await;
    app.register("dave").await;
    let session = app.login("dave").await;
    let refresh = session["refresh_token"].as_str().unwrap().to_string();

    // 刷新令牌不能当作访问令牌使用
    let (status, body) = app.get("/api/v1/apps?team_id=t", &refresh).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(&body), "invalid token");

    let access = session["access_token"].as_str().unwrap();
    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": access })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(&body), "invalid refresh token");

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": refresh })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let rotated = body["data"]["access_token"].as_str().unwrap();
    assert_ne!(body["data"]["refresh_token"].as_str().unwrap(), refresh);

    let (status, _) = app.get("/api/v1/apps?team_id=t", rotated).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": refresh })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(&body), "token is invalid");
}

#[tokio::test]
async fn rbac_routes_require_manage_permission() {
    let app = TestApp::new().await;
    let (admin_id, admin) = app.sign_up(ADMIN).await;
    let (user_id, user) = app.sign_up("erin").await;

    let role = json!({ "name": "auditor", "description": "read only" });
    let (status, body) = app.post("/api/v1/rbac/roles", &user, role.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_message(&body), "insufficient permissions");

    let (status, body) = app.post("/api/v1/rbac/roles", &admin, role.clone()).await;
    assert_eq!(status, StatusCode::OK);
    let role_id = body["data"]["id"].as_str().unwrap().to_string();
    let (status, _) = app.post("/api/v1/rbac/roles", &admin, role).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .post(
            "/api/v1/rbac/permissions",
            &admin,
            json!({ "name": "reports.read", "resource": "reports", "action": "read" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let permission_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app.get("/api/v1/rbac/permissions/reports.read", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["resource"], "reports");
    let (status, body) = app.get("/api/v1/rbac/roles/auditor", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], role_id.as_str());

    let check = json!({ "user_id": user_id, "resource": "reports", "action": "read" });
    let (status, body) = app.post("/api/v1/rbac/check", &user, check.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["has_permission"], false);

    let (status, _) = app
        .post(
            &format!("/api/v1/rbac/roles/{role_id}/permissions"),
            &admin,
            json!({ "permission_id": permission_id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .post(
            &format!("/api/v1/rbac/users/{user_id}/roles"),
            &admin,
            json!({ "role_id": role_id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.post("/api/v1/rbac/check", &user, check).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["has_permission"], true);

    let (_, body) = app
        .get(&format!("/api/v1/rbac/users/{user_id}/roles"), &admin)
        .await;
    let roles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert!(roles.contains(&"user") && roles.contains(&"auditor"));

    // 检查他人需要 rbac.manage
    let (status, _) = app
        .post(
            "/api/v1/rbac/check",
            &user,
            json!({ "user_id": admin_id, "resource": "rbac", "action": "manage" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
