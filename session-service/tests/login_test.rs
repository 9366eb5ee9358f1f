mod common;

use common::{json_body, login_request, TestApp, TEST_EMAIL};
use session_service::services::{JwtService, RefreshTokenStore};

#[tokio::test]
async fn login_returns_identity_and_both_tokens() {
    let app = TestApp::spawn();

    let body = app.login().await;

    assert_eq!(body["id"], app.user.id.to_string());
    assert_eq!(body["email"], TEST_EMAIL);
    assert_eq!(body["is_chirpy_red"], false);
    assert!(body.get("created_at").is_some());
    assert!(body.get("updated_at").is_some());
    assert!(body.get("hashed_password").is_none());

    let token = body["token"].as_str().unwrap();
    let jwt: &JwtService = app.state.session.jwt();
    let claims = jwt.decode_claims(token).unwrap();
    assert_eq!(claims.exp - claims.iat, 3600);
    assert_eq!(claims.sub, app.user.id.to_string());

    let refresh = body["refresh_token"].as_str().unwrap();
    assert_eq!(refresh.len(), 64);
    assert_eq!(app.refresh_tokens.validate(refresh).await.unwrap(), app.user.id);
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let app = TestApp::spawn();

    let wrong = app.send(login_request(TEST_EMAIL, "nope")).await;
    assert_eq!(wrong.status(), 401);
    let wrong = json_body(wrong).await;

    let unknown = app.send(login_request("ghost@b.com", "secret1")).await;
    assert_eq!(unknown.status(), 401);
    let unknown = json_body(unknown).await;

    assert_eq!(wrong, unknown);
    assert_eq!(wrong, serde_json::json!({ "error": "Unauthorized" }));
}

#[tokio::test]
async fn invalid_body_is_rejected_before_lookup() {
    let app = TestApp::spawn();

    let response = app.send(login_request("not-an-email", "")).await;
    assert_eq!(response.status(), 422);
}
