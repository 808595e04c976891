mod common;

use anyhow::Result;
use barangay_care_bff::config::AppConfig;
use common::{set_cookie, TestApp, UNREACHABLE_UPSTREAM};
use reqwest::StatusCode;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

const RESET_SENT: &str = "Password reset code sent to your email";

async fn mock_login_success(app: &TestApp) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .and(body_json(json!({ "email": "juan@example.com", "password": "Secret1!" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok-123",
            "user": { "id": 1, "email": "juan@example.com", "user_type": 1 }
        })))
        .expect(1)
        .mount(&app.upstream)
        .await;
}

#[tokio::test]
async fn login_sets_session_cookie_and_hides_token() -> Result<()> {
    let app = TestApp::spawn().await?;
    mock_login_success(&app).await;

    let res = app
        .post("/api/auth/login", None)
        .json(&json!({ "email": "juan@example.com", "password": "Secret1!" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let cookie = set_cookie(&res);
    assert!(cookie.starts_with("auth_token=tok-123"), "cookie: {cookie}");
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=36000"));
    // Development config: no Secure attribute
    assert!(!cookie.contains("Secure"));

    let body: Value = res.json().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["id"], 1);
    assert!(!body.to_string().contains("tok-123"), "token leaked: {body}");
    Ok(())
}

#[tokio::test]
async fn login_cookie_is_secure_outside_development() -> Result<()> {
    let app = TestApp::spawn_with(AppConfig::production()).await?;
    mock_login_success(&app).await;

    let res = app
        .post("/api/auth/login", None)
        .json(&json!({ "email": "juan@example.com", "password": "Secret1!" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(set_cookie(&res).contains("Secure"));
    Ok(())
}

#[tokio::test]
async fn login_requires_credentials() -> Result<()> {
    let app = TestApp::spawn().await?;
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.upstream)
        .await;

    let res = app
        .post("/api/auth/login", None)
        .json(&json!({ "email": "juan@example.com" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(set_cookie(&res).is_empty());
    let body: Value = res.json().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["status"], 400);
    Ok(())
}

#[tokio::test]
async fn rejected_login_forwards_upstream_message() -> Result<()> {
    let app = TestApp::spawn().await?;
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "non_field_errors": ["Unable to log in with provided credentials."] })),
        )
        .mount(&app.upstream)
        .await;

    let res = app
        .post("/api/auth/login", None)
        .json(&json!({ "email": "juan@example.com", "password": "wrong" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(set_cookie(&res).is_empty());
    let body: Value = res.json().await?;
    assert_eq!(
        body,
        json!({ "success": false, "error": "Unable to log in with provided credentials.", "status": 400 })
    );
    Ok(())
}

#[tokio::test]
async fn logout_notifies_upstream_and_clears_cookie() -> Result<()> {
    let app = TestApp::spawn().await?;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout/"))
        .and(header("Authorization", "Token tok-123"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let res = app.post("/api/auth/logout", Some("tok-123")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let cookie = set_cookie(&res);
    assert!(cookie.starts_with("auth_token=;"), "cookie: {cookie}");
    assert!(cookie.contains("Max-Age=0"));
    Ok(())
}

#[tokio::test]
async fn logout_clears_cookie_when_upstream_is_unreachable() -> Result<()> {
    let base_url = common::serve(AppConfig::development().with_upstream(UNREACHABLE_UPSTREAM)).await?;

    let res = common::client()
        .post(format!("{base_url}/api/auth/logout"))
        .header("Cookie", "auth_token=tok-123")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let cookie = set_cookie(&res);
    assert!(cookie.starts_with("auth_token=;"), "cookie: {cookie}");
    assert!(cookie.contains("Max-Age=0"));
    let body: Value = res.json().await?;
    assert_eq!(body["success"], true);
    Ok(())
}

#[tokio::test]
async fn reset_request_response_never_reveals_account_existence() -> Result<()> {
    let expected = json!({ "success": true, "data": { "message": RESET_SENT } });

    let app = TestApp::spawn().await?;
    Mock::given(method("POST"))
        .and(path("/api/auth/reset-password/request/"))
        .and(body_json(json!({ "email": "known@example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "sent" })))
        .mount(&app.upstream)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/reset-password/request/"))
        .and(body_json(json!({ "email": "unknown@example.com" })))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "No account with this email" })))
        .mount(&app.upstream)
        .await;

    for email in ["known@example.com", "unknown@example.com"] {
        let res = app
            .post("/api/auth/reset-password/request", None)
            .json(&json!({ "email": email }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK, "email {email}");
        assert_eq!(res.json::<Value>().await?, expected, "email {email}");
    }

    // Upstream down: still the same answer
    let base_url = common::serve(AppConfig::development().with_upstream(UNREACHABLE_UPSTREAM)).await?;
    let res = common::client()
        .post(format!("{base_url}/api/auth/reset-password/request"))
        .json(&json!({ "email": "known@example.com" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, expected);
    Ok(())
}

#[tokio::test]
async fn reset_confirm_validates_before_calling_upstream() -> Result<()> {
    let app = TestApp::spawn().await?;
    Mock::given(method("POST"))
        .and(path("/api/auth/reset-password/confirm/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.upstream)
        .await;

    let cases = [
        ("Str0ng!pass", "Str0ng!pasS", "Passwords do not match"),
        ("Ab1!xyz", "Ab1!xyz", "Password must be at least 8 characters long"),
        ("weak1!pass", "weak1!pass", "Password must contain at least one uppercase letter"),
        ("WEAK1!PASS", "WEAK1!PASS", "Password must contain at least one lowercase letter"),
        ("Weak!pass", "Weak!pass", "Password must contain at least one number"),
        ("Weak1pass", "Weak1pass", "Password must contain at least one special character (!@#$%^&*)"),
    ];

    for (password, confirm, message) in cases {
        let res = app
            .post("/api/auth/reset-password/confirm", None)
            .json(&json!({
                "email": "juan@example.com",
                "code": "123456",
                "password": password,
                "confirm_password": confirm
            }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "password {password}");
        let body: Value = res.json().await?;
        assert_eq!(body["error"], message);
    }
    Ok(())
}

#[tokio::test]
async fn reset_confirm_forwards_valid_request() -> Result<()> {
    let app = TestApp::spawn().await?;
    Mock::given(method("POST"))
        .and(path("/api/auth/reset-password/confirm/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Password reset successful" })))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let res = app
        .post("/api/auth/reset-password/confirm", None)
        .json(&json!({
            "email": "juan@example.com",
            "code": "123456",
            "password": "Str0ng!pass",
            "confirm_password": "Str0ng!pass"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["message"], "Password reset successful");
    Ok(())
}

#[tokio::test]
async fn change_password_checks_confirmation() -> Result<()> {
    let app = TestApp::spawn().await?;
    Mock::given(method("POST"))
        .and(path("/api/auth/change-password/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.upstream)
        .await;

    let res = app
        .post("/api/auth/change-password", Some("tok"))
        .json(&json!({ "old_password": "Old1!pass", "new_password": "New1!pass", "confirm_password": "Other1!pass" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["error"], "New passwords do not match");

    let res = app
        .post("/api/auth/change-password", Some("tok"))
        .json(&json!({ "old_password": "Old1!pass", "new_password": "New1!pass" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .post("/api/auth/change-password", None)
        .json(&json!({ "old_password": "a", "new_password": "b", "confirm_password": "b" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn session_status_reports_signed_out_and_signed_in() -> Result<()> {
    let app = TestApp::spawn().await?;
    Mock::given(method("GET"))
        .and(path("/api/auth/user/"))
        .and(header("Authorization", "Token doc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 4, "user_type": 2 })))
        .mount(&app.upstream)
        .await;

    let res = app.get("/api/auth/session", None).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["data"], json!({ "authenticated": false }));

    let res = app.get("/api/auth/session", Some("doc")).send().await?;
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["authenticated"], true);
    assert_eq!(body["data"]["role"], 2);
    assert_eq!(body["data"]["user"]["id"], 4);
    Ok(())
}

#[tokio::test]
async fn enveloped_login_failure_is_a_rejection_without_cookie() -> Result<()> {
    let app = TestApp::spawn().await?;
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": false, "message": "Account is disabled" })),
        )
        .mount(&app.upstream)
        .await;

    let res = app
        .post("/api/auth/login", None)
        .json(&json!({ "email": "juan@example.com", "password": "Secret1!" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(set_cookie(&res).is_empty());
    assert_eq!(
        res.json::<Value>().await?,
        json!({ "success": false, "error": "Account is disabled", "status": 400 })
    );
    Ok(())
}
