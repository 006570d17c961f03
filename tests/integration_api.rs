//! API Integration Tests
//!
//! Drive the router the way a browser would: form posts, JSON replies and
//! the session cookie carried between requests.

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::util::ServiceExt;

mod common;

use common::TestClient;

#[tokio::test]
async fn test_health_check() {
    let app = common::setup_test_app().await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn test_index_points_to_login_then_menu() {
    let mut client = TestClient::new(common::setup_test_app().await);

    let (status, body) = client.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["authenticated"], false);
    assert_eq!(body["next"], "/login");
    assert!(client.has_session(), "first visit should issue a session cookie");

    let (status, _) = client.login("Avi Cohen", "1234").await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = client.get("/").await;
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["next"], "/menu");
}

#[tokio::test]
async fn test_login_and_menu() {
    let mut client = TestClient::new(common::setup_test_app().await);

    let (status, body) = client.login("avi cohen", "1234").await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    assert_eq!(body["customer_name"], "Avi Cohen");
    assert_eq!(body["next"], "/menu");

    let (status, body) = client.get("/menu").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Avi Cohen");
    assert_eq!(body["balance"], 1000);

    let (status, body) = client.get("/balance").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], 1000);
}

#[tokio::test]
async fn test_unknown_customer() {
    let mut client = TestClient::new(common::setup_test_app().await);

    let (status, body) = client.login("Nobody Here", "1234").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "not_found");
    assert_eq!(body["return_to"], "/login");
}

#[tokio::test]
async fn test_three_wrong_pins_lock_out_then_reset() {
    let mut client = TestClient::new(common::setup_test_app().await);

    let (status, body) = client.login("Yossi Cohen", "0000").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "invalid_pin");
    assert_eq!(body["attempts_remaining"], 2);
    assert_eq!(body["error"], "Incorrect PIN. Attempts: 1/3");

    let (status, body) = client.login("Yossi Cohen", "1111").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["attempts_remaining"], 1);

    let (status, body) = client.login("Yossi Cohen", "2222").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error_code"], "too_many_attempts");
    assert_eq!(body["return_to"], "/login");

    // The counter starts over after a lockout
    let (status, body) = client.login("Yossi Cohen", "3333").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["attempts_remaining"], 2);

    let (status, _) = client.login("Yossi Cohen", "6543").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_requires_login() {
    let mut client = TestClient::new(common::setup_test_app().await);

    for uri in ["/menu", "/balance", "/withdraw", "/receipt"] {
        let (status, body) = client.get(uri).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} should require login", uri);
        assert_eq!(body["error_code"], "unauthenticated");
        assert_eq!(body["return_to"], "/login");
    }

    let (status, body) = client.post_form("/deposit", &[("amount", "100")]).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["return_to"], "/login");

    let (status, _) = client.post_form("/withdraw", &[("option", "1")]).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = client.post_form("/change_pin", &[("new_pin", "9999")]).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_yuri_levi_visit() {
    let mut client = TestClient::new(common::setup_test_app().await);

    let (status, _) = client.login("Yuri Levi", "5852").await;
    assert_eq!(status, StatusCode::OK);

    // Deposit 100: 800 -> 900
    let (status, body) = client.post_form("/deposit", &[("amount", "100")]).await;
    assert_eq!(status, StatusCode::OK, "deposit failed: {}", body);
    assert_eq!(body["amount"], 100);
    assert_eq!(body["balance"], 900);
    assert_eq!(body["message"], "Deposited 100 NIS. New balance: 900 NIS.");
    assert_eq!(body["next"], "/menu");

    // Withdraw option 3 (150): 900 -> 750
    let (status, body) = client.post_form("/withdraw", &[("option", "3")]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["amount"], 150);
    assert_eq!(body["balance"], 750);

    // Deposit of 37 is not an accepted denomination
    let (status, body) = client.post_form("/deposit", &[("amount", "37")]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "invalid_denomination");
    assert_eq!(body["return_to"], "/deposit");

    // Other amount larger than the balance
    let (status, body) = client
        .post_form("/withdraw", &[("option", "5"), ("other_amount", "900")])
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "insufficient_funds");
    assert_eq!(body["return_to"], "/withdraw");

    let (status, body) = client.get("/receipt").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Yuri Levi");
    assert_eq!(body["balance"], 750);
    assert!(body["timestamp"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn test_withdraw_options_menu() {
    let mut client = TestClient::new(common::setup_test_app().await);
    client.login("Avi Cohen", "1234").await;

    let (status, body) = client.get("/withdraw").await;
    assert_eq!(status, StatusCode::OK);

    let options = body["options"].as_array().unwrap();
    assert_eq!(options.len(), 5);
    assert_eq!(options[0]["option"], "1");
    assert_eq!(options[0]["amount"], 50);
    assert_eq!(options[3]["amount"], 300);
    assert_eq!(options[4]["option"], "5");
    assert!(options[4]["amount"].is_null());
}

#[tokio::test]
async fn test_withdraw_rejections() {
    let mut client = TestClient::new(common::setup_test_app().await);
    client.login("Avi Cohen", "1234").await;

    let (status, body) = client.post_form("/withdraw", &[("option", "9")]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "invalid_selection");

    let (status, body) = client.post_form("/withdraw", &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "invalid_selection");

    let (status, body) = client
        .post_form("/withdraw", &[("option", "5"), ("other_amount", "abc")])
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "invalid_amount");

    let (_, body) = client.get("/balance").await;
    assert_eq!(body["balance"], 1000);
}

#[tokio::test]
async fn test_change_pin() {
    let app = common::setup_test_app().await;
    let mut client = TestClient::new(app.clone());
    client.login("Avi Cohen", "1234").await;

    let (status, body) = client.post_form("/change_pin", &[("new_pin", "12a4")]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "invalid_pin_format");
    assert_eq!(body["return_to"], "/change_pin");

    let (status, body) = client.post_form("/change_pin", &[("new_pin", "4321")]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "PIN changed successfully.");

    // A second terminal sees the new PIN
    let mut other = TestClient::new(app);
    let (status, _) = other.login("Avi Cohen", "1234").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = other.login("Avi Cohen", "4321").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout() {
    let mut client = TestClient::new(common::setup_test_app().await);
    client.login("Avi Cohen", "1234").await;

    let (status, body) = client.get("/logout").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "You have logged out.");
    assert_eq!(body["next"], "/login");
    assert!(!client.has_session(), "logout should expire the cookie");

    let (status, _) = client.get("/menu").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let app = common::setup_test_app().await;
    let mut avi = TestClient::new(app.clone());
    let mut stranger = TestClient::new(app);

    avi.login("Avi Cohen", "1234").await;
    stranger.get("/").await;

    let (status, _) = stranger.get("/balance").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = avi.get("/balance").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_active_session_outlives_ttl() {
    let app = common::setup_test_app_with_ttl(Duration::from_millis(300)).await;
    let mut client = TestClient::new(app);
    client.login("Avi Cohen", "1234").await;

    // Receipts alone keep the session alive well past one TTL.
    for i in 0..5 {
        tokio::time::sleep(Duration::from_millis(150)).await;
        let (status, body) = client.get("/receipt").await;
        assert_eq!(status, StatusCode::OK, "receipt #{} failed: {}", i, body);
    }

    tokio::time::sleep(Duration::from_millis(450)).await;
    let (status, body) = client.get("/receipt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["return_to"], "/login");
}

#[tokio::test]
async fn test_unreadable_form_from_anonymous_session() {
    let mut client = TestClient::new(common::setup_test_app().await);

    let (status, body) = client.post_raw("/deposit", None, "amount=100").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "unauthenticated");
    assert_eq!(body["return_to"], "/login");
}

#[tokio::test]
async fn test_unreadable_form_is_json_error() {
    let mut client = TestClient::new(common::setup_test_app().await);

    let form = Some("application/x-www-form-urlencoded");
    let (status, body) = client
        .post_raw("/login", form, "name=Avi+Cohen&pin=1234&pin=1234")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "bad_request");
    assert_eq!(body["return_to"], "/login");

    client.login("Avi Cohen", "1234").await;

    let (status, body) = client.post_raw("/deposit", None, "amount=100").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "bad_request");
    assert_eq!(body["return_to"], "/deposit");

    let (status, body) = client
        .post_raw("/withdraw", Some("text/plain"), "option=1")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["return_to"], "/withdraw");

    let (status, body) = client
        .post_raw("/change_pin", form, "new_pin=1111&new_pin=2222")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["return_to"], "/change_pin");

    let (_, body) = client.get("/balance").await;
    assert_eq!(body["balance"], 1000);
}
