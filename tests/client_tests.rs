//! Tests for the login form client against a live server.

mod common;

use tokio::net::TcpListener;

use common::*;
use vitrine::client::{AuthClient, LoginError};

async fn spawn_server() -> String {
    let app = test_app(test_state());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_login_success_returns_session_info() {
    let base_url = spawn_server().await;
    let client = AuthClient::new(base_url);

    let response = client.login(ADMIN_EMAIL, ADMIN_PASSWORD, true).await.unwrap();

    assert_eq!(response.user.email, ADMIN_EMAIL);
    assert!(response.session.remember_me);
}

#[tokio::test]
async fn test_wrong_password_is_invalid_credentials() {
    let base_url = spawn_server().await;
    let client = AuthClient::new(format!("{}/", base_url));

    let err = client.login(ADMIN_EMAIL, "wrong", false).await.unwrap_err();

    assert!(matches!(err, LoginError::InvalidCredentials));
    assert_eq!(err.to_string(), "Invalid email or password");
}

#[tokio::test]
async fn test_repeated_failures_are_rate_limited() {
    let base_url = spawn_server().await;
    let client = AuthClient::new(base_url);

    for _ in 0..5 {
        let err = client.login("someone@example.com", "wrong", false).await.unwrap_err();
        assert!(matches!(err, LoginError::InvalidCredentials));
    }

    match client.login("someone@example.com", "wrong", false).await {
        Err(LoginError::RateLimited { retry_after }) => assert!(retry_after > 0),
        other => panic!("expected rate limit, got {:?}", other.map(|r| r.user)),
    }
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let client = AuthClient::new("http://127.0.0.1:1");

    let err = client.login(ADMIN_EMAIL, ADMIN_PASSWORD, false).await.unwrap_err();

    assert!(matches!(err, LoginError::Network(_)));
    assert_eq!(err.to_string(), "Could not reach the server, please try again");
}
