//! Wire-level behavior of the HTTP identity client.

use cat_gateway::config::GatewayConfig;
use cat_gateway::identity::{
    Credentials, HttpIdentityClient, IdentityService, NewPrincipal, PrincipalPatch,
};
use cat_gateway::{BearerToken, Error, PrincipalId, Roles};
use httpmock::prelude::*;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

fn client(server: &MockServer) -> HttpIdentityClient {
    let config = GatewayConfig::new(Url::parse(&server.base_url()).unwrap());
    HttpIdentityClient::new(&config).unwrap()
}

fn token() -> BearerToken {
    BearerToken::new("tok-123").unwrap()
}

fn alice() -> serde_json::Value {
    json!({"_id": "p1", "user_name": "alice", "email": "alice@example.com", "role": "user"})
}

#[tokio::test]
async fn users_lists_principals() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/users");
            then.status(200).json_body(json!([alice()]));
        })
        .await;

    let users = client(&server).users().await.unwrap();

    mock.assert_async().await;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, PrincipalId::new("p1"));
}

#[tokio::test]
async fn user_by_id_puts_id_in_path() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/users/p1");
            then.status(200).json_body(alice());
        })
        .await;

    let user = client(&server)
        .user_by_id(&PrincipalId::new("p1"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(user.user_name, "alice");
}

#[tokio::test]
async fn check_token_forwards_bearer() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/users/token")
                .header("authorization", "Bearer tok-123");
            then.status(200).json_body(alice());
        })
        .await;

    let user = client(&server).check_token(&token()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(user.id, PrincipalId::new("p1"));
}

#[tokio::test]
async fn login_posts_credentials() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/auth/login")
                .json_body(json!({"username": "alice", "password": "hunter2"}));
            then.status(200).json_body(json!({
                "message": "Login successful",
                "token": "fresh-token",
                "user": alice()
            }));
        })
        .await;

    let session = client(&server)
        .login(&Credentials {
            username: "alice".to_string(),
            password: "hunter2".to_string(),
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(session.token.as_deref(), Some("fresh-token"));
    assert_eq!(session.user.map(|u| u.user_name), Some("alice".to_string()));
}

#[tokio::test]
async fn register_posts_new_principal() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/users").json_body(json!({
                "user_name": "bob",
                "email": "bob@example.com",
                "password": "pw"
            }));
            then.status(200)
                .json_body(json!({"message": "user created", "user": {"id": "p2", "user_name": "bob"}}));
        })
        .await;

    let session = client(&server)
        .register(&NewPrincipal {
            user_name: "bob".to_string(),
            email: "bob@example.com".to_string(),
            password: "pw".to_string(),
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(session.message, "user created");
    assert!(session.token.is_none());
}

#[tokio::test]
async fn update_self_sends_no_id() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/users")
                .header("authorization", "Bearer tok-123")
                .json_body(json!({"email": "new@example.com"}));
            then.status(200)
                .json_body(json!({"message": "user updated", "user": alice()}));
        })
        .await;

    let patch = PrincipalPatch {
        email: Some("new@example.com".to_string()),
        ..PrincipalPatch::default()
    };
    client(&server).update_self(&token(), &patch).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn admin_update_forwards_role_header() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/users/p1")
                .header("authorization", "Bearer tok-123")
                .header("role", "admin");
            then.status(200).json_body(alice());
        })
        .await;

    client(&server)
        .update_as_admin(
            &token(),
            &Roles::single("admin"),
            &PrincipalId::new("p1"),
            &PrincipalPatch::default(),
        )
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn delete_self_and_as_admin() {
    let server = MockServer::start_async().await;
    let own = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/users")
                .header("authorization", "Bearer tok-123");
            then.status(200).json_body(alice());
        })
        .await;
    let other = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/users/p9")
                .header("authorization", "Bearer tok-123")
                .header("role", "user,admin");
            then.status(200)
                .json_body(json!({"id": "p9", "user_name": "mallory"}));
        })
        .await;

    let c = client(&server);
    c.delete_self(&token()).await.unwrap();
    let removed = c
        .delete_as_admin(
            &token(),
            &Roles::from_iter(["user", "admin"]),
            &PrincipalId::new("p9"),
        )
        .await
        .unwrap();

    own.assert_async().await;
    other.assert_async().await;
    assert_eq!(removed.user_name, "mallory");
}

#[tokio::test]
async fn non_success_surfaces_status_text() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/users/ghost");
            then.status(404).json_body(json!({"message": "no such user"}));
        })
        .await;

    let err = client(&server)
        .user_by_id(&PrincipalId::new("ghost"))
        .await
        .unwrap_err();

    match err {
        Error::Upstream { status, ref reason } => {
            assert_eq!(status, 404);
            assert_eq!(reason, "Not Found");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(err.to_string(), "Not Found");
}

#[tokio::test]
async fn custom_status_text_is_kept() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 2048];
        let _ = socket.read(&mut buf).await.unwrap();
        socket
            .write_all(
                b"HTTP/1.1 404 No Such Cat Owner\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
            )
            .await
            .unwrap();
    });

    let config = GatewayConfig::new(Url::parse(&format!("http://{addr}")).unwrap());
    let err = HttpIdentityClient::new(&config)
        .unwrap()
        .user_by_id(&PrincipalId::new("p1"))
        .await
        .unwrap_err();

    match err {
        Error::Upstream { status, ref reason } => {
            assert_eq!(status, 404);
            assert_eq!(reason, "No Such Cat Owner");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn unexpected_payload_is_a_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/users");
            then.status(200).body("<html>oops</html>");
        })
        .await;

    let err = client(&server).users().await.unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test]
async fn unreachable_service_is_unavailable() {
    let config = GatewayConfig::new(Url::parse("http://127.0.0.1:1").unwrap());
    let err = HttpIdentityClient::new(&config)
        .unwrap()
        .users()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::IdentityUnavailable(_)));
}

#[tokio::test]
async fn base_path_is_preserved() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/users");
            then.status(200).json_body(json!([]));
        })
        .await;

    let config = GatewayConfig::new(Url::parse(&server.url("/api/v1/")).unwrap());
    let users = HttpIdentityClient::new(&config)
        .unwrap()
        .users()
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(users.is_empty());
}
