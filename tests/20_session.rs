mod common;

use anyhow::Result;
use chrono::Utc;
use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

use todo_api_rust::auth::{KeyPair, TokenAuthority, TokenLifetimes};

fn me_query() -> serde_json::Value {
    json!({ "kind": "query", "fields": [{ "name": "me" }] })
}

#[tokio::test]
async fn missing_header_is_anonymous_not_rejected() -> Result<()> {
    let server = common::TestServer::start().await?;

    let (status, body) = server.post_query(me_query(), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["me"], serde_json::Value::Null);
    assert_eq!(body["errors"][0]["message"], "Access Denied");
    assert_eq!(common::first_error_code(&body), Some("ACCESS_DENIED"));
    Ok(())
}

#[tokio::test]
async fn malformed_headers_rejected_before_resolvers() -> Result<()> {
    let server = common::TestServer::start().await?;

    for header in ["Bearer abc def", "Token abc", "Bearer", "bearer abc"] {
        let (status, body) = server.post_query(me_query(), Some(header)).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "header {header:?}");
        assert_eq!(body["code"], "MALFORMED_AUTH_HEADER", "header {header:?}");
        assert!(body.get("data").is_none());
    }
    Ok(())
}

#[tokio::test]
async fn invalid_token_rejected_with_401() -> Result<()> {
    let server = common::TestServer::start().await?;

    let (status, body) = server.post_query(me_query(), Some("Bearer not.a.token")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_TOKEN");
    assert_eq!(body["message"], "Failed to validate access token.");
    Ok(())
}

#[tokio::test]
async fn token_from_foreign_key_rejected() -> Result<()> {
    let server = common::TestServer::start().await?;

    let foreign = TokenAuthority::new(
        KeyPair::from_pem(common::OTHER_PRIVATE_PEM, common::OTHER_PUBLIC_PEM)?,
        TokenLifetimes::new(chrono::Duration::minutes(15), chrono::Duration::days(7))?,
    );
    let pair = foreign.issue_token_pair(Uuid::new_v4(), Utc::now())?;

    let (status, body) = server.field("query", "me", json!(null), Some(&pair.access_token)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_TOKEN");
    Ok(())
}

#[tokio::test]
async fn expired_token_rejected() -> Result<()> {
    let server = common::TestServer::start().await?;

    // Same keys as the server, issued far enough in the past to be expired now
    let authority = TokenAuthority::new(
        KeyPair::from_pem(common::PRIVATE_PEM, common::PUBLIC_PEM)?,
        TokenLifetimes::new(chrono::Duration::minutes(15), chrono::Duration::days(7))?,
    );
    let issued = Utc::now() - chrono::Duration::minutes(16);
    let pair = authority.issue_token_pair(Uuid::new_v4(), issued)?;

    let (status, body) = server.field("query", "me", json!(null), Some(&pair.access_token)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_TOKEN");
    Ok(())
}

#[tokio::test]
async fn refresh_token_not_accepted_as_bearer() -> Result<()> {
    let server = common::TestServer::start().await?;
    server.sign_up("test_name", "refresh@example.com", "secret123").await?;
    let body = server.sign_in("refresh@example.com", "secret123").await?;
    let refresh = body["data"]["signIn"]["refreshToken"].as_str().unwrap_or_default().to_string();

    let (status, body) = server.field("query", "me", json!(null), Some(&refresh)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_TOKEN");
    Ok(())
}

#[tokio::test]
async fn public_routes_also_reject_bad_headers() -> Result<()> {
    let server = common::TestServer::start().await?;

    let res = server
        .client
        .get(server.url("/api/v1/health-check"))
        .header("Authorization", "Token abc")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn denial_is_scoped_to_guarded_field() -> Result<()> {
    let server = common::TestServer::start().await?;

    // Anonymous batch: a public field succeeds next to a guarded one
    let (status, body) = server
        .post_query(
            json!({
                "kind": "mutation",
                "fields": [
                    { "name": "signUp", "args": { "input": { "name": "mixed", "email": "mixed@example.com", "password": "secret123" } } },
                    { "name": "createTodo", "args": { "input": { "text": "nope" } } }
                ]
            }),
            None,
        )
        .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["signUp"]["isCreated"], true);
    assert_eq!(body["data"]["createTodo"], serde_json::Value::Null);
    assert_eq!(body["errors"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["errors"][0]["path"], json!(["createTodo"]));
    assert_eq!(body["errors"][0]["message"], "Access Denied");
    Ok(())
}

#[tokio::test]
async fn malformed_header_rejects_public_sign_in() -> Result<()> {
    let server = common::TestServer::start().await?;
    server.sign_up("test_name", "public@example.com", "secret123").await?;

    let sign_in = json!({
        "kind": "mutation",
        "fields": [{ "name": "signIn", "args": { "email": "public@example.com", "password": "secret123" } }]
    });
    let (status, body) = server.post_query(sign_in.clone(), Some("Bearer abc def")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "MALFORMED_AUTH_HEADER");
    assert!(body.get("data").is_none());

    // Same request without the header is served
    let (status, body) = server.post_query(sign_in, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["signIn"]["accessToken"].is_string());
    Ok(())
}

#[tokio::test]
async fn blank_header_is_anonymous() -> Result<()> {
    let server = common::TestServer::start().await?;

    let (status, body) = server.post_query(me_query(), Some("")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["me"], serde_json::Value::Null);
    assert_eq!(common::first_error_code(&body), Some("ACCESS_DENIED"));
    Ok(())
}
