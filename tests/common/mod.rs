#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use todo_api_rust::app::{router, AppState};
use todo_api_rust::auth::KeyPair;
use todo_api_rust::config::AppConfig;
use todo_api_rust::database::{Datastore, MemoryStore};

pub const PRIVATE_PEM: &[u8] = include_bytes!("../fixtures/keys/private_key.pem");
pub const PUBLIC_PEM: &[u8] = include_bytes!("../fixtures/keys/public_key.pem");
pub const OTHER_PRIVATE_PEM: &[u8] = include_bytes!("../fixtures/keys/other_private_key.pem");
pub const OTHER_PUBLIC_PEM: &[u8] = include_bytes!("../fixtures/keys/other_public_key.pem");

pub const SERVER_NAME: &str = "todo-service-test";

/// Router served in-process on a free port, backed by a fresh in-memory store
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let mut config = AppConfig::development();
        config.server.server_name = SERVER_NAME.to_string();
        config.api.enable_request_logging = false;

        let keys = KeyPair::from_pem(PRIVATE_PEM, PUBLIC_PEM).context("fixture keys")?;
        let state = AppState::new(config, keys, Datastore::from_backend(MemoryStore::new())).context("app state")?;

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router(state)).await {
                tracing::error!("test server stopped: {}", e);
            }
        });

        let server = Self {
            port,
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST a query body, optionally with a raw `Authorization` header value
    pub async fn post_query(&self, body: Value, authorization: Option<&str>) -> Result<(StatusCode, Value)> {
        let mut req = self.client.post(self.url("/api/v1/query")).json(&body);
        if let Some(value) = authorization {
            req = req.header("Authorization", value);
        }
        let res = req.send().await?;
        let status = res.status();
        let body = res.json::<Value>().await?;
        Ok((status, body))
    }

    /// Run a single field as `kind`, authenticated with `token` when given
    pub async fn field(&self, kind: &str, name: &str, args: Value, token: Option<&str>) -> Result<(StatusCode, Value)> {
        let header = token.map(|t| format!("Bearer {}", t));
        self.post_query(
            json!({ "kind": kind, "fields": [{ "name": name, "args": args }] }),
            header.as_deref(),
        )
        .await
    }

    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<Value> {
        let (_, body) = self
            .field(
                "mutation",
                "signUp",
                json!({ "input": { "name": name, "email": email, "password": password } }),
                None,
            )
            .await?;
        Ok(body)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Value> {
        let (_, body) = self
            .field("mutation", "signIn", json!({ "email": email, "password": password }), None)
            .await?;
        Ok(body)
    }

    /// Register a fresh user and return its access token
    pub async fn user_token(&self, email: &str) -> Result<String> {
        self.sign_up("test_user", email, "secret123").await?;
        let body = self.sign_in(email, "secret123").await?;
        body["data"]["signIn"]["accessToken"]
            .as_str()
            .map(str::to_string)
            .with_context(|| format!("sign-in returned no token: {}", body))
    }
}

/// First field error code in a query response
pub fn first_error_code(body: &Value) -> Option<&str> {
    body["errors"][0]["code"].as_str()
}
