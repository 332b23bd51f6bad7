//! Test helpers for integration tests
//!
//! Spawns the REST API and the WebSocket gateway on ephemeral ports over an
//! in-memory [`TestContext`], and wraps the HTTP/WebSocket clients.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use chat_api::{create_app, AppState};
use chat_cache::LocalBus;
use chat_common::{
    AppConfig, AppSettings, ChatConfig, CorsConfig, DatabaseConfig, Environment, IdentityConfig,
    JwtConfig, RateLimitConfig, RedisConfig, ServerConfig,
};
use chat_core::UserId;
use chat_gateway::GatewayState;
use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::fixtures::{test_jwt, TestContext, TEST_JWT_SECRET};

/// Configuration for servers under test; nothing in it is dialed
pub fn test_config() -> AppConfig {
    let server = |port| ServerConfig {
        host: "127.0.0.1".to_string(),
        port,
    };

    AppConfig {
        app: AppSettings {
            name: "chat-test".to_string(),
            env: Environment::Development,
        },
        api: server(0),
        gateway: server(0),
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
            min_connections: 0,
            run_migrations: false,
        },
        redis: RedisConfig {
            url: "redis://unused".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            token_expiry: 3600,
        },
        identity: IdentityConfig {
            base_url: "http://unused".to_string(),
            timeout_ms: 200,
        },
        chat: ChatConfig::default(),
        rate_limit: RateLimitConfig {
            requests_per_second: 1000,
            burst: 1000,
        },
        cors: CorsConfig {
            allowed_origins: Vec::new(),
        },
    }
}

async fn bind_ephemeral() -> Result<(TcpListener, SocketAddr)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    Ok((listener, addr))
}

// ============================================================================
// REST API
// ============================================================================

/// REST API server instance over an in-memory context
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server
    pub async fn start(test: &TestContext) -> Result<Self> {
        let state = AppState::new(test.ctx.clone(), test_jwt());
        let app = create_app(state, &test_config());

        let (listener, addr) = bind_ephemeral().await?;
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    /// Make a GET request with auth token
    pub async fn get_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    /// Make a POST request with auth token
    pub async fn post_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    /// Make a PATCH request with auth token
    pub async fn patch_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(self
            .client
            .patch(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    /// Make a PUT request with auth token and no body
    pub async fn put_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    /// Make a DELETE request with auth token
    pub async fn delete_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }
}

// ============================================================================
// WebSocket gateway
// ============================================================================

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Gateway instance wired to an in-process bus
pub struct GatewayServer {
    pub addr: SocketAddr,
    pub state: GatewayState,
    _handle: JoinHandle<()>,
}

impl GatewayServer {
    /// Start a gateway whose listener consumes `bus`
    pub async fn start(test: &TestContext, bus: &LocalBus) -> Result<Self> {
        let state = GatewayState::new(test.ctx.clone(), test_jwt());
        state.listener().start(bus.receiver());

        let app = chat_gateway::create_app(state.clone());
        let (listener, addr) = bind_ephemeral().await?;
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            state,
            _handle: handle,
        })
    }

    pub fn ws_url(&self, token: Option<&str>) -> String {
        match token {
            Some(token) => format!("ws://{}/ws?token={token}", self.addr),
            None => format!("ws://{}/ws", self.addr),
        }
    }

    /// Connect and wait until the session is registered
    pub async fn connect(&self, user_id: UserId, token: &str) -> Result<WsClient> {
        let (socket, _) = connect_async(self.ws_url(Some(token))).await?;

        let registered = tokio::time::timeout(Duration::from_secs(2), async {
            while !self.state.registry().contains(user_id) {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        if registered.is_err() {
            anyhow::bail!("session for user {user_id} was never registered");
        }

        Ok(socket)
    }

    /// Stop the listener and close every session
    pub async fn shutdown(&self) {
        self.state.shutdown().await;
    }
}

/// Next text frame parsed as JSON, skipping control frames
pub async fn next_json(socket: &mut WsClient) -> Result<serde_json::Value> {
    let frame = tokio::time::timeout(Duration::from_secs(2), async {
        while let Some(message) = socket.next().await {
            match message? {
                tokio_tungstenite::tungstenite::Message::Text(text) => {
                    return Ok(serde_json::from_str(&text)?);
                }
                tokio_tungstenite::tungstenite::Message::Close(_) => {
                    anyhow::bail!("socket closed");
                }
                _ => {}
            }
        }
        anyhow::bail!("socket ended")
    })
    .await;

    match frame {
        Ok(result) => result,
        Err(_) => anyhow::bail!("no frame within timeout"),
    }
}

/// Assert that no text frame arrives within `wait`
pub async fn assert_silent(socket: &mut WsClient, wait: Duration) {
    let received = tokio::time::timeout(wait, socket.next()).await;
    if let Ok(Some(Ok(tokio_tungstenite::tungstenite::Message::Text(text)))) = received {
        panic!("unexpected frame: {text}");
    }
}

// ============================================================================
// Assertions
// ============================================================================

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}

/// Assert an error response and return its `error.code`
pub async fn assert_error(response: Response, expected_status: StatusCode) -> Result<String> {
    let body: serde_json::Value = assert_json(response, expected_status).await?;
    body["error"]["code"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("missing error.code in {body}"))
}
