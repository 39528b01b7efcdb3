//! Common test utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crumb_session::{Manager, ManagerConfig};
use crumb_server::{Server, ServerConfig};

/// Cookie name used by every test server.
pub const COOKIE_NAME: &str = "sid";

/// A test server that runs in the background.
pub struct TestServer {
    /// The server's address.
    pub addr: SocketAddr,
    /// HTTP client for this server (no cookie store; tests pass cookies explicitly).
    pub client: Client,
    /// Handle to the session manager the server is using.
    pub manager: Manager,
    /// Triggers graceful shutdown.
    shutdown: Option<oneshot::Sender<()>>,
    /// Handle to the server task.
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Start a new test server with default session settings.
    pub async fn start() -> Result<Self> {
        Self::start_with(ManagerConfig::new(COOKIE_NAME)).await
    }

    /// Start a new test server with a custom manager configuration.
    pub async fn start_with(manager_config: ManagerConfig) -> Result<Self> {
        let addr = find_available_port().await?;
        let manager = Manager::with_config(manager_config);

        let config = ServerConfig::new()
            .with_bind_address(addr)
            .with_request_logging(false);
        let server = Server::new(manager.clone(), config);

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let _ = server
                .run_on(addr, async {
                    let _ = rx.await;
                })
                .await;
        });

        let client = Client::new();
        wait_for_server(&client, addr).await?;

        Ok(Self {
            addr,
            client,
            manager,
            shutdown: Some(tx),
            handle: Some(handle),
        })
    }

    /// Get the base URL for the server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// PUT a session field, optionally presenting a cookie.
    pub async fn put_field(
        &self,
        key: &str,
        value: &str,
        cookie: Option<&str>,
    ) -> Result<reqwest::Response> {
        let mut req = self
            .client
            .put(format!("{}/api/v1/session/{}", self.base_url(), key))
            .json(&serde_json::json!({ "value": value }));
        if let Some(cookie) = cookie {
            req = req.header(reqwest::header::COOKIE, cookie);
        }
        Ok(req.send().await?)
    }

    /// GET a session field, optionally presenting a cookie.
    pub async fn get_field(&self, key: &str, cookie: Option<&str>) -> Result<reqwest::Response> {
        let mut req = self
            .client
            .get(format!("{}/api/v1/session/{}", self.base_url(), key));
        if let Some(cookie) = cookie {
            req = req.header(reqwest::header::COOKIE, cookie);
        }
        Ok(req.send().await?)
    }

    /// Check if server is healthy.
    pub async fn health(&self) -> Result<bool> {
        let resp = self
            .client
            .get(format!("{}/health", self.base_url()))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Shut the server down and wait for it to finish.
    pub async fn stop(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            timeout(Duration::from_secs(5), handle).await??;
        }
        Ok(())
    }
}

/// The `name=value` pair from a response's `Set-Cookie` header.
pub fn cookie_pair(resp: &reqwest::Response) -> Option<String> {
    let header = resp.headers().get(reqwest::header::SET_COOKIE)?.to_str().ok()?;
    header.split(';').next().map(str::to_string)
}

/// Find an available port for the test server.
async fn find_available_port() -> Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}

/// Wait for the server to become ready.
async fn wait_for_server(client: &Client, addr: SocketAddr) -> Result<()> {
    let url = format!("http://{}/health", addr);

    let result = timeout(Duration::from_secs(5), async {
        loop {
            match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return,
                _ => tokio::time::sleep(Duration::from_millis(50)).await,
            }
        }
    })
    .await;

    match result {
        Ok(()) => Ok(()),
        Err(_) => anyhow::bail!("Timeout waiting for server to start"),
    }
}
