use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

use category_service::config::{AppConfig, StorageBackend};
use category_service::database::memory::MemoryDocumentStore;
use category_service::server::{app, AppState};

/// A router serving from its own in-memory store on a free local port
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Start the real router on a background task owned by the test runtime
    pub async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::development();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = port;
        config.database.backend = StorageBackend::Memory;
        config.database.url = None;
        config.api.max_request_size_bytes = 64 * 1024;

        let state = AppState::new(Arc::new(MemoryDocumentStore::new()), &config);
        let router = app(state, &config);
        let listener = tokio::net::TcpListener::bind(config.bind_addr())
            .await
            .with_context(|| format!("failed to bind {}", config.bind_addr()))?;

        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self {
            port,
            base_url,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}
