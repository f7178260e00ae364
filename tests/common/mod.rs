//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use checkin_service::config::{DatabaseConfig, ServiceConfig};
use checkin_service::http::HttpServer;
use checkin_service::lifecycle::Shutdown;
use checkin_service::observability::Logger;
use checkin_service::store::{SqliteVisitStore, VisitRecorder};
use tokio::net::TcpListener;

/// A running service on an ephemeral port.
pub struct TestService {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub client: reqwest::Client,
}

impl TestService {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestService {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// In-memory SQLite store with the `visits` table in place.
pub async fn memory_store() -> SqliteVisitStore {
    let config = DatabaseConfig {
        conn: "sqlite::memory:".into(),
        max_connections: 1,
        create_schema: true,
    };
    let store = SqliteVisitStore::connect(&config).await.unwrap();
    store.ensure_schema().await.unwrap();
    store
}

/// Start the service with the given persistence capability.
pub async fn start_service(visits: Arc<dyn VisitRecorder>) -> TestService {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let mut config = ServiceConfig::default();
    config.listener.port = addr.port();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, Logger::new("integration"), visits);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    // Wait for server to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();

    TestService {
        addr,
        shutdown,
        client,
    }
}
