//! Common test infrastructure for Redis integration tests.

use quill_cache::{build_connection_factory, CacheClientProvisioner, CacheClients, ConnectionFactory};
use quill_config::RedisConfig;
use std::sync::Arc;
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::redis::{Redis, REDIS_PORT};

/// Test Redis container wrapper.
///
/// Keeps the container alive for as long as the clients are in use.
pub struct TestRedis {
    _container: ContainerAsync<Redis>,
    factory: Arc<dyn ConnectionFactory>,
}

impl TestRedis {
    /// Starts a fresh Redis container and builds a factory against it.
    pub async fn new() -> Self {
        let container = Redis::default()
            .start()
            .await
            .expect("Failed to start Redis container");

        let port = container
            .get_host_port_ipv4(REDIS_PORT)
            .await
            .expect("Failed to get Redis port");

        let config = RedisConfig {
            url: format!("redis://127.0.0.1:{}", port),
            pool_size: 4,
            ..RedisConfig::default()
        };

        let factory: Arc<dyn ConnectionFactory> =
            Arc::new(build_connection_factory(&config).expect("Failed to build factory"));
        factory.ping().await.expect("Redis did not answer PING");

        Self {
            _container: container,
            factory,
        }
    }

    pub fn factory(&self) -> Arc<dyn ConnectionFactory> {
        Arc::clone(&self.factory)
    }

    pub fn clients(&self) -> CacheClients {
        CacheClientProvisioner::provision(self.factory())
    }
}
