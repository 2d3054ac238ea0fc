//! Connection factory over a pooled Redis connection source.

use async_trait::async_trait;
use deadpool_redis::{Config, Connection, Pool, Runtime};
use quill_config::RedisConfig;
use quill_core::{Interface, QuillError, QuillResult};
use shaku::Component;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Source of Redis connections shared by every cache client.
///
/// Clients hold this behind an `Arc` and never manage its lifecycle.
#[async_trait]
pub trait ConnectionFactory: Interface {
    /// Check out a pooled connection.
    async fn connection(&self) -> QuillResult<Connection>;

    /// Returns false when Redis is switched off in configuration.
    fn is_enabled(&self) -> bool;

    /// Round-trips a `PING` to verify the server is reachable.
    async fn ping(&self) -> QuillResult<()> {
        let mut conn = self.connection().await?;
        let reply: String = deadpool_redis::redis::cmd("PING")
            .query_async(&mut *conn)
            .await?;
        debug!(reply = %reply, "Redis ping");
        Ok(())
    }
}

/// `deadpool-redis` backed connection factory.
#[derive(Component, Clone)]
#[shaku(interface = ConnectionFactory)]
pub struct RedisConnectionFactory {
    /// Redis connection pool; `None` when caching is disabled.
    pool: Option<Arc<Pool>>,
}

impl RedisConnectionFactory {
    /// Wrap an existing pool.
    #[must_use]
    pub fn new(pool: Arc<Pool>) -> Self {
        Self { pool: Some(pool) }
    }

    /// A factory that refuses to hand out connections.
    #[must_use]
    pub fn disabled() -> Self {
        Self { pool: None }
    }

    /// The underlying pool, if enabled.
    #[must_use]
    pub fn pool(&self) -> Option<&Arc<Pool>> {
        self.pool.as_ref()
    }
}

impl fmt::Debug for RedisConnectionFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("RedisConnectionFactory");
        match &self.pool {
            Some(pool) => s.field("max_size", &pool.status().max_size),
            None => s.field("enabled", &false),
        };
        s.finish()
    }
}

#[async_trait]
impl ConnectionFactory for RedisConnectionFactory {
    async fn connection(&self) -> QuillResult<Connection> {
        match &self.pool {
            Some(pool) => pool
                .get()
                .await
                .map_err(|e| QuillError::Cache(format!("Failed to get Redis connection: {}", e))),
            None => Err(QuillError::Cache("Cache is disabled".to_string())),
        }
    }

    fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }
}

/// Create a Redis connection pool.
///
/// The pool is lazy: no connection is opened until the first checkout.
pub fn create_pool(config: &RedisConfig) -> QuillResult<Pool> {
    info!(url = %config.url, pool_size = config.pool_size, "Creating Redis connection pool");

    Config::from_url(&config.url)
        .builder()
        .map_err(|e| QuillError::Configuration(format!("Invalid Redis config: {}", e)))?
        .max_size(config.pool_size)
        .wait_timeout(Some(config.connect_timeout()))
        .create_timeout(Some(config.connect_timeout()))
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| QuillError::Configuration(format!("Failed to create pool: {}", e)))
}

/// Build the connection factory described by `config`.
pub fn build_connection_factory(config: &RedisConfig) -> QuillResult<RedisConnectionFactory> {
    if !config.enabled {
        info!("Redis disabled; cache clients will reject operations");
        return Ok(RedisConnectionFactory::disabled());
    }

    Ok(RedisConnectionFactory::new(Arc::new(create_pool(config)?)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_factory_rejects_connections() {
        let factory = RedisConnectionFactory::disabled();
        assert!(!factory.is_enabled());

        match factory.connection().await {
            Err(QuillError::Cache(msg)) => assert!(msg.contains("disabled")),
            Err(other) => panic!("Expected Cache error, got {other:?}"),
            Ok(_) => panic!("Disabled factory handed out a connection"),
        }
        assert!(factory.ping().await.is_err());
    }

    #[tokio::test]
    async fn test_pool_creation_is_lazy() {
        let config = RedisConfig {
            url: "redis://127.0.0.1:1".to_string(),
            pool_size: 3,
            ..RedisConfig::default()
        };

        let factory = build_connection_factory(&config).unwrap();
        assert!(factory.is_enabled());
        assert_eq!(factory.pool().unwrap().status().max_size, 3);
    }

    #[test]
    fn test_build_disabled_from_config() {
        let config = RedisConfig {
            enabled: false,
            ..RedisConfig::default()
        };
        let factory = build_connection_factory(&config).unwrap();
        assert!(!factory.is_enabled());
    }

    #[test]
    fn test_invalid_url_is_configuration_error() {
        let config = RedisConfig {
            url: "not-a-redis-url".to_string(),
            ..RedisConfig::default()
        };
        let err = create_pool(&config).unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }
}
