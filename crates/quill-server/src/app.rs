//! Application builder.

use crate::di::{build_cache_module, CacheModule, CacheResolver};
use quill_cache::CacheClients;
use quill_config::AppConfig;
use quill_core::QuillResult;
use std::sync::Arc;
use tracing::{info, warn};

/// Application builder for constructing the server.
pub struct AppBuilder {
    config: Option<AppConfig>,
}

impl AppBuilder {
    /// Creates a new application builder.
    pub fn new() -> Self {
        Self { config: None }
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Wires the DI module and provisions the cache clients.
    pub fn build(self) -> QuillResult<Application> {
        let config = self.config.unwrap_or_default();
        let module = build_cache_module(&config.redis)?;
        let clients = module.cache_clients();

        info!(handles = ?CacheClients::handle_names(), "Cache clients provisioned");

        Ok(Application {
            config,
            module,
            clients,
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A wired application: configuration, DI module and cache clients.
pub struct Application {
    config: AppConfig,
    module: Arc<CacheModule>,
    clients: CacheClients,
}

impl Application {
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn module(&self) -> &Arc<CacheModule> {
        &self.module
    }

    pub fn clients(&self) -> &CacheClients {
        &self.clients
    }

    /// Pings Redis through the shared factory.
    ///
    /// A disabled cache is skipped with a warning.
    pub async fn verify_cache(&self) -> QuillResult<()> {
        let factory = self.module.connection_factory();
        if !factory.is_enabled() {
            warn!("Redis is disabled; skipping connectivity check");
            return Ok(());
        }

        factory.ping().await?;
        info!(url = %self.config.redis.url, "Redis connection verified");
        Ok(())
    }
}
