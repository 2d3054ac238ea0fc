//! Server startup utilities.

use quill_cache::CacheClients;
use quill_config::AppConfig;
use tracing::info;

/// Prints server startup information.
pub fn print_startup_info(config: &AppConfig) {
    let separator = "=".repeat(60);
    info!("{}", separator);
    info!("Application: {} v{}", config.app.name, config.app.version);
    info!("Environment: {}", config.app.environment);
    if config.redis.enabled {
        info!("Redis:       {} (pool size {})", config.redis.url, config.redis.pool_size);
    } else {
        info!("Redis:       disabled");
    }
    info!("Clients:     {}", CacheClients::handle_names().join(", "));
    info!("{}", separator);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_startup_info_does_not_panic() {
        let _ = tracing_subscriber::fmt::try_init();
        print_startup_info(&AppConfig::default());
    }

    #[test]
    fn test_print_startup_info_disabled_redis() {
        let _ = tracing_subscriber::fmt::try_init();
        let mut config = AppConfig::default();
        config.redis.enabled = false;
        print_startup_info(&config);
    }
}
