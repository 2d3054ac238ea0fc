//! Dependency injection module using Shaku.
//!
//! The module owns the Redis connection factory. It is built once by the
//! startup routine and passed around explicitly; cache clients are derived
//! from the factory it resolves.

use quill_cache::{
    build_connection_factory, CacheClientProvisioner, CacheClients, ConnectionFactory,
    RedisConnectionFactory, RedisConnectionFactoryParameters,
};
use quill_config::RedisConfig;
use quill_core::QuillResult;
use shaku::{module, HasComponent};
use std::sync::Arc;

module! {
    pub CacheModule {
        components = [
            RedisConnectionFactory,
        ],
        providers = [],
    }
}

/// Builds the cache module for the given Redis settings.
///
/// No connection is opened here.
pub fn build_cache_module(redis_config: &RedisConfig) -> QuillResult<Arc<CacheModule>> {
    let factory = build_connection_factory(redis_config)?;

    let module = CacheModule::builder()
        .with_component_parameters::<RedisConnectionFactory>(RedisConnectionFactoryParameters {
            pool: factory.pool().cloned(),
        })
        .build();

    Ok(Arc::new(module))
}

/// Trait for resolving cache components from a module.
pub trait CacheResolver {
    /// Resolves the shared connection factory.
    fn connection_factory(&self) -> Arc<dyn ConnectionFactory>;

    /// Provisions `cacheClient` and `rawTextCacheClient` over the module's factory.
    fn cache_clients(&self) -> CacheClients {
        CacheClientProvisioner::provision(self.connection_factory())
    }
}

impl CacheResolver for CacheModule {
    fn connection_factory(&self) -> Arc<dyn ConnectionFactory> {
        self.resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_module_resolves_singleton_factory() {
        let module = build_cache_module(&RedisConfig::default()).unwrap();

        let first = module.connection_factory();
        let second = module.connection_factory();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.is_enabled());
    }

    #[test]
    fn test_disabled_redis_builds_disabled_factory() {
        let config = RedisConfig {
            enabled: false,
            ..RedisConfig::default()
        };
        let module = build_cache_module(&config).unwrap();
        assert!(!module.connection_factory().is_enabled());
    }

    #[test]
    fn test_cache_clients_share_module_factory() {
        let module = build_cache_module(&RedisConfig::default()).unwrap();
        let clients = module.cache_clients();

        assert!(clients.shares_connection_factory());
        assert!(Arc::ptr_eq(
            clients.cache_client().connection_factory(),
            &module.connection_factory()
        ));
    }

    #[test]
    fn test_has_component_trait_bounds() {
        fn _assert_has_factory<T: HasComponent<dyn ConnectionFactory>>() {}
        _assert_has_factory::<CacheModule>();
    }
}
