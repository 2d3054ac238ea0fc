//! Startup wiring of the application's cache clients.

use crate::connection::ConnectionFactory;
use crate::serializer::{CodecModule, JsonCodec, JsonRedisSerializer, StringRedisSerializer};
use crate::string_template::StringCacheTemplate;
use crate::template::CacheTemplate;
use std::sync::Arc;
use tracing::info;

/// Conventional name of the typed client.
pub const CACHE_CLIENT: &str = "cacheClient";

/// Conventional name of the text client.
pub const RAW_TEXT_CACHE_CLIENT: &str = "rawTextCacheClient";

/// Builds the cache clients handed to the rest of the application.
///
/// Construction does no I/O; a bad connection factory surfaces on the first
/// cache operation.
pub struct CacheClientProvisioner;

impl CacheClientProvisioner {
    /// Text keys, JSON values with date/time support, and the same pair for
    /// hash fields.
    #[must_use]
    pub fn typed_client(factory: &Arc<dyn ConnectionFactory>) -> CacheTemplate {
        let template = CacheTemplate::builder(Arc::clone(factory))
            .key_serializer(StringRedisSerializer::new())
            .value_serializer(Self::structured_encoder())
            .hash_key_serializer(StringRedisSerializer::new())
            .hash_value_serializer(Self::structured_encoder())
            .build();

        info!(client = CACHE_CLIENT, ?template, "Registered cache client");
        template
    }

    /// Text for keys and values alike.
    #[must_use]
    pub fn raw_text_client(factory: &Arc<dyn ConnectionFactory>) -> StringCacheTemplate {
        let template = StringCacheTemplate::new(Arc::clone(factory));

        info!(client = RAW_TEXT_CACHE_CLIENT, ?template, "Registered cache client");
        template
    }

    /// Build both clients over one shared factory.
    #[must_use]
    pub fn provision(factory: Arc<dyn ConnectionFactory>) -> CacheClients {
        CacheClients {
            cache_client: Self::typed_client(&factory),
            raw_text_cache_client: Self::raw_text_client(&factory),
        }
    }

    fn structured_encoder() -> JsonRedisSerializer {
        JsonRedisSerializer::new(JsonCodec::new().with_module(CodecModule::DateTime))
    }
}

/// The provisioned cache clients.
#[derive(Debug, Clone)]
pub struct CacheClients {
    cache_client: CacheTemplate,
    raw_text_cache_client: StringCacheTemplate,
}

impl CacheClients {
    #[must_use]
    pub fn cache_client(&self) -> &CacheTemplate {
        &self.cache_client
    }

    #[must_use]
    pub fn raw_text_cache_client(&self) -> &StringCacheTemplate {
        &self.raw_text_cache_client
    }

    #[must_use]
    pub const fn handle_names() -> [&'static str; 2] {
        [CACHE_CLIENT, RAW_TEXT_CACHE_CLIENT]
    }

    /// True when both clients draw from the same factory instance.
    #[must_use]
    pub fn shares_connection_factory(&self) -> bool {
        Arc::ptr_eq(
            self.cache_client.connection_factory(),
            self.raw_text_cache_client.connection_factory(),
        )
    }
}
