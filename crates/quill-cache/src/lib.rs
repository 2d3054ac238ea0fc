//! # Quill Cache
//!
//! Redis cache clients for the Quill notes backend.
//!
//! Startup builds one [`RedisConnectionFactory`] and hands it to the
//! [`CacheClientProvisioner`], which wires serialization strategies onto two
//! client shells:
//!
//! ```text
//!                    ┌──────────────────────────┐
//!                    │  RedisConnectionFactory  │  (deadpool pool, shared)
//!                    └────────────┬─────────────┘
//!                                 │ Arc<dyn ConnectionFactory>
//!                 ┌───────────────┴────────────────┐
//!                 ▼                                ▼
//!   ┌───────────────────────────┐   ┌───────────────────────────┐
//!   │ cacheClient               │   │ rawTextCacheClient        │
//!   │ CacheTemplate             │   │ StringCacheTemplate       │
//!   │  key        : text        │   │  key        : text        │
//!   │  value      : json + time │   │  value      : text        │
//!   │  hash key   : text        │   │  hash key   : text        │
//!   │  hash value : json + time │   │  hash value : text        │
//!   └───────────────────────────┘   └───────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use quill_cache::{build_connection_factory, CacheClientProvisioner};
//! use std::sync::Arc;
//!
//! let factory = Arc::new(build_connection_factory(&config.redis)?);
//! let clients = CacheClientProvisioner::provision(factory);
//!
//! clients.cache_client().set_with_ttl("note:42", &note, Duration::from_secs(300)).await?;
//! let count = clients.raw_text_cache_client().increment("login:attempts:alice", 1).await?;
//! ```

pub mod connection;
pub mod provisioner;
pub mod serializer;
pub mod string_template;
pub mod template;

pub use connection::{build_connection_factory, create_pool, ConnectionFactory, RedisConnectionFactory, RedisConnectionFactoryParameters};
pub use provisioner::{CacheClientProvisioner, CacheClients, CACHE_CLIENT, RAW_TEXT_CACHE_CLIENT};
pub use serializer::{CodecModule, JsonCodec, JsonRedisSerializer, RedisSerializer, SerializerKind, StringRedisSerializer};
pub use string_template::StringCacheTemplate;
pub use template::{CacheTemplate, CacheTemplateBuilder};
