//! Typed cache client: text keys, JSON values.

use crate::connection::ConnectionFactory;
use crate::serializer::{JsonRedisSerializer, RedisSerializer, StringRedisSerializer};
use deadpool_redis::redis::AsyncCommands;
use quill_core::{QuillError, QuillResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Cache client that stores structured values.
///
/// Keys and hash fields pass through their text strategies, values and hash
/// values through their JSON strategies. The configuration is fixed at
/// construction; clones share the connection factory.
#[derive(Clone)]
pub struct CacheTemplate {
    factory: Arc<dyn ConnectionFactory>,
    key_serializer: StringRedisSerializer,
    value_serializer: JsonRedisSerializer,
    hash_key_serializer: StringRedisSerializer,
    hash_value_serializer: JsonRedisSerializer,
}

/// Assembles a [`CacheTemplate`] slot by slot.
///
/// Unset slots fall back to text keys and plain JSON values.
pub struct CacheTemplateBuilder {
    factory: Arc<dyn ConnectionFactory>,
    key_serializer: Option<StringRedisSerializer>,
    value_serializer: Option<JsonRedisSerializer>,
    hash_key_serializer: Option<StringRedisSerializer>,
    hash_value_serializer: Option<JsonRedisSerializer>,
}

impl CacheTemplateBuilder {
    #[must_use]
    pub fn key_serializer(mut self, serializer: StringRedisSerializer) -> Self {
        self.key_serializer = Some(serializer);
        self
    }

    #[must_use]
    pub fn value_serializer(mut self, serializer: JsonRedisSerializer) -> Self {
        self.value_serializer = Some(serializer);
        self
    }

    #[must_use]
    pub fn hash_key_serializer(mut self, serializer: StringRedisSerializer) -> Self {
        self.hash_key_serializer = Some(serializer);
        self
    }

    #[must_use]
    pub fn hash_value_serializer(mut self, serializer: JsonRedisSerializer) -> Self {
        self.hash_value_serializer = Some(serializer);
        self
    }

    #[must_use]
    pub fn build(self) -> CacheTemplate {
        CacheTemplate {
            factory: self.factory,
            key_serializer: self.key_serializer.unwrap_or_default(),
            value_serializer: self.value_serializer.unwrap_or_default(),
            hash_key_serializer: self.hash_key_serializer.unwrap_or_default(),
            hash_value_serializer: self.hash_value_serializer.unwrap_or_default(),
        }
    }
}

impl CacheTemplate {
    /// Start building a client over `factory`.
    #[must_use]
    pub fn builder(factory: Arc<dyn ConnectionFactory>) -> CacheTemplateBuilder {
        CacheTemplateBuilder {
            factory,
            key_serializer: None,
            value_serializer: None,
            hash_key_serializer: None,
            hash_value_serializer: None,
        }
    }

    #[must_use]
    pub fn connection_factory(&self) -> &Arc<dyn ConnectionFactory> {
        &self.factory
    }

    #[must_use]
    pub fn key_serializer(&self) -> &StringRedisSerializer {
        &self.key_serializer
    }

    #[must_use]
    pub fn value_serializer(&self) -> &JsonRedisSerializer {
        &self.value_serializer
    }

    #[must_use]
    pub fn hash_key_serializer(&self) -> &StringRedisSerializer {
        &self.hash_key_serializer
    }

    #[must_use]
    pub fn hash_value_serializer(&self) -> &JsonRedisSerializer {
        &self.hash_value_serializer
    }

    /// Store `value` under `key` with no expiry.
    pub async fn set<V: Serialize + Sync + ?Sized>(&self, key: &str, value: &V) -> QuillResult<()> {
        let raw_key = self.key_serializer.serialize(key);
        let raw_value = self.value_serializer.serialize(value)?;

        let mut conn = self.factory.connection().await?;
        conn.set::<_, _, ()>(raw_key, raw_value)
            .await
            .map_err(|e| QuillError::redis(format!("Failed to set key '{}'", key), e))?;

        debug!("Cached key '{}'", key);
        Ok(())
    }

    /// Store `value` under `key`, expiring after `ttl` (at least one second).
    pub async fn set_with_ttl<V: Serialize + Sync + ?Sized>(
        &self,
        key: &str,
        value: &V,
        ttl: Duration,
    ) -> QuillResult<()> {
        let raw_key = self.key_serializer.serialize(key);
        let raw_value = self.value_serializer.serialize(value)?;
        let ttl_secs = ttl.as_secs().max(1);

        let mut conn = self.factory.connection().await?;
        conn.set_ex::<_, _, ()>(raw_key, raw_value, ttl_secs)
            .await
            .map_err(|e| QuillError::redis(format!("Failed to set key '{}'", key), e))?;

        debug!("Cached key '{}' with TTL {}s", key, ttl_secs);
        Ok(())
    }

    /// Fetch and decode the value under `key`.
    ///
    /// Returns `None` if the key doesn't exist or has expired.
    pub async fn get<V: DeserializeOwned>(&self, key: &str) -> QuillResult<Option<V>> {
        let raw_key = self.key_serializer.serialize(key);

        let mut conn = self.factory.connection().await?;
        let raw: Option<Vec<u8>> = conn
            .get(raw_key)
            .await
            .map_err(|e| QuillError::redis(format!("Failed to get key '{}'", key), e))?;

        match raw {
            Some(bytes) => {
                debug!("Cache hit for key '{}'", key);
                self.value_serializer.deserialize(&bytes).map(Some)
            }
            None => {
                debug!("Cache miss for key '{}'", key);
                Ok(None)
            }
        }
    }

    /// Returns `true` if the key existed and was deleted.
    pub async fn delete(&self, key: &str) -> QuillResult<bool> {
        let raw_key = self.key_serializer.serialize(key);

        let mut conn = self.factory.connection().await?;
        let deleted: i64 = conn
            .del(raw_key)
            .await
            .map_err(|e| QuillError::redis(format!("Failed to delete key '{}'", key), e))?;

        debug!("Deleted key '{}': {}", key, deleted > 0);
        Ok(deleted > 0)
    }

    pub async fn has_key(&self, key: &str) -> QuillResult<bool> {
        let raw_key = self.key_serializer.serialize(key);

        let mut conn = self.factory.connection().await?;
        conn.exists(raw_key)
            .await
            .map_err(|e| QuillError::redis(format!("Failed to check key '{}'", key), e))
    }

    /// Set a new expiry on `key`. Returns `false` if the key does not exist.
    pub async fn expire(&self, key: &str, ttl: Duration) -> QuillResult<bool> {
        let raw_key = self.key_serializer.serialize(key);
        let ttl_secs = i64::try_from(ttl.as_secs().max(1)).unwrap_or(i64::MAX);

        let mut conn = self.factory.connection().await?;
        conn.expire(raw_key, ttl_secs)
            .await
            .map_err(|e| QuillError::redis(format!("Failed to expire key '{}'", key), e))
    }

    /// Remaining time to live; `None` for a missing key or one without expiry.
    pub async fn ttl(&self, key: &str) -> QuillResult<Option<Duration>> {
        let raw_key = self.key_serializer.serialize(key);

        let mut conn = self.factory.connection().await?;
        let secs: i64 = conn
            .ttl(raw_key)
            .await
            .map_err(|e| QuillError::redis(format!("Failed to read TTL of '{}'", key), e))?;

        // -2: no such key, -1: no expiry
        Ok(u64::try_from(secs).ok().map(Duration::from_secs))
    }

    /// Store `value` in hash `key` under `field`.
    pub async fn hash_put<V: Serialize + Sync + ?Sized>(
        &self,
        key: &str,
        field: &str,
        value: &V,
    ) -> QuillResult<()> {
        let raw_key = self.key_serializer.serialize(key);
        let raw_field = self.hash_key_serializer.serialize(field);
        let raw_value = self.hash_value_serializer.serialize(value)?;

        let mut conn = self.factory.connection().await?;
        conn.hset::<_, _, _, ()>(raw_key, raw_field, raw_value)
            .await
            .map_err(|e| {
                QuillError::redis(format!("Failed to set field '{}' of '{}'", field, key), e)
            })?;

        debug!("Cached field '{}' of hash '{}'", field, key);
        Ok(())
    }

    pub async fn hash_get<V: DeserializeOwned>(&self, key: &str, field: &str) -> QuillResult<Option<V>> {
        let raw_key = self.key_serializer.serialize(key);
        let raw_field = self.hash_key_serializer.serialize(field);

        let mut conn = self.factory.connection().await?;
        let raw: Option<Vec<u8>> = conn.hget(raw_key, raw_field).await.map_err(|e| {
            QuillError::redis(format!("Failed to get field '{}' of '{}'", field, key), e)
        })?;

        raw.map(|bytes| self.hash_value_serializer.deserialize(&bytes))
            .transpose()
    }

    /// Every field of hash `key`, decoded. Empty for a missing key.
    pub async fn hash_entries<V: DeserializeOwned>(&self, key: &str) -> QuillResult<HashMap<String, V>> {
        let raw_key = self.key_serializer.serialize(key);

        let mut conn = self.factory.connection().await?;
        let raw: HashMap<Vec<u8>, Vec<u8>> = conn
            .hgetall(raw_key)
            .await
            .map_err(|e| QuillError::redis(format!("Failed to read hash '{}'", key), e))?;

        raw.into_iter()
            .map(|(field, value)| -> QuillResult<(String, V)> {
                Ok((
                    self.hash_key_serializer.deserialize(&field)?,
                    self.hash_value_serializer.deserialize(&value)?,
                ))
            })
            .collect()
    }

    /// Returns `true` if the field existed and was removed.
    pub async fn hash_delete(&self, key: &str, field: &str) -> QuillResult<bool> {
        let raw_key = self.key_serializer.serialize(key);
        let raw_field = self.hash_key_serializer.serialize(field);

        let mut conn = self.factory.connection().await?;
        let removed: i64 = conn.hdel(raw_key, raw_field).await.map_err(|e| {
            QuillError::redis(format!("Failed to delete field '{}' of '{}'", field, key), e)
        })?;

        Ok(removed > 0)
    }
}

impl fmt::Debug for CacheTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheTemplate")
            .field("key", &self.key_serializer.kind())
            .field("value", &self.value_serializer.kind())
            .field("hash_key", &self.hash_key_serializer.kind())
            .field("hash_value", &self.hash_value_serializer.kind())
            .field("enabled", &self.factory.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::RedisConnectionFactory;
    use crate::serializer::{CodecModule, JsonCodec, SerializerKind};

    fn disabled_factory() -> Arc<dyn ConnectionFactory> {
        Arc::new(RedisConnectionFactory::disabled())
    }

    #[test]
    fn test_builder_defaults() {
        let template = CacheTemplate::builder(disabled_factory()).build();
        assert_eq!(template.key_serializer().kind(), SerializerKind::Text);
        assert_eq!(template.value_serializer().kind(), SerializerKind::Json { date_time: false });
        assert_eq!(template.hash_key_serializer().kind(), SerializerKind::Text);
        assert_eq!(
            template.hash_value_serializer().kind(),
            SerializerKind::Json { date_time: false }
        );
    }

    #[test]
    fn test_builder_assigns_slots() {
        let json = JsonRedisSerializer::new(JsonCodec::new().with_module(CodecModule::DateTime));
        let template = CacheTemplate::builder(disabled_factory())
            .value_serializer(json.clone())
            .hash_value_serializer(json)
            .build();

        assert_eq!(template.value_serializer().kind(), SerializerKind::Json { date_time: true });
        assert_eq!(
            template.hash_value_serializer().kind(),
            SerializerKind::Json { date_time: true }
        );
    }

    #[tokio::test]
    async fn test_disabled_cache_surfaces_errors() {
        let template = CacheTemplate::builder(disabled_factory()).build();

        let err = template.set("note:1", &"draft").await.unwrap_err();
        assert!(matches!(err, QuillError::Cache(_)));
        assert!(template.get::<String>("note:1").await.is_err());
        assert!(template.hash_entries::<String>("notes").await.is_err());
    }

    #[tokio::test]
    async fn test_unserializable_value_fails_before_connecting() {
        let template = CacheTemplate::builder(disabled_factory()).build();

        // Non-string map keys cannot be JSON encoded.
        let mut bad = HashMap::new();
        bad.insert(vec![1u8], 1u8);
        let err = template.set("bad", &bad).await.unwrap_err();
        assert!(matches!(err, QuillError::Serialization(_)));
    }

    #[test]
    fn test_debug_lists_serializers() {
        let template = CacheTemplate::builder(disabled_factory()).build();
        let debug = format!("{template:?}");
        assert!(debug.contains("Text"));
        assert!(debug.contains("Json"));
        assert!(debug.contains("enabled: false"));
    }
}
