//! Text-only cache client.

use crate::connection::ConnectionFactory;
use crate::serializer::{RedisSerializer, StringRedisSerializer};
use deadpool_redis::redis::AsyncCommands;
use quill_core::{QuillError, QuillResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Cache client that treats keys, values and hash fields as plain text.
///
/// Used for verification codes, counters and other values that never need
/// structure. There is nothing to configure: every slot is text.
#[derive(Clone)]
pub struct StringCacheTemplate {
    factory: Arc<dyn ConnectionFactory>,
    serializer: StringRedisSerializer,
}

impl StringCacheTemplate {
    #[must_use]
    pub fn new(factory: Arc<dyn ConnectionFactory>) -> Self {
        Self {
            factory,
            serializer: StringRedisSerializer::new(),
        }
    }

    #[must_use]
    pub fn connection_factory(&self) -> &Arc<dyn ConnectionFactory> {
        &self.factory
    }

    #[must_use]
    pub fn key_serializer(&self) -> &StringRedisSerializer {
        &self.serializer
    }

    #[must_use]
    pub fn value_serializer(&self) -> &StringRedisSerializer {
        &self.serializer
    }

    #[must_use]
    pub fn hash_key_serializer(&self) -> &StringRedisSerializer {
        &self.serializer
    }

    #[must_use]
    pub fn hash_value_serializer(&self) -> &StringRedisSerializer {
        &self.serializer
    }

    pub async fn set(&self, key: &str, value: &str) -> QuillResult<()> {
        let mut conn = self.factory.connection().await?;
        conn.set::<_, _, ()>(self.serializer.serialize(key), self.serializer.serialize(value))
            .await
            .map_err(|e| QuillError::redis(format!("Failed to set key '{}'", key), e))?;

        debug!("Cached text key '{}'", key);
        Ok(())
    }

    pub async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> QuillResult<()> {
        let ttl_secs = ttl.as_secs().max(1);

        let mut conn = self.factory.connection().await?;
        conn.set_ex::<_, _, ()>(
            self.serializer.serialize(key),
            self.serializer.serialize(value),
            ttl_secs,
        )
        .await
        .map_err(|e| QuillError::redis(format!("Failed to set key '{}'", key), e))?;

        debug!("Cached text key '{}' with TTL {}s", key, ttl_secs);
        Ok(())
    }

    pub async fn get(&self, key: &str) -> QuillResult<Option<String>> {
        let mut conn = self.factory.connection().await?;
        let raw: Option<Vec<u8>> = conn
            .get(self.serializer.serialize(key))
            .await
            .map_err(|e| QuillError::redis(format!("Failed to get key '{}'", key), e))?;

        raw.map(|bytes| self.serializer.deserialize(&bytes)).transpose()
    }

    pub async fn delete(&self, key: &str) -> QuillResult<bool> {
        let mut conn = self.factory.connection().await?;
        let deleted: i64 = conn
            .del(self.serializer.serialize(key))
            .await
            .map_err(|e| QuillError::redis(format!("Failed to delete key '{}'", key), e))?;

        Ok(deleted > 0)
    }

    pub async fn has_key(&self, key: &str) -> QuillResult<bool> {
        let mut conn = self.factory.connection().await?;
        conn.exists(self.serializer.serialize(key))
            .await
            .map_err(|e| QuillError::redis(format!("Failed to check key '{}'", key), e))
    }

    pub async fn expire(&self, key: &str, ttl: Duration) -> QuillResult<bool> {
        let ttl_secs = i64::try_from(ttl.as_secs().max(1)).unwrap_or(i64::MAX);

        let mut conn = self.factory.connection().await?;
        conn.expire(self.serializer.serialize(key), ttl_secs)
            .await
            .map_err(|e| QuillError::redis(format!("Failed to expire key '{}'", key), e))
    }

    /// Atomically add `delta` to the integer under `key`, creating it at 0.
    pub async fn increment(&self, key: &str, delta: i64) -> QuillResult<i64> {
        let mut conn = self.factory.connection().await?;
        conn.incr(self.serializer.serialize(key), delta)
            .await
            .map_err(|e| QuillError::redis(format!("Failed to increment key '{}'", key), e))
    }

    pub async fn hash_put(&self, key: &str, field: &str, value: &str) -> QuillResult<()> {
        let mut conn = self.factory.connection().await?;
        conn.hset::<_, _, _, ()>(
            self.serializer.serialize(key),
            self.serializer.serialize(field),
            self.serializer.serialize(value),
        )
        .await
        .map_err(|e| QuillError::redis(format!("Failed to set field '{}' of '{}'", field, key), e))
    }

    pub async fn hash_get(&self, key: &str, field: &str) -> QuillResult<Option<String>> {
        let mut conn = self.factory.connection().await?;
        let raw: Option<Vec<u8>> = conn
            .hget(self.serializer.serialize(key), self.serializer.serialize(field))
            .await
            .map_err(|e| {
                QuillError::redis(format!("Failed to get field '{}' of '{}'", field, key), e)
            })?;

        raw.map(|bytes| self.serializer.deserialize(&bytes)).transpose()
    }

    pub async fn hash_entries(&self, key: &str) -> QuillResult<HashMap<String, String>> {
        let mut conn = self.factory.connection().await?;
        let raw: HashMap<Vec<u8>, Vec<u8>> = conn
            .hgetall(self.serializer.serialize(key))
            .await
            .map_err(|e| QuillError::redis(format!("Failed to read hash '{}'", key), e))?;

        raw.into_iter()
            .map(|(field, value)| -> QuillResult<(String, String)> {
                Ok((self.serializer.deserialize(&field)?, self.serializer.deserialize(&value)?))
            })
            .collect()
    }
}

impl fmt::Debug for StringCacheTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringCacheTemplate")
            .field("serializer", &self.serializer.kind())
            .field("enabled", &self.factory.is_enabled())
            .finish()
    }
}
