//! Plain UTF-8 text strategy.

use super::{RedisSerializer, SerializerKind};
use quill_core::QuillResult;

/// Stores strings as their UTF-8 bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringRedisSerializer;

impl StringRedisSerializer {
    /// Creates the text strategy.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn serialize(&self, value: &str) -> Vec<u8> {
        value.as_bytes().to_vec()
    }

    /// Fails with `Serialization` when the stored bytes are not UTF-8.
    pub fn deserialize(&self, bytes: &[u8]) -> QuillResult<String> {
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

impl RedisSerializer for StringRedisSerializer {
    fn kind(&self) -> SerializerKind {
        SerializerKind::Text
    }
}
