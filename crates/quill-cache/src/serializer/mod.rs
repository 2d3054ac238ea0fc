//! Key and value serialization strategies.
//!
//! A cache client holds one strategy per slot (key, value, hash key,
//! hash value). Strategies are immutable once attached.

mod json;
mod string;

pub use json::{CodecModule, JsonCodec, JsonRedisSerializer};
pub use string::StringRedisSerializer;

/// What a strategy encodes to, for inspecting a client's wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializerKind {
    /// UTF-8 text, stored verbatim.
    Text,
    /// JSON text; `date_time` is true when the date/time module is registered.
    Json { date_time: bool },
}

impl SerializerKind {
    /// Returns true for plain text encoding.
    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::Text)
    }

    /// Returns true for JSON encoding, with or without date/time support.
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json { .. })
    }
}

/// Common surface of every serialization strategy.
pub trait RedisSerializer: Send + Sync {
    /// Describes the encoding this strategy produces.
    fn kind(&self) -> SerializerKind;
}
