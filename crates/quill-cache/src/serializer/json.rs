//! JSON value strategy.

use super::{RedisSerializer, SerializerKind};
use quill_core::QuillResult;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Extensions a [`JsonCodec`] can be configured with.
///
/// Modules are descriptive: they do not change the bytes `serde_json`
/// writes. The behaviour comes from the value types themselves, so a
/// missing module is only visible through [`JsonCodec::has_module`] and
/// [`SerializerKind`], never through the encoded output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecModule {
    /// Date and time values travel as ISO-8601 / RFC 3339 text. `chrono`'s
    /// serde support does the encoding.
    DateTime,
}

/// JSON encoder/decoder shared by the value strategies.
///
/// Encoding itself is `serde_json`; the codec records which extensions the
/// strategy was configured with so a client's wiring can be inspected.
/// Date/time values rely on `chrono`'s serde support, which writes RFC 3339
/// strings that decode back to an equal value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonCodec {
    modules: Vec<CodecModule>,
}

impl JsonCodec {
    /// A codec with no extensions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extension. Registering the same module twice is a no-op.
    #[must_use]
    pub fn with_module(mut self, module: CodecModule) -> Self {
        if !self.modules.contains(&module) {
            self.modules.push(module);
        }
        self
    }

    #[must_use]
    pub fn has_module(&self, module: CodecModule) -> bool {
        self.modules.contains(&module)
    }

    #[must_use]
    pub fn modules(&self) -> &[CodecModule] {
        &self.modules
    }

    pub fn to_vec<T: Serialize + ?Sized>(&self, value: &T) -> QuillResult<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    pub fn from_slice<T: DeserializeOwned>(&self, bytes: &[u8]) -> QuillResult<T> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Stores any serde value as JSON text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonRedisSerializer {
    codec: JsonCodec,
}

impl JsonRedisSerializer {
    #[must_use]
    pub fn new(codec: JsonCodec) -> Self {
        Self { codec }
    }

    #[must_use]
    pub fn codec(&self) -> &JsonCodec {
        &self.codec
    }

    pub fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> QuillResult<Vec<u8>> {
        self.codec.to_vec(value)
    }

    pub fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> QuillResult<T> {
        self.codec.from_slice(bytes)
    }
}

impl RedisSerializer for JsonRedisSerializer {
    fn kind(&self) -> SerializerKind {
        SerializerKind::Json {
            date_time: self.codec.has_module(CodecModule::DateTime),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
    use quill_core::QuillError;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct CachedNote {
        id: u64,
        title: String,
        tags: Vec<String>,
        created_at: DateTime<Utc>,
        remind_at: Option<NaiveDateTime>,
        due: NaiveDate,
    }

    fn date_time_serializer() -> JsonRedisSerializer {
        JsonRedisSerializer::new(JsonCodec::new().with_module(CodecModule::DateTime))
    }

    #[test]
    fn test_date_time_round_trip() {
        let serializer = date_time_serializer();
        let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();

        let bytes = serializer.serialize(&created_at).unwrap();
        let decoded: DateTime<Utc> = serializer.deserialize(&bytes).unwrap();

        assert_eq!(decoded, created_at);
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("2024-03-01T08:30:00"), "not textual: {text}");
    }

    #[test]
    fn test_subsecond_precision_survives() {
        let serializer = date_time_serializer();
        let precise = Utc.timestamp_nanos(1_709_281_800_123_456_789);

        let bytes = serializer.serialize(&precise).unwrap();
        let decoded: DateTime<Utc> = serializer.deserialize(&bytes).unwrap();
        assert_eq!(decoded, precise);
    }

    #[test]
    fn test_object_round_trip() {
        let serializer = date_time_serializer();
        let note = CachedNote {
            id: 42,
            title: "Ownership notes".to_string(),
            tags: vec!["rust".to_string(), "borrowck".to_string()],
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap(),
            remind_at: NaiveDate::from_ymd_opt(2024, 3, 2).and_then(|d| d.and_hms_opt(9, 0, 0)),
            due: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        };

        let bytes = serializer.serialize(&note).unwrap();
        let decoded: CachedNote = serializer.deserialize(&bytes).unwrap();
        assert_eq!(decoded, note);
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        let err = date_time_serializer()
            .deserialize::<CachedNote>(b"{not json")
            .unwrap_err();
        assert!(matches!(err, QuillError::Serialization(_)));
    }

    #[test]
    fn test_module_registration_is_idempotent() {
        let codec = JsonCodec::new()
            .with_module(CodecModule::DateTime)
            .with_module(CodecModule::DateTime);
        assert_eq!(codec.modules(), &[CodecModule::DateTime]);
    }

    #[test]
    fn test_kind_reports_date_time_module() {
        assert_eq!(
            date_time_serializer().kind(),
            SerializerKind::Json { date_time: true }
        );
        assert_eq!(
            JsonRedisSerializer::default().kind(),
            SerializerKind::Json { date_time: false }
        );
    }

    #[test]
    fn test_date_time_module_leaves_encoding_unchanged() {
        let when = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
        let with_module = date_time_serializer().serialize(&when).unwrap();
        let without_module = JsonRedisSerializer::default().serialize(&when).unwrap();

        assert_eq!(with_module, without_module);
        assert_ne!(
            date_time_serializer().kind(),
            JsonRedisSerializer::default().kind()
        );
    }
}
