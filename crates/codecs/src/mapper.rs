//! The structured-text mapping used by the JSON and multipart strategies.
//!
//! Strategies never call `serde_json` directly for bytes; they go through a
//! [`JsonMapper`] so the mapping can be swapped (pretty output, a different
//! number policy, a recording mapper in tests) without touching selection.

use exchange::CodecError;

/// Converts structured values to and from bytes.
pub trait JsonMapper: Send + Sync + std::fmt::Debug {
    /// Encodes `value` as bytes.
    ///
    /// `type_name` is only used to label errors.
    fn to_bytes(&self, value: &serde_json::Value, type_name: &str) -> Result<Vec<u8>, CodecError>;

    /// Parses `bytes` into a structured value.
    fn from_bytes(&self, bytes: &[u8], type_name: &str) -> Result<serde_json::Value, CodecError>;
}

/// [`JsonMapper`] backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerdeJsonMapper {
    pretty: bool,
}

impl SerdeJsonMapper {
    /// Compact output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented output. Only useful for debugging request bodies.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl JsonMapper for SerdeJsonMapper {
    fn to_bytes(&self, value: &serde_json::Value, type_name: &str) -> Result<Vec<u8>, CodecError> {
        let result = if self.pretty {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        };
        result.map_err(|source| CodecError::Serialize {
            type_name: type_name.to_string(),
            source,
        })
    }

    fn from_bytes(&self, bytes: &[u8], type_name: &str) -> Result<serde_json::Value, CodecError> {
        serde_json::from_slice(bytes).map_err(|source| CodecError::Deserialize {
            type_name: type_name.to_string(),
            source,
        })
    }
}
