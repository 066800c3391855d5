//! Error types for strategy selection and body conversion.
//!
//! [`ExchangeError`] is what callers of the registry see. It distinguishes a
//! configuration problem (no strategy is registered for the requested type and
//! content type) from a data problem ([`CodecError`]: a strategy accepted the
//! value but could not actually convert it).
//!
//! Neither kind is retried here. Selection failures are deterministic, and a
//! malformed value stays malformed on the next attempt.

use thiserror::Error;

use crate::ContentType;

// ---------------------------------------------------------------------------
// Codec errors
// ---------------------------------------------------------------------------

/// Raised by a strategy's `write`/`read` when its predicate passed but the
/// actual value or bytes are malformed for that codec.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The value could not be serialised into the structured representation.
    #[error("Failed to serialise value of type '{type_name}'")]
    Serialize {
        /// Name of the type being written.
        type_name: String,
        #[source]
        source: serde_json::Error,
    },

    /// The bytes could not be deserialised into the requested type.
    #[error("Failed to deserialise body into type '{type_name}'")]
    Deserialize {
        /// Name of the requested target type.
        type_name: String,
        #[source]
        source: serde_json::Error,
    },

    /// A multipart body could not be produced or parsed.
    ///
    /// Produced by: empty forms, part names containing delimiter characters,
    /// missing `boundary` parameter, truncated bodies, malformed part headers.
    #[error("Malformed multipart body: {reason}")]
    Multipart {
        /// Description of what is wrong with the body.
        reason: String,
    },

    /// The strategy was handed a value variant it does not know how to encode.
    ///
    /// Only possible when a custom strategy's predicate claims a shape that
    /// does not carry the content the strategy expects.
    #[error("Strategy '{strategy}' cannot handle a value of type '{type_name}'")]
    UnsupportedValue {
        /// Name of the strategy that rejected the value.
        strategy: &'static str,
        /// Name of the value's type.
        type_name: String,
    },
}

impl CodecError {
    /// Convenience constructor for [`CodecError::Multipart`].
    pub fn multipart(reason: impl Into<String>) -> Self {
        Self::Multipart {
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Exchange errors
// ---------------------------------------------------------------------------

/// Errors returned by [`crate::ExchangeStrategies`] lookups and conversions.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// No registered writer accepted the value type and declared content type.
    ///
    /// Raised before any encoding and before any transport work begins.
    #[error("No writer strategy for type '{type_name}' with content type {}", display_content_type(.content_type))]
    NoWriterFound {
        /// Name of the value type that was offered.
        type_name: String,
        /// Explicit content type requested by the caller, if any.
        content_type: Option<ContentType>,
    },

    /// No registered reader accepted the target type and response content type.
    #[error("No reader strategy for type '{type_name}' with content type {}", display_content_type(.content_type))]
    NoReaderFound {
        /// Name of the requested target type.
        type_name: String,
        /// Content type reported by the response, if any.
        content_type: Option<ContentType>,
    },

    /// The selected strategy failed to convert the value or body.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl ExchangeError {
    /// Returns `true` for the two selection failures (as opposed to codec failures).
    pub fn is_unresolved(&self) -> bool {
        matches!(
            self,
            ExchangeError::NoWriterFound { .. } | ExchangeError::NoReaderFound { .. }
        )
    }
}

fn display_content_type(content_type: &Option<ContentType>) -> String {
    match content_type {
        Some(ct) => format!("'{ct}'"),
        None => "<unset>".to_string(),
    }
}
