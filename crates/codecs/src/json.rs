//! JSON request and response bodies.

use std::sync::Arc;

use exchange::{
    unset_or_is, CodecError, ContentType, Decoded, Outbound, Payload, ReaderStrategy,
    TypeDescriptor, WriterStrategy,
};

use crate::JsonMapper;

/// Writes objects and collections as `application/json`.
///
/// Accepts any structured shape when the caller declared no content type or
/// declared `application/json`. It does not accept forms or absent values; those
/// belong to the multipart and empty writers.
#[derive(Debug, Clone)]
pub struct JsonWriter {
    mapper: Arc<dyn JsonMapper>,
}

impl JsonWriter {
    /// Creates a writer that encodes through `mapper`.
    pub fn new(mapper: Arc<dyn JsonMapper>) -> Self {
        Self { mapper }
    }
}

impl WriterStrategy for JsonWriter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn can_write(&self, ty: &TypeDescriptor, declared: Option<&ContentType>) -> bool {
        ty.is_structured() && unset_or_is(declared, ContentType::APPLICATION_JSON)
    }

    fn write(&self, value: &Outbound<'_>) -> Result<Payload, CodecError> {
        let type_name = value.descriptor().name();
        let structured = value
            .to_structured()
            .ok_or_else(|| CodecError::UnsupportedValue {
                strategy: self.name(),
                type_name: type_name.to_string(),
            })??;

        let body = self.mapper.to_bytes(&structured, type_name)?;
        Ok(Payload::new(body, Some(ContentType::json())))
    }
}

/// Reads `application/json` bodies into objects and collections.
///
/// A zero-length body reads as [`Decoded::Absent`] so that responses without
/// content never fail to parse.
#[derive(Debug, Clone)]
pub struct JsonReader {
    mapper: Arc<dyn JsonMapper>,
}

impl JsonReader {
    /// Creates a reader that decodes through `mapper`.
    pub fn new(mapper: Arc<dyn JsonMapper>) -> Self {
        Self { mapper }
    }
}

impl ReaderStrategy for JsonReader {
    fn name(&self) -> &'static str {
        "json"
    }

    fn can_read(&self, target: &TypeDescriptor, content_type: Option<&ContentType>) -> bool {
        target.is_structured() && unset_or_is(content_type, ContentType::APPLICATION_JSON)
    }

    fn read(&self, payload: &Payload, target: &TypeDescriptor) -> Result<Decoded, CodecError> {
        if payload.is_empty() {
            return Ok(Decoded::Absent);
        }
        let value = self.mapper.from_bytes(&payload.body, target.name())?;
        Ok(Decoded::Structured(value))
    }
}
