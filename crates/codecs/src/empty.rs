//! Bodies that carry nothing.
//!
//! Register these last: they are the catch-all for absent request values and
//! for responses without content (e.g. `204 No Content`).

use exchange::{
    CodecError, ContentType, Decoded, Outbound, Payload, ReaderStrategy, TypeDescriptor,
    WriterStrategy,
};

/// Writes absent values as a zero-length body without a content type.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyWriter;

impl WriterStrategy for EmptyWriter {
    fn name(&self) -> &'static str {
        "empty"
    }

    fn can_write(&self, ty: &TypeDescriptor, _declared: Option<&ContentType>) -> bool {
        ty.is_void()
    }

    fn write(&self, _value: &Outbound<'_>) -> Result<Payload, CodecError> {
        Ok(Payload::empty())
    }
}

/// Reads any body as [`Decoded::Absent`].
///
/// Claims void targets whatever the content type, and any target when the
/// response carried no content type. The registry matches zero-length bodies
/// as untyped, so every empty response lands here or in a reader that maps
/// empty bodies to absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyReader;

impl ReaderStrategy for EmptyReader {
    fn name(&self) -> &'static str {
        "empty"
    }

    fn can_read(&self, target: &TypeDescriptor, content_type: Option<&ContentType>) -> bool {
        target.is_void() || content_type.is_none()
    }

    fn read(&self, payload: &Payload, target: &TypeDescriptor) -> Result<Decoded, CodecError> {
        if !payload.is_empty() {
            tracing::trace!(
                type_name = target.name(),
                discarded = payload.body.len(),
                "Discarding response body"
            );
        }
        Ok(Decoded::Absent)
    }
}
