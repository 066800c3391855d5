//! Capability contracts implemented by every body codec.
//!
//! A strategy is a predicate plus a conversion. The registry calls the
//! predicate first and only calls the conversion on the first strategy whose
//! predicate returned `true`.
//!
//! ## Rules
//!
//! - Predicates are pure and never panic for well-formed inputs; they answer
//!   `false` instead of failing when the strategy does not apply.
//! - Conversions run only after their predicate accepted the same
//!   (type, content type) pair. They fail with [`CodecError`] when the value or
//!   bytes turn out to be malformed.
//! - Neither may perform I/O. Strategies are shared across threads as
//!   `Arc<dyn …>` and must hold no mutable state.

use crate::{CodecError, ContentType, Decoded, Outbound, Payload, TypeDescriptor};

/// Converts an outgoing value into a request body.
pub trait WriterStrategy: Send + Sync + std::fmt::Debug {
    /// Short, stable name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Returns `true` if this strategy can encode values of type `ty`.
    ///
    /// `declared` is the content type explicitly requested by the caller;
    /// `None` means the caller has no preference.
    fn can_write(&self, ty: &TypeDescriptor, declared: Option<&ContentType>) -> bool;

    /// Encodes `value` into a body and the content type to send with it.
    fn write(&self, value: &Outbound<'_>) -> Result<Payload, CodecError>;
}

/// Converts a response body into a decoded value.
pub trait ReaderStrategy: Send + Sync + std::fmt::Debug {
    /// Short, stable name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Returns `true` if this strategy can decode bodies of `content_type`
    /// into values of type `target`.
    ///
    /// `content_type` is the response's content type; `None` means the
    /// response carried no content-type header.
    fn can_read(&self, target: &TypeDescriptor, content_type: Option<&ContentType>) -> bool;

    /// Decodes `payload` for the requested `target` type.
    fn read(&self, payload: &Payload, target: &TypeDescriptor) -> Result<Decoded, CodecError>;
}
