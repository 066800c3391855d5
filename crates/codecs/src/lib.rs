//! Default body codecs for the exchange layer.
//!
//! Implements the [`exchange::WriterStrategy`] and [`exchange::ReaderStrategy`]
//! contracts for the three body formats the REST API uses: JSON documents,
//! `multipart/form-data` uploads, and empty bodies.
//!
//! ## Default ordering
//!
//! [`defaults`] registers, in order:
//!
//! | Direction | Strategies |
//! |-----------|------------|
//! | writers | [`MultipartWriter`], [`JsonWriter`], [`EmptyWriter`] |
//! | readers | [`JsonReader`], [`EmptyReader`] |
//!
//! The multipart writer precedes the JSON writer so uploads are never encoded
//! as plain JSON, and the empty strategies come last because they are the
//! fallback for absent values and content-less responses.

mod empty;
mod json;
mod mapper;
mod multipart;

use std::sync::Arc;

use exchange::{ExchangeStrategies, ExchangeStrategiesBuilder};

pub use empty::{EmptyReader, EmptyWriter};
pub use json::{JsonReader, JsonWriter};
pub use mapper::{JsonMapper, SerdeJsonMapper};
pub use multipart::{MultipartReader, MultipartWriter};

/// Returns a builder pre-loaded with the default strategies, so callers can
/// append their own after them.
///
/// To take priority over a default, register a strategy on an
/// [`ExchangeStrategies::empty_builder`] before the defaults instead.
pub fn defaults_builder(mapper: Arc<dyn JsonMapper>) -> ExchangeStrategiesBuilder {
    let mut builder = ExchangeStrategies::empty_builder();
    extend_with_defaults(&mut builder, mapper);
    builder
}

/// Appends the default strategies, in their default order, to `builder`.
pub fn extend_with_defaults(builder: &mut ExchangeStrategiesBuilder, mapper: Arc<dyn JsonMapper>) {
    builder
        .writer_strategy(MultipartWriter::new(Arc::clone(&mapper)))
        .writer_strategy(JsonWriter::new(Arc::clone(&mapper)))
        .writer_strategy(EmptyWriter)
        .reader_strategy(JsonReader::new(mapper))
        .reader_strategy(EmptyReader);
}

/// Returns the default registry, mapping structured values through `mapper`.
pub fn defaults(mapper: Arc<dyn JsonMapper>) -> ExchangeStrategies {
    defaults_builder(mapper).build()
}
