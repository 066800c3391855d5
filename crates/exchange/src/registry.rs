//! The strategy registry and its builder.
//!
//! [`ExchangeStrategies`] is an immutable, ordered pair of strategy lists
//! (writers, readers). It is built once at client start-up and shared by every
//! request for the lifetime of the process.
//!
//! ## Selection
//!
//! Both directions use the same rule: scan the list in registration order and
//! take the first strategy whose predicate accepts the (type, content type)
//! pair. There is no scoring and no specificity ranking, so registration order
//! is the priority. Specific strategies (multipart) go before generic ones
//! (JSON), and catch-all strategies (empty body) go last.
//!
//! When nothing matches, selection fails immediately with
//! [`ExchangeError::NoWriterFound`] / [`ExchangeError::NoReaderFound`] and no
//! strategy's conversion is invoked.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{
    ContentType, Decoded, Describe, ExchangeError, Outbound, Payload, ReaderStrategy,
    TypeDescriptor, WriterStrategy,
};

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Immutable ordered lists of writer and reader strategies.
///
/// Cloning is cheap (two reference-count increments) and clones share the same
/// lists. Nothing can be added to or removed from a registry once built.
#[derive(Debug, Clone)]
pub struct ExchangeStrategies {
    writers: Arc<[Arc<dyn WriterStrategy>]>,
    readers: Arc<[Arc<dyn ReaderStrategy>]>,
}

impl ExchangeStrategies {
    /// Returns a mutable builder with no strategies.
    pub fn empty_builder() -> ExchangeStrategiesBuilder {
        ExchangeStrategiesBuilder::default()
    }

    /// Writer strategies in resolution order.
    pub fn writers(&self) -> &[Arc<dyn WriterStrategy>] {
        &self.writers
    }

    /// Reader strategies in resolution order.
    pub fn readers(&self) -> &[Arc<dyn ReaderStrategy>] {
        &self.readers
    }

    /// Returns the first writer that accepts `ty` with the `declared` content type.
    pub fn resolve_writer(
        &self,
        ty: &TypeDescriptor,
        declared: Option<&ContentType>,
    ) -> Result<&dyn WriterStrategy, ExchangeError> {
        match self.writers.iter().find(|w| w.can_write(ty, declared)) {
            Some(writer) => {
                debug!(
                    strategy = writer.name(),
                    type_name = ty.name(),
                    content_type = declared.map(ContentType::as_str),
                    "Resolved writer strategy"
                );
                Ok(writer.as_ref())
            }
            None => {
                warn!(
                    type_name = ty.name(),
                    content_type = declared.map(ContentType::as_str),
                    registered = self.writers.len(),
                    "No writer strategy accepts the request body"
                );
                Err(ExchangeError::NoWriterFound {
                    type_name: ty.name().to_string(),
                    content_type: declared.cloned(),
                })
            }
        }
    }

    /// Returns the first reader that accepts `target` with the response `content_type`.
    pub fn resolve_reader(
        &self,
        target: &TypeDescriptor,
        content_type: Option<&ContentType>,
    ) -> Result<&dyn ReaderStrategy, ExchangeError> {
        match self.readers.iter().find(|r| r.can_read(target, content_type)) {
            Some(reader) => {
                debug!(
                    strategy = reader.name(),
                    type_name = target.name(),
                    content_type = content_type.map(ContentType::as_str),
                    "Resolved reader strategy"
                );
                Ok(reader.as_ref())
            }
            None => {
                warn!(
                    type_name = target.name(),
                    content_type = content_type.map(ContentType::as_str),
                    registered = self.readers.len(),
                    "No reader strategy accepts the response body"
                );
                Err(ExchangeError::NoReaderFound {
                    type_name: target.name().to_string(),
                    content_type: content_type.cloned(),
                })
            }
        }
    }

    /// Resolves a writer for `value` and encodes it.
    pub fn write(
        &self,
        value: &Outbound<'_>,
        declared: Option<&ContentType>,
    ) -> Result<Payload, ExchangeError> {
        let writer = self.resolve_writer(value.descriptor(), declared)?;
        Ok(writer.write(value)?)
    }

    /// Resolves a reader for `payload` and decodes it for `target`.
    ///
    /// A zero-length body is matched as if it carried no content type, so a
    /// `Content-Type` header on an empty response never blocks selection.
    pub fn read(&self, payload: &Payload, target: &TypeDescriptor) -> Result<Decoded, ExchangeError> {
        let content_type = if payload.is_empty() {
            None
        } else {
            payload.content_type()
        };
        let reader = self.resolve_reader(target, content_type)?;
        Ok(reader.read(payload, target)?)
    }

    /// Decodes `payload` straight into `T`. Absent bodies yield `None`.
    pub fn decode<T>(&self, payload: &Payload) -> Result<Option<T>, ExchangeError>
    where
        T: Describe + DeserializeOwned,
    {
        let decoded = self.read(payload, &T::describe())?;
        Ok(decoded.into_typed()?)
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Mutable accumulator of strategies.
///
/// Registration is append-only and never fails. [`build`](Self::build) copies
/// the current lists, so the builder can keep being mutated (or built again)
/// without affecting registries it already produced.
///
/// Intended for single-threaded use during client initialisation.
#[derive(Debug, Clone, Default)]
pub struct ExchangeStrategiesBuilder {
    writers: Vec<Arc<dyn WriterStrategy>>,
    readers: Vec<Arc<dyn ReaderStrategy>>,
}

impl ExchangeStrategiesBuilder {
    /// Appends a writer strategy for request body conversion.
    pub fn writer_strategy(&mut self, strategy: impl WriterStrategy + 'static) -> &mut Self {
        self.writers.push(Arc::new(strategy));
        self
    }

    /// Appends an already shared writer strategy.
    pub fn shared_writer_strategy(&mut self, strategy: Arc<dyn WriterStrategy>) -> &mut Self {
        self.writers.push(strategy);
        self
    }

    /// Appends a reader strategy for response body conversion.
    pub fn reader_strategy(&mut self, strategy: impl ReaderStrategy + 'static) -> &mut Self {
        self.readers.push(Arc::new(strategy));
        self
    }

    /// Appends an already shared reader strategy.
    pub fn shared_reader_strategy(&mut self, strategy: Arc<dyn ReaderStrategy>) -> &mut Self {
        self.readers.push(strategy);
        self
    }

    /// Snapshots the current lists into an immutable registry.
    pub fn build(&self) -> ExchangeStrategies {
        debug!(
            writers = self.writers.len(),
            readers = self.readers.len(),
            "Building exchange strategies"
        );
        ExchangeStrategies {
            writers: self.writers.iter().cloned().collect(),
            readers: self.readers.iter().cloned().collect(),
        }
    }
}
