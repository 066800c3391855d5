//! Body codec dispatch for the REST client.
//!
//! This crate defines how typed in-memory values are turned into raw HTTP
//! request bodies and how raw response bodies are turned back into typed
//! values. Concrete codecs implement the [`WriterStrategy`] and
//! [`ReaderStrategy`] contracts defined here; the [`ExchangeStrategies`]
//! registry picks one per request by trying strategies in registration order.
//!
//! ## Architectural Layer
//!
//! **Contracts + selection.** This crate has no I/O dependencies. Concrete
//! strategies live in the `codecs` crate and the transport lives in the `rest`
//! crate; both depend on this one, never the other way around.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`types`] | `ContentType`, `Payload`, `TypeDescriptor` and the `Describe` trait |
//! | [`value`] | Outgoing (`Outbound`) and decoded (`Decoded`) values, `MultipartForm` |
//! | [`strategy`] | The `WriterStrategy` / `ReaderStrategy` capability contracts |
//! | [`registry`] | `ExchangeStrategies` and its builder; first-match selection |
//! | [`errors`] | Selection and codec error types |

pub mod errors;
pub mod registry;
pub mod strategy;
pub mod types;
pub mod value;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{CodecError, ExchangeError};
pub use registry::{ExchangeStrategies, ExchangeStrategiesBuilder};
pub use strategy::{ReaderStrategy, WriterStrategy};
pub use types::{unset_or_is, ContentType, Describe, Payload, TypeDescriptor, TypeShape};
pub use value::{Decoded, MultipartForm, Outbound, Part, PartBody};
