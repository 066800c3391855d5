//! REST request dispatcher.
//!
//! Sends one HTTP request per call over `reqwest`, encoding request bodies and
//! decoding response bodies through an [`exchange::ExchangeStrategies`]
//! registry. Retries and rate limiting are left to the caller;
//! [`RestError::retry_policy`] says whether a failure is worth retrying.
//!
//! ## Architectural Layer
//!
//! Adapter. Depends on `exchange` for codec selection, `codecs` for the default
//! registry, and `model` for the records it sends and receives. Implements
//! [`model::MessageResolver`] over HTTP.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`client`] | `RestClient`, `PreparedRequest`, `Attachment` |
//! | [`config`] | `RestConfig` |
//! | [`errors`] | `RestError`, `RetryPolicy` |
//! | [`route`] | `Route` and endpoint helpers |

pub mod client;
pub mod config;
pub mod errors;
pub mod route;

pub use client::{Attachment, PreparedRequest, RestClient};
pub use config::{RestConfig, DEFAULT_BASE_URL};
pub use errors::{RestError, RetryPolicy};
pub use route::Route;
