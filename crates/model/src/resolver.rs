//! Explicit context for operations that need to reach the API.
//!
//! Records never hold a client. An operation that has to look something up
//! (e.g. [`crate::Channel::last_message`]) takes a [`MessageResolver`]
//! argument; the `rest` crate provides the HTTP implementation and tests can
//! supply an in-memory one.

use async_trait::async_trait;
use thiserror::Error;

use crate::{Message, Snowflake};

/// Errors from resolving a referenced entity.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The channel's kind does not support the requested operation.
    #[error("Channel {channel_id} does not support {capability}")]
    Unsupported {
        /// Channel the operation was attempted on.
        channel_id: Snowflake,
        /// Name of the missing capability (e.g. `"text"`).
        capability: &'static str,
    },

    /// The referenced message does not exist (or is not visible).
    #[error("Message {message_id} not found in channel {channel_id}")]
    NotFound {
        /// Channel that was searched.
        channel_id: Snowflake,
        /// Message that was requested.
        message_id: Snowflake,
    },

    /// The backing lookup failed.
    #[error("Resolution failed")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Looks up messages by id.
///
/// Each call produces exactly one result. Implementations must not start work
/// before the returned future is polled; dropping the future cancels the
/// lookup.
#[async_trait]
pub trait MessageResolver: Send + Sync {
    /// Fetches `message_id` from `channel_id`.
    async fn message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> Result<Message, ResolveError>;
}
