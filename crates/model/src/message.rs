//! Messages and the body used to create one.

use serde::{Deserialize, Serialize};

use crate::{Snowflake, Timestamp};

/// A message sent in a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: Snowflake,
    channel_id: Snowflake,
    #[serde(default)]
    content: String,
    timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    edited_timestamp: Option<Timestamp>,
    #[serde(default)]
    tts: bool,
    #[serde(default)]
    pinned: bool,
}

impl Message {
    /// Unique id of the message.
    pub fn id(&self) -> Snowflake {
        self.id
    }

    /// Id of the channel the message was sent in.
    pub fn channel_id(&self) -> Snowflake {
        self.channel_id
    }

    /// Text content. Empty for attachment-only messages.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// When the message was sent.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// When the message was last edited, if ever.
    pub fn edited_timestamp(&self) -> Option<Timestamp> {
        self.edited_timestamp
    }

    /// Whether this was a text-to-speech message.
    pub fn is_tts(&self) -> bool {
        self.tts
    }

    /// Whether the message is pinned.
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }
}

/// Request body for `POST /channels/{channel.id}/messages`.
///
/// Sent as JSON on its own, or as the `payload_json` part of a multipart form
/// when files are attached.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreateMessage {
    /// Text content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Client-side id used to confirm delivery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    /// Whether to send as text-to-speech.
    #[serde(default)]
    pub tts: bool,
}

impl CreateMessage {
    /// A plain text message.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }
}

exchange::describe_object!(Message, CreateMessage);
