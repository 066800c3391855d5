//! Channels as one flat record.
//!
//! Every channel kind (guild text, voice, DM, category …) is the same
//! [`Channel`] struct. What a channel can do is described by its
//! [`Capabilities`], derived from its [`ChannelKind`]; kind-specific fields are
//! read through accessors that answer [`Availability::Unsupported`] for kinds
//! that lack the capability.

use serde::{Deserialize, Serialize};

use crate::{Message, MessageResolver, ResolveError, Snowflake, Timestamp};

// ---------------------------------------------------------------------------
// Kind and capabilities
// ---------------------------------------------------------------------------

/// The channel `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum ChannelKind {
    /// A text channel within a guild.
    GuildText,
    /// A direct message between two users.
    Dm,
    /// A voice channel within a guild.
    GuildVoice,
    /// A direct message between multiple users.
    GroupDm,
    /// A category grouping other guild channels.
    GuildCategory,
    /// An announcement channel within a guild.
    GuildNews,
    /// A kind this client does not know about yet.
    Unknown(u8),
}

impl From<u8> for ChannelKind {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::GuildText,
            1 => Self::Dm,
            2 => Self::GuildVoice,
            3 => Self::GroupDm,
            4 => Self::GuildCategory,
            5 => Self::GuildNews,
            other => Self::Unknown(other),
        }
    }
}

impl From<ChannelKind> for u8 {
    fn from(kind: ChannelKind) -> Self {
        match kind {
            ChannelKind::GuildText => 0,
            ChannelKind::Dm => 1,
            ChannelKind::GuildVoice => 2,
            ChannelKind::GroupDm => 3,
            ChannelKind::GuildCategory => 4,
            ChannelKind::GuildNews => 5,
            ChannelKind::Unknown(other) => other,
        }
    }
}

/// What a channel supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities {
    /// Messages can be sent to and read from the channel.
    pub supports_text: bool,
    /// Users can connect to the channel for voice.
    pub supports_voice: bool,
    /// The channel belongs to a guild.
    pub in_guild: bool,
}

impl ChannelKind {
    /// Returns the capability markers for this kind.
    ///
    /// Unknown kinds report no capabilities.
    pub fn capabilities(self) -> Capabilities {
        match self {
            ChannelKind::GuildText | ChannelKind::GuildNews => Capabilities {
                supports_text: true,
                supports_voice: false,
                in_guild: true,
            },
            ChannelKind::Dm | ChannelKind::GroupDm => Capabilities {
                supports_text: true,
                supports_voice: false,
                in_guild: false,
            },
            ChannelKind::GuildVoice => Capabilities {
                supports_text: false,
                supports_voice: true,
                in_guild: true,
            },
            ChannelKind::GuildCategory => Capabilities {
                supports_text: false,
                supports_voice: false,
                in_guild: true,
            },
            ChannelKind::Unknown(_) => Capabilities::default(),
        }
    }
}

/// Result of reading a kind-specific field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability<T> {
    /// The channel has the capability and the field was present.
    Available(T),
    /// The channel's kind lacks the capability this field belongs to.
    Unsupported,
    /// The channel has the capability but the API did not send the field.
    Missing,
}

impl<T> Availability<T> {
    /// Converts into an `Option`, dropping the reason for absence.
    pub fn ok(self) -> Option<T> {
        match self {
            Availability::Available(value) => Some(value),
            Availability::Unsupported | Availability::Missing => None,
        }
    }

    fn gated(supported: bool, value: Option<T>) -> Self {
        match (supported, value) {
            (false, _) => Availability::Unsupported,
            (true, Some(value)) => Availability::Available(value),
            (true, None) => Availability::Missing,
        }
    }
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// A channel of any kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    id: Snowflake,
    #[serde(rename = "type")]
    kind: ChannelKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    guild_id: Option<Snowflake>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    position: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_id: Option<Snowflake>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_message_id: Option<Snowflake>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_pin_timestamp: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bitrate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_limit: Option<u32>,
}

impl Channel {
    /// Creates a channel with only an id and a kind; every other field is unset.
    pub fn new(id: Snowflake, kind: ChannelKind) -> Self {
        Self {
            id,
            kind,
            guild_id: None,
            name: None,
            position: None,
            parent_id: None,
            topic: None,
            last_message_id: None,
            last_pin_timestamp: None,
            bitrate: None,
            user_limit: None,
        }
    }

    /// Unique id of the channel.
    pub fn id(&self) -> Snowflake {
        self.id
    }

    /// The channel's kind.
    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    /// Capability markers for the channel's kind.
    pub fn capabilities(&self) -> Capabilities {
        self.kind.capabilities()
    }

    /// The channel name. DMs have none.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The guild the channel belongs to.
    pub fn guild_id(&self) -> Availability<Snowflake> {
        Availability::gated(self.capabilities().in_guild, self.guild_id)
    }

    /// Sorting position within the guild's channel list.
    pub fn position(&self) -> Availability<i32> {
        Availability::gated(self.capabilities().in_guild, self.position)
    }

    /// The category this channel is nested under.
    pub fn parent_id(&self) -> Availability<Snowflake> {
        Availability::gated(self.capabilities().in_guild, self.parent_id)
    }

    /// The channel topic.
    pub fn topic(&self) -> Availability<&str> {
        Availability::gated(self.capabilities().supports_text, self.topic.as_deref())
    }

    /// Id of the most recent message sent to the channel.
    pub fn last_message_id(&self) -> Availability<Snowflake> {
        Availability::gated(self.capabilities().supports_text, self.last_message_id)
    }

    /// When the most recent message was pinned.
    pub fn last_pin_timestamp(&self) -> Availability<Timestamp> {
        Availability::gated(self.capabilities().supports_text, self.last_pin_timestamp)
    }

    /// Voice bitrate in bits per second.
    pub fn bitrate(&self) -> Availability<u32> {
        Availability::gated(self.capabilities().supports_voice, self.bitrate)
    }

    /// Maximum number of connected users; `0` means unlimited.
    pub fn user_limit(&self) -> Availability<u32> {
        Availability::gated(self.capabilities().supports_voice, self.user_limit)
    }

    /// Sets the most recent message id.
    pub fn with_last_message_id(mut self, id: Snowflake) -> Self {
        self.last_message_id = Some(id);
        self
    }

    /// Sets the voice settings.
    pub fn with_voice(mut self, bitrate: u32, user_limit: u32) -> Self {
        self.bitrate = Some(bitrate);
        self.user_limit = Some(user_limit);
        self
    }

    /// Fetches the most recent message through `resolver`.
    ///
    /// Resolves to `Ok(None)` when the channel has never had a message, and to
    /// [`ResolveError::Unsupported`] for channels that cannot hold messages.
    /// The returned future does nothing until polled; dropping it cancels the
    /// lookup.
    pub async fn last_message(
        &self,
        resolver: &dyn MessageResolver,
    ) -> Result<Option<Message>, ResolveError> {
        let message_id = match self.last_message_id() {
            Availability::Available(id) => id,
            Availability::Missing => return Ok(None),
            Availability::Unsupported => {
                return Err(ResolveError::Unsupported {
                    channel_id: self.id,
                    capability: "text",
                })
            }
        };
        resolver.message(self.id, message_id).await.map(Some)
    }
}

exchange::describe_object!(Channel);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_channel_exposes_voice_fields_only() {
        let channel: Channel = serde_json::from_str(
            r#"{"id":"155101607195836416","type":2,"guild_id":"41771983423143937",
                "name":"ROCKET CHEESE","position":5,"bitrate":64000,"user_limit":0}"#,
        )
        .unwrap();

        assert_eq!(channel.kind(), ChannelKind::GuildVoice);
        assert_eq!(channel.bitrate(), Availability::Available(64000));
        assert_eq!(channel.user_limit(), Availability::Available(0));
        assert_eq!(channel.last_message_id(), Availability::Unsupported);
        assert_eq!(channel.topic(), Availability::Unsupported);
        assert_eq!(
            channel.guild_id(),
            Availability::Available(Snowflake::new(41771983423143937))
        );
        assert!(channel.capabilities().supports_voice);
    }

    #[test]
    fn dm_channel_has_no_guild_fields() {
        let channel: Channel =
            serde_json::from_str(r#"{"id":"1","type":1,"last_message_id":"3"}"#).unwrap();

        assert_eq!(channel.guild_id(), Availability::Unsupported);
        assert_eq!(channel.last_message_id().ok(), Some(Snowflake::new(3)));
        assert_eq!(channel.last_pin_timestamp(), Availability::Missing);
        assert_eq!(channel.name(), None);
    }

    #[test]
    fn unknown_kind_round_trips() {
        let channel: Channel = serde_json::from_str(r#"{"id":"9","type":15}"#).unwrap();

        assert_eq!(channel.kind(), ChannelKind::Unknown(15));
        assert_eq!(channel.capabilities(), Capabilities::default());
        assert_eq!(
            serde_json::to_value(&channel).unwrap(),
            serde_json::json!({ "id": "9", "type": 15 })
        );
    }

    #[test]
    fn last_pin_timestamp_parses_rfc3339() {
        let channel: Channel = serde_json::from_str(
            r#"{"id":"1","type":0,"last_pin_timestamp":"2018-01-02T03:04:05+00:00"}"#,
        )
        .unwrap();

        let ts = channel.last_pin_timestamp().ok().unwrap();
        assert_eq!(ts.to_string(), "2018-01-02T03:04:05+00:00");
    }
}
