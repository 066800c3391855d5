//! Domain records exchanged with the REST API.
//!
//! Records are plain data: they deserialise from API responses, serialise into
//! request bodies, and implement [`exchange::Describe`] so the exchange layer
//! can pick a codec for them. They hold no client reference.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | `Snowflake`, `RegionId`, `Timestamp` |
//! | [`region`] | Voice regions |
//! | [`channel`] | Flat `Channel` record with kind-derived capabilities |
//! | [`message`] | `Message` and the `CreateMessage` request body |
//! | [`resolver`] | The `MessageResolver` context and its errors |

pub mod channel;
pub mod identifiers;
pub mod message;
pub mod region;
pub mod resolver;

pub use channel::{Availability, Capabilities, Channel, ChannelKind};
pub use identifiers::{RegionId, Snowflake, Timestamp};
pub use message::{CreateMessage, Message};
pub use region::Region;
pub use resolver::{MessageResolver, ResolveError};
