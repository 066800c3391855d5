//! Voice regions.

use serde::{Deserialize, Serialize};

use crate::RegionId;

/// A voice server region, as listed by `GET /voice/regions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    id: RegionId,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sample_hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sample_port: Option<u16>,
    #[serde(default)]
    vip: bool,
    #[serde(default)]
    optimal: bool,
    #[serde(default)]
    deprecated: bool,
    #[serde(default)]
    custom: bool,
}

impl Region {
    /// Unique id of the region.
    pub fn id(&self) -> &RegionId {
        &self.id
    }

    /// Display name of the region.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// An example hostname for the region, if the API reported one.
    pub fn sample_hostname(&self) -> Option<&str> {
        self.sample_hostname.as_deref()
    }

    /// An example port for the region, if the API reported one.
    pub fn sample_port(&self) -> Option<u16> {
        self.sample_port
    }

    /// Whether this region is reserved for VIP servers.
    pub fn is_vip(&self) -> bool {
        self.vip
    }

    /// Whether this is the region closest to the current user's client.
    pub fn is_optimal(&self) -> bool {
        self.optimal
    }

    /// Whether this region is deprecated and should not be selected.
    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    /// Whether this is a custom region (used for events etc.).
    pub fn is_custom(&self) -> bool {
        self.custom
    }

    /// Whether the region can be offered to users: neither deprecated nor VIP-only.
    pub fn is_selectable(&self) -> bool {
        !self.deprecated && !self.vip
    }
}

exchange::describe_object!(Region);
