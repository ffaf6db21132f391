//! Type definitions for pimmgrd

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the default routing domain.
pub const DEFAULT_VRF_NAME: &str = "default";

/// DR priority bounds (command grammar).
pub const DR_PRIORITY_MIN: u32 = 1;
pub const DR_PRIORITY_MAX: u32 = u32::MAX;

/// Hello interval bounds in seconds (YANG uint8, 1..max).
pub const HELLO_INTERVAL_MIN: u8 = 1;
pub const HELLO_INTERVAL_MAX: u8 = u8::MAX;

/// Hello holdtime bounds in seconds (YANG uint16, 1..max).
pub const HELLO_HOLDTIME_MIN: u16 = 1;
pub const HELLO_HOLDTIME_MAX: u16 = u16::MAX;

/// Address family of a per-interface protocol container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

impl AddressFamily {
    /// YANG identity used as the address-family list key.
    pub fn yang_name(&self) -> &'static str {
        match self {
            AddressFamily::Ipv4 => "frr-routing:ipv4",
            AddressFamily::Ipv6 => "frr-routing:ipv6",
        }
    }

    /// Leading CLI keyword (`ip pim`, `ipv6 pim`).
    pub fn cli_keyword(&self) -> &'static str {
        match self {
            AddressFamily::Ipv4 => "ip",
            AddressFamily::Ipv6 => "ipv6",
        }
    }

    /// Group-membership discovery protocol that shares the interface with PIM.
    pub fn group_membership_protocol(&self) -> &'static str {
        match self {
            AddressFamily::Ipv4 => "IGMP",
            AddressFamily::Ipv6 => "MLD",
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AddressFamily::Ipv4 => "ipv4",
            AddressFamily::Ipv6 => "ipv6",
        })
    }
}

/// Interface identity: name plus routing domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InterfaceKey {
    /// Interface name
    pub name: String,
    /// VRF the interface is bound to
    pub vrf: String,
}

impl InterfaceKey {
    /// Create a new InterfaceKey
    pub fn new(name: impl Into<String>, vrf: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vrf: vrf.into(),
        }
    }

    /// Create an InterfaceKey in the default VRF
    pub fn in_default_vrf(name: impl Into<String>) -> Self {
        Self::new(name, DEFAULT_VRF_NAME)
    }

    pub fn is_default_vrf(&self) -> bool {
        self.vrf == DEFAULT_VRF_NAME
    }
}

impl fmt::Display for InterfaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default_vrf() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} vrf {}", self.name, self.vrf)
        }
    }
}

/// Dependent PIM interface parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PimParameter {
    DrPriority,
    HelloInterval,
    HelloHoldtime,
    ActiveActive,
}

impl PimParameter {
    /// YANG leaf name under the PIM address-family container.
    pub fn leaf_name(&self) -> &'static str {
        match self {
            PimParameter::DrPriority => "dr-priority",
            PimParameter::HelloInterval => "hello-interval",
            PimParameter::HelloHoldtime => "hello-holdtime",
            PimParameter::ActiveActive => "active-active",
        }
    }
}

/// A parameter together with the value to stage for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterValue {
    DrPriority(u32),
    HelloInterval(u8),
    HelloHoldtime(u16),
    ActiveActive(bool),
}

impl ParameterValue {
    pub fn parameter(&self) -> PimParameter {
        match self {
            ParameterValue::DrPriority(_) => PimParameter::DrPriority,
            ParameterValue::HelloInterval(_) => PimParameter::HelloInterval,
            ParameterValue::HelloHoldtime(_) => PimParameter::HelloHoldtime,
            ParameterValue::ActiveActive(_) => PimParameter::ActiveActive,
        }
    }

    pub fn leaf_value(&self) -> LeafValue {
        match *self {
            ParameterValue::DrPriority(v) => LeafValue::U32(v),
            ParameterValue::HelloInterval(v) => LeafValue::U8(v),
            ParameterValue::HelloHoldtime(v) => LeafValue::U16(v),
            ParameterValue::ActiveActive(v) => LeafValue::Bool(v),
        }
    }
}

/// Scalar value carried by a modify edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
}

impl fmt::Display for LeafValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeafValue::Bool(v) => write!(f, "{}", v),
            LeafValue::U8(v) => write!(f, "{}", v),
            LeafValue::U16(v) => write!(f, "{}", v),
            LeafValue::U32(v) => write!(f, "{}", v),
        }
    }
}

/// Per-interface, per-family PIM record.
///
/// Exists while `enabled` is true or any parameter is away from its
/// default; the datastore prunes it otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PimInterfaceConfig {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dr_priority: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hello_interval: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hello_holdtime: Option<u16>,
    pub active_active: bool,
}

impl PimInterfaceConfig {
    /// Record with only the enable flag set
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// True when every dependent parameter is at its protocol default.
    pub fn parameters_at_default(&self) -> bool {
        self.dr_priority.is_none()
            && self.hello_interval.is_none()
            && self.hello_holdtime.is_none()
            && !self.active_active
    }

    pub fn is_prunable(&self) -> bool {
        !self.enabled && self.parameters_at_default()
    }
}

/// Companion group-membership protocol record (IGMP / MLD).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupMembershipConfig {
    pub enabled: bool,
}

/// Typed relation between PIM and its companion protocol on one
/// interface and address family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceProtocolState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pim: Option<PimInterfaceConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_membership: Option<GroupMembershipConfig>,
}

impl InterfaceProtocolState {
    pub fn is_empty(&self) -> bool {
        self.pim.is_none() && self.group_membership.is_none()
    }

    pub fn pim_enabled(&self) -> bool {
        self.pim.as_ref().is_some_and(|pim| pim.enabled)
    }

    /// PIM runs on the interface either through its own enable leaf or
    /// because the enabled group-membership protocol brings it up.
    pub fn pim_active(&self) -> bool {
        self.pim_enabled() || self.group_membership.as_ref().is_some_and(|gm| gm.enabled)
    }
}

/// Companion protocol state as seen by the prober.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompanionState {
    /// No node exists.
    Absent,
    /// Node exists, enabled flag false or unset.
    PresentDisabled,
    /// Node exists, enabled flag true.
    PresentEnabled,
}

impl CompanionState {
    pub fn is_enabled(&self) -> bool {
        matches!(self, CompanionState::PresentEnabled)
    }
}
