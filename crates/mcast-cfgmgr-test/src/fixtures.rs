//! Test fixtures for common cfgmgr patterns
//!
//! Provides reusable configuration trees for manager testing

use mcast_pimmgrd::{
    AddressFamily, CompanionState, ConfigTree, Datastore, InterfaceKey, PimInterfaceConfig,
    PimMgr,
};

/// Every state the prober can report.
pub const ALL_COMPANION_STATES: [CompanionState; 3] = [
    CompanionState::Absent,
    CompanionState::PresentDisabled,
    CompanionState::PresentEnabled,
];

/// `eth0` in the default VRF.
pub fn eth0() -> InterfaceKey {
    InterfaceKey::in_default_vrf("eth0")
}

/// Builder for configuration trees
#[derive(Debug, Clone, Default)]
pub struct TreeFixture {
    tree: ConfigTree,
}

impl TreeFixture {
    /// Create an empty fixture
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an interface with no protocol configuration
    pub fn interface(mut self, key: &InterfaceKey) -> Self {
        self.tree.add_interface(key);
        self
    }

    /// Add an interface description
    pub fn description(mut self, key: &InterfaceKey, description: &str) -> Self {
        self.tree.set_description(key, description);
        self
    }

    /// Put the companion protocol in the given state
    pub fn companion(mut self, key: &InterfaceKey, family: AddressFamily, state: CompanionState) -> Self {
        match state {
            CompanionState::Absent => {
                self.tree.add_interface(key);
            }
            CompanionState::PresentDisabled => self.tree.set_group_membership(key, family, false),
            CompanionState::PresentEnabled => self.tree.set_group_membership(key, family, true),
        }
        self
    }

    /// Install a PIM record
    pub fn pim(mut self, key: &InterfaceKey, family: AddressFamily, pim: PimInterfaceConfig) -> Self {
        self.tree
            .add_interface(key)
            .protocols
            .entry(family)
            .or_default()
            .pim = Some(pim);
        self
    }

    /// PIM enabled with hello settings
    pub fn pim_with_hello(
        self,
        key: &InterfaceKey,
        family: AddressFamily,
        interval: u8,
        holdtime: Option<u16>,
    ) -> Self {
        self.pim(
            key,
            family,
            PimInterfaceConfig {
                hello_interval: Some(interval),
                hello_holdtime: holdtime,
                ..PimInterfaceConfig::enabled()
            },
        )
    }

    /// Mark a VRF's vxlan termination device
    pub fn vxlan_term_device(mut self, vrf: &str, device: &str) -> Self {
        self.tree.set_vxlan_term_device(vrf, device);
        self
    }

    /// VRF without a PIM instance
    pub fn without_pim_instance(mut self, vrf: &str) -> Self {
        self.tree.set_pim_instance(vrf, false);
        self
    }

    pub fn build(self) -> ConfigTree {
        self.tree
    }

    /// Datastore seeded with the tree as candidate and running config
    pub fn datastore(self) -> Datastore {
        Datastore::from_tree(self.tree)
    }

    /// Manager seeded with the tree
    pub fn manager(self, families: &[AddressFamily]) -> PimMgr {
        PimMgr::with_datastore(families, self.datastore())
    }
}
