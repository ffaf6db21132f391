//! Northbound path constants for pimmgrd
//!
//! Edits are typed internally; these strings are what the transaction
//! engine and the logs see.

use crate::types::{AddressFamily, InterfaceKey};

/// Interface list in the interface module
pub const FRR_INTERFACE_LIST_XPATH: &str = "/frr-interface:lib/interface";

/// PIM per-interface subtree
pub const FRR_PIM_SUBTREE: &str = "frr-pim:pim";

/// Group-membership (IGMP/MLD) per-interface subtree
pub const FRR_GMP_SUBTREE: &str = "frr-gmp:gmp";

/// The current context node
pub const CURRENT_NODE: &str = ".";

/// Leaf names relative to their address-family container
pub mod leaves {
    /// PIM administrative enable
    pub const PIM_ENABLE: &str = "pim-enable";
}

/// Absolute path of an interface entry.
pub fn interface_xpath(key: &InterfaceKey) -> String {
    format!(
        "{}[name='{}'][vrf='{}']",
        FRR_INTERFACE_LIST_XPATH, key.name, key.vrf
    )
}

/// PIM address-family container, relative to the interface.
pub fn pim_af_xpath(family: AddressFamily) -> String {
    format!(
        "{}/address-family[address-family='{}']",
        FRR_PIM_SUBTREE,
        family.yang_name()
    )
}

/// Group-membership address-family container, relative to the interface.
pub fn gmp_af_xpath(family: AddressFamily) -> String {
    format!(
        "{}/address-family[address-family='{}']",
        FRR_GMP_SUBTREE,
        family.yang_name()
    )
}

/// Group-membership address-family container, relative to the PIM
/// address-family container.
pub fn gmp_af_xpath_from_pim(family: AddressFamily) -> String {
    format!("../../{}", gmp_af_xpath(family))
}

/// Absolute PIM address-family container of one interface; the context
/// every relative edit path is resolved against.
pub fn pim_context_xpath(key: &InterfaceKey, family: AddressFamily) -> String {
    format!("{}/{}", interface_xpath(key), pim_af_xpath(family))
}

/// Leaf path relative to the PIM address-family container.
pub fn pim_leaf_xpath(leaf: &str) -> String {
    format!("./{}", leaf)
}
