//! Staged configuration datastore
//!
//! The candidate tree collects edits; a successful `apply_all` validates
//! the whole batch and commits candidate to running in one step. A rejected
//! batch leaves both trees untouched.

use std::collections::BTreeMap;

use mcast_cfgmgr_common::{CfgMgrError, CfgMgrResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::edits::{Edit, EditBatch, EditOperation, EditPath};
use crate::types::{
    AddressFamily, GroupMembershipConfig, InterfaceKey, InterfaceProtocolState, LeafValue,
    PimParameter,
};

/// Read access to a configuration tree.
pub trait CandidateConfig {
    /// Returns the protocol state of one interface/family, if any node exists.
    fn protocol_state(
        &self,
        key: &InterfaceKey,
        family: AddressFamily,
    ) -> Option<&InterfaceProtocolState>;
}

/// Atomic batch application.
pub trait Transaction: CandidateConfig {
    /// Applies every edit of `batch` in order, all-or-nothing.
    fn apply_all(
        &mut self,
        key: &InterfaceKey,
        family: AddressFamily,
        batch: &EditBatch,
    ) -> CfgMgrResult<()>;
}

/// Per-interface configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub protocols: BTreeMap<AddressFamily, InterfaceProtocolState>,
    /// Created by a committed edit rather than seeded; pruned once empty
    #[serde(skip)]
    staged: bool,
}

impl InterfaceConfig {
    fn is_prunable(&self) -> bool {
        self.staged && self.description.is_none() && self.protocols.is_empty()
    }
}

/// Per-VRF configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VrfConfig {
    /// Whether a PIM instance runs in this VRF
    pub pim_instance: bool,
    /// Vxlan termination device PIM enables implicitly (e.g. `ipmr-lo`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vxlan_term_device: Option<String>,
    pub interfaces: BTreeMap<String, InterfaceConfig>,
    #[serde(skip)]
    staged: bool,
}

impl VrfConfig {
    fn is_prunable(&self) -> bool {
        self.staged
            && self.pim_instance
            && self.vxlan_term_device.is_none()
            && self.interfaces.is_empty()
    }
}

impl Default for VrfConfig {
    fn default() -> Self {
        Self {
            pim_instance: true,
            vxlan_term_device: None,
            interfaces: BTreeMap::new(),
            staged: false,
        }
    }
}

/// Whole configuration tree, keyed by VRF name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigTree {
    pub vrfs: BTreeMap<String, VrfConfig>,
}

impl ConfigTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interface(&self, key: &InterfaceKey) -> Option<&InterfaceConfig> {
        self.vrfs.get(&key.vrf)?.interfaces.get(&key.name)
    }

    /// Returns the interface entry, creating it (and its VRF) if needed.
    pub fn add_interface(&mut self, key: &InterfaceKey) -> &mut InterfaceConfig {
        self.vrfs
            .entry(key.vrf.clone())
            .or_default()
            .interfaces
            .entry(key.name.clone())
            .or_default()
    }

    /// Like `add_interface`, but entries created here are removed again by
    /// `prune` once nothing is left in them.
    fn stage_interface(&mut self, key: &InterfaceKey) -> &mut InterfaceConfig {
        self.vrfs
            .entry(key.vrf.clone())
            .or_insert_with(|| VrfConfig {
                staged: true,
                ..VrfConfig::default()
            })
            .interfaces
            .entry(key.name.clone())
            .or_insert_with(|| InterfaceConfig {
                staged: true,
                ..InterfaceConfig::default()
            })
    }

    pub fn set_description(&mut self, key: &InterfaceKey, description: impl Into<String>) {
        self.add_interface(key).description = Some(description.into());
    }

    /// Seeds the companion protocol container for an interface.
    pub fn set_group_membership(&mut self, key: &InterfaceKey, family: AddressFamily, enabled: bool) {
        self.add_interface(key)
            .protocols
            .entry(family)
            .or_default()
            .group_membership = Some(GroupMembershipConfig { enabled });
    }

    pub fn set_pim_instance(&mut self, vrf: &str, present: bool) {
        self.vrfs.entry(vrf.to_string()).or_default().pim_instance = present;
    }

    pub fn set_vxlan_term_device(&mut self, vrf: &str, device: impl Into<String>) {
        self.vrfs.entry(vrf.to_string()).or_default().vxlan_term_device = Some(device.into());
    }

    pub fn interface_count(&self) -> usize {
        self.vrfs.values().map(|vrf| vrf.interfaces.len()).sum()
    }

    fn protocol_state_mut(
        &mut self,
        key: &InterfaceKey,
        family: AddressFamily,
    ) -> Option<&mut InterfaceProtocolState> {
        self.vrfs
            .get_mut(&key.vrf)?
            .interfaces
            .get_mut(&key.name)?
            .protocols
            .get_mut(&family)
    }

    /// Applies one edit. Destroying a missing node is a no-op.
    fn apply_edit(
        &mut self,
        key: &InterfaceKey,
        family: AddressFamily,
        edit: &Edit,
    ) -> CfgMgrResult<()> {
        let xpath = edit.path.absolute_xpath(key, family);

        match edit.operation {
            EditOperation::Destroy => {
                if let Some(state) = self.protocol_state_mut(key, family) {
                    match edit.path {
                        EditPath::PimAddressFamily => state.pim = None,
                        EditPath::GroupMembershipAddressFamily => state.group_membership = None,
                        EditPath::PimEnable => {
                            if let Some(pim) = state.pim.as_mut() {
                                pim.enabled = false;
                            }
                        }
                        EditPath::PimParameter(param) => {
                            if let Some(pim) = state.pim.as_mut() {
                                match param {
                                    PimParameter::DrPriority => pim.dr_priority = None,
                                    PimParameter::HelloInterval => pim.hello_interval = None,
                                    PimParameter::HelloHoldtime => pim.hello_holdtime = None,
                                    PimParameter::ActiveActive => pim.active_active = false,
                                }
                            }
                        }
                    }
                } else {
                    debug!("destroy {} on {}: node absent, nothing to do", xpath, key);
                }
            }
            EditOperation::Modify => {
                let value = edit.value.ok_or_else(|| {
                    CfgMgrError::transaction_rejected(xpath.clone(), "modify without a value")
                })?;
                let state = self
                    .stage_interface(key)
                    .protocols
                    .entry(family)
                    .or_default();

                match (edit.path, value) {
                    (EditPath::PimEnable, LeafValue::Bool(v)) => {
                        state.pim.get_or_insert_with(Default::default).enabled = v;
                    }
                    (EditPath::PimParameter(PimParameter::DrPriority), LeafValue::U32(v)) => {
                        state.pim.get_or_insert_with(Default::default).dr_priority = Some(v);
                    }
                    (EditPath::PimParameter(PimParameter::HelloInterval), LeafValue::U8(v)) => {
                        state.pim.get_or_insert_with(Default::default).hello_interval = Some(v);
                    }
                    (EditPath::PimParameter(PimParameter::HelloHoldtime), LeafValue::U16(v)) => {
                        state.pim.get_or_insert_with(Default::default).hello_holdtime = Some(v);
                    }
                    (EditPath::PimParameter(PimParameter::ActiveActive), LeafValue::Bool(v)) => {
                        state.pim.get_or_insert_with(Default::default).active_active = v;
                    }
                    (EditPath::PimAddressFamily | EditPath::GroupMembershipAddressFamily, _) => {
                        return Err(CfgMgrError::transaction_rejected(
                            xpath,
                            "container nodes cannot be modified",
                        ));
                    }
                    (_, value) => {
                        return Err(CfgMgrError::transaction_rejected(
                            xpath,
                            format!("value '{}' has the wrong type for this leaf", value),
                        ));
                    }
                }
            }
        }

        self.prune(key, family);
        Ok(())
    }

    /// Drops empty PIM records and empty per-family containers, then any
    /// interface or VRF entry that an edit created and that is now empty.
    fn prune(&mut self, key: &InterfaceKey, family: AddressFamily) {
        let Some(vrf) = self.vrfs.get_mut(&key.vrf) else {
            return;
        };

        if let Some(iface) = vrf.interfaces.get_mut(&key.name) {
            if let Some(state) = iface.protocols.get_mut(&family) {
                if state.pim.as_ref().is_some_and(|pim| pim.is_prunable()) {
                    state.pim = None;
                }
                if state.is_empty() {
                    iface.protocols.remove(&family);
                }
            }
            if iface.is_prunable() {
                vrf.interfaces.remove(&key.name);
            }
        }

        if vrf.is_prunable() {
            self.vrfs.remove(&key.vrf);
        }
    }

    /// Dependent parameters may only be staged on an enabled record.
    fn validate_batch(
        &self,
        key: &InterfaceKey,
        family: AddressFamily,
        batch: &EditBatch,
    ) -> CfgMgrResult<()> {
        let pim_active = self
            .protocol_state(key, family)
            .is_some_and(InterfaceProtocolState::pim_active);

        for edit in batch {
            let stages_non_default = match (edit.path, edit.operation, edit.value) {
                (EditPath::PimParameter(_), EditOperation::Modify, Some(LeafValue::Bool(v))) => v,
                (EditPath::PimParameter(_), EditOperation::Modify, _) => true,
                _ => false,
            };
            if stages_non_default && !pim_active {
                return Err(CfgMgrError::transaction_rejected(
                    edit.path.absolute_xpath(key, family),
                    "pim-enable must be true to configure this parameter",
                ));
            }
        }
        Ok(())
    }
}

impl CandidateConfig for ConfigTree {
    fn protocol_state(
        &self,
        key: &InterfaceKey,
        family: AddressFamily,
    ) -> Option<&InterfaceProtocolState> {
        self.interface(key)?.protocols.get(&family)
    }
}

/// In-memory transaction engine holding candidate and running trees.
#[derive(Debug, Clone, Default)]
pub struct Datastore {
    candidate: ConfigTree,
    running: ConfigTree,
    commits: u64,
}

impl Datastore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `tree` as both candidate and running configuration.
    pub fn from_tree(tree: ConfigTree) -> Self {
        Self {
            running: tree.clone(),
            candidate: tree,
            commits: 0,
        }
    }

    pub fn candidate(&self) -> &ConfigTree {
        &self.candidate
    }

    pub fn running(&self) -> &ConfigTree {
        &self.running
    }

    /// Number of batches committed so far.
    pub fn commit_count(&self) -> u64 {
        self.commits
    }

    /// Edits the tree outside of any transaction (startup config, tests).
    pub fn seed<F>(&mut self, f: F)
    where
        F: FnOnce(&mut ConfigTree),
    {
        f(&mut self.candidate);
        self.running = self.candidate.clone();
    }
}

impl CandidateConfig for Datastore {
    fn protocol_state(
        &self,
        key: &InterfaceKey,
        family: AddressFamily,
    ) -> Option<&InterfaceProtocolState> {
        self.candidate.protocol_state(key, family)
    }
}

impl Transaction for Datastore {
    fn apply_all(
        &mut self,
        key: &InterfaceKey,
        family: AddressFamily,
        batch: &EditBatch,
    ) -> CfgMgrResult<()> {
        if batch.is_empty() {
            debug!("Empty batch for {} ({}), nothing to commit", key, family);
            return Ok(());
        }

        let mut staged = self.candidate.clone();
        let result = batch
            .iter()
            .try_for_each(|edit| staged.apply_edit(key, family, edit))
            .and_then(|()| staged.validate_batch(key, family, batch));

        if let Err(e) = result {
            warn!("Rejected batch for {} ({}): {}", key, family, e);
            return Err(e);
        }

        self.candidate = staged;
        self.running = self.candidate.clone();
        self.commits += 1;
        info!(
            "Committed {} edit(s) for {} ({}), commit #{}",
            batch.len(),
            key,
            family,
            self.commits
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ParameterValue, PimInterfaceConfig};
    use pretty_assertions::assert_eq;

    const V6: AddressFamily = AddressFamily::Ipv6;

    fn eth0() -> InterfaceKey {
        InterfaceKey::in_default_vrf("eth0")
    }

    #[test]
    fn test_modify_creates_record() {
        let mut ds = Datastore::new();
        let batch = EditBatch::from(vec![Edit::pim_enable(true)]);

        ds.apply_all(&eth0(), V6, &batch).unwrap();

        let state = ds.running().protocol_state(&eth0(), V6).unwrap();
        assert_eq!(state.pim, Some(PimInterfaceConfig::enabled()));
        assert_eq!(ds.candidate(), ds.running());
        assert_eq!(ds.commit_count(), 1);
    }

    #[test]
    fn test_destroy_absent_is_noop() {
        let mut ds = Datastore::new();
        let batch = EditBatch::from(vec![
            Edit::destroy(EditPath::GroupMembershipAddressFamily),
            Edit::destroy(EditPath::PimAddressFamily),
        ]);

        ds.apply_all(&eth0(), V6, &batch).unwrap();

        assert_eq!(ds.running(), &ConfigTree::new());
    }

    #[test]
    fn test_disable_prunes_record_but_keeps_companion() {
        let mut ds = Datastore::new();
        ds.seed(|tree| tree.set_group_membership(&eth0(), V6, true));
        ds.apply_all(&eth0(), V6, &EditBatch::from(vec![Edit::pim_enable(true)]))
            .unwrap();

        ds.apply_all(&eth0(), V6, &EditBatch::from(vec![Edit::pim_enable(false)]))
            .unwrap();

        let state = ds.running().protocol_state(&eth0(), V6).unwrap();
        assert_eq!(state.pim, None);
        assert_eq!(state.group_membership, Some(GroupMembershipConfig { enabled: true }));
    }

    #[test]
    fn test_parameter_requires_enable() {
        let mut ds = Datastore::new();
        let batch = EditBatch::from(vec![Edit::set_parameter(ParameterValue::HelloInterval(30))]);

        let err = ds.apply_all(&eth0(), V6, &batch).unwrap_err();

        assert!(matches!(err, CfgMgrError::TransactionRejected { .. }));
        assert!(err.to_string().contains(
            "interface[name='eth0'][vrf='default']/frr-pim:pim/address-family\
             [address-family='frr-routing:ipv6']/hello-interval"
        ));
        assert_eq!(ds.running(), &ConfigTree::new());
        assert_eq!(ds.commit_count(), 0);
    }

    #[test]
    fn test_parameter_allowed_with_companion_enabled() {
        let mut ds = Datastore::new();
        ds.seed(|tree| tree.set_group_membership(&eth0(), V6, true));
        let batch = EditBatch::from(vec![Edit::set_parameter(ParameterValue::DrPriority(5))]);

        ds.apply_all(&eth0(), V6, &batch).unwrap();

        let pim = ds.running().protocol_state(&eth0(), V6).unwrap().pim.clone().unwrap();
        assert!(!pim.enabled);
        assert_eq!(pim.dr_priority, Some(5));
    }

    #[test]
    fn test_enable_disable_leaves_no_staged_entries() {
        let mut ds = Datastore::new();
        let key = InterfaceKey::new("eth7", "red");

        ds.apply_all(&key, V6, &EditBatch::from(vec![Edit::pim_enable(true)]))
            .unwrap();
        assert_eq!(ds.running().interface_count(), 1);

        ds.apply_all(
            &key,
            V6,
            &EditBatch::from(vec![
                Edit::destroy(EditPath::GroupMembershipAddressFamily),
                Edit::destroy(EditPath::PimAddressFamily),
            ]),
        )
        .unwrap();

        assert_eq!(ds.running(), &ConfigTree::new());
        assert_eq!(ds.candidate(), &ConfigTree::new());
    }

    #[test]
    fn test_seeded_interface_survives_disable() {
        let mut ds = Datastore::new();
        ds.seed(|tree| {
            tree.add_interface(&eth0());
        });
        let seeded = ds.running().clone();

        ds.apply_all(&eth0(), V6, &EditBatch::from(vec![Edit::pim_enable(true)]))
            .unwrap();
        ds.apply_all(&eth0(), V6, &EditBatch::from(vec![Edit::pim_enable(false)]))
            .unwrap();

        assert_eq!(ds.running(), &seeded);
        assert!(ds.running().interface(&eth0()).is_some());
    }

    #[test]
    fn test_active_active_off_allowed_without_enable() {
        let mut ds = Datastore::new();
        let batch = EditBatch::from(vec![Edit::set_parameter(ParameterValue::ActiveActive(false))]);

        ds.apply_all(&eth0(), V6, &batch).unwrap();

        assert!(ds.running().protocol_state(&eth0(), V6).is_none());
    }

    #[test]
    fn test_wrong_value_type_rejected() {
        let mut ds = Datastore::new();
        let batch = EditBatch::from(vec![Edit::modify(EditPath::PimEnable, LeafValue::U32(1))]);

        let err = ds.apply_all(&eth0(), V6, &batch).unwrap_err();
        assert!(err.to_string().contains("wrong type"));
    }

    #[test]
    fn test_rejected_batch_is_atomic() {
        let mut ds = Datastore::new();
        let batch = EditBatch::from(vec![
            Edit::pim_enable(true),
            Edit::modify(EditPath::PimAddressFamily, LeafValue::Bool(true)),
        ]);

        assert!(ds.apply_all(&eth0(), V6, &batch).is_err());
        assert_eq!(ds.candidate(), &ConfigTree::new());
    }

    #[test]
    fn test_parameter_destroy_reverts_to_default() {
        let mut ds = Datastore::new();
        ds.apply_all(
            &eth0(),
            V6,
            &EditBatch::from(vec![
                Edit::pim_enable(true),
                Edit::set_parameter(ParameterValue::DrPriority(100)),
            ]),
        )
        .unwrap();

        ds.apply_all(
            &eth0(),
            V6,
            &EditBatch::from(vec![Edit::destroy(EditPath::PimParameter(
                PimParameter::DrPriority,
            ))]),
        )
        .unwrap();

        let state = ds.running().protocol_state(&eth0(), V6).unwrap();
        assert_eq!(state.pim, Some(PimInterfaceConfig::enabled()));
    }

    #[test]
    fn test_yaml_round_trip_shape() {
        let yaml = r#"
vrfs:
  default:
    interfaces:
      eth0:
        description: uplink
        protocols:
          ipv6:
            group_membership:
              enabled: true
  red:
    pim_instance: false
    vxlan_term_device: ipmr-lo
"#;
        let tree: ConfigTree = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(tree.interface_count(), 1);
        assert!(tree.vrfs["default"].pim_instance);
        assert!(!tree.vrfs["red"].pim_instance);
        assert_eq!(tree.vrfs["red"].vxlan_term_device.as_deref(), Some("ipmr-lo"));
        let state = tree.protocol_state(&eth0(), V6).unwrap();
        assert_eq!(state.group_membership, Some(GroupMembershipConfig { enabled: true }));
    }
}
