//! PIM enablement reconciler
//!
//! Turns one administrative intent on one interface/family into an ordered
//! edit batch. The reconciler never touches the tree itself: it reads the
//! candidate through the prober and leaves application to the transaction
//! engine, which must treat destroys of absent nodes as no-ops.

use tracing::debug;

use crate::datastore::CandidateConfig;
use crate::edits::{Edit, EditBatch, EditPath};
use crate::prober;
use crate::types::{AddressFamily, CompanionState, InterfaceKey, ParameterValue, PimParameter};

/// Reconciliation context for one interface and address family.
pub struct Reconciler<'a> {
    candidate: &'a dyn CandidateConfig,
    key: &'a InterfaceKey,
    family: AddressFamily,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        candidate: &'a dyn CandidateConfig,
        key: &'a InterfaceKey,
        family: AddressFamily,
    ) -> Self {
        Self {
            candidate,
            key,
            family,
        }
    }

    /// Enabling never touches the companion protocol.
    pub fn enable(&self) -> EditBatch {
        EditBatch::from(vec![Edit::pim_enable(true)])
    }

    /// Disables PIM, removing the whole container unless the companion
    /// protocol is enabled and still needs it.
    pub fn disable(&self) -> EditBatch {
        let companion = prober::probe_companion(self.candidate, self.key, self.family);
        debug!(
            "disable pim on {} ({}): {} is {:?}",
            self.key,
            self.family,
            self.family.group_membership_protocol(),
            companion
        );

        match companion {
            CompanionState::Absent | CompanionState::PresentDisabled => EditBatch::from(vec![
                Edit::destroy(EditPath::GroupMembershipAddressFamily),
                Edit::destroy(EditPath::PimAddressFamily),
            ]),
            CompanionState::PresentEnabled => EditBatch::from(vec![Edit::pim_enable(false)]),
        }
    }

    /// Sets a parameter whose command implies PIM enablement.
    ///
    /// `optional` is emitted only when supplied; its absence never resets
    /// the existing value.
    pub fn set_parameter_with_implicit_enable(
        &self,
        value: ParameterValue,
        optional: Option<ParameterValue>,
    ) -> EditBatch {
        let probe = prober::probe(self.candidate, self.key, self.family);
        let mut batch = EditBatch::new();

        if !probe.companion.is_enabled() && !probe.pim_enabled {
            batch.push(Edit::pim_enable(true));
        } else {
            debug!(
                "pim on {} ({}) already implied enabled ({:?}, pim-enable={})",
                self.key, self.family, probe.companion, probe.pim_enabled
            );
        }

        batch.push(Edit::set_parameter(value));
        if let Some(optional) = optional {
            batch.push(Edit::set_parameter(optional));
        }
        batch
    }

    /// Reverts parameters to their protocol defaults. Never cascades to the
    /// enable flag or the container.
    pub fn disable_parameter(&self, parameters: &[PimParameter]) -> EditBatch {
        parameters
            .iter()
            .map(|&param| Edit::destroy(EditPath::PimParameter(param)))
            .collect::<Vec<_>>()
            .into()
    }

    /// Active-active is only defined on an enabled interface, so turning it
    /// on co-enables PIM; turning it off leaves PIM alone.
    pub fn set_active_active(&self, enable: bool) -> EditBatch {
        let mut batch = EditBatch::new();
        if enable {
            batch.push(Edit::pim_enable(true));
        }
        batch.push(Edit::set_parameter(ParameterValue::ActiveActive(enable)));
        batch
    }
}
