//! Dependency prober
//!
//! Read-only view of the candidate tree used by the reconciler to decide
//! how a PIM change cascades into the companion protocol's container.

use crate::datastore::CandidateConfig;
use crate::types::{AddressFamily, CompanionState, InterfaceKey};

/// What the reconciler needs to know about one interface/family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    /// Companion group-membership protocol state
    pub companion: CompanionState,
    /// Whether `pim-enable` is already true in the candidate
    pub pim_enabled: bool,
}

/// Returns the companion protocol state. A missing node is `Absent`.
pub fn probe_companion(
    candidate: &dyn CandidateConfig,
    key: &InterfaceKey,
    family: AddressFamily,
) -> CompanionState {
    match candidate
        .protocol_state(key, family)
        .and_then(|state| state.group_membership.as_ref())
    {
        None => CompanionState::Absent,
        Some(gmp) if gmp.enabled => CompanionState::PresentEnabled,
        Some(_) => CompanionState::PresentDisabled,
    }
}

/// Probes both the companion protocol and the PIM enable leaf.
pub fn probe(candidate: &dyn CandidateConfig, key: &InterfaceKey, family: AddressFamily) -> ProbeResult {
    ProbeResult {
        companion: probe_companion(candidate, key, family),
        pim_enabled: candidate
            .protocol_state(key, family)
            .is_some_and(|state| state.pim_enabled()),
    }
}
