//! Verification helpers for testing configuration managers
//!
//! Provides assertion helpers to verify committed trees and edit batches

use mcast_pimmgrd::prober::probe_companion;
use mcast_pimmgrd::{AddressFamily, CandidateConfig, CompanionState, ConfigTree, EditBatch, InterfaceKey};
use thiserror::Error;

/// Verification error types
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Expected protocol container for {key} ({family}), found none")]
    ContainerMissing { key: InterfaceKey, family: AddressFamily },

    #[error("Expected no protocol container for {key} ({family}), found {found}")]
    UnexpectedContainer {
        key: InterfaceKey,
        family: AddressFamily,
        found: String,
    },

    #[error("pim-enable on {key} ({family}): expected {expected}, got {actual}")]
    PimEnableMismatch {
        key: InterfaceKey,
        family: AddressFamily,
        expected: bool,
        actual: bool,
    },

    #[error("Companion on {key} ({family}): expected {expected:?}, got {actual:?}")]
    CompanionMismatch {
        key: InterfaceKey,
        family: AddressFamily,
        expected: CompanionState,
        actual: CompanionState,
    },

    #[error("Batch mismatch: expected {expected:?}, got {actual:?}")]
    BatchMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerificationError>;

/// Committed-tree verification helper
pub struct TreeVerifier<'a> {
    tree: &'a ConfigTree,
}

impl<'a> TreeVerifier<'a> {
    /// Create a new verifier
    pub fn new(tree: &'a ConfigTree) -> Self {
        Self { tree }
    }

    /// Verify that the per-family container exists
    pub fn assert_container_present(&self, key: &InterfaceKey, family: AddressFamily) -> VerifyResult<()> {
        match self.tree.protocol_state(key, family) {
            Some(_) => Ok(()),
            None => Err(VerificationError::ContainerMissing {
                key: key.clone(),
                family,
            }),
        }
    }

    /// Verify that the per-family container was removed
    pub fn assert_container_absent(&self, key: &InterfaceKey, family: AddressFamily) -> VerifyResult<()> {
        match self.tree.protocol_state(key, family) {
            None => Ok(()),
            Some(state) => Err(VerificationError::UnexpectedContainer {
                key: key.clone(),
                family,
                found: format!("{:?}", state),
            }),
        }
    }

    /// Verify the PIM enable flag (a missing record counts as false)
    pub fn assert_pim_enabled(
        &self,
        key: &InterfaceKey,
        family: AddressFamily,
        expected: bool,
    ) -> VerifyResult<()> {
        let actual = self
            .tree
            .protocol_state(key, family)
            .is_some_and(|state| state.pim_enabled());
        if actual == expected {
            Ok(())
        } else {
            Err(VerificationError::PimEnableMismatch {
                key: key.clone(),
                family,
                expected,
                actual,
            })
        }
    }

    /// Verify the companion protocol state
    pub fn assert_companion(
        &self,
        key: &InterfaceKey,
        family: AddressFamily,
        expected: CompanionState,
    ) -> VerifyResult<()> {
        let actual = probe_companion(self.tree, key, family);
        if actual == expected {
            Ok(())
        } else {
            Err(VerificationError::CompanionMismatch {
                key: key.clone(),
                family,
                expected,
                actual,
            })
        }
    }
}

/// Verify a batch against its rendered edits, e.g. `"modify ./pim-enable true"`
pub fn assert_batch(batch: &EditBatch, family: AddressFamily, expected: &[&str]) -> VerifyResult<()> {
    let actual = batch.describe(family);
    if actual.iter().map(String::as_str).eq(expected.iter().copied()) {
        Ok(())
    } else {
        Err(VerificationError::BatchMismatch {
            expected: expected.iter().map(|s| s.to_string()).collect(),
            actual,
        })
    }
}
