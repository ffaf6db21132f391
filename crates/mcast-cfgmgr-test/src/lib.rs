//! Test infrastructure for multicast configuration managers
//!
//! Provides:
//! - Configuration tree fixtures for each companion-protocol state
//! - Verification helpers for committed trees and edit batches

pub mod fixtures;
mod verification;

pub use fixtures::*;
pub use verification::*;
