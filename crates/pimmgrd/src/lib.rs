//! PIM interface configuration manager
//!
//! Reconciles per-interface PIM administrative state with the co-resident
//! group-membership protocol (IGMP for IPv4, MLD for IPv6) inside a staged
//! configuration tree, and renders committed interface configuration.

pub mod commands;
pub mod config;
pub mod datastore;
pub mod edits;
pub mod emitter;
mod pim_mgr;
pub mod prober;
pub mod reconciler;
pub mod types;
pub mod xpaths;

pub use commands::{CommandTable, SSM_COMPAT_WARNING};
pub use config::DaemonConfig;
pub use datastore::{CandidateConfig, ConfigTree, Datastore, Transaction};
pub use edits::{Edit, EditBatch, EditOperation, EditPath};
pub use pim_mgr::{CommandRequest, PimMgr};
pub use reconciler::Reconciler;
pub use types::*;
