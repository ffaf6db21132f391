//! Common infrastructure for multicast configuration manager daemons.
//!
//! This crate provides shared functionality for the interface-level
//! multicast managers (pimmgrd and friends):
//!
//! - [`error`]: Error types for cfgmgr operations
//! - [`Orch`]: Base trait for serialized task processing
//! - [`CfgMgr`]: Trait extending `Orch` for config managers
//! - [`ifname`]: Interface name validation
//! - [`render`]: Line-oriented builder for `config write` output
//!
//! # Architecture
//!
//! Configuration managers follow this pattern:
//!
//! 1. Accept administrative commands scoped to one interface
//! 2. Read the staged (candidate) configuration to resolve dependencies
//! 3. Produce an ordered edit batch and hand it to the transaction engine
//! 4. Render committed state back to text for `config write`
//!
//! # Example
//!
//! ```ignore
//! use mcast_cfgmgr_common::{
//!     ifname::validate_ifname,
//!     render::ConfigBuilder,
//!     CfgMgrResult,
//! };
//!
//! fn header(name: &str) -> CfgMgrResult<ConfigBuilder> {
//!     validate_ifname(name)?;
//!     let mut out = ConfigBuilder::new();
//!     out += format!("interface {}", name);
//!     Ok(out)
//! }
//! ```

pub mod error;
pub mod ifname;
pub mod manager;
pub mod orch;
pub mod render;

// Re-export commonly used items at crate root
pub use error::{CfgMgrError, CfgMgrResult};
pub use manager::{CfgMgr, CmdStatus, CommandOutput};
pub use orch::Orch;
