//! Interface name validation.
//!
//! Names are checked against the Linux kernel rules before any command
//! touches the configuration tree: at most `IFNAMSIZ - 1` bytes, no
//! whitespace, no `/`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CfgMgrError, CfgMgrResult};

/// Kernel `IFNAMSIZ`, including the trailing NUL.
pub const IFNAMSIZ: usize = 16;

static IFNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.:@-]{1,15}$").expect("Invalid regex pattern"));

/// Returns true if `name` is usable as an interface name.
pub fn is_valid_ifname(name: &str) -> bool {
    name.len() < IFNAMSIZ && name != "." && name != ".." && IFNAME_RE.is_match(name)
}

/// Validates an interface name.
pub fn validate_ifname(name: &str) -> CfgMgrResult<()> {
    if is_valid_ifname(name) {
        Ok(())
    } else {
        Err(CfgMgrError::InvalidInterfaceName {
            name: name.to_string(),
        })
    }
}
