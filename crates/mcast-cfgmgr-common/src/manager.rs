//! Configuration manager trait and command result types.
//!
//! This module provides the base trait for all cfgmgr daemon managers,
//! extending [`Orch`] with cfgmgr-specific functionality, and the
//! status codes handed back to the command dispatcher.

use std::fmt;

use crate::error::CfgMgrError;
use crate::orch::Orch;
use crate::render::ConfigBuilder;

/// Command completion status, as reported to the operator's shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmdStatus {
    /// Command applied.
    Success,
    /// Command matched but the resulting transaction was rejected.
    WarningConfigFailed,
    /// Verb unknown or arguments did not match the schema.
    NoMatch,
}

impl CmdStatus {
    /// Returns the numeric code understood by vtysh-style front ends.
    pub fn code(&self) -> i32 {
        match self {
            CmdStatus::Success => 0,
            CmdStatus::NoMatch => 2,
            CmdStatus::WarningConfigFailed => 13,
        }
    }

    /// Returns true for [`CmdStatus::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, CmdStatus::Success)
    }
}

/// Outcome of one administrative command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Completion status.
    pub status: CmdStatus,
    /// Lines to show the operator, without trailing newlines.
    pub lines: Vec<String>,
}

impl CommandOutput {
    /// Successful command with no output.
    pub fn success() -> Self {
        Self {
            status: CmdStatus::Success,
            lines: Vec::new(),
        }
    }

    /// Appends an output line.
    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    /// Translates an error into the operator-facing failure.
    pub fn from_error(err: &CfgMgrError) -> Self {
        if err.is_input_error() {
            Self {
                status: CmdStatus::NoMatch,
                lines: vec![format!("% {}", err)],
            }
        } else {
            Self {
                status: CmdStatus::WarningConfigFailed,
                lines: vec!["% Configuration failed.".to_string(), String::new(), err.to_string()],
            }
        }
    }
}

impl fmt::Display for CommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Base trait for configuration manager daemons.
///
/// This trait extends `Orch` with functionality specific to cfgmgr daemons,
/// which turn administrative commands into staged configuration edits and
/// render committed configuration back to text.
///
/// # Example
///
/// ```ignore
/// use mcast_cfgmgr_common::{CfgMgr, Orch, render::ConfigBuilder};
///
/// struct MyMgr {
///     // ... state
/// }
///
/// #[async_trait]
/// impl Orch for MyMgr {
///     fn name(&self) -> &str { "MyMgr" }
///     async fn do_task(&mut self) { /* ... */ }
/// }
///
/// impl CfgMgr for MyMgr {
///     fn daemon_name(&self) -> &str { "mymgrd" }
///     fn config_subtrees(&self) -> &[&str] { &["/frr-interface:lib"] }
///     fn write_config(&self, out: &mut ConfigBuilder) -> usize { 0 }
/// }
/// ```
pub trait CfgMgr: Orch {
    /// Returns the daemon name (e.g., "pimmgrd").
    ///
    /// This is used for logging.
    fn daemon_name(&self) -> &str;

    /// Returns the configuration subtrees this manager edits.
    fn config_subtrees(&self) -> &[&str];

    /// Renders committed configuration into `out`.
    ///
    /// Returns the number of lines written.
    fn write_config(&self, out: &mut ConfigBuilder) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cmd_status_codes() {
        assert_eq!(CmdStatus::Success.code(), 0);
        assert_eq!(CmdStatus::NoMatch.code(), 2);
        assert_eq!(CmdStatus::WarningConfigFailed.code(), 13);
        assert!(CmdStatus::Success.is_success());
        assert!(!CmdStatus::NoMatch.is_success());
    }

    #[test]
    fn test_output_from_transaction_error() {
        let err = CfgMgrError::transaction_rejected("./dr-priority", "pim-enable must be true");
        let out = CommandOutput::from_error(&err);
        assert_eq!(out.status, CmdStatus::WarningConfigFailed);
        assert_eq!(out.lines[0], "% Configuration failed.");
        assert!(out.lines[2].contains("./dr-priority"));
    }

    #[test]
    fn test_output_from_input_error() {
        let err = CfgMgrError::unknown_command("ipv6 pim bogus");
        let out = CommandOutput::from_error(&err);
        assert_eq!(out.status, CmdStatus::NoMatch);
        assert_eq!(out.lines, vec!["% Unknown command: 'ipv6 pim bogus'".to_string()]);
    }

    #[test]
    fn test_output_display() {
        let out = CommandOutput::success().with_line("WARN: something");
        assert_eq!(out.to_string(), "WARN: something\n");
    }
}
