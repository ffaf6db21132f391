//! Daemon configuration for pimmgrd
//!
//! Settings come from an optional YAML file; command-line flags override
//! individual fields in `main`.

use std::fs;
use std::path::{Path, PathBuf};

use mcast_cfgmgr_common::{CfgMgrError, CfgMgrResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::datastore::ConfigTree;
use crate::pim_mgr::CommandRequest;
use crate::types::AddressFamily;

/// Default log level when neither the file nor `RUST_LOG` sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// tracing filter directive
    pub log_level: String,
    /// Address families whose command tables are installed
    pub families: Vec<AddressFamily>,
    /// YAML tree loaded as the initial configuration
    pub startup_config: Option<PathBuf>,
    /// YAML list of commands to run after startup
    pub commands: Option<PathBuf>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            families: vec![AddressFamily::Ipv4, AddressFamily::Ipv6],
            startup_config: None,
            commands: None,
        }
    }
}

impl DaemonConfig {
    /// Loads `path` if given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> CfgMgrResult<Self> {
        let config = match path {
            Some(path) => read_yaml::<Self>(path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CfgMgrResult<()> {
        if self.families.is_empty() {
            return Err(CfgMgrError::invalid_config(
                "families",
                "at least one address family is required",
            ));
        }
        for (idx, family) in self.families.iter().enumerate() {
            if self.families[..idx].contains(family) {
                return Err(CfgMgrError::invalid_config(
                    "families",
                    format!("{} listed more than once", family),
                ));
            }
        }
        if self.log_level.trim().is_empty() {
            return Err(CfgMgrError::invalid_config("log_level", "must not be empty"));
        }
        Ok(())
    }
}

/// Reads a YAML startup tree.
pub fn load_startup_tree(path: &Path) -> CfgMgrResult<ConfigTree> {
    read_yaml(path)
}

/// Reads a YAML list of commands.
pub fn load_command_batch(path: &Path) -> CfgMgrResult<Vec<CommandRequest>> {
    read_yaml(path)
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> CfgMgrResult<T> {
    let shown = path.display().to_string();
    let text = fs::read_to_string(path)
        .map_err(|e| CfgMgrError::config_load(shown.clone(), e.to_string()))?;
    debug!("Read {} bytes from {}", text.len(), shown);
    serde_yaml::from_str(&text).map_err(|e| CfgMgrError::config_load(shown, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn yaml_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = DaemonConfig::load_or_default(None).unwrap();
        assert_eq!(config, DaemonConfig::default());
        assert_eq!(config.families.len(), 2);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_load_partial_file() {
        let file = yaml_file("log_level: debug\nfamilies: [ipv6]\n");
        let config = DaemonConfig::load_or_default(Some(file.path())).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.families, vec![AddressFamily::Ipv6]);
        assert_eq!(config.startup_config, None);
    }

    #[test]
    fn test_missing_file() {
        let err = DaemonConfig::load_or_default(Some(Path::new("/nonexistent/pimmgrd.yaml")))
            .unwrap_err();
        assert!(matches!(err, CfgMgrError::ConfigLoad { .. }));
    }

    #[test]
    fn test_load_error_names_path() {
        let file = yaml_file("log_level: [debug\n");
        let err = load_startup_tree(file.path()).unwrap_err();
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_malformed_yaml() {
        let file = yaml_file("families: [ipv7]\n");
        let err = DaemonConfig::load_or_default(Some(file.path())).unwrap_err();
        assert!(matches!(err, CfgMgrError::ConfigLoad { .. }));
    }

    #[test]
    fn test_validation() {
        let mut config = DaemonConfig::default();
        config.families.clear();
        assert!(config.validate().is_err());

        config.families = vec![AddressFamily::Ipv6, AddressFamily::Ipv6];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_command_batch() {
        let file = yaml_file(
            "- interface: eth0\n  verb: ipv6 pim hello\n  args: ['30', '90']\n\
             - interface: eth1\n  vrf: red\n  verb: no ipv6 pim\n",
        );
        let batch = load_command_batch(file.path()).unwrap();
        assert_eq!(
            batch,
            vec![
                CommandRequest::new("eth0", "ipv6 pim hello").with_args(["30", "90"]),
                CommandRequest::new("eth1", "no ipv6 pim").with_vrf("red"),
            ]
        );
    }

    #[test]
    fn test_load_startup_tree() {
        let file = yaml_file("vrfs:\n  default:\n    interfaces:\n      eth0:\n        description: uplink\n");
        let tree = load_startup_tree(file.path()).unwrap();
        assert_eq!(tree.interface_count(), 1);
    }
}
