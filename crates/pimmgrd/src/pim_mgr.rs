//! PIM Manager - per-interface PIM administrative state

use std::collections::VecDeque;

use async_trait::async_trait;
use mcast_cfgmgr_common::ifname::validate_ifname;
use mcast_cfgmgr_common::render::ConfigBuilder;
use mcast_cfgmgr_common::{CfgMgr, CommandOutput, Orch};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::commands::CommandTable;
use crate::datastore::{ConfigTree, Datastore};
use crate::emitter;
use crate::types::*;
use crate::xpaths;

fn default_vrf() -> String {
    DEFAULT_VRF_NAME.to_string()
}

/// One administrative command addressed to an interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    /// Interface name
    pub interface: String,
    /// VRF of the interface
    #[serde(default = "default_vrf")]
    pub vrf: String,
    /// Verb, e.g. `ipv6 pim hello`
    pub verb: String,
    /// Verb arguments
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandRequest {
    /// Create a request for an interface in the default VRF
    pub fn new(interface: impl Into<String>, verb: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            vrf: default_vrf(),
            verb: verb.into(),
            args: Vec::new(),
        }
    }

    pub fn with_vrf(mut self, vrf: impl Into<String>) -> Self {
        self.vrf = vrf.into();
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn key(&self) -> InterfaceKey {
        InterfaceKey::new(self.interface.clone(), self.vrf.clone())
    }
}

/// PIM Manager
///
/// Owns the staged datastore and the command table, and runs queued
/// commands strictly one after another.
pub struct PimMgr {
    /// Candidate/running configuration
    datastore: Datastore,

    /// Verb -> handler table, built once
    commands: CommandTable,

    /// Commands waiting for `do_task`
    pending: VecDeque<CommandRequest>,

    /// Outcomes of drained commands, in execution order
    results: Vec<(CommandRequest, CommandOutput)>,
}

impl PimMgr {
    /// Create a new PimMgr with an empty datastore
    pub fn new(families: &[AddressFamily]) -> Self {
        Self::with_datastore(families, Datastore::new())
    }

    /// Create a PimMgr on top of an existing datastore
    pub fn with_datastore(families: &[AddressFamily], datastore: Datastore) -> Self {
        let commands = CommandTable::new(families);
        info!(
            "PimMgr initialized with {} verbs for {:?}",
            commands.len(),
            families
        );

        Self {
            datastore,
            commands,
            pending: VecDeque::new(),
            results: Vec::new(),
        }
    }

    pub fn datastore(&self) -> &Datastore {
        &self.datastore
    }

    pub fn command_table(&self) -> &CommandTable {
        &self.commands
    }

    /// Loads a startup tree as both candidate and running configuration.
    pub fn load_startup(&mut self, tree: ConfigTree) {
        info!("Loaded startup config with {} interfaces", tree.interface_count());
        self.datastore.seed(|current| *current = tree);
    }

    /// Runs one command to completion.
    #[instrument(skip(self))]
    pub fn execute(&mut self, request: &CommandRequest) -> CommandOutput {
        if let Err(e) = validate_ifname(&request.interface) {
            return CommandOutput::from_error(&e);
        }

        let key = request.key();
        let args: Vec<&str> = request.args.iter().map(String::as_str).collect();
        let output = self
            .commands
            .dispatch(&mut self.datastore, &key, &request.verb, &args);
        debug!("'{}' on {} -> {:?}", request.verb, key, output.status);
        output
    }

    /// Queues a command for the next `do_task`.
    pub fn enqueue(&mut self, request: CommandRequest) {
        self.pending.push_back(request);
    }

    /// Returns and clears the outcomes collected by `do_task`.
    pub fn take_results(&mut self) -> Vec<(CommandRequest, CommandOutput)> {
        std::mem::take(&mut self.results)
    }

    /// Renders the running configuration.
    pub fn running_config(&self) -> String {
        let mut out = ConfigBuilder::new();
        self.write_config(&mut out);
        out.to_string()
    }
}

impl Default for PimMgr {
    fn default() -> Self {
        Self::new(&[AddressFamily::Ipv4, AddressFamily::Ipv6])
    }
}

#[async_trait]
impl Orch for PimMgr {
    fn name(&self) -> &str {
        "pimmgr"
    }

    async fn do_task(&mut self) {
        while let Some(request) = self.pending.pop_front() {
            let output = self.execute(&request);
            self.results.push((request, output));
        }
    }

    fn has_pending_tasks(&self) -> bool {
        !self.pending.is_empty()
    }

    fn dump_pending_tasks(&self) -> Vec<String> {
        self.pending
            .iter()
            .map(|req| format!("{}: {} {}", req.key(), req.verb, req.args.join(" ")).trim_end().to_string())
            .collect()
    }
}

impl CfgMgr for PimMgr {
    fn daemon_name(&self) -> &str {
        "pimmgrd"
    }

    fn config_subtrees(&self) -> &[&str] {
        &[xpaths::FRR_PIM_SUBTREE, xpaths::FRR_GMP_SUBTREE]
    }

    fn write_config(&self, out: &mut ConfigBuilder) -> usize {
        emitter::interface_config_write(self.datastore.running(), out)
    }
}
