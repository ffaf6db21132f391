//! Command table for per-interface PIM verbs
//!
//! The table maps a verb string to its descriptor (argument schema plus
//! handler). It is built once at startup for the configured address
//! families and then only read.

use std::collections::BTreeMap;
use std::fmt;

use mcast_cfgmgr_common::{CfgMgrError, CfgMgrResult, CommandOutput};
use tracing::{debug, warn};

use crate::datastore::Transaction;
use crate::edits::EditBatch;
use crate::reconciler::Reconciler;
use crate::types::*;

/// Printed after the hidden SSM/SM compatibility verbs succeed.
pub const SSM_COMPAT_WARNING: &str =
    "WARN: Enabled PIM SM on interface; configure PIM SSM range if needed";

/// One numeric argument in a command's grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgSpec {
    pub name: &'static str,
    pub min: u64,
    pub max: u64,
    pub optional: bool,
}

impl ArgSpec {
    pub const fn required(name: &'static str, min: u64, max: u64) -> Self {
        Self {
            name,
            min,
            max,
            optional: false,
        }
    }

    pub const fn optional(name: &'static str, min: u64, max: u64) -> Self {
        Self {
            name,
            min,
            max,
            optional: true,
        }
    }

    fn parse(&self, raw: &str) -> CfgMgrResult<u64> {
        let value: u64 = raw.parse().map_err(|_| {
            CfgMgrError::invalid_argument(self.name, format!("'{}' is not a number", raw))
        })?;
        if value < self.min || value > self.max {
            return Err(CfgMgrError::invalid_argument(
                self.name,
                format!("value {} out of range {}-{}", value, self.min, self.max),
            ));
        }
        Ok(value)
    }
}

impl fmt::Display for ArgSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional {
            write!(f, "[({}-{})]", self.min, self.max)
        } else {
            write!(f, "({}-{})", self.min, self.max)
        }
    }
}

/// Arguments validated against a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    values: Vec<Option<u64>>,
}

impl ParsedArgs {
    /// Validates raw tokens against `schema`.
    pub fn parse(schema: &[ArgSpec], raw: &[&str]) -> CfgMgrResult<Self> {
        if raw.len() > schema.len() {
            return Err(CfgMgrError::invalid_argument(
                raw[schema.len()],
                format!("unexpected argument, at most {} allowed", schema.len()),
            ));
        }

        let mut values = Vec::with_capacity(schema.len());
        for (idx, spec) in schema.iter().enumerate() {
            match raw.get(idx) {
                Some(token) => values.push(Some(spec.parse(token)?)),
                None if spec.optional => values.push(None),
                None => {
                    return Err(CfgMgrError::invalid_argument(spec.name, "missing argument"));
                }
            }
        }
        Ok(Self { values })
    }

    pub fn get(&self, idx: usize) -> Option<u64> {
        self.values.get(idx).copied().flatten()
    }

    pub fn required(&self, idx: usize, name: &str) -> CfgMgrResult<u64> {
        self.get(idx)
            .ok_or_else(|| CfgMgrError::invalid_argument(name, "missing argument"))
    }
}

fn narrow<T: TryFrom<u64>>(value: u64, name: &str) -> CfgMgrResult<T> {
    T::try_from(value)
        .map_err(|_| CfgMgrError::invalid_argument(name, format!("value {} out of range", value)))
}

/// Builds the edit batch for one command.
pub type CommandHandler = fn(&Reconciler<'_>, &ParsedArgs) -> CfgMgrResult<EditBatch>;

/// Everything the dispatcher needs to run a verb.
#[derive(Clone)]
pub struct CommandDescriptor {
    pub verb: String,
    pub family: AddressFamily,
    pub args: &'static [ArgSpec],
    pub handler: CommandHandler,
    /// Kept for compatibility, not listed in help
    pub hidden: bool,
    /// Extra line shown when the command succeeds
    pub success_warning: Option<&'static str>,
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("verb", &self.verb)
            .field("family", &self.family)
            .field("args", &self.args)
            .field("hidden", &self.hidden)
            .field("success_warning", &self.success_warning)
            .finish_non_exhaustive()
    }
}

impl CommandDescriptor {
    /// Grammar line, e.g. `ipv6 pim hello (1-255) [(1-65535)]`.
    pub fn grammar(&self) -> String {
        let mut line = self.verb.clone();
        for arg in self.args {
            line.push(' ');
            line.push_str(&arg.to_string());
        }
        line
    }
}

const NO_ARGS: &[ArgSpec] = &[];
const DRPRIO_ARGS: &[ArgSpec] = &[ArgSpec::required(
    "priority",
    DR_PRIORITY_MIN as u64,
    DR_PRIORITY_MAX as u64,
)];
const NO_DRPRIO_ARGS: &[ArgSpec] = &[ArgSpec::optional(
    "priority",
    DR_PRIORITY_MIN as u64,
    DR_PRIORITY_MAX as u64,
)];
const HELLO_ARGS: &[ArgSpec] = &[
    ArgSpec::required(
        "interval",
        HELLO_INTERVAL_MIN as u64,
        HELLO_INTERVAL_MAX as u64,
    ),
    ArgSpec::optional(
        "holdtime",
        HELLO_HOLDTIME_MIN as u64,
        HELLO_HOLDTIME_MAX as u64,
    ),
];
const NO_HELLO_ARGS: &[ArgSpec] = &[
    ArgSpec::optional(
        "interval",
        HELLO_INTERVAL_MIN as u64,
        HELLO_INTERVAL_MAX as u64,
    ),
    ArgSpec::optional(
        "holdtime",
        HELLO_HOLDTIME_MIN as u64,
        HELLO_HOLDTIME_MAX as u64,
    ),
];

fn enable_pim(r: &Reconciler<'_>, _args: &ParsedArgs) -> CfgMgrResult<EditBatch> {
    Ok(r.enable())
}

fn disable_pim(r: &Reconciler<'_>, _args: &ParsedArgs) -> CfgMgrResult<EditBatch> {
    Ok(r.disable())
}

fn set_dr_priority(r: &Reconciler<'_>, args: &ParsedArgs) -> CfgMgrResult<EditBatch> {
    let priority = narrow::<u32>(args.required(0, "priority")?, "priority")?;
    Ok(r.set_parameter_with_implicit_enable(ParameterValue::DrPriority(priority), None))
}

fn clear_dr_priority(r: &Reconciler<'_>, _args: &ParsedArgs) -> CfgMgrResult<EditBatch> {
    Ok(r.disable_parameter(&[PimParameter::DrPriority]))
}

fn set_hello(r: &Reconciler<'_>, args: &ParsedArgs) -> CfgMgrResult<EditBatch> {
    let interval = narrow::<u8>(args.required(0, "interval")?, "interval")?;
    let holdtime = args
        .get(1)
        .map(|hold| narrow::<u16>(hold, "holdtime"))
        .transpose()?;
    Ok(r.set_parameter_with_implicit_enable(
        ParameterValue::HelloInterval(interval),
        holdtime.map(ParameterValue::HelloHoldtime),
    ))
}

fn clear_hello(r: &Reconciler<'_>, _args: &ParsedArgs) -> CfgMgrResult<EditBatch> {
    Ok(r.disable_parameter(&[PimParameter::HelloInterval, PimParameter::HelloHoldtime]))
}

fn enable_active_active(r: &Reconciler<'_>, _args: &ParsedArgs) -> CfgMgrResult<EditBatch> {
    Ok(r.set_active_active(true))
}

fn disable_active_active(r: &Reconciler<'_>, _args: &ParsedArgs) -> CfgMgrResult<EditBatch> {
    Ok(r.set_active_active(false))
}

/// (verb, schema, handler, hidden, success warning)
type TableEntry = (
    String,
    &'static [ArgSpec],
    CommandHandler,
    bool,
    Option<&'static str>,
);

/// Verb → descriptor map.
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    commands: BTreeMap<String, CommandDescriptor>,
}

impl CommandTable {
    /// Builds the table for the given address families.
    pub fn new(families: &[AddressFamily]) -> Self {
        let mut table = Self::default();
        for &family in families {
            table.install_family(family);
        }
        debug!("Command table built with {} verbs", table.len());
        table
    }

    fn install_family(&mut self, family: AddressFamily) {
        let af = family.cli_keyword();
        let entries: [TableEntry; 12] = [
            (format!("{} pim", af), NO_ARGS, enable_pim, false, None),
            (format!("no {} pim", af), NO_ARGS, disable_pim, false, None),
            (format!("{} pim drpriority", af), DRPRIO_ARGS, set_dr_priority, false, None),
            (format!("no {} pim drpriority", af), NO_DRPRIO_ARGS, clear_dr_priority, false, None),
            (format!("{} pim hello", af), HELLO_ARGS, set_hello, false, None),
            (format!("no {} pim hello", af), NO_HELLO_ARGS, clear_hello, false, None),
            (format!("{} pim active-active", af), NO_ARGS, enable_active_active, false, None),
            (format!("no {} pim active-active", af), NO_ARGS, disable_active_active, false, None),
            // SSM/SM compatibility verbs bind to this family's handlers only
            (format!("{} pim ssm", af), NO_ARGS, enable_pim, true, Some(SSM_COMPAT_WARNING)),
            (format!("{} pim sm", af), NO_ARGS, enable_pim, true, Some(SSM_COMPAT_WARNING)),
            (format!("no {} pim ssm", af), NO_ARGS, disable_pim, true, None),
            (format!("no {} pim sm", af), NO_ARGS, disable_pim, true, None),
        ];

        for (verb, args, handler, hidden, success_warning) in entries {
            self.install(CommandDescriptor {
                verb,
                family,
                args,
                handler,
                hidden,
                success_warning,
            });
        }
    }

    /// Registers a descriptor, replacing any previous one for the verb.
    pub fn install(&mut self, descriptor: CommandDescriptor) {
        if let Some(old) = self.commands.insert(descriptor.verb.clone(), descriptor) {
            warn!("Command '{}' registered twice, keeping the latest", old.verb);
        }
    }

    pub fn get(&self, verb: &str) -> Option<&CommandDescriptor> {
        self.commands.get(verb)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Grammar lines of the visible commands, sorted by verb.
    pub fn help(&self) -> Vec<String> {
        self.commands
            .values()
            .filter(|desc| !desc.hidden)
            .map(CommandDescriptor::grammar)
            .collect()
    }

    /// Runs one verb against `datastore` for interface `key`.
    pub fn dispatch<T: Transaction>(
        &self,
        datastore: &mut T,
        key: &InterfaceKey,
        verb: &str,
        args: &[&str],
    ) -> CommandOutput {
        match self.run(datastore, key, verb, args) {
            Ok(Some(warning)) => CommandOutput::success().with_line(warning),
            Ok(None) => CommandOutput::success(),
            Err(e) => {
                warn!("'{}' on {} failed: {}", verb, key, e);
                CommandOutput::from_error(&e)
            }
        }
    }

    fn run<T: Transaction>(
        &self,
        datastore: &mut T,
        key: &InterfaceKey,
        verb: &str,
        args: &[&str],
    ) -> CfgMgrResult<Option<&'static str>> {
        let desc = self
            .get(verb)
            .ok_or_else(|| CfgMgrError::unknown_command(verb))?;
        let parsed = ParsedArgs::parse(desc.args, args)?;

        let batch = {
            let reconciler = Reconciler::new(&*datastore, key, desc.family);
            (desc.handler)(&reconciler, &parsed)?
        };
        debug!(
            "'{}' on {} -> {:?}",
            verb,
            key,
            batch.describe(desc.family)
        );

        datastore.apply_all(key, desc.family, &batch)?;
        Ok(desc.success_warning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::{CandidateConfig, ConfigTree, Datastore};
    use mcast_cfgmgr_common::CmdStatus;
    use pretty_assertions::assert_eq;

    const V6: AddressFamily = AddressFamily::Ipv6;

    fn setup() -> (CommandTable, Datastore, InterfaceKey) {
        let key = InterfaceKey::in_default_vrf("eth0");
        let mut ds = Datastore::new();
        ds.seed(|tree| {
            tree.add_interface(&key);
        });
        (CommandTable::new(&[V6]), ds, key)
    }

    #[test]
    fn test_table_contents() {
        let table = CommandTable::new(&[AddressFamily::Ipv4, V6]);
        assert_eq!(table.len(), 24);
        assert!(table.get("ipv6 pim").is_some());
        assert!(table.get("ip pim hello").is_some());
        assert_eq!(table.get("ipv6 pim ssm").unwrap().family, V6);
        assert_eq!(table.get("ip pim ssm").unwrap().family, AddressFamily::Ipv4);
    }

    #[test]
    fn test_ipv6_only_table_has_no_ipv4_verbs() {
        let table = CommandTable::new(&[V6]);
        assert!(table.get("ip pim ssm").is_none());
        assert!(table.get("ip pim").is_none());
        assert!(table.commands.values().all(|d| d.family == V6));
    }

    #[test]
    fn test_help_hides_compat_verbs() {
        let table = CommandTable::new(&[V6]);
        let help = table.help();
        assert!(help.contains(&"ipv6 pim hello (1-255) [(1-65535)]".to_string()));
        assert!(help.contains(&"ipv6 pim drpriority (1-4294967295)".to_string()));
        assert!(!help.iter().any(|l| l.contains("ssm")));
    }

    #[test]
    fn test_arg_parsing() {
        let parsed = ParsedArgs::parse(HELLO_ARGS, &["30"]).unwrap();
        assert_eq!(parsed.get(0), Some(30));
        assert_eq!(parsed.get(1), None);

        assert!(ParsedArgs::parse(HELLO_ARGS, &[]).is_err());
        assert!(ParsedArgs::parse(HELLO_ARGS, &["0"]).is_err());
        assert!(ParsedArgs::parse(HELLO_ARGS, &["256"]).is_err());
        assert!(ParsedArgs::parse(HELLO_ARGS, &["abc"]).is_err());
        assert!(ParsedArgs::parse(HELLO_ARGS, &["30", "90", "1"]).is_err());
    }

    #[test]
    fn test_dispatch_enable() {
        let (table, mut ds, key) = setup();
        let out = table.dispatch(&mut ds, &key, "ipv6 pim", &[]);
        assert_eq!(out, CommandOutput::success());
        assert!(ds.protocol_state(&key, V6).unwrap().pim_enabled());
    }

    #[test]
    fn test_dispatch_hello_with_holdtime() {
        let (table, mut ds, key) = setup();
        let out = table.dispatch(&mut ds, &key, "ipv6 pim hello", &["30", "90"]);
        assert!(out.status.is_success());

        let pim = ds.running().protocol_state(&key, V6).unwrap().pim.clone().unwrap();
        assert!(pim.enabled);
        assert_eq!(pim.hello_interval, Some(30));
        assert_eq!(pim.hello_holdtime, Some(90));
    }

    #[test]
    fn test_dispatch_ssm_warning() {
        let (table, mut ds, key) = setup();
        let out = table.dispatch(&mut ds, &key, "ipv6 pim ssm", &[]);
        assert_eq!(out.status, CmdStatus::Success);
        assert_eq!(out.lines, vec![SSM_COMPAT_WARNING.to_string()]);

        let out = table.dispatch(&mut ds, &key, "no ipv6 pim sm", &[]);
        assert_eq!(out, CommandOutput::success());
        assert!(ds.protocol_state(&key, V6).is_none());
    }

    #[test]
    fn test_dispatch_unknown_verb() {
        let (table, mut ds, key) = setup();
        let out = table.dispatch(&mut ds, &key, "ipv6 pim bsm", &[]);
        assert_eq!(out.status, CmdStatus::NoMatch);
        assert_eq!(ds.commit_count(), 0);
    }

    #[test]
    fn test_dispatch_parameter_with_companion_enabled() {
        let (table, mut ds, key) = setup();
        ds.seed(|tree| tree.set_group_membership(&key, V6, true));

        let out = table.dispatch(&mut ds, &key, "ipv6 pim drpriority", &["7"]);
        assert!(out.status.is_success());

        let pim = ds.running().protocol_state(&key, V6).unwrap().pim.clone().unwrap();
        assert!(!pim.enabled);
        assert_eq!(pim.dr_priority, Some(7));
    }

    /// Engine that refuses every non-empty batch
    struct RejectingStore(ConfigTree);

    impl CandidateConfig for RejectingStore {
        fn protocol_state(
            &self,
            key: &InterfaceKey,
            family: AddressFamily,
        ) -> Option<&InterfaceProtocolState> {
            self.0.protocol_state(key, family)
        }
    }

    impl Transaction for RejectingStore {
        fn apply_all(
            &mut self,
            _key: &InterfaceKey,
            family: AddressFamily,
            batch: &EditBatch,
        ) -> CfgMgrResult<()> {
            let xpath = batch.describe(family).join("; ");
            Err(CfgMgrError::transaction_rejected(xpath, "validation failed"))
        }
    }

    #[test]
    fn test_dispatch_rejected_transaction() {
        let table = CommandTable::new(&[V6]);
        let key = InterfaceKey::in_default_vrf("eth0");
        let mut store = RejectingStore(ConfigTree::new());

        let out = table.dispatch(&mut store, &key, "ipv6 pim ssm", &[]);
        assert_eq!(out.status, CmdStatus::WarningConfigFailed);
        assert_eq!(out.lines[0], "% Configuration failed.");
        assert!(out.lines[2].contains("modify ./pim-enable true"));
    }

    #[test]
    fn test_dispatch_clear_hello_ignores_args() {
        let (table, mut ds, key) = setup();
        table.dispatch(&mut ds, &key, "ipv6 pim hello", &["30", "90"]);

        let out = table.dispatch(&mut ds, &key, "no ipv6 pim hello", &["30"]);
        assert!(out.status.is_success());

        let pim = ds.running().protocol_state(&key, V6).unwrap().pim.clone().unwrap();
        assert!(pim.enabled);
        assert_eq!(pim.hello_interval, None);
        assert_eq!(pim.hello_holdtime, None);
    }
}
