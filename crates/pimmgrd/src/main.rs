//! pimmgrd - PIM interface configuration manager
//!
//! Loads a startup tree, runs a batch of interface commands through the
//! reconciler, and prints the resulting interface configuration.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use mcast_cfgmgr_common::{CfgMgr, Orch};
use mcast_pimmgrd::config::{self, DaemonConfig};
use mcast_pimmgrd::PimMgr;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// PIM interface configuration manager
#[derive(Parser, Debug)]
#[command(name = "pimmgrd")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Daemon configuration file (YAML)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Startup configuration tree (YAML), overrides the config file
    #[arg(short = 's', long)]
    startup: Option<PathBuf>,

    /// Command batch (YAML), overrides the config file
    #[arg(short = 'x', long)]
    commands: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long)]
    log_level: Option<String>,

    /// Print the visible command grammar and exit
    #[arg(long)]
    list_commands: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let daemon_config = match load_daemon_config(&args) {
        Ok(daemon_config) => daemon_config,
        Err(e) => {
            init_logging(config::DEFAULT_LOG_LEVEL);
            error!("pimmgrd: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&daemon_config.log_level);

    match run(&args, daemon_config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("pimmgrd: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Reads the config file and applies command-line overrides.
fn load_daemon_config(args: &Args) -> anyhow::Result<DaemonConfig> {
    let mut daemon_config = DaemonConfig::load_or_default(args.config.as_deref())
        .context("loading daemon configuration")?;
    if let Some(level) = &args.log_level {
        daemon_config.log_level = level.clone();
    }
    if args.startup.is_some() {
        daemon_config.startup_config = args.startup.clone();
    }
    if args.commands.is_some() {
        daemon_config.commands = args.commands.clone();
    }
    Ok(daemon_config)
}

/// Returns whether every command succeeded.
async fn run(args: &Args, daemon_config: DaemonConfig) -> anyhow::Result<bool> {
    info!("--- Starting pimmgrd ---");

    let mut mgr = PimMgr::new(&daemon_config.families);

    if args.list_commands {
        for line in mgr.command_table().help() {
            println!("{}", line);
        }
        return Ok(true);
    }

    if let Some(path) = &daemon_config.startup_config {
        let tree = config::load_startup_tree(path)
            .with_context(|| format!("loading startup config {}", path.display()))?;
        mgr.load_startup(tree);
    }

    if let Some(path) = &daemon_config.commands {
        let batch = config::load_command_batch(path)
            .with_context(|| format!("loading command batch {}", path.display()))?;
        info!("Queued {} command(s) from {}", batch.len(), path.display());
        for request in batch {
            mgr.enqueue(request);
        }
    }

    while mgr.has_pending_tasks() {
        mgr.do_task().await;
    }

    let mut all_ok = true;
    for (request, output) in mgr.take_results() {
        all_ok &= output.status.is_success();
        println!("{}# {} {}", request.key(), request.verb, request.args.join(" "));
        print!("{}", output);
    }

    print!("{}", mgr.running_config());
    info!(
        "{} finished after {} commit(s)",
        mgr.daemon_name(),
        mgr.datastore().commit_count()
    );
    Ok(all_ok)
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}
