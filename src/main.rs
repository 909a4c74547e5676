// Application entry point for the Drive Health Monitoring CLI

// Append-only history, archives and summary artifacts
mod history;
// Data models for attributes, snapshots and verdicts
mod models;
// The evaluation pipeline
mod monitor;
// Report assembly
mod report;

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(name = "drive-health")]
#[command(about = "Polls drive self-monitoring data, evaluates health and tracks per-device history")]
struct Args {
    /// Directory holding per-device ledgers, archives and run summaries
    #[arg(short, long, default_value = "/var/lib/drive-health")]
    data_dir: PathBuf,

    /// Probe only the given device path (may be repeated)
    #[arg(short = 'D', long = "device")]
    devices: Vec<PathBuf>,

    /// Do not archive the verbatim diagnostic output per device
    #[arg(long)]
    no_archive: bool,

    /// Evaluate and print the summary without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(level)
        .init();

    // smartctl usually needs raw device access
    if !nix::unistd::Uid::effective().is_root() {
        log::warn!("not running as root; smartctl may be unable to read devices");
    }

    let config = monitor::RunConfig {
        data_dir: args.data_dir,
        devices: args.devices,
        archive_raw: !args.no_archive,
        dry_run: args.dry_run,
    };

    let outcome = monitor::run(&config)?;
    print!("{}", outcome.summary);

    log::debug!(
        "run complete: {} evaluated, {} skipped",
        outcome.evaluated,
        outcome.skipped
    );
    if outcome.failures > 0 {
        log::warn!("{} device(s) failed evaluation this run", outcome.failures);
    }

    Ok(())
}
