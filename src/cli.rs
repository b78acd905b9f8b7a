// src/cli.rs
use clap::Parser;
use tracing::info;

use crate::browser::cdp::ChromeLauncher;
use crate::config::{Args, Config, OperatingZone};
use crate::error::Result;
use crate::progress::TracingProgress;
use crate::runner::Pipeline;

/// Parse args/env, run once, print the confirmation line.
pub fn run() -> Result<()> {
    let args = Args::parse();
    crate::log::init(if args.verbose { "debug" } else { "info" });

    let config = Config::resolve(args)?;
    info!(log = %config.data_csv.display(), snapshot = config.snapshot_html.is_some(), "config resolved");

    let launcher = config
        .browser_args
        .iter()
        .fold(ChromeLauncher::new(&config.browser), |l, a| l.arg(a));

    let summary = Pipeline::new(config, launcher, OperatingZone::jst())
        .run(Some(&mut TracingProgress))?;

    println!("OK: {}", summary.row);
    Ok(())
}
