//! # CLI Behavior
//!
//! This is **one possible UI client** for the QuickStart storage core, not
//! the application itself. The CLI is the only place that knows about
//! terminal I/O, exit codes and output formatting.
//!
//! ## Startup
//!
//! Every invocation runs the full startup sequence
//! ([`quickstartapp::init::initialize`]) before dispatching, so an old data
//! directory is migrated the first time any command touches it. `quickstart
//! init` does only that and prints the migration report.
//!
//! ## Workspace Selection
//!
//! Note commands act on the active workspace unless `--ws <id>` is given.
//! `quickstart ws use <id>` changes the active workspace for later calls.
//!
//! ## Logging
//!
//! `tracing` events from the core go to stderr. The filter comes from
//! `QUICKSTART_LOG` (e.g. `QUICKSTART_LOG=quickstartapp=debug`), defaulting
//! to `warn`, or `debug` with `-v`.
//!
//! ## Module Structure
//!
//! - `setup`: argument parsing via clap, version string
//! - `commands`: per-command handlers calling the API
//! - `render`: text and JSON output

mod commands;
mod render;
pub mod setup;

use anyhow::Result;
use quickstartapp::init::initialize;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "QUICKSTART_LOG";

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    // A second init (tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run() -> Result<()> {
    let cli = setup::parse_cli();
    init_tracing(cli.verbose);

    let ctx = initialize(cli.data_dir.clone())?;
    tracing::debug!(
        data_root = %ctx.api.paths().data_root_path().display(),
        diagnostics = ctx.migration.diagnostics.len(),
        "startup complete"
    );
    commands::dispatch(ctx, cli)
}
