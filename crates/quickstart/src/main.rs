//! # QuickStart CLI
//!
//! The binary is intentionally thin: the CLI lives in `src/cli/`, this file
//! only invokes `cli::run()` and handles process termination.
//!
//! ## Layering
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/quickstart/src/cli/)                  │
//! │  - clap argument parsing (setup.rs)                      │
//! │  - dispatch + input gathering (commands.rs)              │
//! │  - terminal output (render.rs)                           │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │  API Layer (crates/quickstartapp/src/api.rs)             │
//! │  - QuickStartApi, Outcome<T> envelopes                   │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │  Storage core (notes, workspaces, todos, migration)      │
//! │  - no knowledge of stdout/stderr or exit codes           │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Output Conventions
//!
//! - Mutations print their `Outcome` as JSON on stdout.
//! - Listings print colored text, or JSON with `--json`.
//! - Failures print `Error: ...` on stderr and exit with status 1.
//! - Logs go to stderr (`-v` or `QUICKSTART_LOG=debug`), so stdout stays
//!   machine-readable.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
