//! # Initialization
//!
//! Startup sequencing. Everything that must happen before the first
//! repository call lives here, in this order:
//!
//! 1. Resolve the data root: explicit override, else `QUICKSTART_DATA_DIR`,
//!    else the platform data directory.
//! 2. Migrate the tree to the current schema.
//! 3. Merge stray per-workspace todos into the global directory.
//! 4. Lay out every registered workspace (`Notes/`, `attachments/`, index).
//!
//! Steps 2 and 3 never fail; their diagnostics come back in
//! [`AppContext::migration`]. Only an unusable data root or a workspace that
//! cannot be laid out aborts startup.
//!
//! The returned [`AppContext`] is the whole application state. There are no
//! globals: UI shells hold the context and pass it where it is needed.

use crate::api::QuickStartApi;
use crate::error::Result;
use crate::migration::{self, MigrationReport};
use crate::paths::{default_data_root, StoragePaths};
use crate::workspaces::WorkspaceRegistry;
use std::path::PathBuf;

pub struct AppContext {
    pub api: QuickStartApi,
    pub migration: MigrationReport,
}

pub fn initialize(data_override: Option<PathBuf>) -> Result<AppContext> {
    let data_root = match data_override {
        Some(path) => path,
        None => default_data_root()?,
    };
    let paths = StoragePaths::new(data_root);
    paths.data_root()?;
    tracing::debug!(root = %paths.data_root_path().display(), "initializing data root");

    let mut report = migration::migrate(&paths);
    report.absorb(migration::consolidate_global_todos(&paths));

    let registry = WorkspaceRegistry::new(paths.clone());
    for workspace in registry.list() {
        registry.ensure_layout(&workspace.id)?;
    }

    Ok(AppContext {
        api: QuickStartApi::new(paths),
        migration: report,
    })
}
