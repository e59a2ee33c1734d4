//! # Path Resolution
//!
//! All on-disk locations are derived from the data root plus the persisted
//! [`Config`]. The config is re-read on every call, never cached, so a path
//! computed after a workspace rename or a root relocation is always current.
//!
//! ## Current Layout (schema v3)
//!
//! ```text
//! <dataRoot>/
//!   config.json
//!   workspaces/                 # or config.rootPath
//!     <folderName>/
//!       Notes/
//!         index.json
//!         attachments/
//!         YYYY-MM/<title>.md
//!   todos/                      # or config.todosPath
//!     YYYY-MM-DD.json
//! ```
//!
//! ## Contract
//!
//! Every accessor is idempotent and limited to `mkdir -p` side effects. None
//! of them mutates the config. The `*_for` variants are pure functions of a
//! config value and create nothing; the migrator uses them to inspect a tree
//! without touching it.

use crate::config::{Config, ConfigStore, DEFAULT_WORKSPACE_NAME};
use crate::error::{QuickStartError, Result};
use directories::BaseDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the folder created under the platform data directory.
pub const DATA_DIR_NAME: &str = "QuickStart-Data";

/// Overrides the data root (primarily for tests and portable installs).
pub const DATA_DIR_ENV: &str = "QUICKSTART_DATA_DIR";

pub const WORKSPACES_DIR: &str = "workspaces";
pub const TODOS_DIR: &str = "todos";
pub const NOTES_DIR: &str = "Notes";
pub const ATTACHMENTS_DIR: &str = "attachments";
pub const INDEX_FILE: &str = "index.json";
pub const TRASH_DIR: &str = ".trash";
pub const BACKUPS_DIR: &str = "backups";

/// Resolves the data root: `QUICKSTART_DATA_DIR` if set, else the platform
/// application-data directory joined with [`DATA_DIR_NAME`].
pub fn default_data_root() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let base = BaseDirs::new().ok_or_else(|| {
        QuickStartError::Store("could not determine the platform data directory".to_string())
    })?;
    Ok(base.data_dir().join(DATA_DIR_NAME))
}

/// True for month folder names of the form `YYYY-MM`.
pub fn is_month_dir_name(name: &str) -> bool {
    let b = name.as_bytes();
    b.len() == 7
        && b[4] == b'-'
        && b[..4].iter().all(u8::is_ascii_digit)
        && b[5..].iter().all(u8::is_ascii_digit)
}

fn ensure_dir(path: PathBuf) -> Result<PathBuf> {
    fs::create_dir_all(&path)?;
    Ok(path)
}

#[derive(Debug, Clone)]
pub struct StoragePaths {
    data_root: PathBuf,
    config: ConfigStore,
}

impl StoragePaths {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        let data_root = data_root.into();
        let config = ConfigStore::new(&data_root);
        Self { data_root, config }
    }

    pub fn config_store(&self) -> &ConfigStore {
        &self.config
    }

    /// Fresh read of the persisted config.
    pub fn config(&self) -> Config {
        self.config.load()
    }

    /// The data root, without creating it.
    pub fn data_root_path(&self) -> &Path {
        &self.data_root
    }

    pub fn data_root(&self) -> Result<PathBuf> {
        ensure_dir(self.data_root.clone())
    }

    pub fn workspaces_root(&self) -> Result<PathBuf> {
        let root = self.workspaces_root_for(&self.config());
        tracing::debug!(path = %root.display(), "resolved workspaces root");
        ensure_dir(root)
    }

    pub fn workspace_dir(&self, ws_id: &str) -> Result<PathBuf> {
        ensure_dir(self.workspace_dir_for(&self.config(), ws_id))
    }

    pub fn notes_root(&self, ws_id: &str) -> Result<PathBuf> {
        ensure_dir(self.notes_root_for(&self.config(), ws_id))
    }

    pub fn attachments_dir(&self, ws_id: &str) -> Result<PathBuf> {
        ensure_dir(self.notes_root_for(&self.config(), ws_id).join(ATTACHMENTS_DIR))
    }

    pub fn todos_dir(&self) -> Result<PathBuf> {
        ensure_dir(self.todos_dir_for(&self.config()))
    }

    pub fn backups_dir(&self) -> Result<PathBuf> {
        ensure_dir(self.data_root.join(BACKUPS_DIR))
    }

    /// `Notes/index.json` of a workspace (its directory is created).
    pub fn index_path(&self, ws_id: &str) -> Result<PathBuf> {
        Ok(self.notes_root(ws_id)?.join(INDEX_FILE))
    }

    // --- Pure variants ---

    pub fn default_workspaces_root(&self) -> PathBuf {
        self.data_root.join(WORKSPACES_DIR)
    }

    pub fn default_todos_dir(&self) -> PathBuf {
        self.data_root.join(TODOS_DIR)
    }

    pub fn workspaces_root_for(&self, config: &Config) -> PathBuf {
        config
            .root_path
            .clone()
            .unwrap_or_else(|| self.default_workspaces_root())
    }

    /// Falls back to the default folder name for unknown ids; that branch is
    /// only reachable with a hand-edited config.
    pub fn workspace_dir_for(&self, config: &Config, ws_id: &str) -> PathBuf {
        let folder = config
            .workspace(ws_id)
            .map(|ws| ws.folder_name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_WORKSPACE_NAME);
        self.workspaces_root_for(config).join(folder)
    }

    pub fn notes_root_for(&self, config: &Config, ws_id: &str) -> PathBuf {
        self.workspace_dir_for(config, ws_id).join(NOTES_DIR)
    }

    pub fn todos_dir_for(&self, config: &Config) -> PathBuf {
        config
            .todos_path
            .clone()
            .unwrap_or_else(|| self.default_todos_dir())
    }
}
