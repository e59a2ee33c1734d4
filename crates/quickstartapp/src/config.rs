//! # Configuration Document
//!
//! `config.json` at the data root is the single process-wide configuration and
//! the root of all path resolution. The core understands a handful of keys;
//! everything else belongs to the UI and must survive every write untouched.
//!
//! ## Core Keys
//!
//! | Key | Type | Meaning |
//! |-----|------|---------|
//! | `schemaVersion` | integer | On-disk layout version, gates migration |
//! | `activeWorkspaceId` | string | Workspace selected in the UI |
//! | `workspaces` | array | Ordered [`WorkspaceRecord`]s (display order) |
//! | `rootPath` | string? | Override for the workspaces root |
//! | `todosPath` | string? | Override for the global todos directory |
//!
//! ## Passthrough Keys
//!
//! Any other key (`hotkey`, `theme`, `ai`, `autoStart`, ...) lands in
//! [`Config::extra`] via `#[serde(flatten)]` and is written back verbatim.
//! `serde_json` is built with `preserve_order`, so their order is stable too.
//!
//! UI-owned keys are changed through [`Config::set_passthrough`], which refuses
//! to touch core keys: only the workspace registry and the storage relocation
//! operations write those.
//!
//! ## Freshness
//!
//! [`ConfigStore::load`] re-reads the file on every call. Nothing is cached
//! between operations, so every component sees the latest persisted state.

use crate::error::{QuickStartError, Result};
use crate::store;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Layout version written by this release.
pub const CURRENT_SCHEMA_VERSION: u32 = 3;

pub const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_WORKSPACE_ID: &str = "default";
pub const DEFAULT_WORKSPACE_NAME: &str = "默认";
pub const DEFAULT_WORKSPACE_COLOR: &str = "#6366f1";

const CORE_KEYS: &[&str] = &[
    "schemaVersion",
    "activeWorkspaceId",
    "workspaces",
    "rootPath",
    "todosPath",
];

fn default_active_workspace() -> String {
    DEFAULT_WORKSPACE_ID.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
    /// Empty only for records read from a v2 config, before migration.
    #[serde(default)]
    pub folder_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkspaceRecord {
    pub fn new(id: &str, name: &str, color: &str, folder_name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
            folder_name: folder_name.to_string(),
            extra: Map::new(),
        }
    }

    pub fn default_workspace() -> Self {
        Self::new(
            DEFAULT_WORKSPACE_ID,
            DEFAULT_WORKSPACE_NAME,
            DEFAULT_WORKSPACE_COLOR,
            DEFAULT_WORKSPACE_NAME,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default = "default_active_workspace")]
    pub active_workspace_id: String,
    #[serde(default)]
    pub workspaces: Vec<WorkspaceRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub todos_path: Option<PathBuf>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            active_workspace_id: default_active_workspace(),
            workspaces: vec![WorkspaceRecord::default_workspace()],
            root_path: None,
            todos_path: None,
            extra: Map::new(),
        }
    }
}

impl Config {
    pub fn workspace(&self, id: &str) -> Option<&WorkspaceRecord> {
        self.workspaces.iter().find(|ws| ws.id == id)
    }

    pub fn workspace_mut(&mut self, id: &str) -> Option<&mut WorkspaceRecord> {
        self.workspaces.iter_mut().find(|ws| ws.id == id)
    }

    /// Shallow-merges UI-owned keys into the passthrough bag.
    pub fn set_passthrough(&mut self, partial: Map<String, Value>) -> Result<()> {
        if let Some(key) = partial.keys().find(|k| CORE_KEYS.contains(&k.as_str())) {
            return Err(QuickStartError::Invariant(format!(
                "'{}' is managed by the storage core and cannot be set directly",
                key
            )));
        }
        for (key, value) in partial {
            self.extra.insert(key, value);
        }
        Ok(())
    }

    /// The whole document as a JSON object (core + passthrough keys).
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Reads and writes `config.json` through the atomic JSON store.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(data_root: &Path) -> Self {
        Self {
            path: data_root.join(CONFIG_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if either generation of the document is on disk.
    pub fn exists(&self) -> bool {
        self.path.exists() || store::backup_path(&self.path).exists()
    }

    /// Reads the persisted document, or `None` if nothing usable exists.
    pub fn try_load(&self) -> Option<Config> {
        store::try_read_json(&self.path)
    }

    pub fn load(&self) -> Config {
        self.try_load().unwrap_or_default()
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        store::write_json(&self.path, config)
    }

    /// Read-modify-write in one call. The closure's error aborts the write.
    pub fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Config) -> Result<T>,
    {
        let mut config = self.load();
        let out = f(&mut config)?;
        self.save(&config)?;
        Ok(out)
    }
}
