//! # Workspace Registry
//!
//! Workspaces are defined by [`WorkspaceRecord`]s in the config and backed by
//! one folder each under the workspaces root. The registry is the only writer
//! of those records.
//!
//! ## Identity vs Folder
//!
//! - `id`: generated once, immutable, never reused.
//! - `name`: free text shown in the UI.
//! - `folderName`: sanitized, unique within the root, may differ from `name`
//!   (two workspaces named "A" live in `A/` and `A (2)/`).
//!
//! ## Rename Is Transactional
//!
//! The physical directory is renamed first. The record only changes if that
//! succeeded, so config and disk never disagree about a workspace's folder.
//! If persisting the config fails afterwards, the directory rename is rolled
//! back.
//!
//! ## Delete Keeps Files
//!
//! Deleting removes the record only. The folder stays on disk and can be
//! recovered by hand. The distinguished `default` workspace cannot be deleted.

use crate::config::{Config, WorkspaceRecord, DEFAULT_WORKSPACE_ID};
use crate::error::{QuickStartError, Result};
use crate::model::{generate_id, NoteIndex, WorkspaceMetadata};
use crate::paths::{StoragePaths, INDEX_FILE};
use crate::sanitize::{sanitize_name, unique_name_by, WORKSPACE_NAME_MAX};
use crate::store;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

pub(crate) fn metadata_for(record: &WorkspaceRecord) -> WorkspaceMetadata {
    WorkspaceMetadata {
        id: record.id.clone(),
        name: record.name.clone(),
        color: record.color.clone(),
        icon: None,
        created_at: Some(Utc::now()),
    }
}

/// Picks a folder name for `name` under `root`. A folder is taken if it
/// exists on disk or is claimed by a record other than `own_id`.
fn pick_folder_name(config: &Config, root: &Path, name: &str, own_id: Option<&str>) -> String {
    let own_folder = own_id
        .and_then(|id| config.workspace(id))
        .map(|ws| ws.folder_name.as_str());
    let base = sanitize_name(name, WORKSPACE_NAME_MAX);
    unique_name_by(&base, "", |candidate| {
        if Some(candidate) == own_folder {
            return false;
        }
        root.join(candidate).exists()
            || config
                .workspaces
                .iter()
                .any(|ws| ws.folder_name == candidate && Some(ws.id.as_str()) != own_id)
    })
}

#[derive(Debug, Clone)]
pub struct WorkspaceRegistry {
    paths: StoragePaths,
}

impl WorkspaceRegistry {
    pub fn new(paths: StoragePaths) -> Self {
        Self { paths }
    }

    pub fn list(&self) -> Vec<WorkspaceRecord> {
        self.paths.config().workspaces
    }

    pub fn get(&self, id: &str) -> Result<WorkspaceRecord> {
        self.paths
            .config()
            .workspace(id)
            .cloned()
            .ok_or_else(|| QuickStartError::WorkspaceNotFound(id.to_string()))
    }

    pub fn active(&self) -> String {
        self.paths.config().active_workspace_id
    }

    pub fn set_active(&self, id: &str) -> Result<()> {
        self.paths.config_store().update(|config| {
            if config.workspace(id).is_none() {
                return Err(QuickStartError::WorkspaceNotFound(id.to_string()));
            }
            config.active_workspace_id = id.to_string();
            Ok(())
        })
    }

    pub fn create(&self, name: &str, color: &str) -> Result<WorkspaceRecord> {
        let name = name.trim();
        if name.is_empty() {
            return Err(QuickStartError::InvalidInput(
                "workspace name cannot be empty".to_string(),
            ));
        }

        let root = self.paths.workspaces_root()?;
        let mut config = self.paths.config();
        let folder = pick_folder_name(&config, &root, name, None);

        // create_dir (not create_dir_all) fails if the name was claimed meanwhile.
        fs::create_dir(root.join(&folder))?;

        let record = WorkspaceRecord::new(&generate_id(), name, color, &folder);
        config.workspaces.push(record.clone());
        self.paths.config_store().save(&config)?;
        self.ensure_layout(&record.id)?;

        tracing::info!(id = %record.id, folder = %folder, "created workspace");
        Ok(record)
    }

    pub fn rename(
        &self,
        id: &str,
        new_name: &str,
        new_color: Option<&str>,
    ) -> Result<WorkspaceRecord> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(QuickStartError::InvalidInput(
                "workspace name cannot be empty".to_string(),
            ));
        }

        let mut config = self.paths.config();
        let current = config
            .workspace(id)
            .cloned()
            .ok_or_else(|| QuickStartError::WorkspaceNotFound(id.to_string()))?;

        let root = self.paths.workspaces_root_for(&config);
        let target = pick_folder_name(&config, &root, new_name, Some(id));

        let mut moved: Option<(PathBuf, PathBuf)> = None;
        if target != current.folder_name {
            let from = root.join(&current.folder_name);
            let to = root.join(&target);
            if from.exists() {
                fs::rename(&from, &to).map_err(|e| {
                    tracing::warn!(from = %from.display(), to = %to.display(), error = %e, "workspace folder rename failed");
                    QuickStartError::Store(format!(
                        "could not rename workspace folder '{}' to '{}': {}",
                        current.folder_name, target, e
                    ))
                })?;
                moved = Some((from, to));
            }
        }

        let updated = {
            let record = config
                .workspace_mut(id)
                .ok_or_else(|| QuickStartError::WorkspaceNotFound(id.to_string()))?;
            record.name = new_name.to_string();
            if let Some(color) = new_color {
                record.color = color.to_string();
            }
            record.folder_name = target;
            record.clone()
        };

        if let Err(e) = self.paths.config_store().save(&config) {
            if let Some((from, to)) = moved {
                if let Err(undo) = fs::rename(&to, &from) {
                    tracing::warn!(path = %to.display(), error = %undo, "could not roll back workspace folder rename");
                }
            }
            return Err(e);
        }

        self.refresh_index_metadata(&updated);
        Ok(updated)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        if id == DEFAULT_WORKSPACE_ID {
            return Err(QuickStartError::Invariant(
                "the default workspace cannot be deleted".to_string(),
            ));
        }
        self.paths.config_store().update(|config| {
            let pos = config
                .workspaces
                .iter()
                .position(|ws| ws.id == id)
                .ok_or_else(|| QuickStartError::WorkspaceNotFound(id.to_string()))?;
            let removed = config.workspaces.remove(pos);
            if config.active_workspace_id == id {
                config.active_workspace_id = DEFAULT_WORKSPACE_ID.to_string();
            }
            tracing::info!(id = %id, folder = %removed.folder_name, "removed workspace record; folder kept on disk");
            Ok(())
        })
    }

    /// Creates `Notes/`, `Notes/attachments/` and an empty index if missing.
    /// Returns the notes root.
    pub fn ensure_layout(&self, id: &str) -> Result<PathBuf> {
        let record = self.get(id)?;
        let notes_root = self.paths.notes_root(id)?;
        self.paths.attachments_dir(id)?;

        let index_path = notes_root.join(INDEX_FILE);
        if !index_path.exists() && !store::backup_path(&index_path).exists() {
            let index = NoteIndex {
                workspace: Some(metadata_for(&record)),
                notes: Vec::new(),
            };
            store::write_json(&index_path, &index)?;
        }
        Ok(notes_root)
    }

    fn refresh_index_metadata(&self, record: &WorkspaceRecord) {
        let config = self.paths.config();
        let index_path = self.paths.notes_root_for(&config, &record.id).join(INDEX_FILE);
        if !index_path.is_file() {
            return;
        }
        let Some(mut index) = store::try_read_json::<NoteIndex>(&index_path) else {
            return;
        };
        let created_at = index.workspace.as_ref().and_then(|ws| ws.created_at);
        let icon = index.workspace.as_ref().and_then(|ws| ws.icon.clone());
        let mut meta = metadata_for(record);
        meta.created_at = created_at.or(meta.created_at);
        meta.icon = icon;
        index.workspace = Some(meta);
        if let Err(e) = store::write_json(&index_path, &index) {
            tracing::warn!(path = %index_path.display(), error = %e, "could not refresh workspace metadata in index");
        }
    }
}
