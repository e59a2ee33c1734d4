//! # Storage Maintenance
//!
//! Operations that act on whole storage areas rather than single documents:
//!
//! - relocating the workspaces root or the todos directory, optionally
//!   carrying existing data along;
//! - clearing a workspace's notes or all todos, after archiving them to
//!   `<dataRoot>/backups/*.tar.gz`.
//!
//! Unlike the migrator these are user-initiated, so failures propagate.
//! Relocation never overwrites: a destination that already exists is left
//! alone and reported as skipped.

use crate::error::{QuickStartError, Result};
use crate::model::NoteIndex;
use crate::paths::{is_month_dir_name, StoragePaths, ATTACHMENTS_DIR, INDEX_FILE, TRASH_DIR};
use crate::sanitize::unique_name;
use crate::store;
use crate::workspaces::WorkspaceRegistry;
use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelocationReport {
    pub from: PathBuf,
    pub to: PathBuf,
    pub moved: usize,
    pub skipped: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClearReport {
    pub cleared: usize,
    pub backup: PathBuf,
}

fn copy_dir_all(from: &Path, to: &Path) -> std::io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Rename, falling back to copy + remove across filesystems.
fn move_path(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    if from.is_dir() {
        if let Err(e) = copy_dir_all(from, to) {
            let _ = fs::remove_dir_all(to);
            return Err(e.into());
        }
        fs::remove_dir_all(from)?;
    } else {
        fs::copy(from, to)?;
        fs::remove_file(from)?;
    }
    Ok(())
}

fn timestamp() -> String {
    Utc::now().format("%Y%m%d-%H%M%S").to_string()
}

#[derive(Debug, Clone)]
pub struct StorageMaintenance {
    paths: StoragePaths,
}

impl StorageMaintenance {
    pub fn new(paths: StoragePaths) -> Self {
        Self { paths }
    }

    /// Points the workspaces root at `new_root` (`None` restores the default).
    /// With `migrate`, every registered workspace folder is moved along.
    pub fn set_root_path(&self, new_root: Option<PathBuf>, migrate: bool) -> Result<RelocationReport> {
        let mut config = self.paths.config();
        let from = self.paths.workspaces_root_for(&config);
        let to = new_root
            .clone()
            .unwrap_or_else(|| self.paths.default_workspaces_root());
        fs::create_dir_all(&to)?;

        let mut report = RelocationReport {
            from: from.clone(),
            to: to.clone(),
            moved: 0,
            skipped: Vec::new(),
        };

        if migrate && from != to && from.is_dir() {
            for record in &config.workspaces {
                let src = from.join(&record.folder_name);
                if record.folder_name.is_empty() || !src.is_dir() {
                    continue;
                }
                let dst = to.join(&record.folder_name);
                if dst.exists() {
                    tracing::warn!(path = %dst.display(), "relocation target exists, skipping");
                    report.skipped.push(src);
                    continue;
                }
                move_path(&src, &dst)?;
                report.moved += 1;
            }
        }

        config.root_path = new_root;
        self.paths.config_store().save(&config)?;

        let registry = WorkspaceRegistry::new(self.paths.clone());
        for record in &config.workspaces {
            registry.ensure_layout(&record.id)?;
        }
        tracing::info!(from = %report.from.display(), to = %report.to.display(), moved = report.moved, "workspaces root relocated");
        Ok(report)
    }

    /// Points the global todos directory at `new_dir` (`None` restores the
    /// default). With `migrate`, existing `*.json` files are moved along.
    pub fn set_todos_path(&self, new_dir: Option<PathBuf>, migrate: bool) -> Result<RelocationReport> {
        let mut config = self.paths.config();
        let from = self.paths.todos_dir_for(&config);
        let to = new_dir
            .clone()
            .unwrap_or_else(|| self.paths.default_todos_dir());
        fs::create_dir_all(&to)?;

        let mut report = RelocationReport {
            from: from.clone(),
            to: to.clone(),
            moved: 0,
            skipped: Vec::new(),
        };

        if migrate && from != to && from.is_dir() {
            for file in todo_files(&from)? {
                let Some(name) = file.file_name() else {
                    continue;
                };
                let dst = to.join(name);
                if dst.exists() {
                    report.skipped.push(file);
                    continue;
                }
                move_path(&file, &dst)?;
                report.moved += 1;
            }
        }

        config.todos_path = new_dir;
        self.paths.config_store().save(&config)?;
        Ok(report)
    }

    /// Archives and empties a workspace's notes. The index keeps its
    /// workspace metadata.
    pub fn clear_notes(&self, ws_id: &str) -> Result<ClearReport> {
        let config = self.paths.config();
        let record = config
            .workspace(ws_id)
            .ok_or_else(|| QuickStartError::WorkspaceNotFound(ws_id.to_string()))?;
        let notes_root = self.paths.notes_root(ws_id)?;
        let index_path = notes_root.join(INDEX_FILE);
        let index: NoteIndex = store::read_json(&index_path, NoteIndex::default());

        let backup = self.backup_target(&format!("notes-{}", record.folder_name))?;
        write_archive(&backup, |tar| tar.append_dir_all("Notes", &notes_root))?;

        for entry in fs::read_dir(&notes_root)?.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();
            if path.is_dir() && (is_month_dir_name(&name) || name == ATTACHMENTS_DIR || name == TRASH_DIR) {
                fs::remove_dir_all(&path)?;
            }
        }
        fs::create_dir_all(notes_root.join(ATTACHMENTS_DIR))?;

        let cleared = NoteIndex {
            workspace: index.workspace,
            notes: Vec::new(),
        };
        store::write_json(&index_path, &cleared)?;

        tracing::info!(workspace = %ws_id, notes = index.notes.len(), backup = %backup.display(), "cleared notes");
        Ok(ClearReport {
            cleared: index.notes.len(),
            backup,
        })
    }

    /// Archives and removes every todo document.
    pub fn clear_todos(&self) -> Result<ClearReport> {
        let dir = self.paths.todos_dir()?;
        let files = todo_files(&dir)?;

        let backup = self.backup_target("todos")?;
        write_archive(&backup, |tar| {
            for file in &files {
                if let Some(name) = file.file_name() {
                    tar.append_path_with_name(file, Path::new("todos").join(name))?;
                }
            }
            Ok(())
        })?;

        for file in &files {
            fs::remove_file(file)?;
            let bak = store::backup_path(file);
            if bak.exists() {
                fs::remove_file(bak)?;
            }
        }

        tracing::info!(todos = files.len(), backup = %backup.display(), "cleared todos");
        Ok(ClearReport {
            cleared: files.len(),
            backup,
        })
    }

    fn backup_target(&self, prefix: &str) -> Result<PathBuf> {
        let dir = self.paths.backups_dir()?;
        let base = format!("{}-{}", prefix, timestamp());
        let name = unique_name(&dir, &base, ".tar.gz");
        Ok(dir.join(format!("{}.tar.gz", name)))
    }
}

fn todo_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == "json"))
        .collect();
    files.sort();
    Ok(files)
}

fn write_archive<F>(target: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut tar::Builder<GzEncoder<File>>) -> std::io::Result<()>,
{
    let file = File::create(target)?;
    let enc = GzEncoder::new(file, Compression::default());
    let mut tar = tar::Builder::new(enc);
    fill(&mut tar)?;
    tar.into_inner()?.finish()?;
    Ok(())
}
