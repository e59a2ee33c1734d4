//! # Schema Migration
//!
//! Upgrades whatever is on disk to the current layout (schema v3). Runs once
//! at startup, before any repository call.
//!
//! ## Versions
//!
//! | Version | Layout |
//! |---------|--------|
//! | 1 | one flat notes root: `index.json`, `notes/<date>_<id>.md`, `<YYYY-MM>/<date>_<id>.md` |
//! | 2 | `<root>/<workspaceId>/` holding `index.json`, month folders, `attachments/` |
//! | 3 | `<root>/<folderName>/Notes/` holding the same, global `todos/` |
//!
//! Detection: the config's `schemaVersion` (0 reads as 1). Without a config, a
//! legacy notes root at `<dataRoot>/workspaces/default` means v1; otherwise
//! it is a fresh install and the v3 config is written directly.
//!
//! ## Guarantees
//!
//! - Transitions are forward only and cumulative (v1 runs both phases).
//! - A tree already at v3 returns before any file is touched, so running the
//!   migrator on every launch is a no-op.
//! - Nothing here returns an error. Every failed filesystem step is skipped,
//!   logged with `tracing::warn!` and recorded as a [`MigrationDiagnostic`],
//!   and the pass carries on with the rest of the tree.
//!
//! ## Todo Consolidation
//!
//! [`consolidate_global_todos`] runs on every launch independently of the
//! version. It merges stray per-workspace `todos/`/`Todos/` folders into the
//! global todos directory. Existing destination files win; a source file is
//! removed only after it was copied.

use crate::config::{
    Config, WorkspaceRecord, CURRENT_SCHEMA_VERSION, DEFAULT_WORKSPACE_COLOR,
    DEFAULT_WORKSPACE_ID, DEFAULT_WORKSPACE_NAME,
};
use crate::model::{derive_title, generate_id, make_preview, parse_date, NoteIndex, NoteMeta};
use crate::paths::{
    is_month_dir_name, StoragePaths, ATTACHMENTS_DIR, INDEX_FILE, NOTES_DIR, WORKSPACES_DIR,
};
use crate::sanitize::{sanitize_name, unique_name, unique_name_by, NOTE_NAME_MAX, WORKSPACE_NAME_MAX};
use crate::store;
use crate::workspaces::metadata_for;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

/// Config keys only v1 understood. Dropped once their content was moved.
const LEGACY_NOTES_ROOT_KEY: &str = "notesRootPath";
const LEGACY_ATTACHMENTS_KEY: &str = "attachmentsPath";

const LEGACY_NOTES_DIR: &str = "notes";
const LEGACY_TODO_DIRS: &[&str] = &["todos", "Todos"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    Read,
    Write,
    Copy,
    Rename,
    Remove,
    CreateDir,
}

/// One skipped filesystem step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MigrationDiagnostic {
    pub path: PathBuf,
    pub kind: DiagnosticKind,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub from_version: u32,
    pub to_version: u32,
    pub notes_migrated: usize,
    pub todos_merged: usize,
    pub workspaces_renamed: usize,
    pub diagnostics: Vec<MigrationDiagnostic>,
}

impl MigrationReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Folds the counters and diagnostics of `other` into `self`.
    pub fn absorb(&mut self, other: MigrationReport) {
        self.notes_migrated += other.notes_migrated;
        self.todos_merged += other.todos_merged;
        self.workspaces_renamed += other.workspaces_renamed;
        self.diagnostics.extend(other.diagnostics);
    }

    /// Unwraps `result`, or records a diagnostic and yields `None`.
    fn attempt<T, E: Display>(
        &mut self,
        path: &Path,
        kind: DiagnosticKind,
        result: std::result::Result<T, E>,
    ) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(path = %path.display(), kind = ?kind, error = %e, "migration step skipped");
                self.diagnostics.push(MigrationDiagnostic {
                    path: path.to_path_buf(),
                    kind,
                    message: e.to_string(),
                });
                None
            }
        }
    }

    fn ensure_dir(&mut self, dir: &Path) -> bool {
        self.attempt(dir, DiagnosticKind::CreateDir, fs::create_dir_all(dir))
            .is_some()
    }

    /// Copies `from` to `to`, then removes `from`. True once the copy landed,
    /// even if the source could not be removed.
    fn relocate(&mut self, from: &Path, to: &Path) -> bool {
        if self
            .attempt(from, DiagnosticKind::Copy, fs::copy(from, to))
            .is_none()
        {
            return false;
        }
        self.attempt(from, DiagnosticKind::Remove, fs::remove_file(from));
        true
    }

    fn list_dir(&mut self, dir: &Path) -> Vec<PathBuf> {
        let Some(entries) = self.attempt(dir, DiagnosticKind::Read, fs::read_dir(dir)) else {
            return Vec::new();
        };
        let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
        paths.sort();
        paths
    }
}

/// Reads the on-disk schema version without touching anything. `None` means
/// there is nothing to migrate (fresh data root).
pub fn detect_version(paths: &StoragePaths) -> Option<u32> {
    version_of(paths.config_store().try_load().as_ref(), paths)
}

fn version_of(stored: Option<&Config>, paths: &StoragePaths) -> Option<u32> {
    match stored {
        Some(config) => Some(config.schema_version.max(1)),
        None if has_legacy_tree(paths) => Some(1),
        None => None,
    }
}

fn default_legacy_root(paths: &StoragePaths) -> PathBuf {
    paths
        .data_root_path()
        .join(WORKSPACES_DIR)
        .join(DEFAULT_WORKSPACE_ID)
}

fn has_legacy_tree(paths: &StoragePaths) -> bool {
    let root = default_legacy_root(paths);
    root.join(INDEX_FILE).exists() || root.join(LEGACY_NOTES_DIR).is_dir()
}

/// Brings the data tree to [`CURRENT_SCHEMA_VERSION`]. Never fails; see the
/// returned report for skipped steps.
pub fn migrate(paths: &StoragePaths) -> MigrationReport {
    let mut report = MigrationReport::default();
    let store = paths.config_store();

    let stored = store.try_load();
    let Some(version) = version_of(stored.as_ref(), paths) else {
        report.from_version = CURRENT_SCHEMA_VERSION;
        report.to_version = CURRENT_SCHEMA_VERSION;
        report.ensure_dir(paths.data_root_path());
        report.attempt(store.path(), DiagnosticKind::Write, store.save(&Config::default()));
        tracing::info!(root = %paths.data_root_path().display(), "fresh data root initialized");
        return report;
    };

    report.from_version = version;
    report.to_version = version;
    if version >= CURRENT_SCHEMA_VERSION {
        return report;
    }

    let mut config = stored.unwrap_or_else(|| Config {
        schema_version: 1,
        workspaces: Vec::new(),
        ..Config::default()
    });

    tracing::info!(from = version, to = CURRENT_SCHEMA_VERSION, "migrating data tree");
    if version < 2 {
        migrate_v1_to_v2(paths, &mut config, &mut report);
    }
    migrate_v2_to_v3(paths, &mut config, &mut report);

    config.schema_version = CURRENT_SCHEMA_VERSION;
    if report
        .attempt(store.path(), DiagnosticKind::Write, store.save(&config))
        .is_some()
    {
        report.to_version = CURRENT_SCHEMA_VERSION;
    }

    tracing::info!(
        notes = report.notes_migrated,
        todos = report.todos_merged,
        workspaces = report.workspaces_renamed,
        skipped = report.diagnostics.len(),
        "migration finished"
    );
    report
}

// --- v1 -> v2 ---

/// `2024-03-05_abc123` -> (2024-03-05, "abc123")
fn parse_legacy_stem(stem: &str) -> Option<(NaiveDate, &str)> {
    let (date, id) = stem.split_once('_')?;
    let date = parse_date(date)?;
    (!id.is_empty()).then_some((date, id))
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or_else(Utc::now)
}

fn legacy_content_files(report: &mut MigrationReport, legacy_root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let flat = legacy_root.join(LEGACY_NOTES_DIR);
    if flat.is_dir() {
        files.extend(report.list_dir(&flat));
    }
    if legacy_root.is_dir() {
        for dir in report.list_dir(legacy_root) {
            let is_month = dir
                .file_name()
                .map(|n| is_month_dir_name(&n.to_string_lossy()))
                .unwrap_or(false);
            if is_month && dir.is_dir() {
                files.extend(report.list_dir(&dir));
            }
        }
    }
    files.retain(|p| {
        p.is_file()
            && p.extension().is_some_and(|e| e == "md")
            && p.file_stem()
                .is_some_and(|s| parse_legacy_stem(&s.to_string_lossy()).is_some())
    });
    files
}

/// Moves one legacy content file into `<target>/<month>/<title>.md` and
/// returns the new file name.
fn move_note_file(
    report: &mut MigrationReport,
    source: &Path,
    target_root: &Path,
    meta: &NoteMeta,
) -> Option<String> {
    let month_dir = target_root.join(meta.month());
    if !report.ensure_dir(&month_dir) {
        return None;
    }
    let base = sanitize_name(&meta.title, NOTE_NAME_MAX);
    let file_name = format!("{}.md", unique_name(&month_dir, &base, ".md"));
    report
        .relocate(source, &month_dir.join(&file_name))
        .then_some(file_name)
}

fn copy_missing_files(report: &mut MigrationReport, from: &Path, to: &Path) {
    if !from.is_dir() || !report.ensure_dir(to) {
        return;
    }
    for file in report.list_dir(from) {
        let Some(name) = file.file_name() else {
            continue;
        };
        let target = to.join(name);
        if file.is_file() && !target.exists() {
            report.attempt(&file, DiagnosticKind::Copy, fs::copy(&file, &target));
        }
    }
}

fn migrate_v1_to_v2(paths: &StoragePaths, config: &mut Config, report: &mut MigrationReport) {
    let legacy_root = config
        .extra
        .get(LEGACY_NOTES_ROOT_KEY)
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
        .filter(|p| p.is_dir())
        .unwrap_or_else(|| default_legacy_root(paths));
    let target = paths
        .workspaces_root_for(config)
        .join(DEFAULT_WORKSPACE_ID);

    tracing::info!(from = %legacy_root.display(), to = %target.display(), "v1 -> v2");
    if !report.ensure_dir(&target) {
        return;
    }

    let mut index: NoteIndex =
        store::try_read_json(&legacy_root.join(INDEX_FILE)).unwrap_or_default();
    let mut pending = legacy_content_files(report, &legacy_root);

    for meta in index.notes.iter_mut() {
        if !meta.file_name.is_empty() && target.join(meta.month()).join(&meta.file_name).is_file() {
            continue;
        }
        let Some(pos) = pending.iter().position(|p| {
            p.file_name()
                .is_some_and(|n| n.to_string_lossy().contains(meta.id.as_str()))
        }) else {
            continue;
        };
        let source = pending.remove(pos);
        if let Some(file_name) = move_note_file(report, &source, &target, meta) {
            meta.file_name = file_name;
            report.notes_migrated += 1;
        }
    }

    let known: HashSet<String> = index.notes.iter().map(|n| n.id.clone()).collect();
    for source in pending {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let Some((date, legacy_id)) = parse_legacy_stem(&stem) else {
            continue;
        };
        let Some(content) = report.attempt(&source, DiagnosticKind::Read, fs::read_to_string(&source)) else {
            continue;
        };
        let id = if known.contains(legacy_id) {
            generate_id()
        } else {
            legacy_id.to_string()
        };
        let stamp = start_of_day(date);
        let mut meta = NoteMeta {
            id,
            title: derive_title(None, &content),
            preview: make_preview(&content),
            tags: Vec::new(),
            created_at: stamp,
            updated_at: stamp,
            is_deleted: false,
            deleted_at: None,
            file_name: String::new(),
            status_icon: None,
        };
        if let Some(file_name) = move_note_file(report, &source, &target, &meta) {
            meta.file_name = file_name;
            report.notes_migrated += 1;
            tracing::info!(id = %meta.id, "adopted orphan note file");
            index.notes.push(meta);
        }
    }

    if config.workspace(DEFAULT_WORKSPACE_ID).is_none() {
        config.workspaces.insert(
            0,
            WorkspaceRecord::new(
                DEFAULT_WORKSPACE_ID,
                DEFAULT_WORKSPACE_NAME,
                DEFAULT_WORKSPACE_COLOR,
                "",
            ),
        );
    }
    if index.workspace.is_none() {
        index.workspace = config.workspace(DEFAULT_WORKSPACE_ID).map(metadata_for);
    }
    let index_path = target.join(INDEX_FILE);
    report.attempt(&index_path, DiagnosticKind::Write, store::write_json(&index_path, &index));

    let flat = legacy_root.join(LEGACY_NOTES_DIR);
    if flat.is_dir() && fs::read_dir(&flat).is_ok_and(|mut d| d.next().is_none()) {
        report.attempt(&flat, DiagnosticKind::Remove, fs::remove_dir(&flat));
    }

    let attachments = target.join(ATTACHMENTS_DIR);
    if legacy_root != target {
        copy_missing_files(report, &legacy_root.join(ATTACHMENTS_DIR), &attachments);
    }
    if let Some(custom) = config
        .extra
        .get(LEGACY_ATTACHMENTS_KEY)
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
    {
        if custom != attachments {
            copy_missing_files(report, &custom, &attachments);
        }
    }

    let todos = paths.todos_dir_for(config);
    for name in LEGACY_TODO_DIRS {
        let dir = legacy_root.join(name);
        if dir.is_dir() && dir != todos {
            merge_todo_dir(report, &dir, &todos);
        }
    }

    config.extra.remove(LEGACY_NOTES_ROOT_KEY);
    config.extra.remove(LEGACY_ATTACHMENTS_KEY);
    if config.workspace(&config.active_workspace_id).is_none() {
        config.active_workspace_id = DEFAULT_WORKSPACE_ID.to_string();
    }
}

// --- v2 -> v3 ---

/// Moves `from` to `to`. Directories that already exist at `to` are merged
/// entry by entry; conflicting files stay where they are.
fn move_merge(report: &mut MigrationReport, from: &Path, to: &Path) {
    if !to.exists() {
        report.attempt(from, DiagnosticKind::Rename, fs::rename(from, to));
        return;
    }
    if !(from.is_dir() && to.is_dir()) {
        return;
    }
    for child in report.list_dir(from) {
        if let Some(name) = child.file_name() {
            move_merge(report, &child, &to.join(name));
        }
    }
    if fs::read_dir(from).is_ok_and(|mut d| d.next().is_none()) {
        report.attempt(from, DiagnosticKind::Remove, fs::remove_dir(from));
    }
}

fn is_notes_entry(path: &Path) -> bool {
    let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        return false;
    };
    name == ATTACHMENTS_DIR
        || name == INDEX_FILE
        || name == store::backup_path(Path::new(INDEX_FILE)).to_string_lossy()
        || (is_month_dir_name(&name) && path.is_dir())
}

fn migrate_v2_to_v3(paths: &StoragePaths, config: &mut Config, report: &mut MigrationReport) {
    let root = paths.workspaces_root_for(config);
    if !report.ensure_dir(&root) {
        return;
    }
    let todos = paths.todos_dir_for(config);
    let mut assigned: HashSet<String> = HashSet::new();

    for i in 0..config.workspaces.len() {
        let record = config.workspaces[i].clone();

        let folder = if !record.folder_name.is_empty() && root.join(&record.folder_name).is_dir() {
            record.folder_name.clone()
        } else {
            let base = sanitize_name(&record.name, WORKSPACE_NAME_MAX);
            let target = unique_name_by(&base, "", |c| {
                c != record.id && (root.join(c).exists() || assigned.contains(c))
            });
            let old_dir = root.join(&record.id);
            if target != record.id && old_dir.is_dir() {
                let renamed = report
                    .attempt(&old_dir, DiagnosticKind::Rename, fs::rename(&old_dir, root.join(&target)))
                    .is_some();
                if renamed {
                    report.workspaces_renamed += 1;
                    target
                } else {
                    record.id.clone()
                }
            } else {
                target
            }
        };
        assigned.insert(folder.clone());
        config.workspaces[i].folder_name = folder.clone();

        let ws_dir = root.join(&folder);
        if !ws_dir.is_dir() {
            continue;
        }
        let notes_dir = ws_dir.join(NOTES_DIR);
        if !report.ensure_dir(&notes_dir) {
            continue;
        }
        for entry in report.list_dir(&ws_dir) {
            if is_notes_entry(&entry) {
                if let Some(name) = entry.file_name() {
                    move_merge(report, &entry, &notes_dir.join(name));
                }
            }
        }
        for name in LEGACY_TODO_DIRS {
            let dir = ws_dir.join(name);
            if dir.is_dir() && dir != todos {
                merge_todo_dir(report, &dir, &todos);
            }
        }

        let index_path = notes_dir.join(INDEX_FILE);
        if let Some(mut index) = store::try_read_json::<NoteIndex>(&index_path) {
            if index.workspace.is_none() {
                index.workspace = Some(metadata_for(&config.workspaces[i]));
                report.attempt(&index_path, DiagnosticKind::Write, store::write_json(&index_path, &index));
            }
        }
    }
}

// --- todos ---

/// Copies every file of `from` missing in `to`, removing each source after
/// its copy. Conflicting files stay in `from`.
fn merge_todo_dir(report: &mut MigrationReport, from: &Path, to: &Path) {
    if !report.ensure_dir(to) {
        return;
    }
    for file in report.list_dir(from) {
        let Some(name) = file.file_name() else {
            continue;
        };
        let target = to.join(name);
        if !file.is_file() || target.exists() {
            continue;
        }
        if report.relocate(&file, &target) {
            report.todos_merged += 1;
        }
    }
    if fs::read_dir(from).is_ok_and(|mut d| d.next().is_none()) {
        report.attempt(from, DiagnosticKind::Remove, fs::remove_dir(from));
    }
}

/// Merges stray per-workspace todo folders into the global todos directory.
pub fn consolidate_global_todos(paths: &StoragePaths) -> MigrationReport {
    let mut report = MigrationReport::default();
    let Some(config) = paths.config_store().try_load() else {
        return report;
    };
    report.from_version = config.schema_version;
    report.to_version = config.schema_version;

    let todos = paths.todos_dir_for(&config);
    for record in &config.workspaces {
        let ws_dir = paths.workspace_dir_for(&config, &record.id);
        for base in [ws_dir.clone(), ws_dir.join(NOTES_DIR)] {
            for name in LEGACY_TODO_DIRS {
                let dir = base.join(name);
                if dir.is_dir() && dir != todos {
                    merge_todo_dir(&mut report, &dir, &todos);
                }
            }
        }
    }
    if report.todos_merged > 0 {
        tracing::info!(merged = report.todos_merged, "consolidated workspace todos");
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigStore;
    use serde_json::json;
    use tempfile::TempDir;

    fn setup() -> (TempDir, StoragePaths) {
        let temp = TempDir::new().unwrap();
        let paths = StoragePaths::new(temp.path().join("data"));
        fs::create_dir_all(paths.data_root_path()).unwrap();
        (temp, paths)
    }

    fn write_json(path: &Path, value: serde_json::Value) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
    }

    fn note_entry(id: &str, title: &str, updated: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": title,
            "preview": "",
            "tags": [],
            "createdAt": updated,
            "updatedAt": updated,
            "isDeleted": false
        })
    }

    #[test]
    fn fresh_install_writes_current_config() {
        let (_temp, paths) = setup();
        let report = migrate(&paths);

        assert_eq!(report.from_version, CURRENT_SCHEMA_VERSION);
        assert!(report.is_clean());
        let config = paths.config();
        assert_eq!(config.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(config.workspaces[0].id, DEFAULT_WORKSPACE_ID);
    }

    #[test]
    fn current_tree_is_left_alone() {
        let (_temp, paths) = setup();
        let store = ConfigStore::new(paths.data_root_path());
        store.save(&Config::default()).unwrap();
        // Would be picked up by a v1 pass.
        fs::create_dir_all(default_legacy_root(&paths).join("notes")).unwrap();
        let before = fs::read(store.path()).unwrap();

        let report = migrate(&paths);

        assert_eq!(report.from_version, 3);
        assert_eq!(report.to_version, 3);
        assert_eq!(fs::read(store.path()).unwrap(), before);
        assert!(default_legacy_root(&paths).join("notes").is_dir());
        assert!(!store::backup_path(store.path()).exists());
    }

    #[test]
    fn v1_flat_notes_get_title_names() {
        let (_temp, paths) = setup();
        let legacy = default_legacy_root(&paths);
        write_json(
            &legacy.join(INDEX_FILE),
            json!({ "notes": [
                note_entry("n1", "Groceries", "2024-01-05T10:00:00Z"),
                note_entry("n2", "Trip: Rome", "2024-02-10T10:00:00Z"),
            ]}),
        );
        fs::create_dir_all(legacy.join("notes")).unwrap();
        fs::write(legacy.join("notes/2024-01-05_n1.md"), "milk").unwrap();
        fs::create_dir_all(legacy.join("2024-02")).unwrap();
        fs::write(legacy.join("2024-02/2024-02-10_n2.md"), "colosseum").unwrap();

        let report = migrate(&paths);

        assert!(report.is_clean(), "{:?}", report.diagnostics);
        assert_eq!(report.from_version, 1);
        assert_eq!(report.to_version, 3);
        assert_eq!(report.notes_migrated, 2);

        let notes = paths.workspaces_root().unwrap().join(DEFAULT_WORKSPACE_NAME).join(NOTES_DIR);
        assert_eq!(fs::read_to_string(notes.join("2024-01/Groceries.md")).unwrap(), "milk");
        assert_eq!(fs::read_to_string(notes.join("2024-02/Trip Rome.md")).unwrap(), "colosseum");
        assert!(!legacy.exists());

        let index: NoteIndex = store::read_json(&notes.join(INDEX_FILE), NoteIndex::default());
        assert_eq!(index.notes.len(), 2);
        assert_eq!(index.notes[0].file_name, "Groceries.md");
        assert_eq!(index.notes[1].file_name, "Trip Rome.md");
    }

    #[test]
    fn v1_orphans_are_adopted() {
        let (_temp, paths) = setup();
        let legacy = default_legacy_root(&paths);
        write_json(&legacy.join(INDEX_FILE), json!({ "notes": [] }));
        fs::create_dir_all(legacy.join("notes")).unwrap();
        fs::write(legacy.join("notes/2023-12-24_lost1.md"), "Recovered title\nbody").unwrap();

        let report = migrate(&paths);
        assert_eq!(report.notes_migrated, 1);

        let notes = paths.notes_root(DEFAULT_WORKSPACE_ID).unwrap();
        let index: NoteIndex = store::read_json(&notes.join(INDEX_FILE), NoteIndex::default());
        let meta = index.get("lost1").unwrap();
        assert_eq!(meta.title, "Recovered title");
        assert_eq!(meta.month(), "2023-12");
        assert!(notes.join("2023-12/Recovered title.md").is_file());
    }

    #[test]
    fn v1_config_keys_are_consolidated() {
        let (temp, paths) = setup();
        let custom = temp.path().join("elsewhere");
        let attachments = temp.path().join("pics");
        fs::create_dir_all(&attachments).unwrap();
        fs::write(attachments.join("a.png"), "png").unwrap();
        write_json(&custom.join(INDEX_FILE), json!({ "notes": [note_entry("c1", "Custom", "2024-03-01T00:00:00Z")] }));
        fs::create_dir_all(custom.join("notes")).unwrap();
        fs::write(custom.join("notes/2024-03-01_c1.md"), "from custom root").unwrap();
        write_json(
            paths.config_store().path(),
            json!({
                "notesRootPath": custom,
                "attachmentsPath": attachments,
                "hotkey": "Alt+Space",
            }),
        );

        let report = migrate(&paths);
        assert!(report.is_clean(), "{:?}", report.diagnostics);

        let config = paths.config();
        assert!(config.extra.get(LEGACY_NOTES_ROOT_KEY).is_none());
        assert!(config.extra.get(LEGACY_ATTACHMENTS_KEY).is_none());
        assert_eq!(config.extra.get("hotkey"), Some(&json!("Alt+Space")));

        let notes = paths.notes_root(DEFAULT_WORKSPACE_ID).unwrap();
        assert_eq!(fs::read_to_string(notes.join("2024-03/Custom.md")).unwrap(), "from custom root");
        assert!(notes.join(ATTACHMENTS_DIR).join("a.png").is_file());
        assert!(attachments.join("a.png").is_file());
    }

    #[test]
    fn v2_workspace_folders_are_renamed_by_name() {
        let (_temp, paths) = setup();
        write_json(
            paths.config_store().path(),
            json!({
                "schemaVersion": 2,
                "activeWorkspaceId": "w42",
                "workspaces": [
                    { "id": "default", "name": "默认", "color": "#6366f1" },
                    { "id": "w42", "name": "Work/Stuff", "color": "#ff0000" },
                ],
                "theme": "dark",
            }),
        );
        let root = paths.data_root_path().join(WORKSPACES_DIR);
        write_json(&root.join("w42").join(INDEX_FILE), json!({ "notes": [note_entry("x", "X", "2024-04-01T00:00:00Z")] }));
        fs::create_dir_all(root.join("w42/2024-04")).unwrap();
        fs::write(root.join("w42/2024-04/X.md"), "x").unwrap();
        fs::create_dir_all(root.join("w42/attachments")).unwrap();
        fs::create_dir_all(root.join("w42/todos")).unwrap();
        fs::write(root.join("w42/todos/2024-04-01.json"), r#"{"date":"2024-04-01","items":[]}"#).unwrap();

        let report = migrate(&paths);
        assert!(report.is_clean(), "{:?}", report.diagnostics);
        assert_eq!(report.from_version, 2);
        assert_eq!(report.workspaces_renamed, 1);
        assert_eq!(report.todos_merged, 1);

        let config = paths.config();
        assert_eq!(config.schema_version, 3);
        assert_eq!(config.workspace("w42").unwrap().folder_name, "WorkStuff");
        assert_eq!(config.workspace("default").unwrap().folder_name, DEFAULT_WORKSPACE_NAME);
        assert_eq!(config.extra.get("theme"), Some(&json!("dark")));

        let notes = root.join("WorkStuff").join(NOTES_DIR);
        assert!(notes.join(INDEX_FILE).is_file());
        assert!(notes.join("2024-04/X.md").is_file());
        assert!(notes.join(ATTACHMENTS_DIR).is_dir());
        assert!(!root.join("w42").exists());
        assert!(!root.join("WorkStuff/todos").exists());
        assert!(paths.todos_dir().unwrap().join("2024-04-01.json").is_file());

        let index: NoteIndex = store::read_json(&notes.join(INDEX_FILE), NoteIndex::default());
        assert_eq!(index.workspace.unwrap().name, "Work/Stuff");
    }

    #[test]
    fn v2_name_collision_with_unrelated_folder() {
        let (_temp, paths) = setup();
        write_json(
            paths.config_store().path(),
            json!({
                "schemaVersion": 2,
                "workspaces": [
                    { "id": "default", "name": "默认" },
                    { "id": "a1", "name": "Dup" },
                    { "id": "a2", "name": "Dup" },
                ],
            }),
        );
        let root = paths.data_root_path().join(WORKSPACES_DIR);
        fs::create_dir_all(root.join("a1")).unwrap();
        fs::create_dir_all(root.join("a2")).unwrap();

        migrate(&paths);

        let config = paths.config();
        assert_eq!(config.workspace("a1").unwrap().folder_name, "Dup");
        assert_eq!(config.workspace("a2").unwrap().folder_name, "Dup (2)");
        assert!(root.join("Dup").is_dir());
        assert!(root.join("Dup (2)").is_dir());
    }

    #[test]
    fn migration_is_idempotent() {
        let (_temp, paths) = setup();
        let legacy = default_legacy_root(&paths);
        write_json(&legacy.join(INDEX_FILE), json!({ "notes": [note_entry("n1", "Once", "2024-01-01T00:00:00Z")] }));
        fs::create_dir_all(legacy.join("notes")).unwrap();
        fs::write(legacy.join("notes/2024-01-01_n1.md"), "once").unwrap();

        migrate(&paths);
        let config_bytes = fs::read(paths.config_store().path()).unwrap();
        let notes = paths.notes_root(DEFAULT_WORKSPACE_ID).unwrap();
        let files: Vec<PathBuf> = fs::read_dir(notes.join("2024-01")).unwrap().flatten().map(|e| e.path()).collect();

        let second = migrate(&paths);
        assert_eq!(second.from_version, 3);
        assert_eq!(fs::read(paths.config_store().path()).unwrap(), config_bytes);
        let again: Vec<PathBuf> = fs::read_dir(notes.join("2024-01")).unwrap().flatten().map(|e| e.path()).collect();
        assert_eq!(files, again);
    }

    #[test]
    fn consolidation_keeps_existing_destination_files() {
        let (_temp, paths) = setup();
        paths.config_store().save(&Config::default()).unwrap();
        let todos = paths.todos_dir().unwrap();
        fs::write(todos.join("2024-01-01.json"), "global").unwrap();

        let stray = paths.workspace_dir(DEFAULT_WORKSPACE_ID).unwrap().join("Todos");
        fs::create_dir_all(&stray).unwrap();
        fs::write(stray.join("2024-01-01.json"), "stray").unwrap();
        fs::write(stray.join("2024-01-02.json"), "new").unwrap();

        let report = consolidate_global_todos(&paths);
        assert_eq!(report.todos_merged, 1);
        assert_eq!(fs::read_to_string(todos.join("2024-01-01.json")).unwrap(), "global");
        assert_eq!(fs::read_to_string(todos.join("2024-01-02.json")).unwrap(), "new");
        // The losing file stays put.
        assert!(stray.join("2024-01-01.json").is_file());
        assert!(!stray.join("2024-01-02.json").exists());

        let again = consolidate_global_todos(&paths);
        assert_eq!(again.todos_merged, 0);
    }

    #[test]
    fn legacy_stem_parsing() {
        assert_eq!(
            parse_legacy_stem("2024-03-05_abc"),
            Some((NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(), "abc"))
        );
        assert_eq!(parse_legacy_stem("Shopping list"), None);
        assert_eq!(parse_legacy_stem("2024-03-05_"), None);
        assert_eq!(parse_legacy_stem("2024-13-05_x"), None);
    }
}
