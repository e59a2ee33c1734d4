//! # Note Repository
//!
//! CRUD over the notes of one workspace. Every operation reads the index
//! fresh, mutates it, and persists it through the atomic store.
//!
//! ## Save
//!
//! 1. Resolve or generate the id.
//! 2. Write the content into the current `YYYY-MM` folder under a unique,
//!    title-derived file name. The note's own current file does not count as
//!    taken.
//! 3. On update, remove the previous content file if it lives elsewhere, so
//!    a title or month change never leaves an orphan behind. A failed write
//!    leaves the previous file and index untouched.
//! 4. Upsert the [`NoteMeta`]: new notes go to the front of the index,
//!    updates keep their position.
//!
//! ## Soft Delete and Restore
//!
//! | Operation | Index entry                 | Content file                     |
//! |-----------|-----------------------------|----------------------------------|
//! | delete    | `isDeleted`, `deletedAt`    | moved to `Notes/.trash/<id>.md`  |
//! | restore   | flags cleared, `updatedAt`  | moved back into the month folder |
//! | save (id) | flags cleared               | fresh file, trash copy discarded |
//!
//! Loads never look into the trash: a deleted note reads as empty.
//!
//! Trash copies are kept until the note is restored or saved again, or the
//! whole workspace is cleared
//! ([`StorageMaintenance::clear_notes`](crate::maintenance::StorageMaintenance::clear_notes)
//! archives `.trash/` with everything else and then removes it). There is no
//! age or size based pruning.
//!
//! ## File Lookup
//!
//! [`NoteRepository::find_file`] is the one lookup policy used by load,
//! delete and export:
//!
//! 1. `fileName` in the expected month folder.
//! 2. `fileName` in any other month folder, unless another entry owns it.
//! 3. Any `.md` under the month folders (or legacy `notes/`) whose name
//!    contains the id.

use crate::config::Config;
use crate::error::{QuickStartError, Result};
use crate::model::{
    day_of, derive_title, generate_id, make_preview, month_of, parse_date_range, NoteDraft,
    NoteIndex, NoteMeta,
};
use crate::paths::{is_month_dir_name, StoragePaths, INDEX_FILE, TRASH_DIR};
use crate::sanitize::{sanitize_name, unique_name, unique_name_by, NOTE_NAME_MAX};
use crate::store;
use crate::workspaces::metadata_for;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// URL scheme under which attachments are served to note content.
pub const MEDIA_URL_PREFIX: &str = "quickstart://media/";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAttachment {
    pub file_name: String,
    pub path: PathBuf,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotesExport {
    pub markdown: String,
    pub count: usize,
}

/// Month folders under `notes_root`, sorted.
fn month_dirs(notes_root: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(notes_root) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .filter(|e| e.path().is_dir())
        .filter(|e| is_month_dir_name(&e.file_name().to_string_lossy()))
        .map(|e| e.path())
        .collect();
    dirs.sort();
    dirs
}

fn markdown_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "md"))
        .collect();
    files.sort();
    files
}

fn owned_by_other(index: &NoteIndex, id: &str, month: &str, file_name: &str) -> bool {
    index.notes.iter().any(|n| {
        n.id != id && !n.is_deleted && n.file_name == file_name && n.month() == month
    })
}

/// Locates the content file of `id` under `notes_root`.
pub(crate) fn locate(notes_root: &Path, index: &NoteIndex, id: &str) -> Option<PathBuf> {
    let months = month_dirs(notes_root);

    if let Some(meta) = index.get(id).filter(|m| !m.file_name.is_empty()) {
        let expected = notes_root.join(meta.month()).join(&meta.file_name);
        if expected.is_file() {
            return Some(expected);
        }
        for dir in &months {
            let month = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let candidate = dir.join(&meta.file_name);
            if candidate.is_file() && !owned_by_other(index, id, &month, &meta.file_name) {
                return Some(candidate);
            }
        }
    }

    let legacy = notes_root.join("notes");
    months
        .iter()
        .chain(std::iter::once(&legacy))
        .flat_map(|dir| markdown_files(dir))
        .find(|path| {
            path.file_name()
                .map(|n| n.to_string_lossy().contains(id))
                .unwrap_or(false)
        })
}

#[derive(Debug, Clone)]
pub struct NoteRepository {
    paths: StoragePaths,
}

impl NoteRepository {
    pub fn new(paths: StoragePaths) -> Self {
        Self { paths }
    }

    fn require_workspace(&self, ws_id: &str) -> Result<Config> {
        let config = self.paths.config();
        if config.workspace(ws_id).is_none() {
            return Err(QuickStartError::WorkspaceNotFound(ws_id.to_string()));
        }
        Ok(config)
    }

    fn open_index(&self, ws_id: &str) -> Result<(PathBuf, NoteIndex)> {
        let notes_root = self.paths.notes_root(ws_id)?;
        let index = store::read_json(&notes_root.join(INDEX_FILE), NoteIndex::default());
        Ok((notes_root, index))
    }

    /// The full index, soft-deleted entries included. Empty if the workspace
    /// has no index yet or does not exist.
    pub fn list(&self, ws_id: &str) -> NoteIndex {
        let config = self.paths.config();
        if config.workspace(ws_id).is_none() {
            return NoteIndex::default();
        }
        let index_path = self.paths.notes_root_for(&config, ws_id).join(INDEX_FILE);
        store::read_json(&index_path, NoteIndex::default())
    }

    pub fn find_file(&self, ws_id: &str, id: &str) -> Option<PathBuf> {
        let config = self.paths.config();
        config.workspace(ws_id)?;
        let notes_root = self.paths.notes_root_for(&config, ws_id);
        let index = store::read_json(&notes_root.join(INDEX_FILE), NoteIndex::default());
        if index.get(id).is_some_and(|m| m.is_deleted) {
            return None;
        }
        locate(&notes_root, &index, id)
    }

    /// Content of a note, or an empty string if it cannot be found.
    pub fn load_content(&self, ws_id: &str, id: &str) -> String {
        self.find_file(ws_id, id)
            .and_then(|path| fs::read_to_string(path).ok())
            .unwrap_or_default()
    }

    pub fn save(&self, ws_id: &str, draft: NoteDraft) -> Result<String> {
        let config = self.require_workspace(ws_id)?;
        let (notes_root, mut index) = self.open_index(ws_id)?;
        let index_path = notes_root.join(INDEX_FILE);

        let id = draft
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(generate_id);
        let existing = index.position(&id);
        let old_file = existing.and_then(|_| locate(&notes_root, &index, &id));

        let now = Utc::now();
        let month_dir = notes_root.join(month_of(&now));
        fs::create_dir_all(&month_dir)?;

        // The note's own current file counts as free, so a same-title resave
        // overwrites it in place.
        let title = derive_title(draft.title.as_deref(), &draft.content);
        let stem = unique_name_by(&sanitize_name(&title, NOTE_NAME_MAX), ".md", |candidate| {
            let path = month_dir.join(candidate);
            path.exists() && old_file.as_deref() != Some(path.as_path())
        });
        let file_name = format!("{}.md", stem);
        let target = month_dir.join(&file_name);
        store::write_text(&target, &draft.content)?;

        if let Some(old) = old_file.filter(|old| *old != target) {
            if let Err(e) = fs::remove_file(&old) {
                tracing::warn!(path = %old.display(), error = %e, "could not remove previous content file");
            }
        }
        if existing.is_some() {
            let trashed = trash_path(&notes_root, &id);
            if trashed.exists() {
                if let Err(e) = fs::remove_file(&trashed) {
                    tracing::warn!(path = %trashed.display(), error = %e, "could not discard trashed copy");
                }
            }
        }

        let previous = existing.map(|pos| &index.notes[pos]);
        let meta = NoteMeta {
            id: id.clone(),
            title,
            preview: make_preview(&draft.content),
            tags: draft.tags,
            created_at: previous.map(|p| p.created_at).unwrap_or(now),
            updated_at: now,
            is_deleted: false,
            deleted_at: None,
            file_name,
            status_icon: draft
                .status_icon
                .or_else(|| previous.and_then(|p| p.status_icon.clone())),
        };

        match existing {
            Some(pos) => index.notes[pos] = meta,
            None => index.notes.insert(0, meta),
        }
        if index.workspace.is_none() {
            index.workspace = config.workspace(ws_id).map(metadata_for);
        }
        store::write_json(&index_path, &index)?;

        tracing::debug!(workspace = %ws_id, id = %id, "saved note");
        Ok(id)
    }

    /// Soft delete. Unknown ids are a no-op.
    pub fn delete(&self, ws_id: &str, id: &str) -> Result<()> {
        self.require_workspace(ws_id)?;
        let (notes_root, mut index) = self.open_index(ws_id)?;
        let Some(pos) = index.position(id) else {
            return Ok(());
        };
        if index.notes[pos].is_deleted {
            return Ok(());
        }

        let file = locate(&notes_root, &index, id);
        let meta = &mut index.notes[pos];
        meta.is_deleted = true;
        meta.deleted_at = Some(Utc::now());
        store::write_json(&notes_root.join(INDEX_FILE), &index)?;

        if let Some(file) = file {
            let trash_dir = notes_root.join(TRASH_DIR);
            fs::create_dir_all(&trash_dir)?;
            let target = trash_path(&notes_root, id);
            if let Err(e) = fs::rename(&file, &target) {
                tracing::warn!(path = %file.display(), error = %e, "could not move note to trash, removing");
                fs::remove_file(&file)?;
            }
        }
        Ok(())
    }

    /// Undoes a soft delete, bringing back the trashed content. A note deleted
    /// without a trash copy comes back empty.
    pub fn restore(&self, ws_id: &str, id: &str) -> Result<()> {
        self.require_workspace(ws_id)?;
        let (notes_root, mut index) = self.open_index(ws_id)?;
        let pos = index
            .position(id)
            .ok_or_else(|| QuickStartError::NoteNotFound(id.to_string()))?;
        if !index.notes[pos].is_deleted {
            return Ok(());
        }

        let now = Utc::now();
        let month_dir = notes_root.join(month_of(&now));
        fs::create_dir_all(&month_dir)?;
        let base = sanitize_name(&index.notes[pos].title, NOTE_NAME_MAX);
        let file_name = format!("{}.md", unique_name(&month_dir, &base, ".md"));
        let target = month_dir.join(&file_name);

        let trashed = trash_path(&notes_root, id);
        if trashed.is_file() {
            fs::rename(&trashed, &target)?;
        } else {
            store::write_text(&target, "")?;
        }

        let meta = &mut index.notes[pos];
        meta.is_deleted = false;
        meta.deleted_at = None;
        meta.updated_at = now;
        meta.file_name = file_name;
        store::write_json(&notes_root.join(INDEX_FILE), &index)
    }

    /// Sets or clears the status icon. `updatedAt` is left alone so the file
    /// stays in its month folder.
    pub fn update_status_icon(&self, ws_id: &str, id: &str, icon: Option<String>) -> Result<()> {
        self.require_workspace(ws_id)?;
        let (notes_root, mut index) = self.open_index(ws_id)?;
        let pos = index
            .position(id)
            .ok_or_else(|| QuickStartError::NoteNotFound(id.to_string()))?;
        index.notes[pos].status_icon = icon.filter(|i| !i.is_empty());
        store::write_json(&notes_root.join(INDEX_FILE), &index)
    }

    pub fn save_attachment(
        &self,
        ws_id: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<StoredAttachment> {
        self.require_workspace(ws_id)?;
        let dir = self.paths.attachments_dir(ws_id)?;

        let raw = Path::new(file_name);
        let stem = raw
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = raw
            .extension()
            .map(|e| sanitize_name(&e.to_string_lossy(), NOTE_NAME_MAX))
            .map(|e| format!(".{}", e))
            .unwrap_or_default();

        let base = sanitize_name(&stem, NOTE_NAME_MAX);
        let stored = format!("{}{}", unique_name(&dir, &base, &ext), ext);
        let path = dir.join(&stored);
        fs::write(&path, bytes)?;

        Ok(StoredAttachment {
            url: format!("{}{}", MEDIA_URL_PREFIX, stored),
            file_name: stored,
            path,
        })
    }

    /// Notes updated within `[start, end]` (inclusive dates), oldest first.
    pub fn export_range(&self, ws_id: &str, start: &str, end: &str) -> Result<NotesExport> {
        let (from, to) = parse_date_range(start, end)?;

        self.require_workspace(ws_id)?;
        let (notes_root, index) = self.open_index(ws_id)?;

        let mut selected: Vec<&NoteMeta> = index
            .visible()
            .filter(|n| {
                let day = n.updated_at.date_naive();
                day >= from && day <= to
            })
            .collect();
        if selected.is_empty() {
            return Err(QuickStartError::InvalidInput(
                "no notes in the selected date range".to_string(),
            ));
        }
        selected.sort_by_key(|n| n.updated_at);

        let mut markdown = String::new();
        for note in &selected {
            let content = locate(&notes_root, &index, &note.id)
                .and_then(|p| fs::read_to_string(p).ok())
                .unwrap_or_default();
            markdown.push_str(&format!(
                "## {} {}\n\n{}\n\n",
                day_of(&note.updated_at),
                note.title,
                content.trim_end()
            ));
        }

        Ok(NotesExport {
            markdown,
            count: selected.len(),
        })
    }

    pub fn export_single(&self, ws_id: &str, id: &str) -> Result<String> {
        self.require_workspace(ws_id)?;
        let (notes_root, index) = self.open_index(ws_id)?;
        let meta = index
            .get(id)
            .filter(|m| !m.is_deleted)
            .ok_or_else(|| QuickStartError::NoteNotFound(id.to_string()))?;
        let content = locate(&notes_root, &index, id)
            .and_then(|p| fs::read_to_string(p).ok())
            .unwrap_or_default();
        Ok(format!("# {}\n\n{}\n", meta.title, content.trim_end()))
    }
}

fn trash_path(notes_root: &Path, id: &str) -> PathBuf {
    notes_root.join(TRASH_DIR).join(format!("{}.md", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_WORKSPACE_ID;
    use crate::sanitize::UNTITLED;
    use crate::test_utils::TestEnv;
    use std::collections::HashSet;

    const WS: &str = DEFAULT_WORKSPACE_ID;

    fn repo(env: &TestEnv) -> NoteRepository {
        NoteRepository::new(env.paths.clone())
    }

    fn notes_root(env: &TestEnv) -> PathBuf {
        env.paths.notes_root(WS).unwrap()
    }

    #[test]
    fn save_then_load_round_trips() {
        let env = TestEnv::new();
        let repo = repo(&env);
        let content = "# Heading\n\nSome *markdown* ![img](quickstart://media/a.png)\n";

        let id = repo.save(WS, NoteDraft::new("Plan", content)).unwrap();
        assert_eq!(repo.load_content(WS, &id), content);

        let index = repo.list(WS);
        assert_eq!(index.notes.len(), 1);
        let meta = &index.notes[0];
        assert_eq!(meta.file_name, "Plan.md");
        assert!(!meta.preview.contains("!["));
        assert!(notes_root(&env).join(meta.month()).join("Plan.md").is_file());
    }

    #[test]
    fn new_notes_go_first_updates_keep_position() {
        let env = TestEnv::new();
        let repo = repo(&env);
        let first = repo.save(WS, NoteDraft::new("One", "1")).unwrap();
        let second = repo.save(WS, NoteDraft::new("Two", "2")).unwrap();

        let order: Vec<String> = repo.list(WS).notes.into_iter().map(|n| n.id).collect();
        assert_eq!(order, vec![second.clone(), first.clone()]);

        repo.save(WS, NoteDraft::new("One edited", "1b").with_id(&first))
            .unwrap();
        let order: Vec<String> = repo.list(WS).notes.into_iter().map(|n| n.id).collect();
        assert_eq!(order, vec![second, first]);
    }

    #[test]
    fn update_replaces_file_and_keeps_created_at() {
        let env = TestEnv::new();
        let repo = repo(&env);
        let id = repo.save(WS, NoteDraft::new("Before", "a")).unwrap();
        let created = repo.list(WS).notes[0].created_at;

        repo.save(WS, NoteDraft::new("After", "b").with_id(&id)).unwrap();
        let meta = repo.list(WS).notes[0].clone();
        assert_eq!(meta.created_at, created);
        assert!(meta.updated_at >= created);
        assert_eq!(meta.file_name, "After.md");

        let month = notes_root(&env).join(meta.month());
        assert!(!month.join("Before.md").exists());
        assert_eq!(repo.load_content(WS, &id), "b");
    }

    #[test]
    fn resave_with_same_title_keeps_file_name() {
        let env = TestEnv::new();
        let repo = repo(&env);
        let id = repo.save(WS, NoteDraft::new("Stable", "v1")).unwrap();
        repo.save(WS, NoteDraft::new("Stable", "v2").with_id(&id)).unwrap();

        let meta = repo.list(WS).notes[0].clone();
        assert_eq!(meta.file_name, "Stable.md");
        assert!(!notes_root(&env).join(meta.month()).join("Stable (2).md").exists());
        assert_eq!(repo.load_content(WS, &id), "v2");
    }

    #[test]
    fn failed_content_write_keeps_previous_version() {
        let env = TestEnv::new();
        let repo = repo(&env);
        let id = repo.save(WS, NoteDraft::new("Before", "original")).unwrap();
        let month = notes_root(&env).join(month_of(&Utc::now()));
        fs::create_dir_all(month.join("After.md.tmp")).unwrap();

        assert!(repo.save(WS, NoteDraft::new("After", "new").with_id(&id)).is_err());
        assert_eq!(repo.list(WS).notes[0].file_name, "Before.md");
        assert_eq!(repo.load_content(WS, &id), "original");
    }

    #[test]
    fn same_title_gets_unique_file_names() {
        let env = TestEnv::new();
        let repo = repo(&env);
        for i in 0..3 {
            repo.save(WS, NoteDraft::new("Same", format!("{}", i))).unwrap();
        }
        let names: HashSet<String> = repo
            .list(WS)
            .notes
            .into_iter()
            .map(|n| n.file_name)
            .collect();
        let expected: HashSet<String> = ["Same.md", "Same (2).md", "Same (3).md"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn title_falls_back_to_content_then_placeholder() {
        let env = TestEnv::new();
        let repo = repo(&env);
        let mut draft = NoteDraft::default();
        draft.content = "\n  First line: here\nsecond".to_string();
        repo.save(WS, draft).unwrap();

        let mut empty = NoteDraft::default();
        empty.title = Some("   ".to_string());
        repo.save(WS, empty).unwrap();

        let index = repo.list(WS);
        assert_eq!(index.notes[1].title, "First line: here");
        assert_eq!(index.notes[1].file_name, "First line here.md");
        assert_eq!(index.notes[0].title, UNTITLED);
        assert_eq!(index.notes[0].file_name, format!("{}.md", UNTITLED));
    }

    #[test]
    fn delete_marks_entry_and_hides_content() {
        let env = TestEnv::new();
        let repo = repo(&env);
        let id = repo.save(WS, NoteDraft::new("X", "body")).unwrap();

        repo.delete(WS, &id).unwrap();

        let index = repo.list(WS);
        assert_eq!(index.notes.len(), 1);
        assert!(index.notes[0].is_deleted);
        assert!(index.notes[0].deleted_at.is_some());
        assert_eq!(index.visible().count(), 0);
        assert_eq!(repo.load_content(WS, &id), "");
        assert!(notes_root(&env).join(TRASH_DIR).join(format!("{}.md", id)).is_file());
    }

    #[test]
    fn resave_after_delete_revives_entry() {
        let env = TestEnv::new();
        let repo = repo(&env);
        let id = repo.save(WS, NoteDraft::new("X", "body")).unwrap();
        repo.delete(WS, &id).unwrap();

        let again = repo.save(WS, NoteDraft::new("X", "body").with_id(&id)).unwrap();
        assert_eq!(again, id);

        let index = repo.list(WS);
        assert_eq!(index.notes.len(), 1);
        assert!(!index.notes[0].is_deleted);
        assert!(index.notes[0].deleted_at.is_none());
        assert_eq!(repo.load_content(WS, &id), "body");
        assert!(!notes_root(&env).join(TRASH_DIR).join(format!("{}.md", id)).exists());
    }

    #[test]
    fn restore_brings_back_trashed_content() {
        let env = TestEnv::new();
        let repo = repo(&env);
        let id = repo.save(WS, NoteDraft::new("Keep me", "precious")).unwrap();
        repo.delete(WS, &id).unwrap();

        repo.restore(WS, &id).unwrap();
        let meta = repo.list(WS).notes[0].clone();
        assert!(!meta.is_deleted);
        assert_eq!(meta.file_name, "Keep me.md");
        assert_eq!(repo.load_content(WS, &id), "precious");
    }

    #[test]
    fn restore_unknown_note_fails() {
        let env = TestEnv::new();
        assert!(matches!(
            repo(&env).restore(WS, "missing"),
            Err(QuickStartError::NoteNotFound(_))
        ));
    }

    #[test]
    fn delete_unknown_note_is_noop() {
        let env = TestEnv::new();
        let repo = repo(&env);
        repo.delete(WS, "missing").unwrap();
        assert!(repo.list(WS).notes.is_empty());
    }

    #[test]
    fn unknown_workspace_is_rejected_for_writes_and_empty_for_reads() {
        let env = TestEnv::new();
        let repo = repo(&env);
        assert!(matches!(
            repo.save("ghost", NoteDraft::new("a", "b")),
            Err(QuickStartError::WorkspaceNotFound(_))
        ));
        assert!(repo.list("ghost").notes.is_empty());
        assert_eq!(repo.load_content("ghost", "x"), "");
    }

    #[test]
    fn find_file_uses_hint_in_other_month() {
        let env = TestEnv::new();
        let repo = repo(&env);
        let id = repo.save(WS, NoteDraft::new("Moved", "x")).unwrap();
        let meta = repo.list(WS).notes[0].clone();
        let root = notes_root(&env);

        let other = root.join("2001-01");
        fs::create_dir_all(&other).unwrap();
        fs::rename(root.join(meta.month()).join("Moved.md"), other.join("Moved.md")).unwrap();

        assert_eq!(repo.find_file(WS, &id), Some(other.join("Moved.md")));
    }

    #[test]
    fn find_file_falls_back_to_id_substring() {
        let env = TestEnv::new();
        let repo = repo(&env);
        let id = repo.save(WS, NoteDraft::new("Named", "x")).unwrap();
        let meta = repo.list(WS).notes[0].clone();
        let month = notes_root(&env).join(meta.month());

        let legacy_name = format!("2001-01-01_{}.md", id);
        fs::rename(month.join("Named.md"), month.join(&legacy_name)).unwrap();

        assert_eq!(repo.find_file(WS, &id), Some(month.join(legacy_name)));
        assert_eq!(repo.load_content(WS, &id), "x");
    }

    #[test]
    fn find_file_skips_file_owned_by_another_entry() {
        let env = TestEnv::new();
        let repo = repo(&env);
        let a = repo.save(WS, NoteDraft::new("Plan", "a")).unwrap();
        let b = repo.save(WS, NoteDraft::new("Other", "b")).unwrap();

        // Point b at a's file name in a month where that file belongs to a.
        let root = notes_root(&env);
        let index_path = root.join(INDEX_FILE);
        let mut index: NoteIndex = store::read_json(&index_path, NoteIndex::default());
        let month = index.get(&a).unwrap().month();
        fs::remove_file(root.join(&month).join("Other.md")).unwrap();
        let pos = index.position(&b).unwrap();
        index.notes[pos].file_name = "Plan.md".to_string();
        index.notes[pos].updated_at = chrono::TimeZone::with_ymd_and_hms(&Utc, 2001, 1, 1, 0, 0, 0).unwrap();
        store::write_json(&index_path, &index).unwrap();

        assert_eq!(repo.find_file(WS, &b), None);
        assert_eq!(repo.load_content(WS, &a), "a");
    }

    #[test]
    fn index_matches_files_after_mixed_operations() {
        let env = TestEnv::new();
        let repo = repo(&env);
        let a = repo.save(WS, NoteDraft::new("A", "1")).unwrap();
        let b = repo.save(WS, NoteDraft::new("B", "2")).unwrap();
        let c = repo.save(WS, NoteDraft::new("A", "3")).unwrap();
        repo.save(WS, NoteDraft::new("C", "4").with_id(&a)).unwrap();
        repo.delete(WS, &b).unwrap();
        repo.save(WS, NoteDraft::new("B", "5").with_id(&b)).unwrap();
        repo.delete(WS, &c).unwrap();

        let root = notes_root(&env);
        let index = repo.list(WS);
        let mut referenced = HashSet::new();
        for meta in index.visible() {
            let path = root.join(meta.month()).join(&meta.file_name);
            assert!(path.is_file(), "missing {}", path.display());
            assert!(referenced.insert(path));
        }
        let on_disk: HashSet<PathBuf> = month_dirs(&root)
            .iter()
            .flat_map(|d| markdown_files(d))
            .collect();
        assert_eq!(on_disk, referenced);
    }

    #[test]
    fn status_icon_updates_without_touching_timestamp() {
        let env = TestEnv::new();
        let repo = repo(&env);
        let id = repo.save(WS, NoteDraft::new("Icon", "x")).unwrap();
        let before = repo.list(WS).notes[0].updated_at;

        repo.update_status_icon(WS, &id, Some("⭐".to_string())).unwrap();
        let meta = repo.list(WS).notes[0].clone();
        assert_eq!(meta.status_icon.as_deref(), Some("⭐"));
        assert_eq!(meta.updated_at, before);

        repo.save(WS, NoteDraft::new("Icon", "y").with_id(&id)).unwrap();
        assert_eq!(repo.list(WS).notes[0].status_icon.as_deref(), Some("⭐"));

        repo.update_status_icon(WS, &id, None).unwrap();
        assert!(repo.list(WS).notes[0].status_icon.is_none());
    }

    #[test]
    fn attachments_keep_extension_and_get_unique_names() {
        let env = TestEnv::new();
        let repo = repo(&env);
        let first = repo.save_attachment(WS, "shot:1.png", b"png").unwrap();
        let second = repo.save_attachment(WS, "shot:1.png", b"png2").unwrap();

        assert_eq!(first.file_name, "shot1.png");
        assert_eq!(second.file_name, "shot1 (2).png");
        assert_eq!(first.url, "quickstart://media/shot1.png");
        assert_eq!(fs::read(&second.path).unwrap(), b"png2");
        assert!(second.path.starts_with(env.paths.attachments_dir(WS).unwrap()));
    }

    #[test]
    fn export_range_collects_visible_notes() {
        let env = TestEnv::new();
        let repo = repo(&env);
        repo.save(WS, NoteDraft::new("First", "one")).unwrap();
        let gone = repo.save(WS, NoteDraft::new("Gone", "two")).unwrap();
        repo.delete(WS, &gone).unwrap();

        let today = day_of(&Utc::now());
        let export = repo.export_range(WS, &today, &today).unwrap();
        assert_eq!(export.count, 1);
        assert!(export.markdown.contains(&format!("## {} First", today)));
        assert!(export.markdown.contains("one"));
        assert!(!export.markdown.contains("Gone"));
    }

    #[test]
    fn export_range_rejects_bad_or_empty_ranges() {
        let env = TestEnv::new();
        let repo = repo(&env);
        assert!(matches!(
            repo.export_range(WS, "2024-13-01", "2024-12-31"),
            Err(QuickStartError::InvalidInput(_))
        ));
        assert!(matches!(
            repo.export_range(WS, "2000-01-01", "2000-01-31"),
            Err(QuickStartError::InvalidInput(_))
        ));
    }

    #[test]
    fn export_single_renders_title_heading() {
        let env = TestEnv::new();
        let repo = repo(&env);
        let id = repo.save(WS, NoteDraft::new("Solo", "text\n")).unwrap();
        assert_eq!(repo.export_single(WS, &id).unwrap(), "# Solo\n\ntext\n");
    }
}
