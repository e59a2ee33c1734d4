//! # API Facade
//!
//! [`QuickStartApi`] is the single entry point for every UI (desktop shell,
//! CLI, tests). It dispatches to the repositories and converts their
//! `Result`s into [`Outcome`]s.
//!
//! ## The Outcome Contract
//!
//! Mutating operations never hand an error past this boundary. They return
//! a serializable envelope instead:
//!
//! ```json
//! { "success": true,  "data": "lq9x2k3f8a1b2c" }
//! { "success": false, "error": "workspace not found: w42" }
//! ```
//!
//! Reads that are designed to degrade (`list_notes`, `load_note`,
//! `list_workspaces`, `config`) return plain values: an empty index, an empty
//! string, the default config.
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: that belongs in the repositories.
//! - **Presentation**: no stdout, no formatting.
//! - **Caching**: every call reads the persisted state fresh.

use crate::config::{Config, WorkspaceRecord};
use crate::error::Result;
use crate::maintenance::{ClearReport, RelocationReport, StorageMaintenance};
use crate::model::{NoteDraft, NoteIndex, TodoDay, TodoItem};
use crate::notes::{NoteRepository, NotesExport, StoredAttachment};
use crate::paths::StoragePaths;
use crate::todos::{DaySummary, TodoStore, TodosExport};
use crate::workspaces::WorkspaceRegistry;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Result envelope returned across the public boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Outcome<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    pub fn into_result(self) -> std::result::Result<T, String> {
        match (self.data, self.error) {
            (Some(data), _) if self.success => Ok(data),
            (_, error) => Err(error.unwrap_or_else(|| "unknown error".to_string())),
        }
    }
}

impl<T> From<Result<T>> for Outcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Outcome::ok(data),
            Err(e) => {
                tracing::warn!(error = %e, "operation failed");
                Outcome::err(e.to_string())
            }
        }
    }
}

pub struct QuickStartApi {
    paths: StoragePaths,
    notes: NoteRepository,
    workspaces: WorkspaceRegistry,
    todos: TodoStore,
    maintenance: StorageMaintenance,
}

impl QuickStartApi {
    pub fn new(paths: StoragePaths) -> Self {
        Self {
            notes: NoteRepository::new(paths.clone()),
            workspaces: WorkspaceRegistry::new(paths.clone()),
            todos: TodoStore::new(paths.clone()),
            maintenance: StorageMaintenance::new(paths.clone()),
            paths,
        }
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    // --- notes ---

    pub fn list_notes(&self, ws_id: &str) -> NoteIndex {
        self.notes.list(ws_id)
    }

    pub fn load_note(&self, ws_id: &str, id: &str) -> String {
        self.notes.load_content(ws_id, id)
    }

    pub fn find_note_file(&self, ws_id: &str, id: &str) -> Option<PathBuf> {
        self.notes.find_file(ws_id, id)
    }

    pub fn save_note(&self, ws_id: &str, draft: NoteDraft) -> Outcome<String> {
        self.notes.save(ws_id, draft).into()
    }

    pub fn delete_note(&self, ws_id: &str, id: &str) -> Outcome<()> {
        self.notes.delete(ws_id, id).into()
    }

    pub fn restore_note(&self, ws_id: &str, id: &str) -> Outcome<()> {
        self.notes.restore(ws_id, id).into()
    }

    pub fn update_note_icon(&self, ws_id: &str, id: &str, icon: Option<String>) -> Outcome<()> {
        self.notes.update_status_icon(ws_id, id, icon).into()
    }

    pub fn save_attachment(
        &self,
        ws_id: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Outcome<StoredAttachment> {
        self.notes.save_attachment(ws_id, file_name, bytes).into()
    }

    pub fn export_notes(&self, ws_id: &str, start: &str, end: &str) -> Outcome<NotesExport> {
        self.notes.export_range(ws_id, start, end).into()
    }

    pub fn export_note(&self, ws_id: &str, id: &str) -> Outcome<String> {
        self.notes.export_single(ws_id, id).into()
    }

    // --- workspaces ---

    pub fn list_workspaces(&self) -> Vec<WorkspaceRecord> {
        self.workspaces.list()
    }

    pub fn active_workspace(&self) -> String {
        self.workspaces.active()
    }

    pub fn set_active_workspace(&self, id: &str) -> Outcome<()> {
        self.workspaces.set_active(id).into()
    }

    pub fn create_workspace(&self, name: &str, color: &str) -> Outcome<WorkspaceRecord> {
        self.workspaces.create(name, color).into()
    }

    pub fn rename_workspace(
        &self,
        id: &str,
        name: &str,
        color: Option<&str>,
    ) -> Outcome<WorkspaceRecord> {
        self.workspaces.rename(id, name, color).into()
    }

    pub fn delete_workspace(&self, id: &str) -> Outcome<()> {
        self.workspaces.delete(id).into()
    }

    // --- todos ---

    pub fn load_todos(&self, date: &str) -> Outcome<TodoDay> {
        self.todos.load(date).into()
    }

    pub fn save_todos(&self, date: &str, day: TodoDay) -> Outcome<()> {
        self.todos.save(date, day).into()
    }

    pub fn add_todo(&self, date: &str, content: &str) -> Outcome<TodoItem> {
        self.todos.add(date, content).into()
    }

    pub fn set_todo_done(&self, date: &str, item_id: &str, done: bool) -> Outcome<TodoItem> {
        self.todos.set_done(date, item_id, done).into()
    }

    pub fn export_todos(&self, start: &str, end: &str) -> Outcome<TodosExport> {
        self.todos.export_range(start, end).into()
    }

    pub fn todo_month_summary(&self, month: &str) -> Outcome<BTreeMap<String, DaySummary>> {
        self.todos.month_summary(month).into()
    }

    // --- config ---

    pub fn config(&self) -> Config {
        self.paths.config()
    }

    pub fn config_value(&self) -> Outcome<Value> {
        self.paths.config().to_value().into()
    }

    /// Merges UI-owned settings. Core keys are refused.
    pub fn set_config(&self, partial: Map<String, Value>) -> Outcome<()> {
        self.paths
            .config_store()
            .update(|config| config.set_passthrough(partial))
            .into()
    }

    // --- storage ---

    pub fn set_root_path(&self, path: Option<PathBuf>, migrate: bool) -> Outcome<RelocationReport> {
        self.maintenance.set_root_path(path, migrate).into()
    }

    pub fn set_todos_path(&self, path: Option<PathBuf>, migrate: bool) -> Outcome<RelocationReport> {
        self.maintenance.set_todos_path(path, migrate).into()
    }

    pub fn clear_notes(&self, ws_id: &str) -> Outcome<ClearReport> {
        self.maintenance.clear_notes(ws_id).into()
    }

    pub fn clear_todos(&self) -> Outcome<ClearReport> {
        self.maintenance.clear_todos().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_WORKSPACE_ID;
    use crate::test_utils::TestEnv;
    use serde_json::json;

    #[test]
    fn failures_become_error_outcomes() {
        let env = TestEnv::new();
        let api = env.api();

        let outcome = api.delete_workspace(DEFAULT_WORKSPACE_ID);
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("default workspace"));

        let outcome = api.save_note("ghost", NoteDraft::new("a", "b"));
        assert!(!outcome.success);
        assert!(outcome.data.is_none());
    }

    #[test]
    fn outcome_serializes_without_empty_fields() {
        let ok: Outcome<String> = Outcome::ok("id1".to_string());
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({ "success": true, "data": "id1" })
        );
        let err: Outcome<String> = Outcome::err("boom");
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({ "success": false, "error": "boom" })
        );
        assert_eq!(err.into_result(), Err("boom".to_string()));
    }

    #[test]
    fn save_then_load_through_facade() {
        let env = TestEnv::new();
        let api = env.api();
        let id = api
            .save_note(DEFAULT_WORKSPACE_ID, NoteDraft::new("Facade", "content"))
            .into_result()
            .unwrap();
        assert_eq!(api.load_note(DEFAULT_WORKSPACE_ID, &id), "content");
        assert_eq!(api.list_notes(DEFAULT_WORKSPACE_ID).notes.len(), 1);
    }

    #[test]
    fn set_config_preserves_unrelated_keys() {
        let env = TestEnv::new();
        let api = env.api();
        let mut first = Map::new();
        first.insert("hotkey".to_string(), json!("Alt+Space"));
        first.insert("ai".to_string(), json!({ "model": "x", "temperature": 0.2 }));
        assert!(api.set_config(first).success);

        let mut second = Map::new();
        second.insert("theme".to_string(), json!("dark"));
        assert!(api.set_config(second).success);

        let value = api.config_value().into_result().unwrap();
        assert_eq!(value["hotkey"], json!("Alt+Space"));
        assert_eq!(value["ai"]["temperature"], json!(0.2));
        assert_eq!(value["theme"], json!("dark"));

        let mut core = Map::new();
        core.insert("schemaVersion".to_string(), json!(1));
        assert!(!api.set_config(core).success);
        assert_eq!(api.config().schema_version, 3);
    }
}
