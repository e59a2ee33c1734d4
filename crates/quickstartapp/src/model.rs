//! # Domain Model
//!
//! The persisted shapes of the storage core: the per-workspace note index, its
//! entries, and the global per-date todo documents. Field names are camelCase
//! on disk.
//!
//! ## Note Index
//!
//! `Notes/index.json` is the single source of truth for the id → file mapping.
//! Content files are named after the note title, so their names are only a
//! hint for humans; [`NoteMeta::file_name`] is what binds an id to its file.
//!
//! Ordering: new notes are inserted at the front, updates keep their
//! position. The order therefore reflects creation recency, not edit recency.
//!
//! ## Derived Fields
//!
//! - [`make_preview`]: content with Markdown image references removed, cut to
//!   [`PREVIEW_LEN`] characters.
//! - [`derive_title`]: explicit title, else the first content line (cut to
//!   [`TITLE_FROM_CONTENT_LEN`] characters), else [`crate::sanitize::UNTITLED`].
//!
//! ## Identifiers
//!
//! [`generate_id`] concatenates a base-36 microsecond timestamp with a short
//! random suffix. Collisions are negligible, not impossible.

use crate::error::{QuickStartError, Result};
use crate::sanitize::UNTITLED;
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const PREVIEW_LEN: usize = 100;
pub const TITLE_FROM_CONTENT_LEN: usize = 50;

static IMAGE_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").expect("valid image pattern"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceMetadata {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteMeta {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub preview: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    /// Absent only in v1 indexes, before migration.
    #[serde(default)]
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_icon: Option<String>,
}

impl NoteMeta {
    /// `YYYY-MM` folder holding this note's content file.
    pub fn month(&self) -> String {
        month_of(&self.updated_at)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteIndex {
    #[serde(default)]
    pub workspace: Option<WorkspaceMetadata>,
    #[serde(default)]
    pub notes: Vec<NoteMeta>,
}

impl NoteIndex {
    pub fn position(&self, id: &str) -> Option<usize> {
        self.notes.iter().position(|n| n.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&NoteMeta> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Entries not soft-deleted, in index order.
    pub fn visible(&self) -> impl Iterator<Item = &NoteMeta> {
        self.notes.iter().filter(|n| !n.is_deleted)
    }
}

/// Input to a note save. A missing `id` creates a new note.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDraft {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status_icon: Option<String>,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub order: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_at: Option<DateTime<Utc>>,
}

impl TodoItem {
    pub fn new(content: impl Into<String>, order: i64) -> Self {
        Self {
            id: generate_id(),
            content: content.into(),
            done: false,
            color: None,
            time: None,
            order,
            created_at: Utc::now(),
            done_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoDay {
    pub date: String,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub items: Vec<TodoItem>,
}

impl TodoDay {
    pub fn empty(date: &str) -> Self {
        Self {
            date: date.to_string(),
            archived: false,
            items: Vec::new(),
        }
    }
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

pub fn generate_id() -> String {
    let micros = Utc::now().timestamp_micros().max(0) as u64;
    let random = Uuid::new_v4().simple().to_string();
    format!("{}{}", to_base36(micros), &random[..6])
}

pub fn make_preview(content: &str) -> String {
    IMAGE_REF
        .replace_all(content, "")
        .chars()
        .take(PREVIEW_LEN)
        .collect()
}

pub fn derive_title(title: Option<&str>, content: &str) -> String {
    if let Some(t) = title.map(str::trim).filter(|t| !t.is_empty()) {
        return t.to_string();
    }
    let first_line: String = content
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("")
        .chars()
        .take(TITLE_FROM_CONTENT_LEN)
        .collect();
    if first_line.trim().is_empty() {
        UNTITLED.to_string()
    } else {
        first_line.trim().to_string()
    }
}

pub fn month_of(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m").to_string()
}

pub fn day_of(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

/// Parses a strict `YYYY-MM-DD` date.
pub fn parse_date(date: &str) -> Option<NaiveDate> {
    if date.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Parses an inclusive `[start, end]` export range of `YYYY-MM-DD` dates.
pub fn parse_date_range(start: &str, end: &str) -> Result<(NaiveDate, NaiveDate)> {
    let (Some(from), Some(to)) = (parse_date(start), parse_date(end)) else {
        return Err(QuickStartError::InvalidInput(format!(
            "invalid date range '{}'..'{}', expected YYYY-MM-DD",
            start, end
        )));
    };
    if from > to {
        return Err(QuickStartError::InvalidInput(
            "start date is after end date".to_string(),
        ));
    }
    Ok((from, to))
}

/// Validates a strict `YYYY-MM` month.
pub fn is_year_month(value: &str) -> bool {
    value.len() == 7 && parse_date(&format!("{}-01", value)).is_some()
}
