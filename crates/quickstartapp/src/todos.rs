//! Global per-date todo documents (`<todosDir>/YYYY-MM-DD.json`).
//!
//! Todos are not workspace scoped. Dates are validated before they are used
//! as file names, so a malformed date can never address a file outside the
//! todos directory.

use crate::error::{QuickStartError, Result};
use crate::model::{is_year_month, parse_date, parse_date_range, TodoDay, TodoItem};
use crate::paths::StoragePaths;
use crate::store;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    pub total: usize,
    pub done: usize,
}

/// Markdown rendering of the todos in a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodosExport {
    pub markdown: String,
    pub days: usize,
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct TodoStore {
    paths: StoragePaths,
}

impl TodoStore {
    pub fn new(paths: StoragePaths) -> Self {
        Self { paths }
    }

    fn day_path(&self, date: &str) -> Result<PathBuf> {
        if parse_date(date).is_none() {
            return Err(QuickStartError::InvalidInput(format!(
                "invalid date '{}', expected YYYY-MM-DD",
                date
            )));
        }
        Ok(self.paths.todos_dir()?.join(format!("{}.json", date)))
    }

    pub fn load(&self, date: &str) -> Result<TodoDay> {
        let path = self.day_path(date)?;
        Ok(store::read_json(&path, TodoDay::empty(date)))
    }

    /// Writes the document for `date`. The stored `date` field always matches
    /// the file name.
    pub fn save(&self, date: &str, mut day: TodoDay) -> Result<()> {
        let path = self.day_path(date)?;
        day.date = date.to_string();
        store::write_json(&path, &day)
    }

    pub fn add(&self, date: &str, content: &str) -> Result<TodoItem> {
        let content = content.trim();
        if content.is_empty() {
            return Err(QuickStartError::InvalidInput(
                "todo content cannot be empty".to_string(),
            ));
        }
        let mut day = self.load(date)?;
        let order = day.items.iter().map(|i| i.order).max().map_or(0, |o| o + 1);
        let item = TodoItem::new(content, order);
        day.items.push(item.clone());
        self.save(date, day)?;
        Ok(item)
    }

    pub fn set_done(&self, date: &str, item_id: &str, done: bool) -> Result<TodoItem> {
        let mut day = self.load(date)?;
        let item = day
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| QuickStartError::InvalidInput(format!("no todo '{}' on {}", item_id, date)))?;
        item.done = done;
        item.done_at = done.then(Utc::now);
        let updated = item.clone();
        self.save(date, day)?;
        Ok(updated)
    }

    /// Item counts for every day of `month` (`YYYY-MM`) that has items.
    pub fn month_summary(&self, month: &str) -> Result<BTreeMap<String, DaySummary>> {
        if !is_year_month(month) {
            return Err(QuickStartError::InvalidInput(format!(
                "invalid month '{}', expected YYYY-MM",
                month
            )));
        }
        let dir = self.paths.todos_dir()?;
        let prefix = format!("{}-", month);
        let mut summary = BTreeMap::new();

        for entry in fs::read_dir(&dir)?.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            let Some(date) = name.strip_suffix(".json") else {
                continue;
            };
            if !date.starts_with(&prefix) || parse_date(date).is_none() {
                continue;
            }
            let day = store::read_json(&entry.path(), TodoDay::empty(date));
            if day.items.is_empty() {
                continue;
            }
            summary.insert(
                date.to_string(),
                DaySummary {
                    total: day.items.len(),
                    done: day.items.iter().filter(|i| i.done).count(),
                },
            );
        }
        Ok(summary)
    }

    /// Todos of every day in `[start, end]` as Markdown task lists, one
    /// `# YYYY-MM-DD` section per day, separated by rules. Days without items
    /// are skipped.
    pub fn export_range(&self, start: &str, end: &str) -> Result<TodosExport> {
        let (from, to) = parse_date_range(start, end)?;
        let dir = self.paths.todos_dir()?;

        let mut days: Vec<TodoDay> = Vec::new();
        for entry in fs::read_dir(&dir)?.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            let Some(date) = name.strip_suffix(".json") else {
                continue;
            };
            let Some(day_date) = parse_date(date) else {
                continue;
            };
            if day_date < from || day_date > to {
                continue;
            }
            let mut day = store::read_json(&entry.path(), TodoDay::empty(date));
            day.items.retain(|i| !i.content.trim().is_empty());
            if !day.items.is_empty() {
                day.date = date.to_string();
                days.push(day);
            }
        }
        if days.is_empty() {
            return Err(QuickStartError::InvalidInput(
                "no todos in the selected date range".to_string(),
            ));
        }
        days.sort_by(|a, b| a.date.cmp(&b.date));

        let mut sections = Vec::with_capacity(days.len());
        let mut count = 0;
        for day in &mut days {
            day.items.sort_by_key(|i| i.order);
            let mut section = format!("# {}\n\n", day.date);
            for item in &day.items {
                let mark = if item.done { 'x' } else { ' ' };
                section.push_str(&format!("- [{}] {}\n", mark, item.content));
            }
            count += day.items.len();
            sections.push(section);
        }

        Ok(TodosExport {
            markdown: format!("{}\n", sections.join("\n\n---\n\n").trim_end()),
            days: days.len(),
            count,
        })
    }
}
