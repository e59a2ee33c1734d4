//! Terminal output. Text renderings use `colored`, which honors `NO_COLOR`
//! and disables itself when stdout is not a terminal.

use colored::*;
use quickstartapp::api::Outcome;
use quickstartapp::config::WorkspaceRecord;
use quickstartapp::migration::MigrationReport;
use quickstartapp::model::{NoteIndex, NoteMeta, TodoDay};
use quickstartapp::todos::DaySummary;
use serde::Serialize;
use std::collections::BTreeMap;

const TITLE_WIDTH: usize = 40;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints the envelope, then turns a failure into an error for the exit code.
pub fn print_outcome<T: Serialize>(outcome: Outcome<T>) -> anyhow::Result<()> {
    print_json(&outcome)?;
    if outcome.success {
        Ok(())
    } else {
        anyhow::bail!(outcome.error.unwrap_or_else(|| "operation failed".to_string()))
    }
}

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn note_line(meta: &NoteMeta) -> String {
    let icon = meta.status_icon.as_deref().map(|i| format!("{} ", i)).unwrap_or_default();
    let title = clip(&meta.title, TITLE_WIDTH);
    let date = meta.updated_at.format("%Y-%m-%d %H:%M").to_string();
    let line = format!("{}  {}{}", meta.id.dimmed(), icon, title);
    if meta.is_deleted {
        format!("{}  {}", line.red(), "(deleted)".red())
    } else {
        format!("{}  {}", line, date.dimmed())
    }
}

pub fn print_notes(index: &NoteIndex, include_deleted: bool) {
    let notes: Vec<&NoteMeta> = index
        .notes
        .iter()
        .filter(|n| include_deleted || !n.is_deleted)
        .collect();
    if notes.is_empty() {
        println!("No notes found.");
        return;
    }
    for meta in notes {
        println!("{}", note_line(meta));
        if !meta.tags.is_empty() {
            println!("    {}", meta.tags.join(", ").cyan());
        }
    }
}

pub fn print_workspaces(workspaces: &[WorkspaceRecord], active: &str) {
    for ws in workspaces {
        let marker = if ws.id == active { "*".green().bold() } else { " ".normal() };
        println!(
            "{} {}  {}  {}",
            marker,
            ws.id.dimmed(),
            ws.name.bold(),
            format!("[{}]", ws.folder_name).dimmed()
        );
    }
}

pub fn print_todo_day(day: &TodoDay) {
    println!("{}", day.date.bold());
    if day.items.is_empty() {
        println!("  No todos.");
        return;
    }
    let mut items: Vec<_> = day.items.iter().collect();
    items.sort_by_key(|i| i.order);
    for item in items {
        let check = if item.done { "[x]".green() } else { "[ ]".normal() };
        let content = if item.done {
            item.content.dimmed().to_string()
        } else {
            item.content.clone()
        };
        println!("  {} {}  {}", check, content, item.id.dimmed());
    }
}

pub fn print_month_summary(month: &str, summary: &BTreeMap<String, DaySummary>) {
    println!("{}", month.bold());
    if summary.is_empty() {
        println!("  No todos this month.");
        return;
    }
    for (date, counts) in summary {
        let ratio = format!("{}/{}", counts.done, counts.total);
        let ratio = if counts.done == counts.total {
            ratio.green()
        } else {
            ratio.yellow()
        };
        println!("  {}  {}", date, ratio);
    }
}

pub fn print_migration(report: &MigrationReport) {
    if report.from_version == report.to_version {
        println!("Data is at schema v{}.", report.to_version);
    } else {
        println!(
            "Migrated schema v{} -> v{}: {} notes, {} todo files, {} workspace folders.",
            report.from_version,
            report.to_version,
            report.notes_migrated,
            report.todos_merged,
            report.workspaces_renamed
        );
    }
    if report.from_version == report.to_version && report.todos_merged > 0 {
        println!("Merged {} stray todo files.", report.todos_merged);
    }
    for diag in &report.diagnostics {
        println!(
            "  {} {:?} {}: {}",
            "skipped".yellow(),
            diag.kind,
            diag.path.display(),
            diag.message
        );
    }
}
