use crate::error::{QuickStartError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// `<path>.bak`, the previous generation of a document.
pub fn backup_path(path: &Path) -> PathBuf {
    with_suffix(path, ".bak")
}

/// `<path>.tmp`, the in-flight generation of a document.
pub fn temp_path(path: &Path) -> PathBuf {
    with_suffix(path, ".tmp")
}

/// Serializes `value` as pretty JSON and atomically replaces `path` with it,
/// keeping the previous generation at `<path>.bak`.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(value)?;
    let tmp = temp_path(path);
    fs::write(&tmp, json)?;

    let verified = fs::read_to_string(&tmp)
        .map_err(QuickStartError::Io)
        .and_then(|raw| {
            serde_json::from_str::<serde_json::Value>(&raw).map_err(QuickStartError::Serialization)
        });
    if let Err(e) = verified {
        let _ = fs::remove_file(&tmp);
        return Err(QuickStartError::Store(format!(
            "refusing to replace {}: written document does not parse back ({})",
            path.display(),
            e
        )));
    }

    if path.exists() {
        if let Err(e) = fs::rename(path, backup_path(path)) {
            tracing::warn!(path = %path.display(), error = %e, "could not rotate backup generation");
        }
    }

    fs::rename(&tmp, path)?;
    Ok(())
}

/// Writes a plain text file through a temp file + rename. No backup
/// generation is kept; content files are not self-describing documents.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = temp_path(path);
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn parse_file<T: DeserializeOwned>(path: &Path) -> std::result::Result<T, String> {
    let raw = fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&raw).map_err(|e| e.to_string())
}

/// Reads `path`, falling back to `<path>.bak`. Returns `None` when neither
/// generation is readable.
pub fn try_read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let primary_exists = path.exists();
    if primary_exists {
        match parse_file(path) {
            Ok(value) => return Some(value),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable document, trying backup");
            }
        }
    }

    let bak = backup_path(path);
    if !bak.exists() {
        return None;
    }
    match parse_file(&bak) {
        Ok(value) => {
            if primary_exists {
                tracing::warn!(path = %bak.display(), "recovered document from backup generation");
            }
            Some(value)
        }
        Err(e) => {
            tracing::warn!(path = %bak.display(), error = %e, "backup generation unreadable");
            None
        }
    }
}

/// Reads `path` with backup recovery, returning `fallback` if nothing usable
/// exists. Never fails.
pub fn read_json<T: DeserializeOwned>(path: &Path, fallback: T) -> T {
    try_read_json(path).unwrap_or(fallback)
}
