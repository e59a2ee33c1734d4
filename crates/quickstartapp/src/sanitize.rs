//! # Filesystem-Safe Names
//!
//! Workspace folders and note files are named after user-supplied text (a
//! workspace name, a note title). That text may contain anything, so it goes
//! through two steps before it touches the disk:
//!
//! 1. [`sanitize_name`]: strip characters that are illegal in file names on
//!    any supported platform, trim, truncate, and substitute a placeholder for
//!    an empty result.
//! 2. [`unique_name`]: resolve collisions inside the target directory by
//!    appending ` (2)`, ` (3)`, ...
//!
//! Both are deterministic. [`unique_name`] looks at the directory every time
//! it is called; nothing is cached, so consecutive calls from the same process
//! see each other's files once they were created.

use std::path::Path;

/// Placeholder used when a name sanitizes to nothing.
pub const UNTITLED: &str = "无标题";

/// Maximum length (in characters) of a workspace folder name.
pub const WORKSPACE_NAME_MAX: usize = 50;

/// Maximum length (in characters) of a note file stem.
pub const NOTE_NAME_MAX: usize = 80;

const ILLEGAL: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|', '\r', '\n'];

/// Turns arbitrary text into a safe file or folder name.
pub fn sanitize_name(raw: &str, max_len: usize) -> String {
    let stripped: String = raw.chars().filter(|c| !ILLEGAL.contains(c)).collect();
    let truncated: String = stripped.trim().chars().take(max_len).collect();
    let cleaned = truncated.trim();

    // "." and ".." would resolve to the parent directories.
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        UNTITLED.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Returns `base` if `dir/<base><ext>` is free, else the first free
/// `base (N)` for N = 2, 3, ...
///
/// `ext` includes its dot (`".md"`) or is empty for directories.
pub fn unique_name(dir: &Path, base: &str, ext: &str) -> String {
    unique_name_by(base, ext, |candidate| dir.join(candidate).exists())
}

/// Same probing sequence as [`unique_name`] with a caller-defined notion of
/// "taken". `is_taken` receives the full candidate including `ext`.
pub fn unique_name_by<F>(base: &str, ext: &str, mut is_taken: F) -> String
where
    F: FnMut(&str) -> bool,
{
    if !is_taken(&format!("{}{}", base, ext)) {
        return base.to_string();
    }
    let mut n = 2usize;
    loop {
        let candidate = format!("{} ({})", base, n);
        if !is_taken(&format!("{}{}", candidate, ext)) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn strips_illegal_characters() {
        assert_eq!(sanitize_name("a/b\\c:d*e?f\"g<h>i|j", 50), "abcdefghij");
        assert_eq!(sanitize_name("line one\r\nline two", 50), "line oneline two");
    }

    #[test]
    fn trims_and_truncates() {
        assert_eq!(sanitize_name("   spaced   ", 50), "spaced");
        assert_eq!(sanitize_name("abcdef", 3), "abc");
        // Truncation can expose trailing whitespace; it is trimmed again.
        assert_eq!(sanitize_name("ab cdef", 3), "ab");
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(sanitize_name("会议记录和总结", 4), "会议记录");
    }

    #[test]
    fn empty_result_uses_placeholder() {
        assert_eq!(sanitize_name("", 50), UNTITLED);
        assert_eq!(sanitize_name("  /// ", 50), UNTITLED);
        assert_eq!(sanitize_name("..", 50), UNTITLED);
    }

    #[test]
    fn unique_name_returns_base_when_free() {
        let dir = TempDir::new().unwrap();
        assert_eq!(unique_name(dir.path(), "Plan", ".md"), "Plan");
    }

    #[test]
    fn unique_name_sequence_is_pairwise_distinct() {
        let dir = TempDir::new().unwrap();
        let mut seen = HashSet::new();
        let mut names = Vec::new();

        for _ in 0..5 {
            let name = unique_name(dir.path(), "Plan", ".md");
            fs::write(dir.path().join(format!("{}.md", name)), "").unwrap();
            assert!(seen.insert(name.clone()), "duplicate name {}", name);
            names.push(name);
        }

        assert_eq!(
            names,
            vec!["Plan", "Plan (2)", "Plan (3)", "Plan (4)", "Plan (5)"]
        );
    }

    #[test]
    fn unique_name_for_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("A")).unwrap();
        assert_eq!(unique_name(dir.path(), "A", ""), "A (2)");
    }

    #[test]
    fn unique_name_is_exact_match() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Plan (2).md"), "").unwrap();
        // Only "Plan (2)" is taken, so the base itself is still free.
        assert_eq!(unique_name(dir.path(), "Plan", ".md"), "Plan");
    }

    #[test]
    fn unique_name_by_respects_claimed_set() {
        let claimed: HashSet<String> = ["Work".to_string()].into_iter().collect();
        assert_eq!(
            unique_name_by("Work", "", |c| claimed.contains(c)),
            "Work (2)"
        );
    }
}
