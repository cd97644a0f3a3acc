//! Filename completion over a session's working directory.

use std::path::Path;
use tracing::debug;

/// List entries of `dir` whose names start with `partial`, case-insensitively.
///
/// Hidden entries (leading `.`) are skipped and the result is sorted
/// case-insensitively so completion output is deterministic. An unreadable
/// directory yields an empty list, never an error.
pub fn complete(dir: &Path, partial: &str) -> Vec<String> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "completion scan failed");
            return Vec::new();
        }
    };
    let needle = partial.to_lowercase();
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| !name.starts_with('.'))
        .filter(|name| name.to_lowercase().starts_with(&needle))
        .collect();
    names.sort_by_key(|name| name.to_lowercase());
    names
}

/// Extract a `usage:` hint from a `.sql` script, if present.
///
/// Scripts conventionally carry a comment like `-- usage: @report <month>`;
/// the trimmed text after the marker is returned for display next to the
/// completion candidate. Unreadable files yield `None`.
pub fn usage_hint(path: &Path) -> Option<String> {
    if !path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"))
    {
        return None;
    }
    let content = std::fs::read_to_string(path).ok()?;
    for line in content.lines() {
        if let Some(pos) = line.to_lowercase().find("usage:") {
            let hint = line[pos + "usage:".len()..].trim();
            if !hint.is_empty() {
                return Some(hint.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in ["report.sql", "Report2.sql", "other.txt", ".hidden.sql"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        dir
    }

    #[test]
    fn prefix_match_is_case_insensitive_and_sorted() {
        let dir = fixture_dir();
        assert_eq!(
            complete(dir.path(), "rep"),
            vec!["report.sql".to_string(), "Report2.sql".to_string()]
        );
    }

    #[test]
    fn empty_prefix_lists_all_visible_entries() {
        let dir = fixture_dir();
        assert_eq!(
            complete(dir.path(), ""),
            vec![
                "other.txt".to_string(),
                "report.sql".to_string(),
                "Report2.sql".to_string()
            ]
        );
    }

    #[test]
    fn hidden_entries_are_skipped() {
        let dir = fixture_dir();
        assert!(complete(dir.path(), ".hid").is_empty());
    }

    #[test]
    fn unreadable_directory_yields_empty() {
        assert!(complete(Path::new("/no/such/dir"), "rep").is_empty());
    }

    #[test]
    fn usage_hint_from_sql_comment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.sql");
        fs::write(&path, "-- Usage: @report <month>\nselect 1 from dual;\n").unwrap();
        assert_eq!(usage_hint(&path), Some("@report <month>".to_string()));
    }

    #[test]
    fn usage_hint_only_for_sql_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "usage: irrelevant\n").unwrap();
        assert_eq!(usage_hint(&path), None);
    }

    #[test]
    fn usage_hint_absent_when_no_marker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.sql");
        fs::write(&path, "select 1 from dual;\n").unwrap();
        assert_eq!(usage_hint(&path), None);
    }
}
