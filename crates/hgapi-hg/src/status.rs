//! `hg status` output parsing

use hgapi_core::{ChangeKind, HgError, Result, StatusEntry};
use std::collections::BTreeMap;

/// Parse `<code> <path>` lines into status entries
pub fn parse_status(output: &str) -> Result<Vec<StatusEntry>> {
    let mut entries = Vec::new();

    for line in output.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }

        let mut chars = line.chars();
        let (Some(code), Some(' ')) = (chars.next(), chars.next()) else {
            return Err(HgError::Parse(format!("malformed status line: {:?}", line)));
        };
        let path = chars.as_str();
        if path.is_empty() {
            return Err(HgError::Parse(format!("status line without path: {:?}", line)));
        }

        let kind = ChangeKind::from_code(code).ok_or_else(|| {
            HgError::Parse(format!("unknown status code '{}' in {:?}", code, line))
        })?;

        entries.push(StatusEntry {
            kind,
            path: path.to_string(),
        });
    }

    Ok(entries)
}

/// Group entries by kind
///
/// The pending kinds are always present so callers can index without
/// checking; clean and ignored appear only when reported.
pub fn group_status(entries: &[StatusEntry]) -> BTreeMap<ChangeKind, Vec<String>> {
    let mut grouped: BTreeMap<ChangeKind, Vec<String>> = ChangeKind::PENDING
        .iter()
        .map(|kind| (*kind, Vec::new()))
        .collect();

    for entry in entries {
        grouped
            .entry(entry.kind)
            .or_default()
            .push(entry.path.clone());
    }

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        let output = "A one.txt\nM a_folder/two.txt\nM three.txt\n? notes with spaces.md\n! gone.txt\nR old.txt\nC same.txt\nI build/out.o\n";
        let entries = parse_status(output).unwrap();

        assert_eq!(entries.len(), 8);
        assert_eq!(
            entries[0],
            StatusEntry {
                kind: ChangeKind::Added,
                path: "one.txt".to_string()
            }
        );
        assert_eq!(entries[3].kind, ChangeKind::Untracked);
        assert_eq!(entries[3].path, "notes with spaces.md");
        assert_eq!(entries[4].kind, ChangeKind::Missing);
        assert_eq!(entries[6].kind, ChangeKind::Clean);
        assert_eq!(entries[7].kind, ChangeKind::Ignored);
    }

    #[test]
    fn test_empty_status() {
        assert!(parse_status("").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_status() {
        assert!(matches!(parse_status("X foo"), Err(HgError::Parse(_))));
        assert!(matches!(parse_status("Mfoo"), Err(HgError::Parse(_))));
        assert!(matches!(parse_status("M "), Err(HgError::Parse(_))));
    }

    #[test]
    fn test_group_status() {
        let entries = parse_status("A one.txt\nM two.txt\nM three.txt\n").unwrap();
        let grouped = group_status(&entries);

        assert_eq!(grouped[&ChangeKind::Added], vec!["one.txt"]);
        assert_eq!(grouped[&ChangeKind::Modified], vec!["two.txt", "three.txt"]);
        assert!(grouped[&ChangeKind::Removed].is_empty());
        assert!(grouped[&ChangeKind::Missing].is_empty());
        assert!(grouped[&ChangeKind::Untracked].is_empty());
        assert!(!grouped.contains_key(&ChangeKind::Clean));
    }
}
