//! `hg merge` output parsing

use hgapi_core::{HgError, MergeSummary, Result};
use regex::Regex;
use std::sync::OnceLock;

fn summary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d+) files updated, (\d+) files merged, (\d+) files removed, (\d+) files unresolved")
            .expect("merge summary pattern is valid")
    })
}

fn conflict_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Current hg warns "conflicts while merging X!", older releases "merging X failed!"
        Regex::new(r"(?m)^(?:warning: conflicts while merging (.+?)! |merging (.+) failed!$)")
            .expect("conflict pattern is valid")
    })
}

fn preview_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^changeset:\s+(-?\d+):[0-9a-f]+\s*$").expect("preview pattern is valid")
    })
}

/// Find the file-count summary line in merge or update output
pub fn parse_merge_summary(output: &str) -> Option<MergeSummary> {
    let caps = summary_re().captures(output)?;
    let count = |i: usize| caps[i].parse::<usize>().unwrap_or(0);

    Some(MergeSummary {
        updated: count(1),
        merged: count(2),
        removed: count(3),
        unresolved: count(4),
    })
}

/// Files hg reported as left with conflict markers, in report order
pub fn parse_conflicts(output: &str) -> Vec<String> {
    let mut files: Vec<String> = Vec::new();

    for caps in conflict_re().captures_iter(output) {
        if let Some(file) = caps.get(1).or_else(|| caps.get(2)) {
            let file = file.as_str().to_string();
            if !files.contains(&file) {
                files.push(file);
            }
        }
    }

    files
}

/// Revision numbers listed by `hg merge --preview`
pub fn parse_merge_preview(output: &str) -> Result<Vec<i64>> {
    preview_re()
        .captures_iter(output)
        .map(|caps| {
            caps[1]
                .parse::<i64>()
                .map_err(|_| HgError::Parse(format!("invalid revision in preview: {:?}", &caps[1])))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFLICTED: &str = "\
merging a.txt
merging dir/b.txt
warning: conflicts while merging a.txt! (edit, then use 'hg resolve --mark')
warning: conflicts while merging dir/b.txt! (edit, then use 'hg resolve --mark')
0 files updated, 0 files merged, 0 files removed, 2 files unresolved
use 'hg resolve' to retry unresolved file merges or 'hg merge --abort' to abandon
";

    #[test]
    fn test_summary() {
        let summary = parse_merge_summary(CONFLICTED).unwrap();
        assert_eq!(summary.unresolved, 2);
        assert!(!summary.is_clean());

        let clean = parse_merge_summary(
            "1 files updated, 0 files merged, 0 files removed, 0 files unresolved\n(branch merge, don't forget to commit)\n",
        )
        .unwrap();
        assert_eq!(clean.updated, 1);
        assert!(clean.is_clean());

        assert!(parse_merge_summary("abort: nothing to merge").is_none());
    }

    #[test]
    fn test_conflicts() {
        assert_eq!(parse_conflicts(CONFLICTED), vec!["a.txt", "dir/b.txt"]);
        assert_eq!(
            parse_conflicts("merging a.txt\nmerging a.txt failed!\n"),
            vec!["a.txt"]
        );
        assert!(parse_conflicts("merging a.txt\n").is_empty());
    }

    #[test]
    fn test_preview() {
        let output = "\
changeset:   3:9ab3a4ea0b1a
user:        Alice <alice@example.com>
date:        Tue Nov 14 23:13:20 2023 +0100
summary:     other side

changeset:   4:1f0dee641bb7
user:        Alice <alice@example.com>
date:        Tue Nov 14 23:14:20 2023 +0100
summary:     more
";
        assert_eq!(parse_merge_preview(output).unwrap(), vec![3, 4]);
        assert!(parse_merge_preview("").unwrap().is_empty());
    }
}
