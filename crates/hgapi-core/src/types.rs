//! Record types parsed from hg output

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Change classification reported by `hg status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
    Untracked,
    Missing,
    Clean,
    Ignored,
}

impl ChangeKind {
    /// Kinds reported by a plain `hg status` (no clean or ignored files)
    pub const PENDING: [ChangeKind; 5] = [
        Self::Added,
        Self::Modified,
        Self::Removed,
        Self::Untracked,
        Self::Missing,
    ];

    /// Map a status code character to a kind
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'A' => Some(Self::Added),
            'M' => Some(Self::Modified),
            'R' => Some(Self::Removed),
            '?' => Some(Self::Untracked),
            '!' => Some(Self::Missing),
            'C' => Some(Self::Clean),
            'I' => Some(Self::Ignored),
            _ => None,
        }
    }

    /// The status code character hg prints for this kind
    pub fn code(&self) -> char {
        match self {
            Self::Added => 'A',
            Self::Modified => 'M',
            Self::Removed => 'R',
            Self::Untracked => '?',
            Self::Missing => '!',
            Self::Clean => 'C',
            Self::Ignored => 'I',
        }
    }

    /// Whether this kind represents a change that would be committed or needs attention
    pub fn is_pending(&self) -> bool {
        !matches!(self, Self::Clean | Self::Ignored)
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Modified => write!(f, "modified"),
            Self::Removed => write!(f, "removed"),
            Self::Untracked => write!(f, "untracked"),
            Self::Missing => write!(f, "missing"),
            Self::Clean => write!(f, "clean"),
            Self::Ignored => write!(f, "ignored"),
        }
    }
}

impl std::str::FromStr for ChangeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "added" | "a" => Ok(Self::Added),
            "modified" | "m" => Ok(Self::Modified),
            "removed" | "r" => Ok(Self::Removed),
            "untracked" | "unknown" | "?" => Ok(Self::Untracked),
            "missing" | "deleted" | "!" => Ok(Self::Missing),
            "clean" | "c" => Ok(Self::Clean),
            "ignored" | "i" => Ok(Self::Ignored),
            _ => Err(format!("Invalid change kind: {}", s)),
        }
    }
}

/// One line of `hg status` output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub kind: ChangeKind,
    /// Path relative to the repository root
    pub path: String,
}

/// A committed revision
///
/// Two revisions are equal when they have the same node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Revision {
    /// Local revision number
    pub rev: i64,
    /// Full 40-hex node hash
    pub node: String,
    pub author: String,
    pub date: DateTime<FixedOffset>,
    pub branch: String,
    /// Parent revision numbers; null parents are omitted
    pub parents: Vec<i64>,
    pub tags: Vec<String>,
    pub bookmarks: Vec<String>,
    pub description: String,
}

impl Revision {
    /// The 12-character short form of the node
    pub fn short_node(&self) -> &str {
        self.node.get(..12).unwrap_or(&self.node)
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// First line of the description
    pub fn summary(&self) -> &str {
        self.description.lines().next().unwrap_or("")
    }
}

impl PartialEq for Revision {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl Eq for Revision {}

/// Source and destination of a rename or copy recorded in a git-style diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rename {
    pub from: String,
    pub to: String,
    /// True when the source was copied rather than moved
    #[serde(default)]
    pub copy: bool,
}

/// The part of `hg diff` output that concerns one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffEntry {
    pub filename: String,
    /// Complete chunk for the file, including the `diff` header line
    pub diff: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename: Option<Rename>,
}

impl DiffEntry {
    /// Lines added by this chunk, without the leading `+`
    pub fn added_lines(&self) -> impl Iterator<Item = &str> {
        self.diff
            .lines()
            .filter(|l| l.starts_with('+') && !l.starts_with("+++"))
            .map(|l| &l[1..])
    }

    /// Lines removed by this chunk, without the leading `-`
    pub fn removed_lines(&self) -> impl Iterator<Item = &str> {
        self.diff
            .lines()
            .filter(|l| l.starts_with('-') && !l.starts_with("---"))
            .map(|l| &l[1..])
    }
}

/// Branch state as shown by `hg branches`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchState {
    #[default]
    Active,
    Inactive,
    Closed,
}

impl std::fmt::Display for BranchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// A named branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    /// Revision number of the branch tip
    pub rev: i64,
    /// Short node of the branch tip
    pub node: String,
    pub state: BranchState,
}

/// A tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub rev: i64,
    pub node: String,
    /// Local tags live in `.hg/localtags` and are not versioned
    #[serde(default)]
    pub local: bool,
}

/// A bookmark
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub name: String,
    pub rev: i64,
    pub node: String,
    /// Whether this is the active bookmark of the working copy
    pub active: bool,
}

/// Identity of a newly created commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitId {
    pub rev: i64,
    pub node: String,
}

impl std::fmt::Display for CommitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.rev, self.node)
    }
}

/// File counts reported at the end of `hg merge` and `hg update`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeSummary {
    pub updated: usize,
    pub merged: usize,
    pub removed: usize,
    pub unresolved: usize,
}

impl MergeSummary {
    pub fn is_clean(&self) -> bool {
        self.unresolved == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn revision(node: &str, parents: Vec<i64>) -> Revision {
        Revision {
            rev: 1,
            node: node.to_string(),
            author: "alice".to_string(),
            date: DateTime::parse_from_rfc3339("2024-01-02T03:04:05+00:00").unwrap(),
            branch: "default".to_string(),
            parents,
            tags: Vec::new(),
            bookmarks: Vec::new(),
            description: "first line\n\nbody".to_string(),
        }
    }

    #[test]
    fn test_change_kind_codes() {
        for kind in [
            ChangeKind::Added,
            ChangeKind::Modified,
            ChangeKind::Removed,
            ChangeKind::Untracked,
            ChangeKind::Missing,
            ChangeKind::Clean,
            ChangeKind::Ignored,
        ] {
            assert_eq!(ChangeKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(ChangeKind::from_code('X'), None);
        assert!(!ChangeKind::Clean.is_pending());
        assert!(ChangeKind::Missing.is_pending());
    }

    #[test]
    fn test_change_kind_from_str() {
        assert_eq!("Added".parse::<ChangeKind>(), Ok(ChangeKind::Added));
        assert_eq!("unknown".parse::<ChangeKind>(), Ok(ChangeKind::Untracked));
        assert!("bogus".parse::<ChangeKind>().is_err());
    }

    #[test]
    fn test_revision_equality_uses_node() {
        let a = revision("0123456789abcdef0123456789abcdef01234567", vec![0]);
        let mut b = a.clone();
        b.description = "different".to_string();
        assert_eq!(a, b);

        let c = revision("fedcba9876543210fedcba9876543210fedcba98", vec![0]);
        assert_ne!(a, c);
    }

    #[test]
    fn test_revision_helpers() {
        let rev = revision("0123456789abcdef0123456789abcdef01234567", vec![0, 3]);
        assert_eq!(rev.short_node(), "0123456789ab");
        assert_eq!(rev.summary(), "first line");
        assert!(rev.is_merge());

        let short = revision("abc", vec![]);
        assert_eq!(short.short_node(), "abc");

        // Byte 12 falls inside a multi-byte character
        let odd = revision("a\u{e9}\u{e9}\u{e9}\u{e9}\u{e9}\u{e9}\u{e9}", vec![]);
        assert_eq!(odd.short_node(), odd.node);
    }

    #[test]
    fn test_diff_entry_lines() {
        let entry = DiffEntry {
            filename: "a.txt".to_string(),
            diff: "diff -r 000000000000 a.txt\n--- a/a.txt\n+++ b/a.txt\n@@ -1,1 +1,2 @@\n-old\n+new\n+more\n"
                .to_string(),
            rename: None,
        };
        assert_eq!(entry.added_lines().collect::<Vec<_>>(), vec!["new", "more"]);
        assert_eq!(entry.removed_lines().collect::<Vec<_>>(), vec!["old"]);
    }
}
