//! Revision identifiers and ranges
//!
//! A repository can be addressed like a sequence of revisions: a single
//! revision by number or symbol, or a span between two of them. Spans render
//! to a revset that `hg log -r` understands.

use serde::{Deserialize, Serialize};

/// A single revision, by local number or by symbol (`tip`, `.`, branch,
/// tag, bookmark or hash prefix)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RevisionId {
    Number(i64),
    Symbol(String),
}

impl RevisionId {
    pub fn tip() -> Self {
        Self::Symbol("tip".to_string())
    }

    /// Parent of the working copy
    pub fn working_parent() -> Self {
        Self::Symbol(".".to_string())
    }

    /// Render as a revset operand, quoting symbols the revset parser would split
    pub fn to_revset(&self) -> String {
        match self {
            Self::Number(n) if *n < 0 => format!("\"{}\"", n),
            Self::Number(n) => n.to_string(),
            Self::Symbol(s) if is_plain_symbol(s) => s.clone(),
            Self::Symbol(s) => quote_symbol(s),
        }
    }
}

impl std::fmt::Display for RevisionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Symbol(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RevisionId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for RevisionId {
    fn from(n: i32) -> Self {
        Self::Number(n as i64)
    }
}

impl From<u32> for RevisionId {
    fn from(n: u32) -> Self {
        Self::Number(n as i64)
    }
}

impl From<&str> for RevisionId {
    fn from(s: &str) -> Self {
        s.to_string().into()
    }
}

/// Only canonical integers are revision numbers; `0042` stays a node prefix
impl From<String> for RevisionId {
    fn from(s: String) -> Self {
        match s.parse::<i64>() {
            Ok(n) if n.to_string() == s => Self::Number(n),
            _ => Self::Symbol(s),
        }
    }
}

impl From<&String> for RevisionId {
    fn from(s: &String) -> Self {
        s.clone().into()
    }
}

/// A span of revisions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionRange {
    /// Both ends included (`a:b`)
    Closed(RevisionId, RevisionId),
    /// Lower end included, upper end excluded
    HalfOpen(RevisionId, RevisionId),
    /// From a revision to tip (`a:`)
    From(RevisionId),
    /// From revision 0 up to and including a revision (`:b`)
    UpTo(RevisionId),
    /// The whole history, oldest first
    All,
}

impl RevisionRange {
    pub fn closed(lower: impl Into<RevisionId>, upper: impl Into<RevisionId>) -> Self {
        Self::Closed(lower.into(), upper.into())
    }

    pub fn half_open(lower: impl Into<RevisionId>, upper: impl Into<RevisionId>) -> Self {
        Self::HalfOpen(lower.into(), upper.into())
    }

    /// Render as an `hg log -r` revset
    pub fn to_revset(&self) -> String {
        match self {
            Self::Closed(a, b) => format!("{}:{}", a.to_revset(), b.to_revset()),
            Self::HalfOpen(a, b) => {
                let upper = b.to_revset();
                format!("{}:{} - {}", a.to_revset(), upper, upper)
            }
            Self::From(a) => format!("{}:", a.to_revset()),
            Self::UpTo(b) => format!(":{}", b.to_revset()),
            Self::All => "all()".to_string(),
        }
    }
}

impl std::fmt::Display for RevisionRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_revset())
    }
}

fn is_plain_symbol(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '@'))
}

fn quote_symbol(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_conversions() {
        assert_eq!(RevisionId::from(3), RevisionId::Number(3));
        assert_eq!(RevisionId::from("12"), RevisionId::Number(12));
        assert_eq!(
            RevisionId::from("tip"),
            RevisionId::Symbol("tip".to_string())
        );
        assert_eq!(
            RevisionId::from("6c31a9f7be7a"),
            RevisionId::Symbol("6c31a9f7be7a".to_string())
        );
    }

    #[test]
    fn test_non_canonical_numbers_stay_symbols() {
        assert_eq!(
            RevisionId::from("0042"),
            RevisionId::Symbol("0042".to_string())
        );
        assert_eq!(RevisionId::from("0042").to_revset(), "0042");
        assert_eq!(RevisionId::from("+5"), RevisionId::Symbol("+5".to_string()));
        assert_eq!(RevisionId::from("-1"), RevisionId::Number(-1));
        assert_eq!(RevisionId::from("0"), RevisionId::Number(0));
    }

    #[test]
    fn test_working_parent() {
        assert_eq!(RevisionId::working_parent().to_revset(), ".");
        assert_eq!(RevisionId::working_parent(), RevisionId::from("."));
    }

    #[test]
    fn test_symbol_quoting() {
        assert_eq!(RevisionId::from("tip").to_revset(), "tip");
        assert_eq!(RevisionId::from(".").to_revset(), ".");
        assert_eq!(RevisionId::from("feature-x").to_revset(), "\"feature-x\"");
        assert_eq!(
            RevisionId::from("my \"odd\" name").to_revset(),
            "\"my \\\"odd\\\" name\""
        );
        assert_eq!(RevisionId::Number(-1).to_revset(), "\"-1\"");
    }

    #[test]
    fn test_range_revsets() {
        assert_eq!(RevisionRange::closed(0, "tip").to_revset(), "0:tip");
        assert_eq!(RevisionRange::half_open(2, 5).to_revset(), "2:5 - 5");
        assert_eq!(RevisionRange::From(3.into()).to_revset(), "3:");
        assert_eq!(RevisionRange::UpTo("stable".into()).to_revset(), ":stable");
        assert_eq!(RevisionRange::All.to_revset(), "all()");
    }
}
