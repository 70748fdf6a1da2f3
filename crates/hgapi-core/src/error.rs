//! Unified error types for hgapi

use thiserror::Error;

use crate::types::MergeSummary;

/// Unified error type for all hgapi operations
#[derive(Error, Debug)]
pub enum HgError {
    // Invocation errors
    #[error("hg {subcommand} {} failed (exit code {}): {stderr}", args.join(" "), display_code(*exit_code))]
    CommandFailed {
        subcommand: String,
        args: Vec<String>,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("merge with {} left unresolved files: {}", revision.as_deref().unwrap_or("default head"), unresolved.join(", "))]
    MergeConflict {
        revision: Option<String>,
        unresolved: Vec<String>,
        summary: MergeSummary,
        stderr: String,
    },

    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    // Caller errors, raised before anything is spawned
    #[error("Precondition violated: {0}")]
    Precondition(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Output errors
    #[error("Unexpected hg output: {0}")]
    Parse(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

impl HgError {
    /// True for failures reported by the hg process itself, including merge conflicts
    pub fn is_invocation_failure(&self) -> bool {
        matches!(self, Self::CommandFailed { .. } | Self::MergeConflict { .. })
    }

    pub fn is_merge_conflict(&self) -> bool {
        matches!(self, Self::MergeConflict { .. })
    }

    /// Exit code of the failed hg process, if there was one
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::CommandFailed { exit_code, .. } => *exit_code,
            // hg merge reports unresolved files with exit code 1
            Self::MergeConflict { .. } => Some(1),
            _ => None,
        }
    }

    /// Captured stderr of the failed hg process
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::CommandFailed { stderr, .. } | Self::MergeConflict { stderr, .. } => {
                Some(stderr.as_str())
            }
            _ => None,
        }
    }
}

fn display_code(code: Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

/// Result type alias using HgError
pub type Result<T> = std::result::Result<T, HgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_display() {
        let err = HgError::CommandFailed {
            subcommand: "update".to_string(),
            args: vec!["-r".to_string(), "nope".to_string()],
            exit_code: Some(255),
            stdout: String::new(),
            stderr: "abort: unknown revision 'nope'".to_string(),
        };

        assert!(err.is_invocation_failure());
        assert!(!err.is_merge_conflict());
        assert_eq!(err.exit_code(), Some(255));
        assert_eq!(
            err.to_string(),
            "hg update -r nope failed (exit code 255): abort: unknown revision 'nope'"
        );
    }

    #[test]
    fn test_merge_conflict_is_invocation_failure() {
        let err = HgError::MergeConflict {
            revision: Some("2".to_string()),
            unresolved: vec!["a.txt".to_string()],
            summary: MergeSummary {
                unresolved: 1,
                ..Default::default()
            },
            stderr: String::new(),
        };

        assert!(err.is_invocation_failure());
        assert!(err.is_merge_conflict());
        assert_eq!(err.exit_code(), Some(1));
        assert!(err.to_string().contains("a.txt"));
    }

    #[test]
    fn test_precondition_is_not_invocation_failure() {
        let err = HgError::Precondition("already a repository".to_string());
        assert!(!err.is_invocation_failure());
        assert_eq!(err.exit_code(), None);
        assert_eq!(err.stderr(), None);
    }
}
