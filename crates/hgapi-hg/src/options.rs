//! Option structs for facade operations that take more than one or two inputs

use hgapi_core::{RevisionId, RevisionRange};

/// Options for [`Repository::commit`](crate::Repository::commit)
#[derive(Debug, Clone, Default)]
pub struct CommitOptions {
    pub message: String,
    /// Overrides the repository handle's default user
    pub user: Option<String>,
    /// Any date format hg accepts, e.g. `2024-01-02 10:00 +0100`
    pub date: Option<String>,
    pub close_branch: bool,
    /// Commit only these files; empty commits everything pending
    pub files: Vec<String>,
}

impl CommitOptions {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn close_branch(mut self) -> Self {
        self.close_branch = true;
        self
    }

    pub fn files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }
}

/// Options for [`Repository::log`](crate::Repository::log)
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Revset to show; `None` shows the whole history newest first
    pub revset: Option<String>,
    pub limit: Option<usize>,
    pub branch: Option<String>,
    /// Restrict to revisions touching these files
    pub files: Vec<String>,
}

impl LogOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revision(mut self, rev: impl Into<RevisionId>) -> Self {
        self.revset = Some(rev.into().to_string());
        self
    }

    pub fn range(mut self, range: RevisionRange) -> Self {
        self.revset = Some(range.to_revset());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }
}

/// Options for [`Repository::diff`](crate::Repository::diff)
///
/// With no revisions the working copy is compared to its parent. `change`
/// shows the changes a single revision introduced and excludes `from`/`to`.
#[derive(Debug, Clone, Default)]
pub struct DiffOptions {
    pub from: Option<RevisionId>,
    pub to: Option<RevisionId>,
    pub change: Option<RevisionId>,
    pub files: Vec<String>,
    /// Use git extended format, which records renames and copies
    pub git: bool,
}

impl DiffOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(mut self, rev: impl Into<RevisionId>) -> Self {
        self.from = Some(rev.into());
        self
    }

    pub fn to(mut self, rev: impl Into<RevisionId>) -> Self {
        self.to = Some(rev.into());
        self
    }

    pub fn change(mut self, rev: impl Into<RevisionId>) -> Self {
        self.change = Some(rev.into());
        self
    }

    pub fn files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }

    pub fn git(mut self) -> Self {
        self.git = true;
        self
    }
}

/// Options for [`Repository::status`](crate::Repository::status)
#[derive(Debug, Clone, Default)]
pub struct StatusOptions {
    pub from: Option<RevisionId>,
    pub to: Option<RevisionId>,
    pub change: Option<RevisionId>,
    /// Also report clean files
    pub clean: bool,
    /// Also report ignored files
    pub ignored: bool,
    pub files: Vec<String>,
}

impl StatusOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(mut self, rev: impl Into<RevisionId>) -> Self {
        self.from = Some(rev.into());
        self
    }

    pub fn to(mut self, rev: impl Into<RevisionId>) -> Self {
        self.to = Some(rev.into());
        self
    }

    pub fn change(mut self, rev: impl Into<RevisionId>) -> Self {
        self.change = Some(rev.into());
        self
    }

    pub fn clean(mut self) -> Self {
        self.clean = true;
        self
    }

    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    pub fn files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }
}

/// Options for [`Repository::revert`](crate::Repository::revert)
#[derive(Debug, Clone, Default)]
pub struct RevertOptions {
    /// Files to revert; empty reverts everything
    pub files: Vec<String>,
    pub revision: Option<RevisionId>,
    /// Do not keep `.orig` backups
    pub no_backup: bool,
}

/// Options for [`Repository::tag`](crate::Repository::tag)
#[derive(Debug, Clone, Default)]
pub struct TagOptions {
    pub names: Vec<String>,
    pub revision: Option<RevisionId>,
    pub message: Option<String>,
    pub user: Option<String>,
    /// Local tags are not versioned and create no commit
    pub local: bool,
}

impl TagOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            names: vec![name.into()],
            ..Default::default()
        }
    }

    pub fn revision(mut self, rev: impl Into<RevisionId>) -> Self {
        self.revision = Some(rev.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn local(mut self) -> Self {
        self.local = true;
        self
    }
}

/// Options for [`Repository::clone_from`](crate::Repository::clone_from)
#[derive(Debug, Clone, Default)]
pub struct CloneOptions {
    /// Do not check out a working copy
    pub noupdate: bool,
    pub revision: Option<RevisionId>,
    pub branch: Option<String>,
}

/// Options for [`Repository::push`](crate::Repository::push)
#[derive(Debug, Clone, Default)]
pub struct PushOptions {
    pub destination: Option<String>,
    pub revision: Option<RevisionId>,
    pub force: bool,
    pub new_branch: bool,
}

/// Options for [`Repository::pull`](crate::Repository::pull)
#[derive(Debug, Clone, Default)]
pub struct PullOptions {
    pub source: Option<String>,
    /// Update the working copy after pulling
    pub update: bool,
}

/// Options for [`Repository::merge_with`](crate::Repository::merge_with)
#[derive(Debug, Clone)]
pub struct MergeOptions {
    pub revision: Option<RevisionId>,
    /// Merge tool; the default leaves conflict markers instead of prompting
    pub tool: String,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            revision: None,
            tool: "internal:merge".to_string(),
        }
    }
}

/// Actions for [`Repository::bookmark`](crate::Repository::bookmark)
#[derive(Debug, Clone)]
pub enum BookmarkAction {
    Create {
        name: String,
        revision: Option<RevisionId>,
        force: bool,
        inactive: bool,
    },
    Delete(String),
    Rename {
        from: String,
        to: String,
    },
    /// Deactivate the active bookmark without deleting it
    Deactivate,
}
