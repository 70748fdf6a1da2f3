//! Repository facade
//!
//! A [`Repository`] is a path plus an executor. Each method builds the
//! argument list for one hg subcommand, runs it, and parses the output with
//! the parser for that format. Nothing read from the repository is cached
//! except the hg version, so results always reflect what is on disk.
//!
//! Mutating calls against one working copy must be serialized by the
//! caller; no locking is done here.

use hgapi_core::{
    Bookmark, Branch, ClientConfig, CommitId, DiffEntry, HgError, MergeSummary, Result, Revision,
    RevisionId, RevisionRange, StatusEntry, Tag,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

use crate::command::{self, HgCommand, HgExecutor, HgOutput};
use crate::diff::parse_diff;
use crate::listing::{
    parse_bookmarks, parse_branches, parse_commit, parse_identify, parse_paths, parse_tags,
    parse_version,
};
use crate::log::{parse_log, parse_single, LOG_TEMPLATE};
use crate::merge::{parse_conflicts, parse_merge_preview, parse_merge_summary};
use crate::options::{
    BookmarkAction, CloneOptions, CommitOptions, DiffOptions, LogOptions, MergeOptions,
    PullOptions, PushOptions, RevertOptions, StatusOptions, TagOptions,
};
use crate::showconfig::{parse_bool, parse_list, parse_showconfig, ConfigMap};
use crate::status::parse_status;
use crate::validate::{path_arg, validate_name, validate_path, validate_paths, validate_revision};

/// Exit code hg uses for "nothing found" outcomes (no heads, no incoming
/// changes, nothing to push, unset config key)
const EXIT_NOTHING: i32 = 1;

/// A Mercurial repository at a filesystem path
pub struct Repository<E: HgExecutor = HgCommand> {
    path: PathBuf,
    executor: E,
    user: Option<String>,
    version: OnceCell<String>,
}

impl Repository<HgCommand> {
    /// Handle for the repository at `path` using the real hg binary
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::open(path, ClientConfig::default())
    }

    /// Handle for the repository at `path` with a client configuration
    pub fn open(path: impl Into<PathBuf>, config: ClientConfig) -> Self {
        let user = config.default_user.clone();
        let mut repo = Self::with_executor(path, HgCommand::with_config(config));
        repo.user = user;
        repo
    }
}

impl<E: HgExecutor> Repository<E> {
    pub fn with_executor(path: impl Into<PathBuf>, executor: E) -> Self {
        Self {
            path: path.into(),
            executor,
            user: None,
            version: OnceCell::new(),
        }
    }

    /// Set the committer used when a commit or tag does not name one
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Whether the path holds a repository (has a `.hg` directory)
    pub fn exists(&self) -> bool {
        self.path.join(".hg").is_dir()
    }

    /// Find the repository containing `start`
    ///
    /// Executes: `hg root`
    pub async fn discover(executor: E, start: impl AsRef<Path>) -> Result<Self> {
        let start = start.as_ref();
        let output = command::run(&executor, start, "root", &[]).await?;
        let root = PathBuf::from(output.stdout_trimmed());
        debug!("Discovered repository at {}", root.display());
        Ok(Self::with_executor(root, executor))
    }

    /// Clone `source` (path or URL) into `dest` and return a handle for the clone
    ///
    /// Executes: `hg clone {source} {dest} [-U] [-r rev] [-b branch]`
    pub async fn clone_from(
        executor: E,
        source: &str,
        dest: impl Into<PathBuf>,
        options: &CloneOptions,
    ) -> Result<Self> {
        let dest = dest.into();
        if dest.join(".hg").exists() {
            return Err(HgError::Precondition(format!(
                "{} is already a repository",
                dest.display()
            )));
        }

        let mut args = vec![
            validate_name(source, "clone source")?.to_string(),
            path_arg(&dest)?,
        ];
        if options.noupdate {
            args.push("-U".to_string());
        }
        if let Some(rev) = &options.revision {
            args.push("-r".to_string());
            args.push(validate_revision(rev)?);
        }
        if let Some(branch) = &options.branch {
            args.push("-b".to_string());
            args.push(validate_name(branch, "branch")?.to_string());
        }

        command::run(&executor, Path::new("."), "clone", &args).await?;
        info!("Cloned {} into {}", source, dest.display());

        Ok(Self::with_executor(dest, executor))
    }

    fn ensure_path(&self) -> Result<()> {
        if self.path.is_dir() {
            Ok(())
        } else {
            Err(HgError::Precondition(format!(
                "repository path {} does not exist",
                self.path.display()
            )))
        }
    }

    /// Run a subcommand in the repository, failing on non-zero exit
    async fn run(&self, subcommand: &str, args: &[String]) -> Result<HgOutput> {
        self.ensure_path()?;
        command::run(&self.executor, &self.path, subcommand, args).await
    }

    /// Run a subcommand in the repository and return the output whatever the exit code
    async fn invoke(&self, subcommand: &str, args: &[String]) -> Result<HgOutput> {
        self.ensure_path()?;
        command::invoke(&self.executor, &self.path, subcommand, args).await
    }

    /// Run a subcommand where exit code 1 means "nothing to report"
    ///
    /// Returns `None` for that outcome.
    async fn run_or_nothing(&self, subcommand: &str, args: &[String]) -> Result<Option<HgOutput>> {
        let output = self.invoke(subcommand, args).await?;
        if output.exit_code == Some(EXIT_NOTHING) {
            debug!("hg {} reported nothing", subcommand);
            return Ok(None);
        }
        output.check(subcommand, args).map(Some)
    }

    /// Create a new repository at the path
    ///
    /// Executes: `hg init`. The directory is created if missing.
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn init(&self) -> Result<()> {
        if self.exists() {
            return Err(HgError::Precondition(format!(
                "{} is already a repository",
                self.path.display()
            )));
        }

        tokio::fs::create_dir_all(&self.path).await?;
        command::run(&self.executor, &self.path, "init", &[]).await?;
        info!("Initialized repository at {}", self.path.display());
        Ok(())
    }

    /// Schedule files for addition; no files adds every untracked file
    #[instrument(skip(self, files), fields(repo = %self.path.display()))]
    pub async fn add<S: AsRef<str>>(&self, files: &[S]) -> Result<()> {
        let args = validate_paths(files, "file")?;
        self.run("add", &args).await?;
        Ok(())
    }

    /// Add untracked and remove missing files; no files means the whole working copy
    ///
    /// `similarity` (0-100) enables rename detection.
    #[instrument(skip(self, files), fields(repo = %self.path.display()))]
    pub async fn addremove<S: AsRef<str>>(&self, files: &[S], similarity: Option<u8>) -> Result<()> {
        let mut args = Vec::new();
        if let Some(similarity) = similarity {
            if similarity > 100 {
                return Err(HgError::InvalidArgument(format!(
                    "similarity must be between 0 and 100, got {}",
                    similarity
                )));
            }
            args.push("-s".to_string());
            args.push(similarity.to_string());
        }
        args.extend(validate_paths(files, "file")?);
        self.run("addremove", &args).await?;
        Ok(())
    }

    /// Schedule tracked files for removal
    #[instrument(skip(self, files), fields(repo = %self.path.display()))]
    pub async fn remove<S: AsRef<str>>(&self, files: &[S]) -> Result<()> {
        if files.is_empty() {
            return Err(HgError::Precondition(
                "remove needs at least one file".to_string(),
            ));
        }
        let args = validate_paths(files, "file")?;
        self.run("remove", &args).await?;
        Ok(())
    }

    /// Rename (move) a tracked file
    ///
    /// Executes: `hg rename {source} {destination}`
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn rename(&self, source: &str, destination: &str) -> Result<()> {
        let args = vec![
            validate_path(source, "source")?.to_string(),
            validate_path(destination, "destination")?.to_string(),
        ];
        self.run("rename", &args).await?;
        Ok(())
    }

    /// Restore files to their committed state; no files reverts everything
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn revert(&self, options: &RevertOptions) -> Result<()> {
        let mut args = Vec::new();
        if let Some(rev) = &options.revision {
            args.push("-r".to_string());
            args.push(validate_revision(rev)?);
        }
        if options.no_backup {
            args.push("--no-backup".to_string());
        }
        if options.files.is_empty() {
            args.push("--all".to_string());
        } else {
            args.extend(validate_paths(&options.files, "file")?);
        }
        self.run("revert", &args).await?;
        Ok(())
    }

    /// Commit pending changes and return the new revision
    ///
    /// Executes: `hg commit -v -m {message} [-u user] [-d date] [--close-branch] [files...]`
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn commit(&self, options: &CommitOptions) -> Result<CommitId> {
        if options.message.trim().is_empty() {
            return Err(HgError::InvalidArgument(
                "commit message cannot be empty".to_string(),
            ));
        }

        let mut args = vec!["-v".to_string(), "-m".to_string(), options.message.clone()];
        if let Some(user) = options.user.as_deref().or(self.user.as_deref()) {
            args.push("-u".to_string());
            args.push(validate_name(user, "user")?.to_string());
        }
        if let Some(date) = &options.date {
            args.push("-d".to_string());
            args.push(validate_name(date, "date")?.to_string());
        }
        if options.close_branch {
            args.push("--close-branch".to_string());
        }
        args.extend(validate_paths(&options.files, "file")?);

        let output = self.run("commit", &args).await?;
        let id = parse_commit(&output.stdout)?;
        debug!("Committed {}", id);
        Ok(id)
    }

    /// Query the working copy branch, or set it when `name` is given
    ///
    /// Returns the current (or new) branch name.
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn branch(&self, name: Option<&str>) -> Result<String> {
        match name {
            Some(name) => {
                let name = validate_name(name, "branch")?;
                self.run("branch", &[name.to_string()]).await?;
                Ok(name.to_string())
            }
            None => {
                let output = self.run("branch", &[]).await?;
                Ok(output.stdout_trimmed().trim().to_string())
            }
        }
    }

    /// List named branches, newest first
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn branches(&self, include_closed: bool) -> Result<Vec<Branch>> {
        let args = if include_closed {
            vec!["--closed".to_string()]
        } else {
            Vec::new()
        };
        let output = self.run("branches", &args).await?;
        parse_branches(&output.stdout)
    }

    /// Open branch heads as full revision records
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn heads(&self) -> Result<Vec<Revision>> {
        let args = vec!["--template".to_string(), LOG_TEMPLATE.to_string()];
        match self.run_or_nothing("heads", &args).await? {
            Some(output) => parse_log(&output.stdout),
            None => Ok(Vec::new()),
        }
    }

    /// List tags, including `tip`
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn tags(&self) -> Result<Vec<Tag>> {
        let output = self.run("tags", &["-v".to_string()]).await?;
        parse_tags(&output.stdout)
    }

    /// Add one or more tags
    ///
    /// Executes: `hg tag [-r rev] [-m message] [-u user] [-l] {names...}`
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn tag(&self, options: &TagOptions) -> Result<()> {
        if options.names.is_empty() {
            return Err(HgError::InvalidArgument(
                "tag needs at least one name".to_string(),
            ));
        }

        let mut args = Vec::new();
        if let Some(rev) = &options.revision {
            args.push("-r".to_string());
            args.push(validate_revision(rev)?);
        }
        if let Some(message) = &options.message {
            args.push("-m".to_string());
            args.push(message.clone());
        }
        if let Some(user) = options.user.as_deref().or(self.user.as_deref()) {
            args.push("-u".to_string());
            args.push(validate_name(user, "user")?.to_string());
        }
        if options.local {
            args.push("-l".to_string());
        }
        for name in &options.names {
            args.push(validate_name(name, "tag")?.to_string());
        }

        self.run("tag", &args).await?;
        Ok(())
    }

    /// List bookmarks
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn bookmarks(&self) -> Result<Vec<Bookmark>> {
        let output = self.run("bookmarks", &[]).await?;
        parse_bookmarks(&output.stdout)
    }

    /// Create, delete, rename or deactivate a bookmark
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn bookmark(&self, action: &BookmarkAction) -> Result<()> {
        let mut args = Vec::new();
        match action {
            BookmarkAction::Create {
                name,
                revision,
                force,
                inactive,
            } => {
                if *force {
                    args.push("--force".to_string());
                }
                if let Some(rev) = revision {
                    args.push("--rev".to_string());
                    args.push(validate_revision(rev)?);
                }
                if *inactive {
                    args.push("--inactive".to_string());
                }
                args.push(validate_name(name, "bookmark")?.to_string());
            }
            BookmarkAction::Delete(name) => {
                args.push("--delete".to_string());
                args.push(validate_name(name, "bookmark")?.to_string());
            }
            BookmarkAction::Rename { from, to } => {
                args.push("--rename".to_string());
                args.push(validate_name(from, "bookmark")?.to_string());
                args.push(validate_name(to, "bookmark")?.to_string());
            }
            BookmarkAction::Deactivate => args.push("--inactive".to_string()),
        }

        self.run("bookmarks", &args).await?;
        Ok(())
    }

    /// Revision history
    ///
    /// Newest first unless the revset orders it otherwise (ranges like
    /// `0:tip` come oldest first).
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn log(&self, options: &LogOptions) -> Result<Vec<Revision>> {
        let mut args = Vec::new();
        if let Some(revset) = &options.revset {
            if revset.trim().is_empty() {
                return Err(HgError::InvalidArgument("revset cannot be empty".to_string()));
            }
            args.push("-r".to_string());
            args.push(revset.clone());
        }
        if let Some(branch) = &options.branch {
            args.push("-b".to_string());
            args.push(validate_name(branch, "branch")?.to_string());
        }
        if let Some(limit) = options.limit {
            args.push("-l".to_string());
            args.push(limit.to_string());
        }
        args.push("--template".to_string());
        args.push(LOG_TEMPLATE.to_string());
        args.extend(validate_paths(&options.files, "file")?);

        let output = self.run("log", &args).await?;
        parse_log(&output.stdout)
    }

    /// A single revision by number or symbol
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn revision(&self, id: impl Into<RevisionId> + std::fmt::Debug) -> Result<Revision> {
        let id = validate_revision(&id.into())?;
        let args = vec![
            "-r".to_string(),
            id.clone(),
            "--template".to_string(),
            LOG_TEMPLATE.to_string(),
        ];
        let output = self.run("log", &args).await?;
        parse_single(&output.stdout, &id)
    }

    /// All revisions in a range, in range order
    pub async fn revisions(&self, range: RevisionRange) -> Result<Vec<Revision>> {
        self.log(&LogOptions::new().range(range)).await
    }

    /// Revisions from `lower` to `upper`, both included
    pub async fn revisions_between(
        &self,
        lower: impl Into<RevisionId>,
        upper: impl Into<RevisionId>,
    ) -> Result<Vec<Revision>> {
        self.revisions(RevisionRange::closed(lower, upper)).await
    }

    /// Unified diff split per file
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn diff(&self, options: &DiffOptions) -> Result<Vec<DiffEntry>> {
        let mut args = revision_args(
            "diff",
            ("-r", "-c"),
            options.from.as_ref(),
            options.to.as_ref(),
            options.change.as_ref(),
        )?;
        if options.git {
            args.push("--git".to_string());
        }
        args.extend(validate_paths(&options.files, "file")?);

        let output = self.run("diff", &args).await?;
        parse_diff(&output.stdout)
    }

    /// Per-file change classification
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn status(&self, options: &StatusOptions) -> Result<Vec<StatusEntry>> {
        let mut args = revision_args(
            "status",
            ("--rev", "--change"),
            options.from.as_ref(),
            options.to.as_ref(),
            options.change.as_ref(),
        )?;

        // Asking for clean or ignored files alone would hide the pending ones
        if options.clean || options.ignored {
            for flag in ["--modified", "--added", "--removed", "--deleted", "--unknown"] {
                args.push(flag.to_string());
            }
            if options.clean {
                args.push("--clean".to_string());
            }
            if options.ignored {
                args.push("--ignored".to_string());
            }
        }
        args.extend(validate_paths(&options.files, "file")?);

        let output = self.run("status", &args).await?;
        parse_status(&output.stdout)
    }

    /// Merge another head into the working copy
    ///
    /// Unresolved files raise [`HgError::MergeConflict`]; the working copy is
    /// left with conflict markers for the caller to resolve or abort.
    pub async fn merge(&self, revision: Option<RevisionId>) -> Result<MergeSummary> {
        self.merge_with(&MergeOptions {
            revision,
            ..Default::default()
        })
        .await
    }

    /// Merge with an explicit tool
    ///
    /// Executes: `hg merge --tool {tool} [-r rev]`
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn merge_with(&self, options: &MergeOptions) -> Result<MergeSummary> {
        let mut args = vec![
            "--tool".to_string(),
            validate_name(&options.tool, "merge tool")?.to_string(),
        ];
        let revision = match &options.revision {
            Some(rev) => {
                let rev = validate_revision(rev)?;
                args.push("-r".to_string());
                args.push(rev.clone());
                Some(rev)
            }
            None => None,
        };

        let output = self.invoke("merge", &args).await?;
        let summary = parse_merge_summary(&output.stdout);

        if output.success() {
            return Ok(summary.unwrap_or_default());
        }

        if output.exit_code == Some(EXIT_NOTHING) {
            let unresolved = parse_conflicts(&format!("{}\n{}", output.stdout, output.stderr));
            let summary = summary.unwrap_or_default();
            if summary.unresolved > 0 || !unresolved.is_empty() {
                debug!("Merge left {} unresolved files", summary.unresolved);
                return Err(HgError::MergeConflict {
                    revision,
                    unresolved,
                    summary,
                    stderr: output.stderr.trim_end().to_string(),
                });
            }
        }

        Err(output.into_error("merge", &args))
    }

    /// Revision numbers a merge would bring in, without merging
    ///
    /// Executes: `hg merge -P [-r rev]`
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn merge_preview(&self, revision: Option<RevisionId>) -> Result<Vec<i64>> {
        let mut args = vec!["-P".to_string()];
        if let Some(rev) = &revision {
            args.push("-r".to_string());
            args.push(validate_revision(rev)?);
        }
        let output = self.run("merge", &args).await?;
        parse_merge_preview(&output.stdout)
    }

    /// Pull changes from a remote
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn pull(&self, options: &PullOptions) -> Result<()> {
        let mut args = Vec::new();
        if options.update {
            args.push("-u".to_string());
        }
        if let Some(source) = &options.source {
            args.push(validate_name(source, "source")?.to_string());
        }
        self.run("pull", &args).await?;
        Ok(())
    }

    /// Push changes to a remote
    ///
    /// Returns `false` when there was nothing to push.
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn push(&self, options: &PushOptions) -> Result<bool> {
        let mut args = Vec::new();
        if options.force {
            args.push("-f".to_string());
        }
        if options.new_branch {
            args.push("--new-branch".to_string());
        }
        if let Some(rev) = &options.revision {
            args.push("-r".to_string());
            args.push(validate_revision(rev)?);
        }
        if let Some(destination) = &options.destination {
            args.push(validate_name(destination, "destination")?.to_string());
        }
        Ok(self.run_or_nothing("push", &args).await?.is_some())
    }

    /// Revisions a pull from `remote` would bring in
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn incoming(&self, remote: Option<&str>) -> Result<Vec<Revision>> {
        self.remote_changes("incoming", remote).await
    }

    /// Revisions a push to `remote` would send
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn outgoing(&self, remote: Option<&str>) -> Result<Vec<Revision>> {
        self.remote_changes("outgoing", remote).await
    }

    async fn remote_changes(&self, subcommand: &str, remote: Option<&str>) -> Result<Vec<Revision>> {
        let mut args = vec![
            "--quiet".to_string(),
            "--template".to_string(),
            LOG_TEMPLATE.to_string(),
        ];
        if let Some(remote) = remote {
            args.push(validate_name(remote, "remote")?.to_string());
        }
        match self.run_or_nothing(subcommand, &args).await? {
            Some(output) => parse_log(&output.stdout),
            None => Ok(Vec::new()),
        }
    }

    /// Configured remotes, alias to location
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn paths(&self) -> Result<BTreeMap<String, String>> {
        let output = self.run("paths", &[]).await?;
        parse_paths(&output.stdout)
    }

    /// Update the working copy to a revision
    ///
    /// Executes: `hg update -r {rev} [-C]`
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn update(&self, revision: impl Into<RevisionId> + std::fmt::Debug, clean: bool) -> Result<()> {
        let mut args = vec!["-r".to_string(), validate_revision(&revision.into())?];
        if clean {
            args.push("-C".to_string());
        }
        self.run("update", &args).await?;
        Ok(())
    }

    /// Short node of the working copy parent, without the dirty marker
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn id(&self) -> Result<String> {
        let output = self.run("id", &["-i".to_string()]).await?;
        Ok(parse_identify(&output.stdout)?.0)
    }

    /// Whether the working copy has uncommitted changes
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn is_dirty(&self) -> Result<bool> {
        let output = self.run("id", &["-i".to_string()]).await?;
        Ok(parse_identify(&output.stdout)?.1)
    }

    /// Revision number of the working copy parent; -1 in an empty repository
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn rev_number(&self) -> Result<i64> {
        let output = self.run("id", &["-n".to_string()]).await?;
        let (rev, _) = parse_identify(&output.stdout)?;
        rev.parse::<i64>()
            .map_err(|_| HgError::Parse(format!("invalid revision number: {:?}", rev)))
    }

    /// Full node of the working copy parent
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn node(&self) -> Result<String> {
        let args = vec![
            "-r".to_string(),
            ".".to_string(),
            "--template".to_string(),
            "{node}".to_string(),
        ];
        let output = self.run("log", &args).await?;
        let node = output.stdout_trimmed().trim();
        if node.len() != 40 || !node.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(HgError::Parse(format!("invalid node: {:?}", node)));
        }
        Ok(node.to_string())
    }

    /// Root directory of the repository
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn root(&self) -> Result<PathBuf> {
        let output = self.run("root", &[]).await?;
        Ok(PathBuf::from(output.stdout_trimmed()))
    }

    /// Mercurial version, queried once per handle
    pub async fn version(&self) -> Result<String> {
        self.version
            .get_or_try_init(|| hg_version(&self.executor))
            .await
            .cloned()
    }

    /// Value of `section.key`, `None` when unset
    ///
    /// Executes: `hg showconfig {section}.{key}`
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn config(&self, section: &str, key: &str) -> Result<Option<String>> {
        let name = format!(
            "{}.{}",
            validate_name(section, "config section")?,
            validate_name(key, "config key")?
        );
        Ok(self
            .run_or_nothing("showconfig", &[name])
            .await?
            .map(|output| output.stdout_trimmed().to_string()))
    }

    /// `section.key` as a boolean; unset is `false`
    pub async fn config_bool(&self, section: &str, key: &str) -> Result<bool> {
        let value = self.config(section, key).await?;
        parse_bool(section, key, value.as_deref())
    }

    /// `section.key` as a list; unset is empty
    pub async fn config_list(&self, section: &str, key: &str) -> Result<Vec<String>> {
        let value = self.config(section, key).await?;
        Ok(parse_list(value.as_deref()))
    }

    /// Every configuration value visible to the repository
    #[instrument(skip(self), fields(repo = %self.path.display()))]
    pub async fn read_config(&self) -> Result<ConfigMap> {
        let output = self.run("showconfig", &[]).await?;
        Ok(parse_showconfig(&output.stdout))
    }
}

/// Revision flags shared by `diff` and `status`
///
/// A single `-r X` compares X with the working copy, so an upper endpoint
/// without a lower one has no faithful rendering and is rejected.
fn revision_args(
    subcommand: &str,
    (rev_flag, change_flag): (&str, &str),
    from: Option<&RevisionId>,
    to: Option<&RevisionId>,
    change: Option<&RevisionId>,
) -> Result<Vec<String>> {
    let revisions: Vec<(&str, &RevisionId)> = match (change, from, to) {
        (Some(change), None, None) => vec![(change_flag, change)],
        (Some(_), _, _) => {
            return Err(HgError::InvalidArgument(format!(
                "{} --change cannot be combined with from/to revisions",
                subcommand
            )))
        }
        (None, None, Some(_)) => {
            return Err(HgError::InvalidArgument(format!(
                "{} needs a from revision when a to revision is given",
                subcommand
            )))
        }
        (None, from, to) => [from, to]
            .into_iter()
            .flatten()
            .map(|rev| (rev_flag, rev))
            .collect(),
    };

    let mut args = Vec::new();
    for (flag, rev) in revisions {
        args.push(flag.to_string());
        args.push(validate_revision(rev)?);
    }
    Ok(args)
}

/// Mercurial version reported by `hg version`
pub async fn hg_version<E: HgExecutor + ?Sized>(executor: &E) -> Result<String> {
    let output = command::run(executor, Path::new("."), "version", &[]).await?;
    parse_version(&output.stdout)
}
