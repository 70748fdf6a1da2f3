//! hgapi CLI - typed Mercurial operations from the shell
//!
//! Usage:
//!   hgapi status                 Show working copy changes
//!   hgapi log -l 5               Show recent history
//!   hgapi commit -m <message>    Commit pending changes
//!   hgapi merge <rev>            Merge another head
//!   hgapi config ui.username     Read a configuration value
//!
//! Every subcommand accepts `--json` for machine-readable output.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use hgapi_core::{ClientConfig, Revision, RevisionId};
use hgapi_hg::{
    group_status, BookmarkAction, CloneOptions, CommitOptions, DiffOptions, HgCommand, LogOptions,
    MergeOptions, PullOptions, PushOptions, Repository, RevertOptions, StatusOptions, TagOptions,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "hgapi")]
#[command(author, version, about = "Typed facade over the Mercurial command line")]
struct Cli {
    /// Repository path
    #[arg(short = 'R', long, global = true, default_value = ".")]
    repo: PathBuf,

    /// Client configuration file (defaults to <repo>/hgapi.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new repository at --repo
    Init,

    /// Copy an existing repository
    Clone {
        source: String,
        dest: PathBuf,

        /// Do not check out a working copy
        #[arg(short = 'U', long)]
        noupdate: bool,

        #[arg(short, long)]
        rev: Option<String>,

        #[arg(short, long)]
        branch: Option<String>,
    },

    /// Schedule files for addition (all untracked files when none given)
    Add { files: Vec<String> },

    /// Add new files and remove missing ones
    Addremove {
        files: Vec<String>,

        /// Guess renames by similarity (0-100)
        #[arg(short, long)]
        similarity: Option<u8>,
    },

    /// Schedule files for removal
    Remove {
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Restore files to their committed state (everything when none given)
    Revert {
        files: Vec<String>,

        #[arg(short, long)]
        rev: Option<String>,

        /// Do not save .orig backups
        #[arg(long)]
        no_backup: bool,
    },

    /// Rename a tracked file
    Rename { source: String, dest: String },

    /// Commit pending changes
    Commit {
        #[arg(short, long)]
        message: String,

        #[arg(short, long)]
        user: Option<String>,

        #[arg(short, long)]
        date: Option<String>,

        #[arg(long)]
        close_branch: bool,

        files: Vec<String>,
    },

    /// Show or set the working copy branch
    Branch { name: Option<String> },

    /// List named branches
    Branches {
        /// Include closed branches
        #[arg(short, long)]
        closed: bool,
    },

    /// Show open branch heads
    Heads,

    /// List tags
    Tags,

    /// List bookmarks, or create, delete, rename and deactivate one
    Bookmarks {
        name: Option<String>,

        #[arg(short, long)]
        rev: Option<String>,

        #[arg(short, long)]
        delete: bool,

        /// Rename the bookmark OLD to NAME
        #[arg(short = 'm', long, value_name = "OLD")]
        rename: Option<String>,

        #[arg(short, long)]
        inactive: bool,

        #[arg(short, long)]
        force: bool,
    },

    /// Show revision history
    Log {
        /// Revset to show
        #[arg(short, long)]
        rev: Option<String>,

        #[arg(short, long)]
        limit: Option<usize>,

        #[arg(short, long)]
        branch: Option<String>,

        files: Vec<String>,
    },

    /// Show a single revision (the working copy parent by default)
    Show { rev: Option<String> },

    /// Show differences, per file
    Diff {
        /// Revision to compare (give twice for a range)
        #[arg(short, long)]
        rev: Vec<String>,

        /// Changes introduced by one revision
        #[arg(short, long, conflicts_with = "rev")]
        change: Option<String>,

        #[arg(long)]
        git: bool,

        files: Vec<String>,
    },

    /// Show changed files in the working copy
    Status {
        /// Compare against a revision (give twice for a range)
        #[arg(long)]
        rev: Vec<String>,

        #[arg(long, conflicts_with = "rev")]
        change: Option<String>,

        #[arg(short, long)]
        clean: bool,

        #[arg(short, long)]
        ignored: bool,

        files: Vec<String>,
    },

    /// Merge another head into the working copy
    Merge {
        rev: Option<String>,

        #[arg(short, long, default_value = "internal:merge")]
        tool: String,

        /// List the revisions to be merged without merging
        #[arg(short = 'P', long)]
        preview: bool,
    },

    /// Pull changes from a remote
    Pull {
        source: Option<String>,

        #[arg(short, long)]
        update: bool,
    },

    /// Push changes to a remote
    Push {
        dest: Option<String>,

        #[arg(short, long)]
        rev: Option<String>,

        #[arg(short, long)]
        force: bool,

        #[arg(long)]
        new_branch: bool,
    },

    /// Show revisions a pull would bring in
    Incoming { remote: Option<String> },

    /// Show revisions a push would send
    Outgoing { remote: Option<String> },

    /// Show configured remotes
    Paths,

    /// Update the working copy
    Update {
        rev: String,

        /// Discard uncommitted changes
        #[arg(short = 'C', long)]
        clean: bool,
    },

    /// Tag a revision
    Tag {
        #[arg(required = true)]
        names: Vec<String>,

        #[arg(short, long)]
        rev: Option<String>,

        #[arg(short, long)]
        message: Option<String>,

        /// Make the tag local to this repository
        #[arg(short, long)]
        local: bool,
    },

    /// Identify the working copy parent
    Id,

    /// Print the repository root
    Root,

    /// Print the Mercurial version
    Version,

    /// Show configuration (all values, or a single section.key)
    Config {
        name: Option<String>,

        /// Interpret the value as a boolean
        #[arg(long = "bool", conflicts_with = "as_list")]
        as_bool: bool,

        /// Interpret the value as a list
        #[arg(long = "list")]
        as_list: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; RUST_LOG overrides --verbose
    let level = log_level(cli.verbose);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(&cli.repo, cli.config.as_deref())?;
    debug!("Using hg binary {}", config.hg_binary);

    let json = cli.json;
    match cli.command {
        Commands::Clone {
            source,
            dest,
            noupdate,
            rev,
            branch,
        } => {
            let options = CloneOptions {
                noupdate,
                revision: rev.map(RevisionId::from),
                branch,
            };
            let repo =
                Repository::clone_from(HgCommand::with_config(config), &source, dest, &options)
                    .await
                    .with_context(|| format!("Failed to clone {}", source))?;
            println!("Cloned {} into {}", source, repo.path().display());
            Ok(())
        }
        Commands::Init => {
            let repo = Repository::open(&cli.repo, config);
            run_command(&repo, Commands::Init, json).await
        }
        command => {
            let repo = discover_repository(&cli.repo, config).await?;
            run_command(&repo, command, json).await
        }
    }
}

fn log_level(verbose: bool) -> Level {
    if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Open the repository containing `start`, which may be a subdirectory
async fn discover_repository(start: &Path, config: ClientConfig) -> Result<Repository<HgCommand>> {
    let executor = HgCommand::with_config(config);
    let user = executor.config().default_user.clone();
    let repo = Repository::discover(executor, start)
        .await
        .with_context(|| format!("No repository found at {}", start.display()))?;
    Ok(match user {
        Some(user) => repo.with_user(user),
        None => repo,
    })
}

fn load_config(repo: &Path, explicit: Option<&Path>) -> Result<ClientConfig> {
    match explicit {
        Some(path) => ClientConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => ClientConfig::load_or_default(repo).context("Failed to load hgapi.toml"),
    }
}

async fn run_command(repo: &Repository<HgCommand>, command: Commands, json: bool) -> Result<()> {
    match command {
        Commands::Init => {
            repo.init().await.context("Failed to initialize repository")?;
            println!("Initialized repository in {}", repo.path().display());
        }
        Commands::Clone { .. } => bail!("clone does not operate on an existing repository"),
        Commands::Add { files } => repo.add(&files).await?,
        Commands::Addremove { files, similarity } => repo.addremove(&files, similarity).await?,
        Commands::Remove { files } => repo.remove(&files).await?,
        Commands::Revert {
            files,
            rev,
            no_backup,
        } => {
            repo.revert(&RevertOptions {
                files,
                revision: rev.map(RevisionId::from),
                no_backup,
            })
            .await?
        }
        Commands::Rename { source, dest } => repo.rename(&source, &dest).await?,
        Commands::Commit {
            message,
            user,
            date,
            close_branch,
            files,
        } => {
            let options = CommitOptions {
                message,
                user,
                date,
                close_branch,
                files,
            };
            let id = repo.commit(&options).await.context("Commit failed")?;
            output(json, &id, || println!("committed changeset {}", id))?;
        }
        Commands::Branch { name } => {
            let branch = repo.branch(name.as_deref()).await?;
            output(json, &branch, || println!("{}", branch))?;
        }
        Commands::Branches { closed } => {
            let branches = repo.branches(closed).await?;
            output(json, &branches, || {
                for b in &branches {
                    println!("{:<30} {}:{} ({:?})", b.name, b.rev, b.node, b.state);
                }
            })?;
        }
        Commands::Heads => {
            let heads = repo.heads().await?;
            output(json, &heads, || print_revisions(&heads))?;
        }
        Commands::Tags => {
            let tags = repo.tags().await?;
            output(json, &tags, || {
                for t in &tags {
                    let local = if t.local { " local" } else { "" };
                    println!("{:<30} {}:{}{}", t.name, t.rev, t.node, local);
                }
            })?;
        }
        Commands::Bookmarks {
            name,
            rev,
            delete,
            rename,
            inactive,
            force,
        } => {
            let action = match (name, rename) {
                (Some(name), _) if delete => Some(BookmarkAction::Delete(name)),
                (Some(to), Some(from)) => Some(BookmarkAction::Rename { from, to }),
                (Some(name), None) => Some(BookmarkAction::Create {
                    name,
                    revision: rev.map(RevisionId::from),
                    force,
                    inactive,
                }),
                (None, Some(_)) => bail!("--rename needs the new bookmark name"),
                (None, None) if delete => bail!("--delete needs a bookmark name"),
                (None, None) if inactive => Some(BookmarkAction::Deactivate),
                (None, None) => None,
            };

            match action {
                Some(action) => repo.bookmark(&action).await?,
                None => {
                    let bookmarks = repo.bookmarks().await?;
                    output(json, &bookmarks, || {
                        if bookmarks.is_empty() {
                            println!("no bookmarks set");
                        }
                        for b in &bookmarks {
                            let marker = if b.active { "*" } else { " " };
                            println!(" {} {:<28} {}:{}", marker, b.name, b.rev, b.node);
                        }
                    })?;
                }
            }
        }
        Commands::Log {
            rev,
            limit,
            branch,
            files,
        } => {
            let options = LogOptions {
                revset: rev,
                limit,
                branch,
                files,
            };
            let revisions = repo.log(&options).await?;
            output(json, &revisions, || print_revisions(&revisions))?;
        }
        Commands::Show { rev } => {
            let rev = rev
                .map(RevisionId::from)
                .unwrap_or_else(RevisionId::working_parent);
            let revision = repo.revision(rev).await?;
            output(json, &revision, || {
                print_revision(&revision);
                println!();
                for line in revision.description.lines() {
                    println!("    {}", line);
                }
            })?;
        }
        Commands::Diff {
            rev,
            change,
            git,
            files,
        } => {
            let (from, to) = revision_pair(rev)?;
            let options = DiffOptions {
                from,
                to,
                change: change.map(RevisionId::from),
                files,
                git,
            };
            let entries = repo.diff(&options).await?;
            output(json, &entries, || {
                for entry in &entries {
                    print!("{}", entry.diff);
                }
            })?;
        }
        Commands::Status {
            rev,
            change,
            clean,
            ignored,
            files,
        } => {
            let (from, to) = revision_pair(rev)?;
            let options = StatusOptions {
                from,
                to,
                change: change.map(RevisionId::from),
                clean,
                ignored,
                files,
            };
            let entries = repo.status(&options).await?;
            if json {
                print_json(&group_status(&entries))?;
            } else {
                for entry in &entries {
                    println!("{} {}", entry.kind.code(), entry.path);
                }
            }
        }
        Commands::Merge { rev, tool, preview } => {
            let revision = rev.map(RevisionId::from);
            if preview {
                let revs = repo.merge_preview(revision).await?;
                output(json, &revs, || {
                    for rev in &revs {
                        println!("{}", rev);
                    }
                })?;
            } else {
                let summary = repo
                    .merge_with(&MergeOptions { revision, tool })
                    .await
                    .context("Merge failed")?;
                output(json, &summary, || {
                    println!(
                        "{} files updated, {} files merged, {} files removed, {} files unresolved",
                        summary.updated, summary.merged, summary.removed, summary.unresolved
                    )
                })?;
            }
        }
        Commands::Pull { source, update } => {
            repo.pull(&PullOptions { source, update }).await?;
        }
        Commands::Push {
            dest,
            rev,
            force,
            new_branch,
        } => {
            let options = PushOptions {
                destination: dest,
                revision: rev.map(RevisionId::from),
                force,
                new_branch,
            };
            let pushed = repo.push(&options).await?;
            output(json, &pushed, || {
                if !pushed {
                    println!("no changes found");
                }
            })?;
        }
        Commands::Incoming { remote } => {
            let revisions = repo.incoming(remote.as_deref()).await?;
            output(json, &revisions, || print_revisions(&revisions))?;
        }
        Commands::Outgoing { remote } => {
            let revisions = repo.outgoing(remote.as_deref()).await?;
            output(json, &revisions, || print_revisions(&revisions))?;
        }
        Commands::Paths => {
            let paths = repo.paths().await?;
            output(json, &paths, || {
                for (alias, url) in &paths {
                    println!("{} = {}", alias, url);
                }
            })?;
        }
        Commands::Update { rev, clean } => repo.update(rev, clean).await?,
        Commands::Tag {
            names,
            rev,
            message,
            local,
        } => {
            let options = TagOptions {
                names,
                revision: rev.map(RevisionId::from),
                message,
                user: None,
                local,
            };
            repo.tag(&options).await?;
        }
        Commands::Id => {
            let id = repo.id().await?;
            let dirty = repo.is_dirty().await?;
            output(
                json,
                &serde_json::json!({ "id": id, "dirty": dirty }),
                || println!("{}{}", id, if dirty { "+" } else { "" }),
            )?;
        }
        Commands::Root => {
            let root = repo.root().await?;
            output(json, &root, || println!("{}", root.display()))?;
        }
        Commands::Version => {
            let version = repo.version().await?;
            output(json, &version, || println!("{}", version))?;
        }
        Commands::Config {
            name,
            as_bool,
            as_list,
        } => match name {
            None => {
                let config = repo.read_config().await?;
                output(json, &config, || {
                    for (section, values) in &config {
                        for (key, value) in values {
                            println!("{}.{}={}", section, key, value);
                        }
                    }
                })?;
            }
            Some(name) => {
                let (section, key) = name
                    .split_once('.')
                    .with_context(|| format!("Expected section.key, got '{}'", name))?;
                if as_bool {
                    let value = repo.config_bool(section, key).await?;
                    output(json, &value, || println!("{}", value))?;
                } else if as_list {
                    let values = repo.config_list(section, key).await?;
                    output(json, &values, || {
                        for value in &values {
                            println!("{}", value);
                        }
                    })?;
                } else {
                    let value = repo.config(section, key).await?;
                    output(json, &value, || {
                        if let Some(value) = &value {
                            println!("{}", value);
                        }
                    })?;
                }
            }
        },
    }

    Ok(())
}

/// Split repeated `--rev` values into an optional range
fn revision_pair(revs: Vec<String>) -> Result<(Option<RevisionId>, Option<RevisionId>)> {
    let mut revs = revs.into_iter().map(RevisionId::from);
    let pair = (revs.next(), revs.next());
    if revs.next().is_some() {
        bail!("--rev may be given at most twice");
    }
    Ok(pair)
}

fn output<T: Serialize>(json: bool, value: &T, human: impl FnOnce()) -> Result<()> {
    if json {
        print_json(value)
    } else {
        human();
        Ok(())
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_revision(rev: &Revision) {
    println!(
        "{}:{} {} {} {}",
        rev.rev,
        rev.short_node(),
        rev.branch,
        rev.author,
        rev.date.format("%Y-%m-%d %H:%M %z")
    );
}

fn print_revisions(revisions: &[Revision]) {
    for rev in revisions {
        print_revision(rev);
        println!("    {}", rev.summary());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["hgapi", "status", "--json", "-R", "/tmp/repo"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.repo, PathBuf::from("/tmp/repo"));
        assert!(matches!(cli.command, Commands::Status { .. }));
    }

    #[test]
    fn test_config_flags_conflict() {
        assert!(Cli::try_parse_from(["hgapi", "config", "ui.debug", "--bool", "--list"]).is_err());
    }

    #[test]
    fn test_default_log_level() {
        assert_eq!(log_level(false), Level::INFO);
        assert_eq!(log_level(true), Level::DEBUG);
    }

    #[test]
    fn test_show_defaults_to_working_parent() {
        let cli = Cli::try_parse_from(["hgapi", "show"]).unwrap();
        assert!(matches!(cli.command, Commands::Show { rev: None }));
    }

    #[test]
    fn test_revision_pair() {
        let (from, to) = revision_pair(vec!["1".to_string(), "tip".to_string()]).unwrap();
        assert_eq!(from, Some(RevisionId::Number(1)));
        assert_eq!(to, Some(RevisionId::tip()));

        assert_eq!(revision_pair(Vec::new()).unwrap(), (None, None));
        assert!(revision_pair(vec!["1".into(), "2".into(), "3".into()]).is_err());
    }
}
