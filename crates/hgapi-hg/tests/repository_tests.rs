//! End-to-end tests against a real `hg` binary
//!
//! Each test works in its own temp dir with user configuration disabled.
//! Tests return early when hg is not installed.

use hgapi_core::{ChangeKind, ClientConfig, HgError, RevisionRange};
use hgapi_hg::{
    group_status, CommitOptions, DiffOptions, HgCommand, Repository, StatusOptions, TagOptions,
};
use std::path::Path;
use tempfile::TempDir;

const USER: &str = "Test User <test@example.com>";

fn hg_available() -> bool {
    std::process::Command::new("hg")
        .arg("version")
        .env("HGRCPATH", "")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn isolated_config() -> ClientConfig {
    ClientConfig::default()
        .with_env("HGRCPATH", "")
        .with_env("HGUSER", USER)
        .with_default_user(USER)
}

async fn new_repo(dir: &TempDir) -> Repository<HgCommand> {
    let repo = Repository::open(dir.path().join("repo"), isolated_config());
    repo.init().await.unwrap();
    repo
}

fn write(repo: &Repository<HgCommand>, file: &str, content: &str) {
    std::fs::write(repo.path().join(file), content).unwrap();
}

fn append(path: &Path, content: &str) {
    let mut existing = std::fs::read_to_string(path).unwrap_or_default();
    existing.push_str(content);
    std::fs::write(path, existing).unwrap();
}

async fn commit_file(repo: &Repository<HgCommand>, file: &str, content: &str, message: &str) {
    write(repo, file, content);
    repo.addremove::<&str>(&[], None).await.unwrap();
    repo.commit(&CommitOptions::new(message)).await.unwrap();
}

#[tokio::test]
async fn test_commit_records_author_and_message() {
    if !hg_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    let repo = new_repo(&dir).await;

    write(&repo, "file.txt", "hello\n");
    repo.add(&["file.txt"]).await.unwrap();
    let id = repo
        .commit(&CommitOptions::new("Adding file.txt"))
        .await
        .unwrap();
    assert_eq!(id.rev, 0);

    let rev = repo.revision("tip").await.unwrap();
    assert_eq!(rev.rev, 0);
    assert_eq!(rev.author, USER);
    assert_eq!(rev.description, "Adding file.txt");
    assert_eq!(rev.branch, "default");
    assert!(rev.parents.is_empty());
    assert!(rev.node.starts_with(&id.node));
    assert!(rev.tags.contains(&"tip".to_string()));

    // Nothing pending after committing everything
    assert!(repo.status(&StatusOptions::new()).await.unwrap().is_empty());
    assert!(!repo.is_dirty().await.unwrap());
    assert_eq!(repo.rev_number().await.unwrap(), 0);
    assert_eq!(repo.node().await.unwrap(), rev.node);
}

#[tokio::test]
async fn test_author_falls_back_to_configured_user() {
    if !hg_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    // No default user on the handle, so hg takes the committer from HGUSER
    let config = ClientConfig::default()
        .with_env("HGRCPATH", "")
        .with_env("HGUSER", USER);
    let repo = Repository::open(dir.path().join("repo"), config);
    repo.init().await.unwrap();
    assert!(repo.user().is_none());

    write(&repo, "file.txt", "hello\n");
    repo.add(&["file.txt"]).await.unwrap();
    let id = repo.commit(&CommitOptions::new("no user given")).await.unwrap();
    assert_eq!(repo.revision(id.rev).await.unwrap().author, USER);

    append(&repo.path().join("file.txt"), "more\n");
    let other = "Other Person <other@example.com>";
    let id = repo
        .commit(&CommitOptions::new("explicit user").user(other))
        .await
        .unwrap();
    assert_eq!(repo.revision(id.rev).await.unwrap().author, other);
}

#[tokio::test]
async fn test_committed_file_is_clean() {
    if !hg_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    let repo = new_repo(&dir).await;
    commit_file(&repo, "file.txt", "content\n", "initial").await;

    let entries = repo.status(&StatusOptions::new().clean()).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, ChangeKind::Clean);
    assert_eq!(entries[0].path, "file.txt");
}

#[tokio::test]
async fn test_init_twice_is_precondition() {
    if !hg_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    let repo = new_repo(&dir).await;

    assert!(matches!(repo.init().await, Err(HgError::Precondition(_))));
}

#[tokio::test]
async fn test_status_and_diff_of_working_copy() {
    if !hg_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    let repo = new_repo(&dir).await;
    commit_file(&repo, "file.txt", "first line\n", "initial").await;

    append(&repo.path().join("file.txt"), "second line\n");
    write(&repo, "scratch.txt", "untracked\n");

    let entries = repo.status(&StatusOptions::new()).await.unwrap();
    let groups = group_status(&entries);
    assert_eq!(groups[&ChangeKind::Modified], vec!["file.txt"]);
    assert_eq!(groups[&ChangeKind::Untracked], vec!["scratch.txt"]);
    assert!(groups[&ChangeKind::Added].is_empty());
    assert!(repo.is_dirty().await.unwrap());

    let diff = repo.diff(&DiffOptions::new()).await.unwrap();
    assert_eq!(diff.len(), 1);
    assert_eq!(diff[0].filename, "file.txt");
    assert!(diff[0].diff.contains("+second line"));
    assert_eq!(diff[0].added_lines().collect::<Vec<_>>(), vec!["second line"]);
}

#[tokio::test]
async fn test_revision_slicing() {
    if !hg_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    let repo = new_repo(&dir).await;
    for i in 0..4 {
        commit_file(&repo, "file.txt", &format!("version {i}\n"), &format!("commit {i}")).await;
    }

    let closed = repo.revisions_between(1, 3).await.unwrap();
    assert_eq!(closed.iter().map(|r| r.rev).collect::<Vec<_>>(), vec![1, 2, 3]);

    let half_open = repo
        .revisions(RevisionRange::half_open(1, 3))
        .await
        .unwrap();
    assert_eq!(half_open.len(), 2);

    let all = repo.revisions(RevisionRange::All).await.unwrap();
    assert_eq!(all.len(), 4);
    assert_eq!(all[2].parents, vec![1]);
}

#[tokio::test]
async fn test_config_bool_from_repository_hgrc() {
    if !hg_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    let repo = new_repo(&dir).await;
    std::fs::write(
        repo.path().join(".hg/hgrc"),
        "[test]\nstuff.debug = True\nstuff.quiet = off\nitems = a, b\n",
    )
    .unwrap();

    assert!(repo.config_bool("test", "stuff.debug").await.unwrap());
    assert!(!repo.config_bool("test", "stuff.quiet").await.unwrap());
    assert!(!repo.config_bool("test", "missing").await.unwrap());
    assert_eq!(repo.config_list("test", "items").await.unwrap(), vec!["a", "b"]);

    let config = repo.read_config().await.unwrap();
    assert_eq!(config["test"]["stuff.debug"], "True");
}

#[tokio::test]
async fn test_branches_and_tags() {
    if !hg_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    let repo = new_repo(&dir).await;
    commit_file(&repo, "file.txt", "base\n", "initial").await;

    repo.branch(Some("feature")).await.unwrap();
    assert_eq!(repo.branch(None).await.unwrap(), "feature");
    commit_file(&repo, "file.txt", "feature\n", "on feature").await;

    let branches = repo.branches(false).await.unwrap();
    let names: Vec<_> = branches.iter().map(|b| b.name.as_str()).collect();
    assert!(names.contains(&"feature"));
    assert!(names.contains(&"default"));

    repo.tag(&TagOptions::new("v1.0").revision(0)).await.unwrap();
    let tags = repo.tags().await.unwrap();
    let v1 = tags.iter().find(|t| t.name == "v1.0").unwrap();
    assert_eq!(v1.rev, 0);
    assert!(!v1.local);
}

#[tokio::test]
async fn test_merge_reports_conflicts() {
    if !hg_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    let repo = new_repo(&dir).await;
    commit_file(&repo, "a.txt", "base\n", "base").await;
    commit_file(&repo, "a.txt", "one side\n", "one").await;
    repo.update(0, false).await.unwrap();
    commit_file(&repo, "a.txt", "other side\n", "other").await;

    assert_eq!(repo.heads().await.unwrap().len(), 2);

    let err = repo.merge(Some(1.into())).await.unwrap_err();
    assert!(err.is_merge_conflict());
    match err {
        HgError::MergeConflict { unresolved, summary, .. } => {
            assert_eq!(unresolved, vec!["a.txt"]);
            assert_eq!(summary.unresolved, 1);
        }
        other => panic!("expected merge conflict, got {other:?}"),
    }
    let content = std::fs::read_to_string(repo.path().join("a.txt")).unwrap();
    assert!(content.contains("<<<<<<<"));
}

#[tokio::test]
async fn test_clean_merge() {
    if !hg_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    let repo = new_repo(&dir).await;
    commit_file(&repo, "a.txt", "base\n", "base").await;
    commit_file(&repo, "b.txt", "b\n", "add b").await;
    repo.update(0, false).await.unwrap();
    commit_file(&repo, "c.txt", "c\n", "add c").await;

    assert_eq!(repo.merge_preview(Some(1.into())).await.unwrap(), vec![1]);

    let summary = repo.merge(Some(1.into())).await.unwrap();
    assert!(summary.is_clean());
    for file in ["a.txt", "b.txt", "c.txt"] {
        let content = std::fs::read_to_string(repo.path().join(file)).unwrap();
        assert!(!content.contains("<<<<<<<"), "{file} has conflict markers");
        assert!(!content.contains(">>>>>>>"), "{file} has conflict markers");
    }

    let merge = repo.commit(&CommitOptions::new("merge")).await.unwrap();
    let rev = repo.revision(merge.rev).await.unwrap();
    assert!(rev.is_merge());
}
