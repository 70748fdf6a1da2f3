//! # hgapi-hg
//!
//! Mercurial integration for hgapi.
//!
//! This crate provides:
//! - `hg` process execution behind the [`HgExecutor`] trait
//! - The [`Repository`] facade, one method per hg operation
//! - Parsers for each hg output format

mod command;
mod diff;
mod listing;
mod log;
mod merge;
mod options;
mod repo;
mod showconfig;
mod status;
mod validate;

pub use command::{invoke, run, HgCommand, HgExecutor, HgOutput, MockHgExecutor};
pub use diff::parse_diff;
pub use log::{parse_log, LOG_TEMPLATE};
pub use options::{
    BookmarkAction, CloneOptions, CommitOptions, DiffOptions, LogOptions, MergeOptions,
    PullOptions, PushOptions, RevertOptions, StatusOptions, TagOptions,
};
pub use repo::{hg_version, Repository};
pub use showconfig::{parse_bool, parse_list, parse_showconfig, ConfigMap};
pub use status::{group_status, parse_status};
