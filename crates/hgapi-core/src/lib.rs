//! # hgapi-core
//!
//! Core types for hgapi, a typed facade over the Mercurial command line.
//!
//! ## Core Paradigm
//!
//! - Mercurial owns all version control; hgapi only runs `hg` and parses its output
//! - Every read re-queries `hg`, so results always reflect the repository on disk
//! - Each output format has its own record type

mod config;
mod error;
mod revision;
mod types;

pub use config::{ClientConfig, CONFIG_FILE_NAME, OUTPUT_ENCODING};
pub use error::{HgError, Result};
pub use revision::{RevisionId, RevisionRange};
pub use types::*;
