//! Parsers for the short line-oriented listings: branches, tags, bookmarks,
//! paths, version, identify and commit output

use hgapi_core::{Bookmark, Branch, BranchState, CommitId, HgError, Result, Tag};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

fn branch_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<name>.+?)\s+(?P<rev>-?\d+):(?P<node>[0-9a-f]+)(?:\s+\((?P<state>inactive|closed)\))?$")
            .expect("branch pattern is valid")
    })
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<name>.+?)\s+(?P<rev>-?\d+):(?P<node>[0-9a-f]+)(?P<local>\s+local)?$")
            .expect("tag pattern is valid")
    })
}

fn bookmark_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?P<active>\*)?\s*(?P<name>\S.*?)\s+(?P<rev>-?\d+):(?P<node>[0-9a-f]+)$")
            .expect("bookmark pattern is valid")
    })
}

fn version_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(version ([^)]+)\)").expect("version pattern is valid"))
}

fn commit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"committed changeset (-?\d+):([0-9a-f]+)").expect("commit pattern is valid")
    })
}

/// Parse `hg branches`
pub fn parse_branches(output: &str) -> Result<Vec<Branch>> {
    non_empty_lines(output)
        .map(|line| {
            let caps = branch_re()
                .captures(line)
                .ok_or_else(|| HgError::Parse(format!("malformed branch line: {:?}", line)))?;

            let state = match caps.name("state").map(|m| m.as_str()) {
                Some("inactive") => BranchState::Inactive,
                Some("closed") => BranchState::Closed,
                _ => BranchState::Active,
            };

            Ok(Branch {
                name: caps["name"].to_string(),
                rev: parse_number(&caps["rev"])?,
                node: caps["node"].to_string(),
                state,
            })
        })
        .collect()
}

/// Parse `hg tags -v`
pub fn parse_tags(output: &str) -> Result<Vec<Tag>> {
    non_empty_lines(output)
        .map(|line| {
            let caps = tag_re()
                .captures(line)
                .ok_or_else(|| HgError::Parse(format!("malformed tag line: {:?}", line)))?;

            Ok(Tag {
                name: caps["name"].to_string(),
                rev: parse_number(&caps["rev"])?,
                node: caps["node"].to_string(),
                local: caps.name("local").is_some(),
            })
        })
        .collect()
}

/// Parse `hg bookmarks`
pub fn parse_bookmarks(output: &str) -> Result<Vec<Bookmark>> {
    if output.trim() == "no bookmarks set" {
        return Ok(Vec::new());
    }

    non_empty_lines(output)
        .map(|line| {
            let caps = bookmark_re()
                .captures(line)
                .ok_or_else(|| HgError::Parse(format!("malformed bookmark line: {:?}", line)))?;

            Ok(Bookmark {
                name: caps["name"].to_string(),
                rev: parse_number(&caps["rev"])?,
                node: caps["node"].to_string(),
                active: caps.name("active").is_some(),
            })
        })
        .collect()
}

/// Parse `hg paths` into alias -> location
pub fn parse_paths(output: &str) -> Result<BTreeMap<String, String>> {
    non_empty_lines(output)
        .map(|line| {
            line.split_once(" = ")
                .map(|(alias, url)| (alias.trim().to_string(), url.trim().to_string()))
                .ok_or_else(|| HgError::Parse(format!("malformed path line: {:?}", line)))
        })
        .collect()
}

/// Extract the version number from the first line of `hg version`
pub fn parse_version(output: &str) -> Result<String> {
    let first = output.lines().next().unwrap_or("");
    version_re()
        .captures(first)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| HgError::Parse(format!("no version in {:?}", first)))
}

/// Extract the new revision from `hg commit -v`
pub fn parse_commit(output: &str) -> Result<CommitId> {
    let caps = commit_re().captures(output).ok_or_else(|| {
        HgError::Parse(format!(
            "commit output has no 'committed changeset' line: {:?}",
            output.trim()
        ))
    })?;

    Ok(CommitId {
        rev: parse_number(&caps[1])?,
        node: caps[2].to_string(),
    })
}

/// Split `hg id -i` or `hg id -n` output into the identifier and the dirty marker
pub fn parse_identify(output: &str) -> Result<(String, bool)> {
    let value = output.trim();
    let (id, dirty) = match value.strip_suffix('+') {
        Some(id) => (id, true),
        None => (value, false),
    };

    if id.is_empty() || id.contains(char::is_whitespace) {
        return Err(HgError::Parse(format!("unexpected identify output: {:?}", value)));
    }
    Ok((id.to_string(), dirty))
}

fn parse_number(s: &str) -> Result<i64> {
    s.parse::<i64>()
        .map_err(|_| HgError::Parse(format!("invalid revision number: {:?}", s)))
}

fn non_empty_lines(output: &str) -> impl Iterator<Item = &str> {
    output
        .lines()
        .map(|l| l.trim_end())
        .filter(|l| !l.is_empty())
}
