//! `hg diff` output segmentation
//!
//! The unified diff is cut into one chunk per file at every `diff ` header.
//! Plain headers look like `diff -r 1f0dee641bb7 -r 9ab3a4ea0b1a path`; git
//! headers look like `diff --git a/old b/new` and may be followed by
//! `rename from`/`rename to` or `copy from`/`copy to` lines.

use hgapi_core::{DiffEntry, HgError, Rename, Result};

/// Split diff output into per-file entries, in output order
pub fn parse_diff(output: &str) -> Result<Vec<DiffEntry>> {
    let mut entries: Vec<DiffEntry> = Vec::new();
    let mut pending = RenameLines::default();

    for line in output.lines() {
        if line.starts_with("diff ") {
            finish(&mut entries, &mut pending);
            entries.push(DiffEntry {
                filename: header_filename(line)?,
                diff: String::new(),
                rename: None,
            });
        }

        let Some(current) = entries.last_mut() else {
            if line.trim().is_empty() {
                continue;
            }
            return Err(HgError::Parse(format!(
                "diff output does not start with a file header: {:?}",
                line
            )));
        };

        pending.observe(line);
        current.diff.push_str(line);
        current.diff.push('\n');
    }

    finish(&mut entries, &mut pending);
    Ok(entries)
}

fn finish(entries: &mut [DiffEntry], pending: &mut RenameLines) {
    if let Some(last) = entries.last_mut() {
        last.rename = std::mem::take(pending).into_rename();
    }
}

/// Extract the file name from a `diff` header line
fn header_filename(line: &str) -> Result<String> {
    let rest = &line["diff ".len()..];

    if let Some(git) = rest.strip_prefix("--git ") {
        // `a/<old> b/<new>`; the new name is what the chunk is about
        return git
            .rfind(" b/")
            .map(|idx| git[idx + 3..].to_string())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| HgError::Parse(format!("malformed git diff header: {:?}", line)));
    }

    // Skip `-r <node>` pairs (and any other flag with a value), the rest is the path
    let mut rest = rest;
    while let Some(after_flag) = rest.strip_prefix('-') {
        let Some((_flag, after)) = after_flag.split_once(' ') else {
            break;
        };
        let Some((_value, after)) = after.split_once(' ') else {
            break;
        };
        rest = after;
    }

    if rest.is_empty() || rest.starts_with('-') {
        return Err(HgError::Parse(format!("malformed diff header: {:?}", line)));
    }
    Ok(rest.to_string())
}

#[derive(Default)]
struct RenameLines {
    from: Option<String>,
    to: Option<String>,
    copy: bool,
}

impl RenameLines {
    fn observe(&mut self, line: &str) {
        if let Some(from) = line.strip_prefix("rename from ") {
            self.from = Some(from.to_string());
        } else if let Some(to) = line.strip_prefix("rename to ") {
            self.to = Some(to.to_string());
        } else if let Some(from) = line.strip_prefix("copy from ") {
            self.from = Some(from.to_string());
            self.copy = true;
        } else if let Some(to) = line.strip_prefix("copy to ") {
            self.to = Some(to.to_string());
            self.copy = true;
        }
    }

    fn into_rename(self) -> Option<Rename> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => Some(Rename {
                from,
                to,
                copy: self.copy,
            }),
            _ => None,
        }
    }
}
