//! Structured revision output
//!
//! Every command that prints revisions (`log`, `heads`, `incoming`,
//! `outgoing`) is given [`LOG_TEMPLATE`]. Fields are separated by the ASCII
//! unit separator and each record ends with the ASCII record separator, so
//! multi-line descriptions survive the split intact.

use chrono::{DateTime, FixedOffset};
use hgapi_core::{HgError, Result, Revision};

/// Separates the fields of one revision record
pub const FIELD_SEPARATOR: char = '\u{1f}';

/// Terminates each revision record
pub const RECORD_SEPARATOR: char = '\u{1e}';

/// Template passed as `--template` to every revision-printing command
///
/// Fields: rev, node, author, date (hgdate), branch, p1rev, p2rev, tags,
/// bookmarks, description.
pub const LOG_TEMPLATE: &str = "{rev}\u{1f}{node}\u{1f}{author}\u{1f}{date|hgdate}\u{1f}{branch}\u{1f}{p1rev}\u{1f}{p2rev}\u{1f}{tags}\u{1f}{bookmarks}\u{1f}{desc}\u{1e}";

const FIELD_COUNT: usize = 10;

/// Parse templated output into revisions, in output order
pub fn parse_log(output: &str) -> Result<Vec<Revision>> {
    let mut records: Vec<&str> = output.split(RECORD_SEPARATOR).collect();

    // Whatever follows the last terminator must be blank
    if let Some(rest) = records.pop() {
        if !rest.trim().is_empty() {
            return Err(HgError::Parse(format!(
                "unterminated revision record: {:?}",
                truncate(rest)
            )));
        }
    }

    records.into_iter().map(parse_record).collect()
}

/// Parse templated output that must describe exactly one revision
pub fn parse_single(output: &str, identifier: &str) -> Result<Revision> {
    let mut revisions = parse_log(output)?;
    match revisions.len() {
        1 => Ok(revisions.remove(0)),
        0 => Err(HgError::Parse(format!(
            "no revision record for '{}'",
            identifier
        ))),
        n => Err(HgError::Parse(format!(
            "'{}' resolved to {} revisions, expected one",
            identifier, n
        ))),
    }
}

fn parse_record(record: &str) -> Result<Revision> {
    // Commands like `hg incoming` may leave a newline between records
    let record = record.trim_start_matches(['\n', '\r']);
    let fields: Vec<&str> = record.split(FIELD_SEPARATOR).collect();

    if fields.len() != FIELD_COUNT {
        return Err(HgError::Parse(format!(
            "expected {} fields in revision record, found {}: {:?}",
            FIELD_COUNT,
            fields.len(),
            truncate(record)
        )));
    }

    let rev = parse_rev(fields[0], "rev")?;
    let node = fields[1].trim().to_string();
    if node.is_empty() || !node.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(HgError::Parse(format!("invalid node: {:?}", fields[1])));
    }

    let branch = match fields[4].trim() {
        "" => "default".to_string(),
        b => b.to_string(),
    };

    let parents = [parse_rev(fields[5], "p1rev")?, parse_rev(fields[6], "p2rev")?]
        .into_iter()
        .filter(|p| *p >= 0)
        .collect();

    Ok(Revision {
        rev,
        node,
        author: fields[2].to_string(),
        date: parse_hgdate(fields[3])?,
        branch,
        parents,
        tags: split_words(fields[7]),
        bookmarks: split_words(fields[8]),
        description: fields[9].to_string(),
    })
}

fn parse_rev(field: &str, name: &str) -> Result<i64> {
    field
        .trim()
        .parse::<i64>()
        .map_err(|_| HgError::Parse(format!("invalid {}: {:?}", name, field)))
}

/// Parse `{date|hgdate}` output: unix seconds and offset in seconds west of UTC
pub fn parse_hgdate(field: &str) -> Result<DateTime<FixedOffset>> {
    let invalid = || HgError::Parse(format!("invalid date: {:?}", field));

    let mut parts = field.split_whitespace();
    let (Some(secs), Some(offset), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };

    // hg stores float timestamps; hgdate prints whole seconds but be lenient
    let secs = secs
        .parse::<i64>()
        .or_else(|_| secs.parse::<f64>().map(|f| f.trunc() as i64))
        .map_err(|_| invalid())?;
    let offset = offset.parse::<i32>().map_err(|_| invalid())?;

    let tz = FixedOffset::west_opt(offset).ok_or_else(invalid)?;
    let utc = DateTime::from_timestamp(secs, 0).ok_or_else(invalid)?;
    Ok(utc.with_timezone(&tz))
}

fn split_words(field: &str) -> Vec<String> {
    field.split_whitespace().map(str::to_string).collect()
}

fn truncate(s: &str) -> String {
    s.chars().take(80).collect()
}
