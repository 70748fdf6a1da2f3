//! Input validation for hg arguments
//!
//! Caller-supplied strings are passed to hg as separate argv entries, so
//! there is no shell to escape from. What remains is option injection (a
//! value starting with `-` is parsed as a flag) and control characters that
//! hg cannot represent.

use hgapi_core::{HgError, Result, RevisionId};
use std::path::Path;

/// Validate a file path argument
///
/// Returns the input unchanged if valid.
pub fn validate_path<'a>(input: &'a str, context: &str) -> Result<&'a str> {
    if input.is_empty() {
        return Err(HgError::InvalidArgument(format!(
            "{} cannot be empty",
            context
        )));
    }
    if input.starts_with('-') {
        return Err(HgError::InvalidArgument(format!(
            "{} must not start with '-': '{}'",
            context, input
        )));
    }
    reject_control(input, context)?;
    Ok(input)
}

/// Validate every path in a list
pub fn validate_paths<S: AsRef<str>>(inputs: &[S], context: &str) -> Result<Vec<String>> {
    inputs
        .iter()
        .map(|p| validate_path(p.as_ref(), context).map(str::to_string))
        .collect()
}

/// Validate a revision identifier and render it as an argument
///
/// Negative revision numbers are allowed; symbols may not look like flags.
pub fn validate_revision(rev: &RevisionId) -> Result<String> {
    match rev {
        RevisionId::Number(n) => Ok(n.to_string()),
        RevisionId::Symbol(s) => {
            validate_name(s, "revision")?;
            Ok(s.clone())
        }
    }
}

/// Validate a branch, tag, bookmark or remote name
pub fn validate_name<'a>(input: &'a str, context: &str) -> Result<&'a str> {
    if input.trim().is_empty() {
        return Err(HgError::InvalidArgument(format!(
            "{} cannot be empty",
            context
        )));
    }
    if input.starts_with('-') {
        return Err(HgError::InvalidArgument(format!(
            "{} must not start with '-': '{}'",
            context, input
        )));
    }
    reject_control(input, context)?;
    Ok(input)
}

/// Convert a filesystem path to an argument
pub fn path_arg(path: &Path) -> Result<String> {
    path.to_str().map(str::to_string).ok_or_else(|| {
        HgError::InvalidArgument(format!(
            "path is not valid UTF-8: {}",
            path.display()
        ))
    })
}

fn reject_control(input: &str, context: &str) -> Result<()> {
    if input.contains('\0') {
        return Err(HgError::InvalidArgument(format!(
            "{} contains null byte",
            context
        )));
    }
    if input.contains(['\n', '\r']) {
        return Err(HgError::InvalidArgument(format!(
            "{} contains a line break: '{}'",
            context,
            input.escape_debug()
        )));
    }
    Ok(())
}
