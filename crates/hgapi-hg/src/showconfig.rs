//! `hg showconfig` parsing and value coercion

use hgapi_core::{HgError, Result};
use std::collections::BTreeMap;

/// Section -> key -> value, as printed by a bare `hg showconfig`
pub type ConfigMap = BTreeMap<String, BTreeMap<String, String>>;

/// Strings Mercurial accepts as booleans, matched case-insensitively
const TRUE_VALUES: [&str; 5] = ["1", "yes", "true", "on", "always"];
const FALSE_VALUES: [&str; 5] = ["0", "no", "false", "off", "never"];

/// Parse `section.key=value` lines
///
/// Keys may themselves contain dots; only the first dot separates the
/// section. Lines without `=` continue the previous value.
pub fn parse_showconfig(output: &str) -> ConfigMap {
    let mut config = ConfigMap::new();
    let mut last: Option<(String, String)> = None;

    for line in output.lines() {
        let Some((name, value)) = line.split_once('=').filter(|(name, _)| name.contains('.'))
        else {
            if let Some((section, key)) = &last {
                if let Some(existing) = config.get_mut(section).and_then(|s| s.get_mut(key)) {
                    existing.push('\n');
                    existing.push_str(line.trim());
                }
            }
            continue;
        };

        let Some((section, key)) = name.split_once('.') else {
            continue;
        };

        config
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.trim().to_string());
        last = Some((section.to_string(), key.to_string()));
    }

    config
}

/// Coerce a config value to a boolean using Mercurial's truth table
///
/// An absent or empty value is `false`. A value outside the table is a
/// parse anomaly, as it is for hg itself.
pub fn parse_bool(section: &str, key: &str, value: Option<&str>) -> Result<bool> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(false);
    };

    let lower = value.to_lowercase();
    if TRUE_VALUES.contains(&lower.as_str()) {
        Ok(true)
    } else if FALSE_VALUES.contains(&lower.as_str()) {
        Ok(false)
    } else {
        Err(HgError::Parse(format!(
            "{}.{} is not a boolean ('{}')",
            section, key, value
        )))
    }
}

/// Split a config value into a list: on commas when present, otherwise on whitespace
pub fn parse_list(value: Option<&str>) -> Vec<String> {
    let Some(value) = value else {
        return Vec::new();
    };

    let items: Box<dyn Iterator<Item = &str>> = if value.contains(',') {
        Box::new(value.split(','))
    } else {
        Box::new(value.split_whitespace())
    };

    items
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_showconfig() {
        let output = "\
ui.username=testuser
ui.editor=vim
test.stuff.otherstuff=tsosvalue
test.stuff.debug=True
extensions.rebase=
";
        let config = parse_showconfig(output);

        assert_eq!(config["ui"]["username"], "testuser");
        assert_eq!(config["test"]["stuff.otherstuff"], "tsosvalue");
        assert_eq!(config["test"]["stuff.debug"], "True");
        assert_eq!(config["extensions"]["rebase"], "");
    }

    #[test]
    fn test_multiline_value() {
        let config = parse_showconfig("hooks.multi=first\n  second\nui.verbose=no\n");
        assert_eq!(config["hooks"]["multi"], "first\nsecond");
        assert_eq!(config["ui"]["verbose"], "no");
    }

    #[test]
    fn test_parse_bool() {
        for value in ["1", "yes", "True", "ON", "always"] {
            assert!(parse_bool("s", "k", Some(value)).unwrap(), "{value}");
        }
        for value in ["0", "no", "False", "off", "never"] {
            assert!(!parse_bool("s", "k", Some(value)).unwrap(), "{value}");
        }
        assert!(!parse_bool("s", "k", None).unwrap());
        assert!(!parse_bool("s", "k", Some("")).unwrap());
        assert!(matches!(
            parse_bool("s", "k", Some("maybe")),
            Err(HgError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list(Some("a, b,c")), vec!["a", "b", "c"]);
        assert_eq!(parse_list(Some("a b  c")), vec!["a", "b", "c"]);
        assert_eq!(parse_list(Some("a,,b,")), vec!["a", "b"]);
        assert!(parse_list(None).is_empty());
        assert!(parse_list(Some("   ")).is_empty());
    }
}
