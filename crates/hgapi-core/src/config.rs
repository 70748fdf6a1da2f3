//! Client configuration for hgapi
//!
//! Controls how the `hg` binary is launched: which executable, whether plain
//! mode is forced, and any extra environment. Output is always requested and
//! decoded as UTF-8.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::{HgError, Result};

/// File name looked up next to a repository by [`ClientConfig::load_or_default`]
pub const CONFIG_FILE_NAME: &str = "hgapi.toml";

/// `HGENCODING` for every hg process; stdout and stderr are decoded as UTF-8
pub const OUTPUT_ENCODING: &str = "UTF-8";

/// How hg processes are launched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Executable to run
    #[serde(default = "default_hg_binary")]
    pub hg_binary: String,

    /// Set `HGPLAIN=1` so output is not localised or decorated
    #[serde(default = "default_plain")]
    pub plain: bool,

    /// Committer used when a commit does not name one
    #[serde(default)]
    pub default_user: Option<String>,

    /// Extra environment variables for every hg process (`HGENCODING` is ignored)
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

fn default_hg_binary() -> String {
    "hg".to_string()
}

fn default_plain() -> bool {
    true
}

impl ClientConfig {
    /// Load configuration from `hgapi.toml` in the repo root or use defaults
    pub fn load_or_default(repo_root: &Path) -> Result<Self> {
        let config_path = repo_root.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
            .map_err(|e| HgError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| HgError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn with_binary(mut self, hg_binary: impl Into<String>) -> Self {
        self.hg_binary = hg_binary.into();
        self
    }

    pub fn with_default_user(mut self, user: impl Into<String>) -> Self {
        self.default_user = Some(user.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Environment variables every hg process gets, in application order
    pub fn process_env(&self) -> Vec<(String, String)> {
        let mut vars = vec![("HGENCODING".to_string(), OUTPUT_ENCODING.to_string())];
        if self.plain {
            vars.push(("HGPLAIN".to_string(), "1".to_string()));
        }
        vars.extend(
            self.env
                .iter()
                .filter(|(k, _)| k.as_str() != "HGENCODING")
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        vars
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            hg_binary: default_hg_binary(),
            plain: default_plain(),
            default_user: None,
            env: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.hg_binary, "hg");
        assert_eq!(
            config.process_env(),
            vec![
                ("HGENCODING".to_string(), "UTF-8".to_string()),
                ("HGPLAIN".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_partial_toml() {
        let config = ClientConfig::from_toml(
            r#"
            hg_binary = "/opt/hg/bin/hg"
            default_user = "Build Bot <bot@example.com>"

            [env]
            HGRCPATH = ""
            "#,
        )
        .unwrap();

        assert_eq!(config.hg_binary, "/opt/hg/bin/hg");
        assert!(config.plain);
        assert_eq!(
            config.default_user.as_deref(),
            Some("Build Bot <bot@example.com>")
        );
        assert!(config
            .process_env()
            .contains(&("HGRCPATH".to_string(), String::new())));
    }

    #[test]
    fn test_encoding_stays_utf8() {
        let config = ClientConfig::from_toml(
            r#"
            encoding = "latin1"

            [env]
            HGENCODING = "latin1"
            HGRCPATH = ""
            "#,
        )
        .unwrap();

        let vars = config.process_env();
        let encodings: Vec<_> = vars.iter().filter(|(k, _)| k == "HGENCODING").collect();
        assert_eq!(encodings.len(), 1);
        assert_eq!(encodings[0].1, OUTPUT_ENCODING);
        assert!(vars.contains(&("HGRCPATH".to_string(), String::new())));
    }

    #[test]
    fn test_invalid_toml() {
        let err = ClientConfig::from_toml("plain = \"sometimes\"").unwrap_err();
        assert!(matches!(err, HgError::Config(_)));
    }

    #[test]
    fn test_load_or_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            ClientConfig::load_or_default(dir.path()).unwrap(),
            ClientConfig::default()
        );

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "plain = false\n").unwrap();
        let config = ClientConfig::load_or_default(dir.path()).unwrap();
        assert!(!config.plain);
        assert_eq!(config.process_env().len(), 1);
    }
}
