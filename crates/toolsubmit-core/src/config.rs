use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::issue_url::{DEFAULT_ISSUE_TEMPLATE, DEFAULT_ISSUE_URL};
use crate::theme::Theme;

pub const DEFAULT_README_MAX_CHARS: usize = 4000;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// User configuration, read from `~/.config/toolsubmit/config.yaml`.
///
/// Every field is optional in the file; command-line flags take precedence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Model passed to the AI CLI (`--model`).
    #[serde(default)]
    pub model: Option<String>,
    /// Path to the AI CLI executable.
    #[serde(default)]
    pub cli_path: Option<String>,
    #[serde(default = "default_issue_url")]
    pub issue_url: String,
    #[serde(default = "default_issue_template")]
    pub issue_template: String,
    #[serde(default = "default_readme_max_chars")]
    pub readme_max_chars: usize,
    #[serde(default)]
    pub theme: Option<Theme>,
}

fn default_issue_url() -> String {
    DEFAULT_ISSUE_URL.to_string()
}

fn default_issue_template() -> String {
    DEFAULT_ISSUE_TEMPLATE.to_string()
}

fn default_readme_max_chars() -> usize {
    DEFAULT_README_MAX_CHARS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: None,
            cli_path: None,
            issue_url: default_issue_url(),
            issue_template: default_issue_template(),
            readme_max_chars: default_readme_max_chars(),
            theme: None,
        }
    }
}

impl Config {
    /// `~/.config/toolsubmit/config.yaml`, or `None` without a home directory.
    pub fn default_path() -> Option<PathBuf> {
        home::home_dir().map(|h| h.join(".config").join("toolsubmit").join("config.yaml"))
    }

    /// Load from `explicit` if given, else from [`Config::default_path`].
    ///
    /// A missing default file yields defaults; a missing explicit file is an
    /// error, as is a file that does not parse.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(&data)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_point_at_registry() {
        let c = Config::default();
        assert_eq!(c.issue_url, DEFAULT_ISSUE_URL);
        assert_eq!(c.issue_template, DEFAULT_ISSUE_TEMPLATE);
        assert_eq!(c.readme_max_chars, 4000);
        assert_eq!(c.model, None);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("config.yaml");
        std::fs::write(&p, "model: claude-haiku-4-5\ntheme: forest\n").unwrap();
        let c = Config::load(Some(&p)).unwrap();
        assert_eq!(c.model.as_deref(), Some("claude-haiku-4-5"));
        assert_eq!(c.theme, Some(Theme::Forest));
        assert_eq!(c.issue_url, DEFAULT_ISSUE_URL);
        assert_eq!(c.readme_max_chars, DEFAULT_README_MAX_CHARS);
    }

    #[test]
    fn empty_file_is_default() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("config.yaml");
        std::fs::write(&p, "\n").unwrap();
        assert_eq!(Config::load(Some(&p)).unwrap(), Config::default());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.yaml"))).is_err());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("config.yaml");
        std::fs::write(&p, "readme_max_chars: lots\n").unwrap();
        assert!(Config::load(Some(&p)).is_err());
    }
}
