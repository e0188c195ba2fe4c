//! Configuration file handling

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::config_path;
use super::{Error, Result};
use crate::data::Fixtures;

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// Application under test
    #[serde(default)]
    pub target: TargetConfig,

    /// Browser used for real runs
    #[serde(default)]
    pub chrome: ChromeConfig,

    /// Wait and request timeouts
    #[serde(default)]
    pub timeouts: Timeouts,

    /// Credentials, verification code and card fixtures
    #[serde(default)]
    pub fixtures: Fixtures,
}

/// Application under test
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TargetConfig {
    /// URL opened at the start of every scenario
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:9999".to_string()
}

/// Browser used for real runs
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChromeConfig {
    /// DevTools endpoint of an already running Chrome
    ///
    /// Either `ws://host:port/devtools/browser/<id>` or `http://host:port`.
    /// When unset a new Chrome is launched for every scenario.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_url: Option<String>,

    /// Chrome/Chromium binary; detected from the usual locations when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<PathBuf>,

    /// Run the launched browser without a window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Extra command line switches for the launched browser
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            connect_url: None,
            executable: None,
            headless: default_headless(),
            args: Vec::new(),
        }
    }
}

fn default_headless() -> bool {
    true
}

/// Timeout settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Timeouts {
    /// How long a page waits for an element to appear
    #[serde(default = "default_element_wait")]
    pub element_wait_secs: u64,

    /// Pause between two lookups while waiting
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Timeout for a single DevTools request
    #[serde(default = "default_request")]
    pub request_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            element_wait_secs: default_element_wait(),
            poll_interval_ms: default_poll_interval(),
            request_secs: default_request(),
        }
    }
}

impl Timeouts {
    pub fn element_wait(&self) -> Duration {
        Duration::from_secs(self.element_wait_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }
}

fn default_element_wait() -> u64 {
    4
}
fn default_poll_interval() -> u64 {
    100
}
fn default_request() -> u64 {
    30
}

impl Config {
    /// Load configuration from `path`, or from the default config file
    ///
    /// An explicit path must exist. A missing default file yields the
    /// default configuration. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Apply `TRANSFER_E2E_*` overrides from `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("TRANSFER_E2E_BASE_URL") {
            self.target.base_url = url;
        }
        if let Some(url) = lookup("TRANSFER_E2E_CHROME_URL") {
            self.chrome.connect_url = Some(url);
        }
        if let Some(path) = lookup("TRANSFER_E2E_CHROME_EXECUTABLE") {
            self.chrome.executable = Some(PathBuf::from(path));
        }
        if let Some(login) = lookup("TRANSFER_E2E_LOGIN") {
            self.fixtures.login = login;
        }
        if let Some(password) = lookup("TRANSFER_E2E_PASSWORD") {
            self.fixtures.password = password;
        }
        if let Some(code) = lookup("TRANSFER_E2E_VERIFICATION_CODE") {
            self.fixtures.verification_code = code;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults_point_at_local_app() {
        let config = Config::default();
        assert_eq!(config.target.base_url, "http://localhost:9999");
        assert!(config.chrome.connect_url.is_none());
        assert!(config.chrome.headless);
        assert_eq!(config.timeouts.element_wait(), Duration::from_secs(4));
        assert_eq!(config.fixtures.verification_code, "12345");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[target]
base_url = "http://bank.test:8080"

[chrome]
executable = "/usr/bin/chromium"
args = ["--no-sandbox"]

[timeouts]
element_wait_secs = 10

[fixtures.first_card]
card_number = "4111 1111 1111 1111"
owner_code = "card-a"
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.target.base_url, "http://bank.test:8080");
        assert_eq!(config.timeouts.element_wait_secs, 10);
        assert_eq!(config.chrome.executable.as_deref(), Some(Path::new("/usr/bin/chromium")));
        assert_eq!(config.chrome.args, vec!["--no-sandbox".to_string()]);
        assert!(config.chrome.headless);
        assert_eq!(config.timeouts.poll_interval_ms, 100);
        assert_eq!(config.fixtures.first_card.card_number, "4111 1111 1111 1111");
        assert_eq!(config.fixtures.second_card.card_number, "5559 0000 0000 0002");
        assert_eq!(config.fixtures.login, "vasya");
    }

    #[test]
    fn test_invalid_file_is_config_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[timeouts]\nelement_wait_secs = \"soon\"\n").unwrap();
        assert!(matches!(
            Config::from_file(file.path()),
            Err(Error::ConfigParse(_))
        ));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = Config::load(Some(Path::new("/nonexistent/transfer-e2e.toml")));
        assert!(matches!(result, Err(Error::FileRead { .. })));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("TRANSFER_E2E_BASE_URL", "http://staging:9999"),
            ("TRANSFER_E2E_VERIFICATION_CODE", "54321"),
            ("TRANSFER_E2E_CHROME_URL", "http://127.0.0.1:9222"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.target.base_url, "http://staging:9999");
        assert_eq!(config.fixtures.verification_code, "54321");
        assert_eq!(config.fixtures.password, "qwerty123");
        assert_eq!(config.chrome.connect_url.as_deref(), Some("http://127.0.0.1:9222"));
        assert!(config.chrome.executable.is_none());
    }

    #[test]
    fn test_rendered_config_parses_back() {
        let rendered = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(!rendered.contains("connect_url"));

        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.target.base_url, "http://localhost:9999");
        assert!(parsed.chrome.args.is_empty());
    }
}
