//! Configuration read from `.adminhub/adminhub.toml`.
//!
//! Settings are layered: file, then environment, then CLI flags.
//!
//! ```toml
//! [api]
//! base_url = "https://api.example.com"
//! with_credentials = true
//! timeout_secs = 30
//!
//! [list]
//! default_page_size = 10
//!
//! [logging]
//! format = "text"
//! file = ".adminhub/logs/adminhub.log"
//! level = "info"
//! ```

use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::http::TransportSettings;

pub const CONFIG_FILE: &str = "adminhub.toml";
pub const ENV_API_URL: &str = "ADMINHUB_API_URL";
pub const ENV_WITH_CREDENTIALS: &str = "ADMINHUB_WITH_CREDENTIALS";
pub const ENV_TIMEOUT_SECS: &str = "ADMINHUB_TIMEOUT_SECS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Invalid log format '{}'. Valid values: text, json", s),
        }
    }
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Send and persist the backend's session cookie.
    #[serde(default = "default_with_credentials")]
    pub with_credentials: bool,
    /// Request timeout. No timeout when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_with_credentials() -> bool {
    true
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            with_credentials: default_with_credentials(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSection {
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
}

fn default_page_size() -> u32 {
    10
}

impl Default for ListSection {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSection {
    #[serde(default)]
    pub format: LogFormat,
    /// Also write logs here (rotated daily).
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// Filter directive used when `ADMINHUB_LOG` is unset.
    #[serde(default)]
    pub level: Option<String>,
}

/// The complete adminhub.toml structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdminToml {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub list: ListSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl AdminToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse adminhub.toml")
    }

    /// Defaults when `state_dir` holds no config file.
    pub fn load_or_default(state_dir: &Path) -> Result<Self> {
        let config_path = state_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize adminhub.toml")?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the file's values and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(problem) = base_url_problem(&self.api.base_url) {
            warnings.push(problem);
        }
        if self.list.default_page_size == 0 {
            warnings.push("default_page_size must be greater than 0; 10 is used instead".to_string());
        }
        if self.api.timeout_secs == Some(0) {
            warnings.push("timeout_secs = 0 fails every request; remove it to disable the timeout".to_string());
        }
        if let Some(level) = &self.logging.level
            && tracing_subscriber::EnvFilter::try_new(level).is_err()
        {
            warnings.push(format!("Invalid logging level '{}'", level));
        }

        warnings
    }
}

fn base_url_problem(url: &str) -> Option<String> {
    match Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => None,
        Ok(parsed) => Some(format!(
            "base_url '{}' uses unsupported scheme '{}'",
            url,
            parsed.scheme()
        )),
        Err(e) => Some(format!("Invalid base_url '{}': {}", url, e)),
    }
}

/// Effective configuration for one invocation.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub state_dir: PathBuf,
    pub toml: AdminToml,
    pub cli_api_url: Option<String>,
    pub verbose: bool,
}

impl AdminConfig {
    pub fn new(state_dir: PathBuf) -> Result<Self> {
        let toml = AdminToml::load_or_default(&state_dir)?;
        Ok(Self {
            state_dir,
            toml,
            cli_api_url: None,
            verbose: false,
        })
    }

    pub fn with_cli_args(state_dir: PathBuf, api_url: Option<String>, verbose: bool) -> Result<Self> {
        let mut config = Self::new(state_dir)?;
        config.cli_api_url = api_url;
        config.verbose = verbose;
        Ok(config)
    }

    /// CLI → env → file.
    pub fn api_url(&self) -> String {
        self.cli_api_url
            .clone()
            .or_else(|| std::env::var(ENV_API_URL).ok().filter(|v| !v.is_empty()))
            .unwrap_or_else(|| self.toml.api.base_url.clone())
    }

    /// Env can override file.
    pub fn with_credentials(&self) -> bool {
        if let Ok(env_val) = std::env::var(ENV_WITH_CREDENTIALS) {
            return env_val != "false" && env_val != "0";
        }
        self.toml.api.with_credentials
    }

    /// Env can override file. An unparsable env value is ignored.
    pub fn timeout(&self) -> Option<Duration> {
        std::env::var(ENV_TIMEOUT_SECS)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .or(self.toml.api.timeout_secs)
            .map(Duration::from_secs)
    }

    pub fn default_page_size(&self) -> u32 {
        match self.toml.list.default_page_size {
            0 => default_page_size(),
            n => n,
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.state_dir.join(CONFIG_FILE)
    }

    pub fn cookie_file(&self) -> PathBuf {
        self.state_dir.join("cookies")
    }

    /// Page-state cache shared by list commands.
    pub fn session_file(&self) -> PathBuf {
        self.state_dir.join("session.json")
    }

    /// Durable store holding the signed-in user's profile.
    pub fn user_file(&self) -> PathBuf {
        self.state_dir.join("user.json")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.state_dir.join("logs")
    }

    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            base_url: self.api_url(),
            with_credentials: self.with_credentials(),
            timeout: self.timeout(),
            cookie_file: self.with_credentials().then(|| self.cookie_file()),
        }
    }

    /// Validate the effective configuration and return warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = self.toml.validate();
        let effective = self.api_url();
        if effective != self.toml.api.base_url
            && let Some(problem) = base_url_problem(&effective)
        {
            warnings.push(problem);
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() -> Vec<(&'static str, Option<String>)> {
        [ENV_API_URL, ENV_WITH_CREDENTIALS, ENV_TIMEOUT_SECS]
            .into_iter()
            .map(|key| {
                let saved = std::env::var(key).ok();
                unsafe { std::env::remove_var(key) };
                (key, saved)
            })
            .collect()
    }

    fn restore_env(saved: Vec<(&'static str, Option<String>)>) {
        for (key, value) in saved {
            match value {
                Some(v) => unsafe { std::env::set_var(key, v) },
                None => unsafe { std::env::remove_var(key) },
            }
        }
    }

    #[test]
    fn test_defaults() {
        let toml = AdminToml::default();
        assert_eq!(toml.api.base_url, "http://localhost:5000");
        assert!(toml.api.with_credentials);
        assert_eq!(toml.api.timeout_secs, None);
        assert_eq!(toml.list.default_page_size, 10);
        assert_eq!(toml.logging.format, LogFormat::Text);
        assert!(toml.validate().is_empty());
    }

    #[test]
    fn test_parse_partial_file_keeps_defaults() {
        let toml = AdminToml::parse(
            r#"
[api]
base_url = "https://api.example.com"

[logging]
format = "json"
"#,
        )
        .unwrap();
        assert_eq!(toml.api.base_url, "https://api.example.com");
        assert!(toml.api.with_credentials);
        assert_eq!(toml.logging.format, LogFormat::Json);
        assert_eq!(toml.list.default_page_size, 10);
    }

    #[test]
    fn test_parse_rejects_bad_format() {
        assert!(AdminToml::parse("[logging]\nformat = \"xml\"").is_err());
    }

    #[test]
    fn test_validate_reports_problems() {
        let mut toml = AdminToml::default();
        toml.api.base_url = "ftp://files".to_string();
        toml.api.timeout_secs = Some(0);
        toml.list.default_page_size = 0;
        let warnings = toml.validate();
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("ftp"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let mut toml = AdminToml::default();
        toml.api.timeout_secs = Some(30);
        toml.save(&dir.path().join("nested").join(CONFIG_FILE)).unwrap();

        let loaded = AdminToml::load_or_default(&dir.path().join("nested")).unwrap();
        assert_eq!(loaded.api.timeout_secs, Some(30));
    }

    #[test]
    fn test_load_or_default_without_file() {
        let dir = tempdir().unwrap();
        let toml = AdminToml::load_or_default(dir.path()).unwrap();
        assert_eq!(toml.api.base_url, default_base_url());
    }

    #[test]
    fn test_api_url_priority() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let saved = clear_env();
        let dir = tempdir().unwrap();

        let mut config = AdminConfig::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(config.api_url(), "http://localhost:5000");

        unsafe { std::env::set_var(ENV_API_URL, "http://env:1") };
        assert_eq!(config.api_url(), "http://env:1");

        config.cli_api_url = Some("http://cli:2".to_string());
        assert_eq!(config.api_url(), "http://cli:2");

        restore_env(saved);
    }

    #[test]
    fn test_env_overrides_credentials_and_timeout() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let saved = clear_env();
        let dir = tempdir().unwrap();
        let config = AdminConfig::new(dir.path().to_path_buf()).unwrap();

        assert!(config.with_credentials());
        assert_eq!(config.timeout(), None);

        unsafe { std::env::set_var(ENV_WITH_CREDENTIALS, "false") };
        unsafe { std::env::set_var(ENV_TIMEOUT_SECS, "12") };
        assert!(!config.with_credentials());
        assert_eq!(config.timeout(), Some(Duration::from_secs(12)));
        assert_eq!(config.transport_settings().cookie_file, None);

        restore_env(saved);
    }

    #[test]
    fn test_paths_live_under_state_dir() {
        let dir = tempdir().unwrap();
        let config = AdminConfig::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(config.config_file(), dir.path().join("adminhub.toml"));
        assert_eq!(config.cookie_file(), dir.path().join("cookies"));
        assert!(config.session_file().starts_with(dir.path()));
    }
}
