//! Configuration management for Lutrabox.
//!
//! Parses `lutrabox.toml` with serde and discovers it in the current
//! directory or its parents. CLI overrides are applied through
//! [`CliSettings`].
//!
//! ```toml
//! [endpoint]
//! url = "https://sws.ifi.uio.no/lutra/expand"
//! timeout_secs = 30
//!
//! [widget]
//! cooldown_ms = 3000
//! ```
//!
//! `endpoint.url` supports `${VAR}` and `${VAR:-default}` expansion.

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "lutrabox.toml";

/// Processing service the widgets submit to.
pub const DEFAULT_ENDPOINT_URL: &str = "https://sws.ifi.uio.no/lutra/expand";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_COOLDOWN_MS: u64 = 3000;

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override endpoint URL.
    pub endpoint_url: Option<String>,
    /// Override request timeout.
    pub timeout_secs: Option<u64>,
    /// Override cooldown after a result.
    pub cooldown_ms: Option<u64>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoint: EndpointConfig,
    pub widget: WidgetConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Remote processing endpoint.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// URL receiving the multipart POST.
    pub url: String,
    /// Whole-request timeout.
    pub timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENDPOINT_URL.to_owned(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Widget behavior.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Delay after a result before the run control is enabled again.
    pub cooldown_ms: u64,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: DEFAULT_COOLDOWN_MS,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`endpoint.url`").
        field: String,
        /// Error message (e.g., "${`LUTRA_URL`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

fn require_positive(value: u64, field: &str) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Validation(format!(
            "{field} must be greater than 0"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration with optional CLI settings.
    ///
    /// Uses `config_path` when given, otherwise the nearest `lutrabox.toml`
    /// in the current directory or its parents, otherwise defaults. CLI
    /// settings take precedence over file values.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit `config_path` doesn't exist, the file
    /// cannot be parsed, or the resulting values are invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_from(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Search for `lutrabox.toml` in `start` and its parents.
    #[must_use]
    pub fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(url) = &settings.endpoint_url {
            self.endpoint.url.clone_from(url);
        }
        if let Some(timeout_secs) = settings.timeout_secs {
            self.endpoint.timeout_secs = timeout_secs;
        }
        if let Some(cooldown_ms) = settings.cooldown_ms {
            self.widget.cooldown_ms = cooldown_ms;
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.endpoint.url = expand::expand_env(&config.endpoint.url, "endpoint.url")?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` for an empty or non-HTTP endpoint
    /// URL, or a zero timeout or cooldown.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.endpoint.url, "endpoint.url")?;
        require_http_url(&self.endpoint.url, "endpoint.url")?;
        require_positive(self.endpoint.timeout_secs, "endpoint.timeout_secs")?;
        require_positive(self.widget.cooldown_ms, "widget.cooldown_ms")?;
        Ok(())
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.endpoint.timeout_secs)
    }

    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.widget.cooldown_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.endpoint.url, "https://sws.ifi.uio.no/lutra/expand");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.cooldown(), Duration::from_millis(3000));
        assert!(config.config_path.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.endpoint.url, DEFAULT_ENDPOINT_URL);
        assert_eq!(config.widget.cooldown_ms, 3000);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[endpoint]
url = "http://localhost:8080/lutra/expand"
timeout_secs = 5

[widget]
cooldown_ms = 500
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.endpoint.url, "http://localhost:8080/lutra/expand");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.cooldown(), Duration::from_millis(500));
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let mut config = Config::default();
        config.endpoint.url = "ftp://example.com".to_owned();
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: endpoint.url must start with http:// or https://"
        );
    }

    #[test]
    fn test_validate_rejects_empty_url() {
        let mut config = Config::default();
        config.endpoint.url = String::new();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_zero_durations() {
        let mut config = Config::default();
        config.endpoint.timeout_secs = 0;
        assert!(config.validate().unwrap_err().to_string().contains("endpoint.timeout_secs"));

        let mut config = Config::default();
        config.widget.cooldown_ms = 0;
        assert!(config.validate().unwrap_err().to_string().contains("widget.cooldown_ms"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings {
            endpoint_url: Some("http://127.0.0.1:9000/expand".to_owned()),
            timeout_secs: None,
            cooldown_ms: Some(100),
        });
        assert_eq!(config.endpoint.url, "http://127.0.0.1:9000/expand");
        assert_eq!(config.endpoint.timeout_secs, 30);
        assert_eq!(config.widget.cooldown_ms, 100);
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[widget]\ncooldown_ms = 1500\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.cooldown(), Duration::from_millis(1500));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(p) if p == path));
    }

    #[test]
    fn test_load_invalid_file_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[endpoint]\nurl = \"sws.ifi.uio.no\"\n").unwrap();
        assert!(matches!(
            Config::load(Some(&path), None),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_load_cli_override_is_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "").unwrap();
        let settings = CliSettings {
            cooldown_ms: Some(0),
            ..CliSettings::default()
        };
        assert!(Config::load(Some(&path), Some(&settings)).is_err());
    }

    #[test]
    fn test_load_expands_endpoint_url() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("LUTRABOX_TEST_ENDPOINT", "http://lutra.test:8080");
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            "[endpoint]\nurl = \"${LUTRABOX_TEST_ENDPOINT}/expand\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.endpoint.url, "http://lutra.test:8080/expand");
        unsafe {
            std::env::remove_var("LUTRABOX_TEST_ENDPOINT");
        }
    }

    #[test]
    fn test_discover_in_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("docs").join("guide");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();

        assert_eq!(
            Config::discover_from(&nested),
            Some(dir.path().join(CONFIG_FILENAME))
        );
    }

    #[test]
    fn test_discover_prefers_nearest() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("site");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();
        std::fs::write(nested.join(CONFIG_FILENAME), "").unwrap();

        assert_eq!(
            Config::discover_from(&nested),
            Some(nested.join(CONFIG_FILENAME))
        );
    }
}
