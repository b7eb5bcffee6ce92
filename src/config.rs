//! Configuration management for Drupal-Steps
//!
//! Settings come from three layers: built-in defaults, an optional TOML file
//! and `DRUPAL_STEPS__*` environment variables, later layers winning.

use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "DRUPAL_STEPS";

/// Step library configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL every relative path is resolved against
    pub base_url: String,

    /// Region name to CSS selector
    pub regions: HashMap<String, String>,

    /// Interface labels the login flow looks for
    pub text: TextConfig,

    /// Directory screenshots are written to
    pub screenshot_dir: Option<PathBuf>,

    /// Log level
    pub log_level: String,
}

/// Interface labels used by the authentication steps
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Label of the log-in button
    pub log_in: String,

    /// Text of the log-out link
    pub log_out: String,

    /// Label of the username field
    pub username_field: String,

    /// Label of the password field
    pub password_field: String,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            log_in: "Log in".to_string(),
            log_out: "Log out".to_string(),
            username_field: "Username".to_string(),
            password_field: "Password".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
            regions: HashMap::new(),
            text: TextConfig::default(),
            screenshot_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::configuration(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// Layer an optional TOML file and the environment over the defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(
                ::config::File::from(path).format(::config::FileFormat::Toml),
            );
        }

        let layered = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = layered.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject settings no step could work with
    pub fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(Error::configuration(format!(
                "base_url must be an http(s) URL, got \"{}\"",
                self.base_url
            )));
        }

        if let Some((name, _)) = self.regions.iter().find(|(_, selector)| selector.trim().is_empty()) {
            return Err(Error::configuration(format!("Region \"{}\" has an empty selector", name)));
        }

        Ok(())
    }

    /// Add a region mapping
    pub fn with_region<N: Into<String>, S: Into<String>>(mut self, name: N, selector: S) -> Self {
        self.regions.insert(name.into(), selector.into());
        self
    }

    /// Set the base URL
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// CSS selector mapped to a region name
    pub fn region_selector(&self, name: &str) -> Result<&str> {
        self.regions
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| Error::configuration(format!("No region named \"{}\" is configured", name)))
    }

    /// Resolve a path against the base URL; absolute URLs pass through
    pub fn locate_path(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    /// Serialises tests that touch `DRUPAL_STEPS__*` variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_VARS: [&str; 3] = [
        "DRUPAL_STEPS__BASE_URL",
        "DRUPAL_STEPS__REGIONS__FOOTER",
        "DRUPAL_STEPS__LOG_LEVEL",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://localhost");
        assert_eq!(config.text.log_out, "Log out");
        assert!(config.regions.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_locate_path() {
        let config = Config::default().with_base_url("http://drupal.test/");
        assert_eq!(config.locate_path("/node/1"), "http://drupal.test/node/1");
        assert_eq!(config.locate_path("user/login"), "http://drupal.test/user/login");
        assert_eq!(config.locate_path("https://other.test/x"), "https://other.test/x");
    }

    #[test]
    fn test_region_selector() {
        let config = Config::default().with_region("footer", "#footer");
        assert_eq!(config.region_selector("footer").unwrap(), "#footer");
        assert!(matches!(
            config.region_selector("header"),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
base_url = "https://site.test"

[regions]
content = "main .region-content"

[text]
log_out = "Sign out"
"#
        )
        .unwrap();

        let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.base_url, "https://site.test");
        assert_eq!(config.region_selector("content").unwrap(), "main .region-content");
        assert_eq!(config.text.log_out, "Sign out");
        assert_eq!(config.text.log_in, "Log in");
    }

    #[test]
    fn test_load_layers_env_over_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r##"
base_url = "https://file.test"
log_level = "debug"

[regions]
footer = "footer"
header = "#header"
"##
        )
        .unwrap();

        std::env::set_var("DRUPAL_STEPS__BASE_URL", "https://env.test");
        std::env::set_var("DRUPAL_STEPS__REGIONS__FOOTER", "#footer");
        let result = Config::load(Some(file.path()));
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.base_url, "https://env.test");
        assert_eq!(config.region_selector("footer").unwrap(), "#footer");
        assert_eq!(config.region_selector("header").unwrap(), "#header");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.text.log_in, "Log in");
    }

    #[test]
    fn test_from_env_defaults_and_overrides() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let config = Config::from_env().unwrap();
        assert_eq!(config.base_url, "http://localhost");
        assert!(config.regions.is_empty());

        std::env::set_var("DRUPAL_STEPS__LOG_LEVEL", "trace");
        let result = Config::from_env();
        clear_env();
        assert_eq!(result.unwrap().log_level, "trace");
    }

    #[test]
    fn test_load_rejects_invalid_env_base_url() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        std::env::set_var("DRUPAL_STEPS__BASE_URL", "drupal.test");
        let result = Config::load(None);
        clear_env();

        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let config = Config::default().with_base_url("drupal.test");
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_empty_region_selector_rejected() {
        let config = Config::default().with_region("footer", "  ");
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let result = Config::from_file("/nonexistent/drupal-steps.toml");
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
