//! Unified error types for Drupal-Steps

use thiserror::Error;

/// Unified Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for Drupal-Steps
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Layered configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ::config::ConfigError),

    /// TOML parse errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// No table, or no row matching the search text
    #[error("Not found: {0}")]
    NotFound(String),

    /// A text presence/absence check did not hold
    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    /// Element not found
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Browser session errors
    #[error("Session error: {0}")]
    Session(String),

    /// Authoring driver errors
    #[error("Driver error: {0}")]
    Driver(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Create a new not found error naming the search text and page URL
    pub fn not_found<S: Into<String>, U: AsRef<str>>(search: S, url: U) -> Self {
        Error::NotFound(format!(
            "Failed to find a row containing \"{}\" on the page {}",
            search.into(),
            url.as_ref()
        ))
    }

    /// Create a new not found error for a page without any table rows
    pub fn no_table<S: AsRef<str>, U: AsRef<str>>(search: S, url: U) -> Self {
        Error::NotFound(format!(
            "Cannot find a table on the page {} while looking for a row containing \"{}\"",
            url.as_ref(),
            search.as_ref()
        ))
    }

    /// Create a new assertion failed error
    pub fn assertion_failed<S: Into<String>>(msg: S) -> Self {
        Error::AssertionFailed(msg.into())
    }

    /// Create a new element not found error
    pub fn element_not_found<S: Into<String>>(what: S) -> Self {
        Error::ElementNotFound(what.into())
    }

    /// Create a new session error
    pub fn session<S: Into<String>>(msg: S) -> Self {
        Error::Session(msg.into())
    }

    /// Create a new driver error
    pub fn driver<S: Into<String>>(msg: S) -> Self {
        Error::Driver(msg.into())
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    /// Whether this error means a row search came up empty
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_search_and_url() {
        let err = Error::not_found("Editor", "http://example.com/admin/people");
        let msg = err.to_string();
        assert!(msg.contains("\"Editor\""));
        assert!(msg.contains("http://example.com/admin/people"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_no_table_names_search_and_url() {
        let err = Error::no_table("Editor", "http://example.com/admin/people");
        let msg = err.to_string();
        assert!(msg.contains("\"Editor\""));
        assert!(msg.contains("http://example.com/admin/people"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_other_errors_are_not_not_found() {
        assert!(!Error::assertion_failed("nope").is_not_found());
        assert!(!Error::element_not_found("link").is_not_found());
    }
}
