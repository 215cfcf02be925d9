//! Test environment configuration.
//!
//! Loaded from YAML; every field has a default pointing at a local
//! development engine, so an empty file is a valid configuration.
//!
//! ```yaml
//! app_url: http://localhost:8080/operaton/app/cockpit/default/
//! rest_url: http://localhost:8080/engine-rest
//! request_timeout_ms: 10000
//! browser:
//!   headless: false
//! ```

use crate::browser::BrowserConfig;
use crate::result::{E2eError, E2eResult};
use crate::scenario::ResourceDir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default cockpit application root
pub const DEFAULT_APP_URL: &str = "http://localhost:8080/operaton/app/cockpit/default/";

/// Default engine REST root
pub const DEFAULT_REST_URL: &str = "http://localhost:8080/engine-rest";

/// Configuration of a test environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct E2eConfig {
    /// Cockpit application root the page objects navigate below
    pub app_url: String,
    /// Engine REST root scenarios are executed against
    pub rest_url: String,
    /// Fixture directory (None = the bundled `resources/`)
    pub resources_dir: Option<PathBuf>,
    /// Timeout of a single backend request
    pub request_timeout_ms: u64,
    /// Browser launch settings
    pub browser: BrowserConfig,
}

impl Default for E2eConfig {
    fn default() -> Self {
        Self {
            app_url: DEFAULT_APP_URL.to_string(),
            rest_url: DEFAULT_REST_URL.to_string(),
            resources_dir: None,
            request_timeout_ms: 30_000,
            browser: BrowserConfig::default(),
        }
    }
}

impl E2eConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML document
    ///
    /// # Errors
    ///
    /// Returns error on malformed YAML or invalid values
    pub fn from_yaml_str(yaml: &str) -> E2eResult<Self> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml_ng::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> E2eResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading config");
        Self::from_yaml_str(&yaml)
    }

    /// Set the engine REST root
    #[must_use]
    pub fn with_rest_url(mut self, url: impl Into<String>) -> Self {
        self.rest_url = url.into();
        self
    }

    /// Set the cockpit application root
    #[must_use]
    pub fn with_app_url(mut self, url: impl Into<String>) -> Self {
        self.app_url = url.into();
        self
    }

    /// Set the fixture directory
    #[must_use]
    pub fn with_resources_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resources_dir = Some(dir.into());
        self
    }

    /// Fixture directory to read scenario resources from
    #[must_use]
    pub fn resources(&self) -> ResourceDir {
        self.resources_dir
            .as_ref()
            .map_or_else(ResourceDir::default, |dir| ResourceDir::new(dir))
    }

    /// Backend request timeout
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    fn validate(&self) -> E2eResult<()> {
        if self.rest_url.trim().is_empty() {
            return Err(E2eError::Config {
                message: "rest_url must not be empty".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(E2eError::Config {
                message: "request_timeout_ms must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = E2eConfig::default();
        assert_eq!(config.app_url, DEFAULT_APP_URL);
        assert_eq!(config.rest_url, DEFAULT_REST_URL);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.resources(), ResourceDir::default());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(E2eConfig::from_yaml_str("").unwrap(), E2eConfig::default());
    }

    #[test]
    fn test_partial_yaml() {
        let config = E2eConfig::from_yaml_str(
            "rest_url: http://engine:8080/engine-rest\nbrowser:\n  headless: false\n",
        )
        .unwrap();
        assert_eq!(config.rest_url, "http://engine:8080/engine-rest");
        assert_eq!(config.app_url, DEFAULT_APP_URL);
        assert!(!config.browser.headless);
        assert!(config.browser.sandbox);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            E2eConfig::from_yaml_str("request_timeout_ms: 0").unwrap_err(),
            E2eError::Config { .. }
        ));
        assert!(matches!(
            E2eConfig::from_yaml_str("rest_url: ''").unwrap_err(),
            E2eError::Config { .. }
        ));
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(
            E2eConfig::from_yaml_str("request_timeout_ms: [").unwrap_err(),
            E2eError::Yaml(_)
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("e2e.yaml");
        std::fs::write(&path, "resources_dir: /srv/fixtures\n").unwrap();

        let config = E2eConfig::load(&path).unwrap();
        assert_eq!(config.resources(), ResourceDir::new("/srv/fixtures"));
    }

    #[test]
    fn test_builders() {
        let config = E2eConfig::new()
            .with_rest_url("http://a/engine-rest")
            .with_app_url("http://a/app/")
            .with_resources_dir("/tmp/r");
        assert_eq!(config.rest_url, "http://a/engine-rest");
        assert_eq!(config.app_url, "http://a/app/");
        assert_eq!(config.resources_dir, Some(PathBuf::from("/tmp/r")));
    }
}
