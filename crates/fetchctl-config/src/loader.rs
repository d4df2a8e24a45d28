//! Layered configuration loading: defaults, then a JSON file, then environment.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{PanelConfig, UrlValidation};
use crate::validate;

/// Environment variable overriding `api.base_url`.
pub const ENV_API_URL: &str = "FETCHCTL_API_URL";
/// Environment variable overriding `api.request_timeout_ms` (`0` disables the timeout).
pub const ENV_REQUEST_TIMEOUT_MS: &str = "FETCHCTL_REQUEST_TIMEOUT_MS";
/// Environment variable overriding `polling.active_interval_ms`.
pub const ENV_POLL_ACTIVE_MS: &str = "FETCHCTL_POLL_ACTIVE_MS";
/// Environment variable overriding `polling.idle_interval_ms`.
pub const ENV_POLL_IDLE_MS: &str = "FETCHCTL_POLL_IDLE_MS";
/// Environment variable overriding `submission.url_validation`.
pub const ENV_URL_VALIDATION: &str = "FETCHCTL_URL_VALIDATION";
/// Environment variable overriding `links.media_server`.
pub const ENV_MEDIA_SERVER_URL: &str = "FETCHCTL_MEDIA_SERVER_URL";
/// Environment variable overriding `links.download_manager`.
pub const ENV_DOWNLOAD_MANAGER_URL: &str = "FETCHCTL_DOWNLOAD_MANAGER_URL";

/// Builder that assembles a [`PanelConfig`] from its sources.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env: HashMap<String, String>,
}

impl ConfigLoader {
    /// Loader that yields the built-in defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a JSON document; missing sections and fields keep their defaults.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Overlay variables from an explicit set (later entries win).
    #[must_use]
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(key, value)| (key.into(), value.into())));
        self
    }

    /// Overlay the `FETCHCTL_*` variables of the current process.
    #[must_use]
    pub fn with_process_env(self) -> Self {
        self.with_env(std::env::vars().filter(|(key, _)| key.starts_with("FETCHCTL_")))
    }

    /// Resolve and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] or [`ConfigError::Parse`] when the file cannot be used, and
    /// [`ConfigError::InvalidField`] when an override or the final document is invalid.
    pub fn load(self) -> ConfigResult<PanelConfig> {
        let mut config = match &self.file {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })?;
                debug!(path = %path.display(), "loaded configuration file");
                serde_json::from_str::<PanelConfig>(&raw).map_err(|source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                })?
            }
            None => PanelConfig::default(),
        };

        self.apply_env(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&self, config: &mut PanelConfig) -> ConfigResult<()> {
        if let Some(value) = self.var(ENV_API_URL) {
            validate::parse_http_url(value, "api", "base_url")?;
            config.api.base_url = value.trim().to_string();
        }
        if let Some(value) = self.var(ENV_REQUEST_TIMEOUT_MS) {
            let millis = validate::parse_millis(value, "api", "request_timeout_ms")?;
            config.api.request_timeout_ms = (millis > 0).then_some(millis);
        }
        if let Some(value) = self.var(ENV_POLL_ACTIVE_MS) {
            config.polling.active_interval_ms =
                validate::parse_millis(value, "polling", "active_interval_ms")?;
        }
        if let Some(value) = self.var(ENV_POLL_IDLE_MS) {
            config.polling.idle_interval_ms =
                validate::parse_millis(value, "polling", "idle_interval_ms")?;
        }
        if let Some(value) = self.var(ENV_URL_VALIDATION) {
            config.submission.url_validation = value.parse::<UrlValidation>()?;
        }
        if let Some(value) = self.var(ENV_MEDIA_SERVER_URL) {
            config.links.media_server = value.trim().to_string();
        }
        if let Some(value) = self.var(ENV_DOWNLOAD_MANAGER_URL) {
            config.links.download_manager = value.trim().to_string();
        }
        Ok(())
    }

    fn var(&self, key: &str) -> Option<&str> {
        self.env
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn loader_without_sources_yields_defaults() {
        let config = ConfigLoader::new().load().expect("defaults should load");
        assert_eq!(config, PanelConfig::default());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let file = write_config(
            r#"{
                "api": { "base_url": "https://fetch.example/api/" },
                "motion": { "success_hold_ms": 500 },
                "submission": { "category": "anime", "url_validation": "strict" }
            }"#,
        );

        let config = ConfigLoader::new()
            .with_file(file.path())
            .load()
            .expect("partial file should load");

        assert_eq!(config.api.base_url, "https://fetch.example/api/");
        assert_eq!(config.motion.success_hold_ms, 500);
        assert_eq!(config.motion.icon_transition_ms, 240);
        assert_eq!(config.submission.category, "anime");
        assert_eq!(config.submission.save_path, "/data/Windows/Movies");
        assert_eq!(config.submission.url_validation, UrlValidation::Strict);
        assert_eq!(config.polling.idle_interval_ms, 10_000);
    }

    #[test]
    fn environment_overrides_file_values() {
        let file = write_config(r#"{ "polling": { "active_interval_ms": 2000 } }"#);

        let config = ConfigLoader::new()
            .with_file(file.path())
            .with_env([
                (ENV_API_URL, "http://10.0.0.5:9000/"),
                (ENV_POLL_ACTIVE_MS, "3000"),
                (ENV_REQUEST_TIMEOUT_MS, "15000"),
                (ENV_URL_VALIDATION, "strict"),
                (ENV_MEDIA_SERVER_URL, "https://jf.example"),
            ])
            .load()
            .expect("env overrides should load");

        assert_eq!(config.api.base_url, "http://10.0.0.5:9000/");
        assert_eq!(config.api.request_timeout_ms, Some(15_000));
        assert_eq!(config.polling.active_interval_ms, 3_000);
        assert_eq!(config.submission.url_validation, UrlValidation::Strict);
        assert_eq!(config.links.media_server, "https://jf.example");
    }

    #[test]
    fn zero_timeout_disables_request_timeout() {
        let config = ConfigLoader::new()
            .with_env([(ENV_REQUEST_TIMEOUT_MS, "0")])
            .load()
            .expect("zero timeout should load");
        assert!(config.api.request_timeout().is_none());
    }

    #[test]
    fn blank_environment_values_are_ignored() {
        let config = ConfigLoader::new()
            .with_env([(ENV_API_URL, "   ")])
            .load()
            .expect("blank override should be ignored");
        assert_eq!(config.api.base_url, crate::defaults::API_BASE_URL);
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        let err = ConfigLoader::new()
            .with_env([(ENV_POLL_IDLE_MS, "soon")])
            .load()
            .expect_err("non-numeric interval");
        assert!(err.to_string().contains("idle_interval_ms"));

        let err = ConfigLoader::new()
            .with_env([(ENV_API_URL, "ftp://files.example")])
            .load()
            .expect_err("ftp base url");
        assert!(matches!(err, ConfigError::InvalidField { .. }));

        let err = ConfigLoader::new()
            .with_env([(ENV_POLL_ACTIVE_MS, "60000")])
            .load()
            .expect_err("active above idle");
        assert!(err.to_string().contains("active_interval_ms"));
    }

    #[test]
    fn unreadable_and_malformed_files_are_reported() {
        let err = ConfigLoader::new()
            .with_file("/definitely/missing/fetchctl.json")
            .load()
            .expect_err("missing file");
        assert!(matches!(err, ConfigError::Io { .. }));

        let file = write_config("{ not json");
        let err = ConfigLoader::new()
            .with_file(file.path())
            .load()
            .expect_err("malformed file");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
