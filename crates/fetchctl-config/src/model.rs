//! Typed configuration sections.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::defaults;
use crate::error::{ConfigError, ConfigResult};
use crate::validate;

/// Complete panel configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PanelConfig {
    /// Backend endpoint settings.
    pub api: ApiConfig,
    /// Deep links to the surrounding web UIs.
    pub links: LinkConfig,
    /// Poll cadence for the torrent list.
    pub polling: PollingConfig,
    /// Visual transition timings.
    pub motion: MotionConfig,
    /// Values applied to blank submission fields.
    pub submission: SubmissionDefaults,
}

impl PanelConfig {
    /// Check every section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] for the first offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        self.api.base_url()?;
        self.links.resolve(&self.api.base_url()?)?;
        self.polling.validate()
    }
}

/// Backend endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every API path is resolved against.
    pub base_url: String,
    /// Optional per-request timeout; `None` waits indefinitely.
    pub request_timeout_ms: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::API_BASE_URL.to_string(),
            request_timeout_ms: None,
        }
    }
}

impl ApiConfig {
    /// Parsed base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] when the URL does not parse or is not HTTP(S).
    pub fn base_url(&self) -> ConfigResult<Url> {
        validate::parse_http_url(&self.base_url, "api", "base_url")
    }

    /// Request timeout as a duration.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

/// Deep links to the media server and download manager web UIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Media server UI, absolute or relative to the base URL.
    pub media_server: String,
    /// Download manager UI, absolute or relative to the base URL.
    pub download_manager: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            media_server: defaults::MEDIA_SERVER_LINK.to_string(),
            download_manager: defaults::DOWNLOAD_MANAGER_LINK.to_string(),
        }
    }
}

/// Deep links resolved against a base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLinks {
    /// Media server UI.
    pub media_server: Url,
    /// Download manager UI.
    pub download_manager: Url,
}

impl LinkConfig {
    /// Resolve both links against `base`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] when a link cannot be joined onto `base`.
    pub fn resolve(&self, base: &Url) -> ConfigResult<ResolvedLinks> {
        let join = |value: &str, field: &str| {
            base.join(value)
                .map_err(|err| ConfigError::invalid("links", field, err.to_string()))
        };
        Ok(ResolvedLinks {
            media_server: join(&self.media_server, "media_server")?,
            download_manager: join(&self.download_manager, "download_manager")?,
        })
    }
}

/// Poll cadence for the torrent list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Interval after a snapshot with at least one item.
    pub active_interval_ms: u64,
    /// Interval after an empty snapshot.
    pub idle_interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            active_interval_ms: defaults::POLL_ACTIVE_MS,
            idle_interval_ms: defaults::POLL_IDLE_MS,
        }
    }
}

impl PollingConfig {
    /// Active interval as a duration.
    #[must_use]
    pub const fn active_interval(&self) -> Duration {
        Duration::from_millis(self.active_interval_ms)
    }

    /// Idle interval as a duration.
    #[must_use]
    pub const fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }

    /// Both intervals must be non-zero and the active one may not exceed the idle one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] naming the offending interval.
    pub fn validate(&self) -> ConfigResult<()> {
        validate::ensure_non_zero(self.active_interval_ms, "polling", "active_interval_ms")?;
        validate::ensure_non_zero(self.idle_interval_ms, "polling", "idle_interval_ms")?;
        if self.active_interval_ms > self.idle_interval_ms {
            return Err(ConfigError::invalid(
                "polling",
                "active_interval_ms",
                "must not exceed idle_interval_ms",
            ));
        }
        Ok(())
    }
}

/// Transition timings. Zero disables the corresponding delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// One submit-button icon transition.
    pub icon_transition_ms: u64,
    /// Success icon hold before returning to idle.
    pub success_hold_ms: u64,
    /// Enter flag lifetime for new list items.
    pub enter_ms: u64,
    /// Ghost lifetime for removed list items.
    pub exit_ms: u64,
    /// Delay between revealed output lines.
    pub output_line_ms: u64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            icon_transition_ms: defaults::ICON_TRANSITION_MS,
            success_hold_ms: defaults::SUCCESS_HOLD_MS,
            enter_ms: defaults::ENTER_TRANSITION_MS,
            exit_ms: defaults::EXIT_TRANSITION_MS,
            output_line_ms: defaults::OUTPUT_LINE_MS,
        }
    }
}

impl MotionConfig {
    /// Every delay set to zero; used by headless callers that only want final states.
    #[must_use]
    pub const fn instant() -> Self {
        Self {
            icon_transition_ms: 0,
            success_hold_ms: 0,
            enter_ms: 0,
            exit_ms: 0,
            output_line_ms: 0,
        }
    }

    /// Icon transition as a duration.
    #[must_use]
    pub const fn icon_transition(&self) -> Duration {
        Duration::from_millis(self.icon_transition_ms)
    }

    /// Success hold as a duration.
    #[must_use]
    pub const fn success_hold(&self) -> Duration {
        Duration::from_millis(self.success_hold_ms)
    }

    /// Enter transition as a duration.
    #[must_use]
    pub const fn enter(&self) -> Duration {
        Duration::from_millis(self.enter_ms)
    }

    /// Exit transition as a duration.
    #[must_use]
    pub const fn exit(&self) -> Duration {
        Duration::from_millis(self.exit_ms)
    }

    /// Output line delay as a duration.
    #[must_use]
    pub const fn output_line(&self) -> Duration {
        Duration::from_millis(self.output_line_ms)
    }
}

/// How strictly the submission URL is checked before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UrlValidation {
    /// Any non-blank value is accepted (magnets included).
    #[default]
    Lenient,
    /// Only well-formed `http`/`https` URLs are accepted.
    Strict,
}

impl UrlValidation {
    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lenient => "lenient",
            Self::Strict => "strict",
        }
    }
}

impl Display for UrlValidation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for UrlValidation {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(ConfigError::invalid(
                "submission",
                "url_validation",
                format!("unknown mode '{other}' (expected lenient or strict)"),
            )),
        }
    }
}

/// Values applied when the corresponding submission field is blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionDefaults {
    /// Save path fallback.
    pub save_path: String,
    /// Category fallback.
    pub category: String,
    /// Comma-separated tags fallback.
    pub tags: String,
    /// Initial state of the manage toggle.
    pub manage: bool,
    /// Initial state of the notify toggle.
    pub notify: bool,
    /// Initial state of the subtitle toggle.
    pub find_subs: bool,
    /// URL check applied before dispatch.
    pub url_validation: UrlValidation,
}

impl Default for SubmissionDefaults {
    fn default() -> Self {
        Self {
            save_path: defaults::SAVE_PATH.to_string(),
            category: defaults::CATEGORY.to_string(),
            tags: defaults::TAGS.to_string(),
            manage: true,
            notify: true,
            find_subs: false,
            url_validation: UrlValidation::Lenient,
        }
    }
}
