//! Validation helpers and parsing utilities for configuration values.

use url::Url;

use crate::error::{ConfigError, ConfigResult};

/// Parse an absolute `http`/`https` URL.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value does not parse or uses another scheme.
pub fn parse_http_url(value: &str, section: &str, field: &str) -> ConfigResult<Url> {
    let url = Url::parse(value.trim())
        .map_err(|err| ConfigError::invalid(section, field, format!("invalid URL: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::invalid(
            section,
            field,
            format!("unsupported scheme '{other}' (expected http or https)"),
        )),
    }
}

/// Parse a millisecond count.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not an unsigned integer.
pub fn parse_millis(value: &str, section: &str, field: &str) -> ConfigResult<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::invalid(section, field, "must be a whole number of milliseconds"))
}

pub(crate) fn ensure_non_zero(value: u64, section: &str, field: &str) -> ConfigResult<()> {
    if value == 0 {
        return Err(ConfigError::invalid(section, field, "must be non-zero"));
    }
    Ok(())
}
