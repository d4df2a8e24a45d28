//! Shared client utilities and error types for the CLI.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use fetchctl_config::PanelConfig;
use fetchctl_panel::{ApiError, HttpTorrentApi, TorrentApi};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use url::Url;

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

/// Build the shared HTTP client tagging every request with `request_id`.
pub(crate) fn build_client(request_id: &str, timeout: Option<Duration>) -> CliResult<Client> {
    let mut default_headers = HeaderMap::new();
    let request_id = HeaderValue::from_str(request_id)
        .map_err(|_| CliError::failure(anyhow!("request identifier contains invalid characters")))?;
    default_headers.insert(HEADER_REQUEST_ID, request_id);

    let mut builder = Client::builder().default_headers(default_headers);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))
}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) client: Client,
    pub(crate) base_url: Url,
    pub(crate) config: PanelConfig,
}

impl AppContext {
    /// Collaborator bound to this context's client and base URL.
    pub(crate) fn api(&self) -> Arc<dyn TorrentApi> {
        Arc::new(HttpTorrentApi::with_client(
            self.client.clone(),
            self.base_url.clone(),
        ))
    }
}

/// Parse the API URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    let url = input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme '{other}' in '{input}'")),
    }
}

/// Classify a collaborator error into a CLI error.
///
/// Client-side rejections (400, 409, 422) are validation failures; everything
/// else is operational.
pub(crate) fn classify_api_error(err: ApiError) -> CliError {
    match err {
        ApiError::Status {
            status: 400 | 409 | 422,
            message,
        } => CliError::validation(message),
        ApiError::Status { message, .. } => CliError::failure(anyhow!(message)),
        other => CliError::failure(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_url_rejects_invalid_input() {
        assert!(parse_url("http://127.0.0.1:8080").is_ok());
        let err = parse_url("not a url").expect_err("garbage");
        assert!(err.contains("invalid URL"));
        let err = parse_url("ftp://files.example").expect_err("ftp");
        assert!(err.contains("unsupported scheme 'ftp'"));
    }

    #[test]
    fn exit_codes_follow_error_class() {
        assert_eq!(CliError::validation("bad").exit_code(), 2);
        assert_eq!(CliError::failure(anyhow!("boom")).exit_code(), 3);
        assert_eq!(CliError::validation("bad").display_message(), "bad");
    }

    #[test]
    fn api_errors_are_classified_by_status() {
        let conflict = classify_api_error(ApiError::Status {
            status: 409,
            message: "torrent already queued".to_string(),
        });
        assert!(matches!(
            conflict,
            CliError::Validation(ref message) if message == "torrent already queued"
        ));

        let unavailable = classify_api_error(ApiError::status(503));
        assert_eq!(unavailable.exit_code(), 3);
        assert_eq!(
            unavailable.display_message(),
            "HTTP error! status: 503"
        );
    }

    #[test]
    fn client_rejects_invalid_request_ids() {
        assert!(build_client("abc-123", None).is_ok());
        assert!(build_client("bad\nid", Some(Duration::from_secs(1))).is_err());
    }
}
