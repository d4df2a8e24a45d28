//! Add-torrent form fields and payload construction.

use fetchctl_api_models::AddTorrentRequest;
use fetchctl_config::{SubmissionDefaults, UrlValidation};
use thiserror::Error;
use url::Url;

/// Reasons a submission is rejected before reaching the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// The URL field is empty after trimming.
    #[error("URL is required")]
    EmptyUrl,
    /// Strict mode: the URL does not parse.
    #[error("URL is not valid")]
    InvalidUrl,
    /// Strict mode: the URL parses but is not `http`/`https`.
    #[error("only http and https URLs are supported (got '{scheme}')")]
    UnsupportedScheme {
        /// Scheme that was supplied.
        scheme: String,
    },
}

/// Raw form state as edited by the user. Blank text fields fall back to the
/// configured [`SubmissionDefaults`] when the payload is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionForm {
    /// Torrent URL or magnet link.
    pub url: String,
    /// Download directory.
    pub save_path: String,
    /// Download manager category.
    pub category: String,
    /// Comma-separated tags.
    pub tags: String,
    /// Hand the finished download to the media server.
    pub manage: bool,
    /// Send a completion notification.
    pub notify: bool,
    /// Look up subtitles after completion.
    pub find_subs: bool,
}

impl Default for SubmissionForm {
    fn default() -> Self {
        Self::from_defaults(&SubmissionDefaults::default())
    }
}

impl SubmissionForm {
    /// Blank text fields with toggles seeded from `defaults`.
    #[must_use]
    pub fn from_defaults(defaults: &SubmissionDefaults) -> Self {
        Self {
            url: String::new(),
            save_path: String::new(),
            category: String::new(),
            tags: String::new(),
            manage: defaults.manage,
            notify: defaults.notify,
            find_subs: defaults.find_subs,
        }
    }

    /// Check the URL field and return it trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::EmptyUrl`] for a blank URL and, in strict mode,
    /// [`SubmissionError::InvalidUrl`] or [`SubmissionError::UnsupportedScheme`].
    pub fn validate(&self, mode: UrlValidation) -> Result<String, SubmissionError> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(SubmissionError::EmptyUrl);
        }
        if mode == UrlValidation::Strict {
            let parsed = Url::parse(url).map_err(|_| SubmissionError::InvalidUrl)?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(SubmissionError::UnsupportedScheme {
                    scheme: parsed.scheme().to_string(),
                });
            }
        }
        Ok(url.to_string())
    }

    /// Build the request payload, applying defaults to blank fields.
    ///
    /// # Errors
    ///
    /// Propagates [`validate`](Self::validate) failures.
    pub fn into_request(
        &self,
        defaults: &SubmissionDefaults,
    ) -> Result<AddTorrentRequest, SubmissionError> {
        let url = self.validate(defaults.url_validation)?;
        Ok(AddTorrentRequest {
            url,
            save_path: or_default(&self.save_path, &defaults.save_path),
            category: or_default(&self.category, &defaults.category),
            tags: split_tags(&or_default(&self.tags, &defaults.tags)),
            manage: self.manage,
            notify: self.notify,
            find_subs: self.find_subs,
        })
    }
}

fn or_default(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.trim().to_string()
    } else {
        trimmed.to_string()
    }
}

fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(url: &str) -> SubmissionForm {
        SubmissionForm {
            url: url.to_string(),
            ..SubmissionForm::default()
        }
    }

    #[test]
    fn blank_urls_are_rejected() {
        for raw in ["", "   ", "\t\n"] {
            assert_eq!(
                form(raw).validate(UrlValidation::Lenient),
                Err(SubmissionError::EmptyUrl)
            );
        }
    }

    #[test]
    fn lenient_mode_accepts_magnets_and_trims() {
        let url = form("  magnet:?xt=urn:btih:abc  ")
            .validate(UrlValidation::Lenient)
            .expect("magnet accepted");
        assert_eq!(url, "magnet:?xt=urn:btih:abc");
        assert!(form("not even a url").validate(UrlValidation::Lenient).is_ok());
    }

    #[test]
    fn strict_mode_requires_http_urls() {
        assert!(
            form("https://tracker.example/file.torrent")
                .validate(UrlValidation::Strict)
                .is_ok()
        );
        assert_eq!(
            form("not a url").validate(UrlValidation::Strict),
            Err(SubmissionError::InvalidUrl)
        );
        assert_eq!(
            form("magnet:?xt=urn:btih:abc").validate(UrlValidation::Strict),
            Err(SubmissionError::UnsupportedScheme {
                scheme: "magnet".to_string()
            })
        );
    }

    #[test]
    fn blank_fields_take_defaults() {
        let request = form("magnet:?xt=urn:btih:abc")
            .into_request(&SubmissionDefaults::default())
            .expect("request");
        assert_eq!(request.save_path, "/data/Windows/Movies");
        assert_eq!(request.category, "jellyfin");
        assert_eq!(request.tags, vec!["fetch-api".to_string()]);
        assert!(request.manage);
        assert!(request.notify);
        assert!(!request.find_subs);
    }

    #[test]
    fn tags_are_split_trimmed_and_filtered() {
        let mut custom = form("magnet:?xt=urn:btih:abc");
        custom.tags = " movies, ,4k ,, remux ".to_string();
        custom.save_path = " /mnt/media ".to_string();
        custom.find_subs = true;

        let request = custom
            .into_request(&SubmissionDefaults::default())
            .expect("request");
        assert_eq!(request.tags, vec!["movies", "4k", "remux"]);
        assert_eq!(request.save_path, "/mnt/media");
        assert!(request.find_subs);
    }

    #[test]
    fn toggles_are_seeded_from_defaults() {
        let defaults = SubmissionDefaults {
            manage: false,
            find_subs: true,
            ..SubmissionDefaults::default()
        };
        let seeded = SubmissionForm::from_defaults(&defaults);
        assert!(!seeded.manage);
        assert!(seeded.find_subs);
        assert!(seeded.url.is_empty());
    }
}
