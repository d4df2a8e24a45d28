//! Default values for the panel configuration.
//!
//! The submission defaults mirror what the connector expects for a Jellyfin
//! import when the form leaves a field blank.

/// Backend base URL used when nothing else is configured.
pub const API_BASE_URL: &str = "http://127.0.0.1:8080/";
/// Media server web UI, relative to the base URL.
pub const MEDIA_SERVER_LINK: &str = "/__jellyfin__";
/// Download manager web UI, relative to the base URL.
pub const DOWNLOAD_MANAGER_LINK: &str = "/__qbittorrent__";

/// Poll interval while the last snapshot had at least one item.
pub const POLL_ACTIVE_MS: u64 = 5_000;
/// Poll interval while the last snapshot was empty.
pub const POLL_IDLE_MS: u64 = 10_000;

/// Duration of one submit-button icon transition.
pub const ICON_TRANSITION_MS: u64 = 240;
/// How long the success icon stays up before returning to idle.
pub const SUCCESS_HOLD_MS: u64 = 2_000;
/// Enter transition for newly listed torrents.
pub const ENTER_TRANSITION_MS: u64 = 900;
/// Exit transition for torrents that left the list.
pub const EXIT_TRANSITION_MS: u64 = 900;
/// Delay between revealed lines of the output panel.
pub const OUTPUT_LINE_MS: u64 = 62;

/// Save path applied when the form leaves it blank.
pub const SAVE_PATH: &str = "/data/Windows/Movies";
/// Category applied when the form leaves it blank.
pub const CATEGORY: &str = "jellyfin";
/// Comma-separated tags applied when the form leaves them blank.
pub const TAGS: &str = "fetch-api";
