#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub, unused)]
#![allow(clippy::multiple_crate_versions)]
//! Shared HTTP DTOs for the fetch-api downloader connector.
//!
//! The panel and the CLI both decode backend payloads through these types so the
//! contract stays in one place. Records are read-only snapshots owned by the
//! backend; the client only ever replaces them wholesale.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// ETA values at or above this many minutes are reported by the backend when the
/// remaining time cannot be estimated.
pub const ETA_UNKNOWN_MINUTES: f64 = 144_000.0;

/// Tag prefix used by the connector to publish post-processing sub-status.
pub const JELLYFIN_TAG_PREFIX: &str = "jellyfin:";

/// Coarse lifecycle state reported for a torrent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TorrentStatus {
    /// Actively fetching pieces.
    Downloading,
    /// Stopped by the user or the connector.
    Paused,
    /// Download finished.
    Completed,
    /// Download failed.
    Error,
    /// Any state the client does not recognise.
    #[default]
    #[serde(other)]
    Unknown,
}

impl TorrentStatus {
    /// Stable lowercase label for table output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Downloading => "downloading",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Error => "error",
            Self::Unknown => "unknown",
        }
    }
}

/// One queued, active or finished download as reported by `GET /torrents/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TorrentRecord {
    /// Stable identifier, unique within a snapshot.
    pub hash: String,
    #[serde(default)]
    /// Display name.
    pub name: String,
    #[serde(default)]
    /// Lifecycle state.
    pub status: TorrentStatus,
    #[serde(default)]
    /// Completion in the range 0–100.
    pub progress_percentage: f64,
    #[serde(default)]
    /// Download throughput; meaningful only while downloading.
    pub speed_download_mbps: f64,
    #[serde(default)]
    /// Upload throughput; meaningful only while downloading.
    pub speed_upload_mbps: f64,
    #[serde(default)]
    /// Connected seeders; meaningful only while downloading.
    pub seeders: u32,
    #[serde(default)]
    /// Connected leechers; meaningful only while downloading.
    pub leechers: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Remaining minutes, absent or sentinel when unknown.
    pub eta_minutes: Option<f64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    /// Ordered tag list, including connector sub-status tags.
    pub tags: Vec<String>,
}

impl TorrentRecord {
    /// Build a record with only identity fields populated.
    #[must_use]
    pub fn new(hash: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            name: name.into(),
            status: TorrentStatus::Unknown,
            progress_percentage: 0.0,
            speed_download_mbps: 0.0,
            speed_upload_mbps: 0.0,
            seeders: 0,
            leechers: 0,
            eta_minutes: None,
            tags: Vec::new(),
        }
    }

    /// Whether transfer statistics (speeds, peers, ETA) are meaningful.
    #[must_use]
    pub fn is_downloading(&self) -> bool {
        self.status == TorrentStatus::Downloading
    }

    /// Progress clamped to 0–100.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress_percentage.clamp(0.0, 100.0)
    }

    /// ETA in minutes, `None` when absent, negative or at the unknown sentinel.
    #[must_use]
    pub fn eta(&self) -> Option<f64> {
        self.eta_minutes
            .filter(|minutes| minutes.is_finite() && *minutes >= 0.0)
            .filter(|minutes| *minutes < ETA_UNKNOWN_MINUTES)
    }

    /// Connector sub-status tags in tag order.
    pub fn jellyfin_tags(&self) -> impl Iterator<Item = JellyfinTag> + '_ {
        self.tags.iter().filter_map(|tag| JellyfinTag::parse(tag))
    }

    /// Latest subtitle lookup state, if the connector published one.
    #[must_use]
    pub fn subtitle_status(&self) -> Option<SubStatus> {
        self.jellyfin_tags()
            .filter(|tag| tag.action == JellyfinAction::FindSubs)
            .map(|tag| tag.state)
            .last()
    }

    /// Latest rename state, if the connector published one.
    #[must_use]
    pub fn rename_status(&self) -> Option<SubStatus> {
        self.jellyfin_tags()
            .filter(|tag| tag.action == JellyfinAction::Rename)
            .map(|tag| tag.state)
            .last()
    }

    /// User-facing tags with connector sub-status tags removed.
    #[must_use]
    pub fn display_tags(&self) -> Vec<&str> {
        self.tags
            .iter()
            .filter(|tag| JellyfinTag::parse(tag).is_none())
            .map(String::as_str)
            .collect()
    }
}

/// Post-processing step a connector tag refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JellyfinAction {
    /// Subtitle lookup (`jellyfin:find_subs=<state>`).
    FindSubs,
    /// Library rename (`jellyfin:<state>=rename`).
    Rename,
}

impl JellyfinAction {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "find_subs" => Some(Self::FindSubs),
            "rename" => Some(Self::Rename),
            _ => None,
        }
    }
}

/// Progress of a post-processing step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SubStatus {
    /// Queued or running.
    Pending,
    /// Finished successfully.
    Completed,
    /// Finished with some items missing.
    PartiallyCompleted,
    /// Nothing to do, results already on disk.
    AlreadyPresent,
    /// Gave up.
    Failed,
}

impl SubStatus {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "partially_completed" => Some(Self::PartiallyCompleted),
            "already_present" => Some(Self::AlreadyPresent),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::PartiallyCompleted => "partially_completed",
            Self::AlreadyPresent => "already_present",
            Self::Failed => "failed",
        }
    }
}

/// Decoded connector sub-status tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JellyfinTag {
    /// Step the tag describes.
    pub action: JellyfinAction,
    /// Reported state of that step.
    pub state: SubStatus,
}

impl JellyfinTag {
    /// Parse either `jellyfin:<action>=<state>` or `jellyfin:<state>=<action>`.
    ///
    /// Returns `None` for plain tags and for unknown actions or states.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        let body = tag.trim().strip_prefix(JELLYFIN_TAG_PREFIX)?;
        let (left, right) = body.split_once('=')?;
        if let Some(action) = JellyfinAction::parse(left) {
            return SubStatus::parse(right).map(|state| Self { action, state });
        }
        let action = JellyfinAction::parse(right)?;
        SubStatus::parse(left).map(|state| Self { action, state })
    }
}

/// Envelope returned by `GET /torrents/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TorrentListResponse {
    #[serde(default)]
    /// Item count reported by the backend.
    pub total_items: usize,
    #[serde(default, deserialize_with = "null_as_empty")]
    /// Records in backend order; a missing or null field decodes as empty.
    pub items: Vec<TorrentRecord>,
}

/// Body of `POST /torrents/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddTorrentRequest {
    /// Magnet link or torrent URL.
    pub url: String,
    /// Target directory on the download host.
    pub save_path: String,
    /// Download manager category.
    pub category: String,
    /// Tags applied on admission.
    pub tags: Vec<String>,
    /// Let the connector rename and clean up after completion.
    pub manage: bool,
    /// Post a chat notification once downloaded.
    pub notify: bool,
    /// Look up subtitles once downloaded.
    pub find_subs: bool,
}

/// Error document returned by the connector on non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Raw upstream payload when the connector proxied a failure.
    pub upstream_response: Option<Map<String, Value>>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}
