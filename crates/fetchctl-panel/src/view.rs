//! Formatting helpers for rendered torrent rows.

use fetchctl_api_models::ETA_UNKNOWN_MINUTES;

/// Shown for an ETA the backend cannot estimate.
pub const ETA_UNKNOWN_LABEL: &str = "unknown";

const MINUTES_PER_HOUR: u64 = 60;
const MINUTES_PER_DAY: u64 = 24 * MINUTES_PER_HOUR;

/// Render remaining minutes as `<1m`, `42m`, `3h 05m` or `2d 4h`.
///
/// Absent, negative, non-finite and sentinel values render as [`ETA_UNKNOWN_LABEL`].
#[must_use]
pub fn format_eta(minutes: Option<f64>) -> String {
    let Some(minutes) = minutes
        .filter(|value| value.is_finite() && *value >= 0.0 && *value < ETA_UNKNOWN_MINUTES)
    else {
        return ETA_UNKNOWN_LABEL.to_string();
    };

    if minutes < 1.0 {
        return "<1m".to_string();
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let whole = minutes.round() as u64;
    match whole {
        m if m < MINUTES_PER_HOUR => format!("{m}m"),
        m if m < MINUTES_PER_DAY => {
            format!("{}h {:02}m", m / MINUTES_PER_HOUR, m % MINUTES_PER_HOUR)
        }
        m => format!(
            "{}d {}h",
            m / MINUTES_PER_DAY,
            (m % MINUTES_PER_DAY) / MINUTES_PER_HOUR
        ),
    }
}

/// Render a throughput in megabytes per second; sub-megabyte rates use KB/s.
#[must_use]
pub fn format_speed(mbps: f64) -> String {
    let mbps = if mbps.is_finite() { mbps.max(0.0) } else { 0.0 };
    if mbps >= 1.0 {
        format!("{mbps:.1} MB/s")
    } else {
        format!("{:.0} KB/s", mbps * 1024.0)
    }
}
