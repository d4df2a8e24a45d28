//! Command handlers grouped by concern.

pub(crate) mod health;
pub(crate) mod torrents;
pub(crate) mod watch;

#[cfg(test)]
pub(crate) fn test_context(base_url: &str) -> crate::client::AppContext {
    use fetchctl_config::PanelConfig;

    let client = crate::client::build_client("test-request", None).expect("client");
    let base_url = format!("{}/", base_url.trim_end_matches('/'));
    crate::client::AppContext {
        client,
        base_url: base_url.parse().expect("base url"),
        config: PanelConfig::default(),
    }
}
