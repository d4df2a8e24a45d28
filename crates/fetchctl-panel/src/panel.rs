//! Composition root: both components on one timer registry.

use std::sync::Arc;

use fetchctl_config::PanelConfig;
use tracing::info;

use crate::api::TorrentApi;
use crate::reconcile::Poller;
use crate::submission::SubmissionController;
use crate::timers::TimerRegistry;

/// A mounted control panel. Dropping it tears it down.
///
/// The Submission Controller and the Polling Reconciler share only the backend:
/// a successful submit shows up in the list on the next poll tick.
pub struct ControlPanel {
    timers: TimerRegistry,
    submission: SubmissionController,
    list: Poller,
}

impl ControlPanel {
    /// Mount both components and start polling. Must run inside a Tokio runtime.
    #[must_use]
    pub fn mount(config: &PanelConfig, api: Arc<dyn TorrentApi>) -> Self {
        let timers = TimerRegistry::new();
        let submission = SubmissionController::new(
            Arc::clone(&api),
            timers.clone(),
            config.motion,
            config.submission.clone(),
        );
        let list = Poller::spawn(api, &timers, config.polling, &config.motion);
        info!(
            active_ms = config.polling.active_interval_ms,
            idle_ms = config.polling.idle_interval_ms,
            "control panel mounted"
        );
        Self {
            timers,
            submission,
            list,
        }
    }

    /// The add-torrent form.
    #[must_use]
    pub const fn submission(&self) -> &SubmissionController {
        &self.submission
    }

    /// The polled torrent list.
    #[must_use]
    pub const fn list(&self) -> &Poller {
        &self.list
    }

    /// Registry owning every scheduled task.
    #[must_use]
    pub const fn timers(&self) -> &TimerRegistry {
        &self.timers
    }

    /// Cancel every pending timer and in-flight request. Idempotent.
    pub fn teardown(&self) {
        if !self.timers.is_disposed() {
            self.timers.dispose();
            info!("control panel torn down");
        }
    }
}

impl Drop for ControlPanel {
    fn drop(&mut self) {
        self.teardown();
    }
}
