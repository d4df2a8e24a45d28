//! Background poll loop feeding the reconciler.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use fetchctl_config::{MotionConfig, PollingConfig};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::reconciler::{Reconciler, RenderPhase, RenderedTorrent};
use crate::api::TorrentApi;
use crate::timers::TimerRegistry;

/// Published state of the torrent list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListView {
    /// Rendered rows, live items first.
    pub items: Vec<RenderedTorrent>,
    /// Whether at least one fetch has succeeded.
    pub loaded: bool,
    /// Delay scheduled before the next fetch.
    pub next_interval: Duration,
}

impl ListView {
    /// Rows currently in `phase`.
    pub fn in_phase(&self, phase: RenderPhase) -> impl Iterator<Item = &RenderedTorrent> {
        self.items.iter().filter(move |row| row.phase == phase)
    }

    /// Hashes of every rendered row in display order.
    #[must_use]
    pub fn hashes(&self) -> Vec<&str> {
        self.items
            .iter()
            .map(|row| row.record.hash.as_str())
            .collect()
    }
}

struct Shared {
    reconciler: Mutex<Reconciler>,
    view: watch::Sender<ListView>,
}

impl Shared {
    fn reconciler(&self) -> MutexGuard<'_, Reconciler> {
        self.reconciler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, reconciler: &Reconciler) {
        self.view.send_replace(ListView {
            items: reconciler.rendered(),
            loaded: reconciler.is_loaded(),
            next_interval: reconciler.next_interval(),
        });
    }

    fn expire(&self) {
        let mut reconciler = self.reconciler();
        if reconciler.expire(Instant::now()) {
            self.publish(&reconciler);
        }
    }
}

/// Handle to a running poll loop.
#[derive(Debug, Clone)]
pub struct Poller {
    view: watch::Receiver<ListView>,
}

impl Poller {
    /// Start polling on `timers`. The loop, its expiry timers and any in-flight
    /// fetch stop when the registry is disposed; the last published view stays
    /// readable.
    #[must_use]
    pub fn spawn(
        api: Arc<dyn TorrentApi>,
        timers: &TimerRegistry,
        polling: PollingConfig,
        motion: &MotionConfig,
    ) -> Self {
        let reconciler = Reconciler::new(polling, motion);
        let (view, receiver) = watch::channel(ListView {
            next_interval: reconciler.next_interval(),
            ..ListView::default()
        });
        let shared = Arc::new(Shared {
            reconciler: Mutex::new(reconciler),
            view,
        });

        let registry = timers.clone();
        timers.spawn(async move {
            loop {
                let interval = poll_once(api.as_ref(), &shared, &registry).await;
                trace!(interval_ms = interval.as_millis(), "next poll scheduled");
                if registry.sleep(interval).await.is_err() {
                    break;
                }
            }
        });

        Self { view: receiver }
    }

    /// Receiver observing every published list.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ListView> {
        self.view.clone()
    }

    /// Snapshot of the current list.
    #[must_use]
    pub fn view(&self) -> ListView {
        self.view.borrow().clone()
    }
}

/// One tick: fetch, reconcile, publish, arm expiry timers. Returns the delay
/// before the next tick. Failures leave the rendered list untouched.
async fn poll_once(
    api: &dyn TorrentApi,
    shared: &Arc<Shared>,
    timers: &TimerRegistry,
) -> Duration {
    let fetched = api.list_torrents().await;

    let mut reconciler = shared.reconciler();
    match fetched {
        Ok(list) => {
            let items = list.items.len();
            let diff = reconciler.apply(list.items, Instant::now());
            debug!(
                items,
                entering = diff.entering.len(),
                exiting = diff.exiting.len(),
                "torrent list refreshed"
            );
            shared.publish(&reconciler);

            if !diff.entering.is_empty() && !reconciler.enter_duration().is_zero() {
                let shared = Arc::clone(shared);
                timers.schedule(reconciler.enter_duration(), move || shared.expire());
            }
            if !diff.exiting.is_empty() && !reconciler.exit_duration().is_zero() {
                let shared = Arc::clone(shared);
                timers.schedule(reconciler.exit_duration(), move || shared.expire());
            }
        }
        Err(err) => debug!(error = %err, "torrent poll failed; keeping previous list"),
    }
    reconciler.next_interval()
}
