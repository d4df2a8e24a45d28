//! Rendered-list bookkeeping: enter flags, ghosts and the adaptive interval.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use fetchctl_api_models::TorrentRecord;
use fetchctl_config::{MotionConfig, PollingConfig};
use tokio::time::Instant;

use super::diff::SnapshotDiff;

/// Animation state of one rendered row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPhase {
    /// Newly appeared; the flag clears after the enter duration.
    Entering,
    /// Present in the last two snapshots.
    Steady,
    /// Gone from the live snapshot, shown until the exit duration elapses.
    Exiting,
}

/// A record plus its animation state.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTorrent {
    /// Latest known record (for ghosts, the last one seen).
    pub record: TorrentRecord,
    /// Animation state.
    pub phase: RenderPhase,
}

#[derive(Debug, Clone)]
struct Ghost {
    record: TorrentRecord,
    expires_at: Instant,
}

/// Reconciles successive snapshots into a rendered list.
///
/// Time is passed in explicitly so the loop and its expiry timers agree on
/// deadlines.
#[derive(Debug, Clone)]
pub struct Reconciler {
    polling: PollingConfig,
    enter: Duration,
    exit: Duration,
    current: Vec<TorrentRecord>,
    previous: Option<HashSet<String>>,
    entering: HashMap<String, Instant>,
    ghosts: Vec<Ghost>,
}

impl Reconciler {
    /// Empty reconciler; nothing has been fetched yet.
    #[must_use]
    pub fn new(polling: PollingConfig, motion: &MotionConfig) -> Self {
        Self {
            polling,
            enter: motion.enter(),
            exit: motion.exit(),
            current: Vec::new(),
            previous: None,
            entering: HashMap::new(),
            ghosts: Vec::new(),
        }
    }

    /// Fold a freshly fetched snapshot in at `now`.
    ///
    /// The first snapshot is rendered without a diff. Later snapshots flag
    /// entering items and turn exiting ones into ghosts. An item that comes back
    /// while still a ghost is treated as never having left.
    pub fn apply(&mut self, snapshot: Vec<TorrentRecord>, now: Instant) -> SnapshotDiff {
        let hashes: HashSet<String> = snapshot.iter().map(|record| record.hash.clone()).collect();

        let diff = match &self.previous {
            None => SnapshotDiff::default(),
            Some(previous) => SnapshotDiff::between(
                previous.iter().map(String::as_str),
                hashes.iter().map(String::as_str),
            ),
        };

        let revived: HashSet<String> = self
            .ghosts
            .iter()
            .filter(|ghost| hashes.contains(&ghost.record.hash))
            .map(|ghost| ghost.record.hash.clone())
            .collect();
        self.ghosts.retain(|ghost| !revived.contains(&ghost.record.hash));

        self.entering.retain(|hash, _| hashes.contains(hash));
        if !self.enter.is_zero() {
            for hash in diff.entering.iter().filter(|hash| !revived.contains(*hash)) {
                self.entering.insert(hash.clone(), now + self.enter);
            }
        }

        if !self.exit.is_zero() {
            for record in self
                .current
                .iter()
                .filter(|record| diff.exiting.contains(&record.hash))
            {
                self.ghosts.push(Ghost {
                    record: record.clone(),
                    expires_at: now + self.exit,
                });
            }
        }

        self.current = snapshot;
        self.previous = Some(hashes);
        diff
    }

    /// Drop enter flags and ghosts whose window has closed by `now`.
    /// Returns whether anything changed.
    pub fn expire(&mut self, now: Instant) -> bool {
        let before = (self.entering.len(), self.ghosts.len());
        self.entering.retain(|_, deadline| *deadline > now);
        self.ghosts.retain(|ghost| ghost.expires_at > now);
        before != (self.entering.len(), self.ghosts.len())
    }

    /// Live items in snapshot order, then ghosts in the order they left.
    #[must_use]
    pub fn rendered(&self) -> Vec<RenderedTorrent> {
        let live = self.current.iter().map(|record| RenderedTorrent {
            record: record.clone(),
            phase: if self.entering.contains_key(&record.hash) {
                RenderPhase::Entering
            } else {
                RenderPhase::Steady
            },
        });
        let ghosts = self.ghosts.iter().map(|ghost| RenderedTorrent {
            record: ghost.record.clone(),
            phase: RenderPhase::Exiting,
        });
        live.chain(ghosts).collect()
    }

    /// Delay before the next fetch: active while the last snapshot had items,
    /// idle otherwise (including before the first successful fetch).
    #[must_use]
    pub fn next_interval(&self) -> Duration {
        if self.current.is_empty() {
            self.polling.idle_interval()
        } else {
            self.polling.active_interval()
        }
    }

    /// Whether a snapshot has been applied yet.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.previous.is_some()
    }

    /// Configured enter duration.
    #[must_use]
    pub const fn enter_duration(&self) -> Duration {
        self.enter
    }

    /// Configured exit duration.
    #[must_use]
    pub const fn exit_duration(&self) -> Duration {
        self.exit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(900);

    fn reconciler() -> Reconciler {
        Reconciler::new(PollingConfig::default(), &MotionConfig::default())
    }

    fn records(hashes: &[&str]) -> Vec<TorrentRecord> {
        hashes
            .iter()
            .map(|hash| TorrentRecord::new(*hash, format!("Torrent {hash}")))
            .collect()
    }

    fn phases(reconciler: &Reconciler) -> Vec<(String, RenderPhase)> {
        reconciler
            .rendered()
            .into_iter()
            .map(|row| (row.record.hash, row.phase))
            .collect()
    }

    fn row(hash: &str, phase: RenderPhase) -> (String, RenderPhase) {
        (hash.to_string(), phase)
    }

    #[test]
    fn first_snapshot_renders_without_animation() {
        let mut reconciler = reconciler();
        let t0 = Instant::now();
        assert!(!reconciler.is_loaded());

        let diff = reconciler.apply(records(&["a", "b"]), t0);
        assert!(diff.is_empty());
        assert!(reconciler.is_loaded());
        assert_eq!(
            phases(&reconciler),
            vec![row("a", RenderPhase::Steady), row("b", RenderPhase::Steady)]
        );
    }

    #[test]
    fn entering_flag_clears_after_window() {
        let mut reconciler = reconciler();
        let t0 = Instant::now();
        reconciler.apply(records(&["a"]), t0);

        let diff = reconciler.apply(records(&["a", "b"]), t0 + Duration::from_secs(5));
        assert_eq!(diff.entering.len(), 1);
        assert_eq!(
            phases(&reconciler),
            vec![row("a", RenderPhase::Steady), row("b", RenderPhase::Entering)]
        );

        let t1 = t0 + Duration::from_secs(5);
        assert!(!reconciler.expire(t1 + WINDOW - Duration::from_millis(1)));
        assert!(reconciler.expire(t1 + WINDOW));
        assert_eq!(phases(&reconciler)[1], row("b", RenderPhase::Steady));
    }

    #[test]
    fn removed_item_ghosts_for_exactly_one_window() {
        let mut reconciler = reconciler();
        let t0 = Instant::now();
        reconciler.apply(records(&["a", "b"]), t0);

        let t1 = t0 + Duration::from_secs(5);
        let diff = reconciler.apply(records(&["b"]), t1);
        assert_eq!(diff.exiting.iter().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(
            phases(&reconciler),
            vec![row("b", RenderPhase::Steady), row("a", RenderPhase::Exiting)]
        );

        reconciler.expire(t1 + WINDOW - Duration::from_millis(1));
        assert_eq!(reconciler.rendered().len(), 2);

        assert!(reconciler.expire(t1 + WINDOW));
        assert_eq!(phases(&reconciler), vec![row("b", RenderPhase::Steady)]);
    }

    #[test]
    fn reappearing_ghost_is_treated_as_never_left() {
        let mut reconciler = reconciler();
        let t0 = Instant::now();
        reconciler.apply(records(&["a", "b"]), t0);
        reconciler.apply(records(&["b"]), t0 + Duration::from_millis(100));

        let diff = reconciler.apply(records(&["a", "b"]), t0 + Duration::from_millis(200));
        assert!(diff.entering.contains("a"));
        assert_eq!(
            phases(&reconciler),
            vec![row("a", RenderPhase::Steady), row("b", RenderPhase::Steady)]
        );

        assert!(!reconciler.expire(t0 + Duration::from_secs(10)));
        assert_eq!(reconciler.rendered().len(), 2);
    }

    #[test]
    fn ghost_record_is_the_last_one_seen() {
        let mut reconciler = reconciler();
        let t0 = Instant::now();
        let mut first = records(&["a"]);
        first[0].progress_percentage = 42.0;
        reconciler.apply(first, t0);
        reconciler.apply(Vec::new(), t0 + Duration::from_secs(5));

        let rendered = reconciler.rendered();
        assert_eq!(rendered.len(), 1);
        assert!((rendered[0].record.progress_percentage - 42.0).abs() < f64::EPSILON);
    }

    #[test]
    fn item_leaving_while_entering_becomes_a_ghost() {
        let mut reconciler = reconciler();
        let t0 = Instant::now();
        reconciler.apply(Vec::new(), t0);
        reconciler.apply(records(&["a"]), t0 + Duration::from_millis(100));
        reconciler.apply(Vec::new(), t0 + Duration::from_millis(200));

        assert_eq!(phases(&reconciler), vec![row("a", RenderPhase::Exiting)]);
    }

    #[test]
    fn zero_durations_disable_animation() {
        let mut reconciler = Reconciler::new(PollingConfig::default(), &MotionConfig::instant());
        let t0 = Instant::now();
        reconciler.apply(records(&["a"]), t0);
        reconciler.apply(records(&["b"]), t0 + Duration::from_secs(1));

        assert_eq!(phases(&reconciler), vec![row("b", RenderPhase::Steady)]);
    }

    #[test]
    fn interval_follows_last_snapshot_size() {
        let mut reconciler = reconciler();
        let t0 = Instant::now();
        assert_eq!(reconciler.next_interval(), Duration::from_secs(10));

        reconciler.apply(records(&["a"]), t0);
        assert_eq!(reconciler.next_interval(), Duration::from_secs(5));

        reconciler.apply(Vec::new(), t0 + Duration::from_secs(5));
        assert_eq!(reconciler.next_interval(), Duration::from_secs(10));
    }
}
