//! Polling Reconciler: snapshot diffing, ghost bookkeeping and the poll loop.

mod diff;
mod poller;
mod reconciler;

pub use diff::SnapshotDiff;
pub use poller::{ListView, Poller};
pub use reconciler::{Reconciler, RenderPhase, RenderedTorrent};
