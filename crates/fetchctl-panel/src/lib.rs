#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub, unused)]
#![allow(clippy::module_name_repetitions)]

//! Headless control panel for the fetch-api downloader connector.
//!
//! Layout:
//! - `api.rs`: the HTTP collaborator trait and its reqwest implementation
//! - `timers.rs`: scoped timer registry cancelled on teardown
//! - `fence.rs`: generation tokens that invalidate superseded continuations
//! - `output.rs`: pretty-printed response panel with line-by-line reveal
//! - `submission/`: add-torrent form, button state and the submit flow
//! - `reconcile/`: snapshot diffing, ghost bookkeeping and the poll loop
//! - `panel.rs`: mounts both components on one registry
//! - `view.rs`: formatting helpers for rendered rows
//!
//! Every piece of visible state lives in a `tokio::sync::watch` channel so
//! front-ends (the CLI, a TUI, tests) observe transitions instead of polling.

pub mod api;
pub mod error;
pub mod fence;
pub mod output;
pub mod panel;
pub mod reconcile;
pub mod submission;
pub mod timers;
pub mod view;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::{HttpTorrentApi, TorrentApi};
pub use error::{ApiError, ApiResult, Disposed};
pub use fence::{FlowFence, FlowId};
pub use output::{EMPTY_OUTPUT, OutputPanel};
pub use panel::ControlPanel;
pub use reconcile::{ListView, Poller, Reconciler, RenderPhase, RenderedTorrent, SnapshotDiff};
pub use submission::{
    ButtonIcon, ButtonPhase, IconTransition, SubmissionController, SubmissionError,
    SubmissionForm, SubmissionView, SubmitOutcome,
};
pub use timers::TimerRegistry;
pub use view::{ETA_UNKNOWN_LABEL, format_eta, format_speed};
